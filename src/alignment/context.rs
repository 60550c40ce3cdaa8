/*!
 * Positional context fingerprints.
 *
 * A marker is recognised by the letters that precede it rather than by its
 * own letter alone. Translators drop and swap markers, so besides the exact
 * windows of the last 3, 4 and 5 letters we keep every order-preserving
 * subsequence of the larger windows. Matching walks a ladder from the
 * strictest window to the loosest.
 *
 * The first three positions do not have a full window; they carry an edge
 * context with `prev0..prev(index)` instead.
 */

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::alignment::model::MarkerToken;

/// Number of leading positions that only get an edge context
pub const EDGE_POSITIONS: usize = 3;

/// Which kind of edge a leading marker sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCase {
    /// Very first marker of the sequence
    Start,
    /// Second or third marker
    Partial,
}

/// Context of a marker in one of the first three positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeContext {
    pub edge_case: EdgeCase,

    /// `windows[j]` holds the `j` letters immediately preceding the marker
    pub windows: Vec<Vec<MarkerToken>>,
}

/// Context of a marker with at least three predecessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FullContext {
    pub prev3: Vec<MarkerToken>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev4: Option<Vec<MarkerToken>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev5: Option<Vec<MarkerToken>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prev5_choose4: Vec<Vec<MarkerToken>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prev5_choose3: Vec<Vec<MarkerToken>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prev4_choose3: Vec<Vec<MarkerToken>>,
}

/// Positional fingerprint attached to a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContextFingerprint {
    Edge(EdgeContext),
    Full(FullContext),
}

impl ContextFingerprint {
    pub fn edge_case(&self) -> Option<EdgeCase> {
        match self {
            Self::Edge(edge) => Some(edge.edge_case),
            Self::Full(_) => None,
        }
    }
}

/// Rule that produced a match, recorded for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// Edge contexts agreed on the window of the given size
    EdgeCase(usize),
    Prev5,
    Prev5Choose4,
    Prev5Choose3,
    Prev4,
    Prev4Choose3,
    Prev3,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EdgeCase(j) => write!(f, "edge_case_prev{}", j),
            Self::Prev5 => write!(f, "prev5"),
            Self::Prev5Choose4 => write!(f, "prev5Choose4"),
            Self::Prev5Choose3 => write!(f, "prev5Choose3"),
            Self::Prev4 => write!(f, "prev4"),
            Self::Prev4Choose3 => write!(f, "prev4Choose3"),
            Self::Prev3 => write!(f, "prev3"),
        }
    }
}

impl FromStr for MatchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(j) = s.strip_prefix("edge_case_prev") {
            return j
                .parse()
                .map(Self::EdgeCase)
                .map_err(|_| format!("Invalid match method: {}", s));
        }
        match s {
            "prev5" => Ok(Self::Prev5),
            "prev5Choose4" => Ok(Self::Prev5Choose4),
            "prev5Choose3" => Ok(Self::Prev5Choose3),
            "prev4" => Ok(Self::Prev4),
            "prev4Choose3" => Ok(Self::Prev4Choose3),
            "prev3" => Ok(Self::Prev3),
            _ => Err(format!("Invalid match method: {}", s)),
        }
    }
}

impl Serialize for MatchMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// All order-preserving subsequences of `items` with exactly `size` elements
///
/// Results come out in lexicographic order of the chosen indices.
pub fn combinations<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size > items.len() {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..size).collect();

    loop {
        result.push(indices.iter().map(|&i| items[i].clone()).collect());

        // Rightmost index that can still advance
        let mut slot = size;
        loop {
            if slot == 0 {
                return result;
            }
            slot -= 1;
            if indices[slot] < items.len() - size + slot {
                break;
            }
        }

        indices[slot] += 1;
        for next in slot + 1..size {
            indices[next] = indices[next - 1] + 1;
        }
    }
}

/// Build the context of the marker at 1-based `position`
///
/// `sequence` is the marker sequence seen so far on the same side (source or
/// translation); only its first `position - 1` entries are consulted, so it
/// may already contain the marker itself.
pub fn build_context(sequence: &[MarkerToken], position: usize) -> ContextFingerprint {
    let index = position.saturating_sub(1);
    let preceding = &sequence[..index.min(sequence.len())];

    let window = |count: usize| -> Option<Vec<MarkerToken>> {
        if count > preceding.len() {
            return None;
        }
        Some(preceding[preceding.len() - count..].to_vec())
    };

    if index < EDGE_POSITIONS {
        let edge_case = if index == 0 { EdgeCase::Start } else { EdgeCase::Partial };
        let windows = (0..=index).map(|j| window(j).unwrap_or_default()).collect();
        return ContextFingerprint::Edge(EdgeContext { edge_case, windows });
    }

    let prev3 = window(3).unwrap_or_default();
    let prev4 = window(4);
    let prev5 = window(5);

    let (prev5_choose4, prev5_choose3) = match &prev5 {
        Some(p5) if p5.len() == 5 => (combinations(p5, 4), combinations(p5, 3)),
        _ => (Vec::new(), Vec::new()),
    };
    let prev4_choose3 = match &prev4 {
        Some(p4) if p4.len() == 4 => combinations(p4, 3),
        _ => Vec::new(),
    };

    ContextFingerprint::Full(FullContext {
        prev3,
        prev4,
        prev5,
        prev5_choose4,
        prev5_choose3,
        prev4_choose3,
    })
}

/// Source-side context prepared for repeated lookups
#[derive(Debug, Clone)]
pub enum CompiledContext {
    Edge(EdgeContext),
    Full {
        prev3: Vec<MarkerToken>,
        prev4: Option<Vec<MarkerToken>>,
        prev5: Option<Vec<MarkerToken>>,
        prev5_choose4: HashSet<Vec<MarkerToken>>,
        prev5_choose3: HashSet<Vec<MarkerToken>>,
        prev4_choose3: HashSet<Vec<MarkerToken>>,
    },
}

impl From<&ContextFingerprint> for CompiledContext {
    fn from(fingerprint: &ContextFingerprint) -> Self {
        match fingerprint {
            ContextFingerprint::Edge(edge) => Self::Edge(edge.clone()),
            ContextFingerprint::Full(full) => Self::Full {
                prev3: full.prev3.clone(),
                prev4: full.prev4.clone(),
                prev5: full.prev5.clone(),
                prev5_choose4: full.prev5_choose4.iter().cloned().collect(),
                prev5_choose3: full.prev5_choose3.iter().cloned().collect(),
                prev4_choose3: full.prev4_choose3.iter().cloned().collect(),
            },
        }
    }
}

impl CompiledContext {
    /// Compare a translation-side context against this source context
    ///
    /// Edge contexts only match edge contexts. For edge contexts the largest
    /// shared window is tried first so the reported method is as specific as
    /// possible; `prev0` is always empty on both sides and therefore always
    /// agrees. Full contexts walk the ladder in strict priority order.
    pub fn compare(&self, translation: &ContextFingerprint) -> Option<MatchMethod> {
        match (self, translation) {
            (Self::Edge(source), ContextFingerprint::Edge(trans)) => {
                let shared = source.windows.len().min(trans.windows.len());
                (0..shared)
                    .rev()
                    .find(|&j| source.windows[j] == trans.windows[j])
                    .map(MatchMethod::EdgeCase)
            }
            (
                Self::Full {
                    prev3,
                    prev4,
                    prev5,
                    prev5_choose4,
                    prev5_choose3,
                    prev4_choose3,
                },
                ContextFingerprint::Full(trans),
            ) => {
                if trans.prev5.is_some() && trans.prev5 == *prev5 {
                    return Some(MatchMethod::Prev5);
                }
                if let Some(t4) = &trans.prev4 {
                    if prev5_choose4.contains(t4) {
                        return Some(MatchMethod::Prev5Choose4);
                    }
                }
                if prev5_choose3.contains(&trans.prev3) {
                    return Some(MatchMethod::Prev5Choose3);
                }
                if trans.prev4.is_some() && trans.prev4 == *prev4 {
                    return Some(MatchMethod::Prev4);
                }
                if prev4_choose3.contains(&trans.prev3) {
                    return Some(MatchMethod::Prev4Choose3);
                }
                if trans.prev3 == *prev3 {
                    return Some(MatchMethod::Prev3);
                }
                None
            }
            _ => None,
        }
    }
}
