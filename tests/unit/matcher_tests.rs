/*!
 * Tests for context fingerprints and marker matching
 */

use segment_mapper::alignment::context::{build_context, EdgeCase};
use segment_mapper::alignment::{
    ContextFingerprint, ContextMatcher, MarkerExtractor, MarkerToken, MatchFailure, MatchMethod, MatchOutcome,
    SourceDocument, TranslationMarker,
};
use segment_mapper::text::LanguageServices;

fn document(text: &str) -> SourceDocument {
    let services = LanguageServices::default();
    MarkerExtractor::new(&services, "en").extract(text, &[])
}

fn feed(matcher: &mut ContextMatcher, letters: &str) -> Vec<MatchOutcome> {
    letters
        .chars()
        .enumerate()
        .map(|(i, letter)| {
            matcher.match_marker(&TranslationMarker {
                letter,
                position: i + 1,
                content: String::new(),
            })
        })
        .collect()
}

fn tokens(letters: &str) -> Vec<MarkerToken> {
    letters.chars().map(MarkerToken).collect()
}

/// Test the methods reported along an undisturbed sequence
#[test]
fn test_matchMarker_withIdenticalSequence_shouldClimbTheLadder() {
    let doc = document("(a) 1 (b) 2 (c) 3 (d) 4 (e) 5 (f) 6 (g) 7");
    let mut matcher = ContextMatcher::new(&doc);
    let methods: Vec<Option<MatchMethod>> = feed(&mut matcher, "abcdefg").iter().map(|o| o.method()).collect();

    assert_eq!(
        methods,
        vec![
            Some(MatchMethod::EdgeCase(0)),
            Some(MatchMethod::EdgeCase(1)),
            Some(MatchMethod::EdgeCase(2)),
            Some(MatchMethod::Prev3),
            Some(MatchMethod::Prev4),
            Some(MatchMethod::Prev5),
            Some(MatchMethod::Prev5),
        ]
    );
    assert!(matcher.unmatched().is_empty());
}

/// Test that a stream starting past the first source marker still matches
#[test]
fn test_matchMarker_withMissingFirstMarker_shouldMatchOnEdgeWindows() {
    let doc = document("(a) 1 (b) 2 (c) 3");
    let mut matcher = ContextMatcher::new(&doc);
    let outcomes = feed(&mut matcher, "bc");

    assert_eq!(
        outcomes[0],
        MatchOutcome::Matched {
            source_position: 2,
            method: MatchMethod::EdgeCase(0)
        }
    );
    assert_eq!(
        outcomes[1],
        MatchOutcome::Matched {
            source_position: 3,
            method: MatchMethod::EdgeCase(1)
        }
    );
    assert_eq!(matcher.unmatched().candidates('a'), &[1]);
}

/// Test that a swapped pair is recovered through a subsequence window
#[test]
fn test_matchMarker_withSwappedPair_shouldUseSubsequenceWindow() {
    let doc = document("(a) 1 (b) 2 (c) 3 (d) 4 (e) 5");
    let mut matcher = ContextMatcher::new(&doc);
    let outcomes = feed(&mut matcher, "abced");

    assert_eq!(
        outcomes[3],
        MatchOutcome::Matched {
            source_position: 5,
            method: MatchMethod::Prev4Choose3
        }
    );
    assert_eq!(outcomes[4], MatchOutcome::Unmatched(MatchFailure::NoContextMatch));
}

/// Test that later occurrences of a letter are reachable after earlier ones match
#[test]
fn test_matchMarker_withRepeatedLetters_shouldMatchEachOccurrenceOnce() {
    let doc = document("(a) One (b) Two (a) Three (b) Four");
    let mut matcher = ContextMatcher::new(&doc);
    let positions: Vec<Option<usize>> = feed(&mut matcher, "abab").iter().map(|o| o.source_position()).collect();
    assert_eq!(positions, vec![Some(1), Some(2), Some(3), Some(4)]);
}

/// Test the translation-side context of the most recent marker
#[test]
fn test_lastContext_shouldMirrorSourceFingerprint() {
    let doc = document("(a) 1 (b) 2 (c) 3 (d) 4");
    let mut matcher = ContextMatcher::new(&doc);
    assert!(matcher.last_context().is_none());
    feed(&mut matcher, "abcd");

    let context = matcher.last_context().unwrap();
    assert_eq!(context, doc.instance_at(4).unwrap().context_fingerprint);
    assert_eq!(matcher.history_len(), 4);
}

/// Test the shape of edge and full fingerprints
#[test]
fn test_buildContext_shouldProduceEdgeThenFullWindows() {
    let sequence = tokens("abcdefg");

    match build_context(&sequence, 3) {
        ContextFingerprint::Edge(edge) => {
            assert_eq!(edge.edge_case, EdgeCase::Partial);
            assert_eq!(edge.windows, vec![tokens(""), tokens("b"), tokens("ab")]);
        }
        other => panic!("expected edge context, got {:?}", other),
    }

    match build_context(&sequence, 7) {
        ContextFingerprint::Full(full) => {
            assert_eq!(full.prev3, tokens("def"));
            assert_eq!(full.prev4, Some(tokens("cdef")));
            assert_eq!(full.prev5, Some(tokens("bcdef")));
            assert_eq!(full.prev5_choose4.len(), 5);
            assert_eq!(full.prev5_choose3.len(), 10);
            assert_eq!(full.prev4_choose3.len(), 4);
        }
        other => panic!("expected full context, got {:?}", other),
    }
}

/// Test match method names as they appear in snapshots
#[test]
fn test_matchMethod_serialization_shouldUseStableNames() {
    assert_eq!(serde_json::to_string(&MatchMethod::Prev5Choose4).unwrap(), "\"prev5Choose4\"");
    assert_eq!(serde_json::to_string(&MatchMethod::EdgeCase(2)).unwrap(), "\"edge_case_prev2\"");
    let parsed: MatchMethod = serde_json::from_str("\"edge_case_prev1\"").unwrap();
    assert_eq!(parsed, MatchMethod::EdgeCase(1));
    assert!(serde_json::from_str::<MatchMethod>("\"prev9\"").is_err());
}
