/*!
 * Long-lived language services.
 *
 * `LanguageServices` owns the word splitter, the optional compound lexicon
 * and the bounded caches in front of them. One instance is created per
 * processor and passed by reference to the extractor and the redistributor.
 */

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::app_config::{CacheConfig, RedistributionConfig};
use crate::language_utils;
use crate::text::boundaries::BoundaryRules;
use crate::text::cache::BoundedCache;
use crate::text::compounds::{self, CompoundLexicon};
use crate::text::tokenizer::{UnicodeWordSplitter, WordSplitter};

/// Cache hit counters for both caches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceCacheStats {
    pub split_hits: usize,
    pub split_misses: usize,
    pub compound_hits: usize,
    pub compound_misses: usize,
}

/// Language capabilities shared by extraction and redistribution
pub struct LanguageServices {
    splitter: Arc<dyn WordSplitter>,
    lexicon: Option<Arc<dyn CompoundLexicon>>,
    split_cache: BoundedCache<(String, String), Vec<String>>,
    compound_cache: BoundedCache<String, String>,
    merge_compounds: bool,
}

impl fmt::Debug for LanguageServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageServices")
            .field("has_lexicon", &self.lexicon.is_some())
            .field("merge_compounds", &self.merge_compounds)
            .field("split_cache_len", &self.split_cache.len())
            .field("compound_cache_len", &self.compound_cache.len())
            .finish()
    }
}

impl Default for LanguageServices {
    fn default() -> Self {
        Self::new(&CacheConfig::default(), &RedistributionConfig::default())
    }
}

impl LanguageServices {
    /// Create services with the default splitter and no lexicon
    pub fn new(cache: &CacheConfig, redistribution: &RedistributionConfig) -> Self {
        Self {
            splitter: Arc::new(UnicodeWordSplitter),
            lexicon: None,
            split_cache: BoundedCache::new(cache.split_cache_capacity),
            compound_cache: BoundedCache::new(cache.compound_cache_capacity),
            merge_compounds: redistribution.merge_compounds,
        }
    }

    /// Replace the word splitter
    pub fn with_splitter(mut self, splitter: Arc<dyn WordSplitter>) -> Self {
        self.splitter = splitter;
        self.split_cache.clear();
        self
    }

    /// Attach a compound lexicon (consulted for Vietnamese only)
    pub fn with_lexicon(mut self, lexicon: Arc<dyn CompoundLexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self.compound_cache.clear();
        self
    }

    /// Lexicon for a language, if one applies
    pub fn lexicon_for(&self, language: &str) -> Option<&dyn CompoundLexicon> {
        if language == "vi" { self.lexicon.as_deref() } else { None }
    }

    /// Split a text into words
    pub fn split_words(&self, text: &str, language: &str) -> Vec<String> {
        let key = (language.to_string(), text.to_string());
        self.split_cache
            .get_or_insert_with(key, || self.splitter.split_into_words(text, language))
    }

    /// Count words with the same rules as `split_words`
    pub fn count_words(&self, text: &str, language: &str) -> usize {
        self.split_words(text, language).len()
    }

    /// Compound-mark a translation when the language and settings call for it
    ///
    /// Returns `None` when no marking applies, so callers can tell a plain
    /// translation from one that merely contained no compounds.
    pub fn mark_compounds(&self, text: &str, language: &str) -> Option<String> {
        if !self.merge_compounds {
            return None;
        }
        let lexicon = self.lexicon_for(language)?;
        let marked = self
            .compound_cache
            .get_or_insert_with(text.to_string(), || compounds::merge_compounds(text, lexicon));
        debug!("Compound marking: {} chars in, {} chars out", text.chars().count(), marked.chars().count());
        Some(marked)
    }

    /// Boundary rules for a language
    pub fn boundary_rules(&self, language: &str) -> BoundaryRules {
        BoundaryRules::for_language(language)
    }

    /// Detect the language of a text
    pub fn detect_language(&self, text: &str) -> &'static str {
        language_utils::detect_language(text)
    }

    /// Cache counters
    pub fn cache_stats(&self) -> ServiceCacheStats {
        let (split_hits, split_misses, _) = self.split_cache.stats();
        let (compound_hits, compound_misses, _) = self.compound_cache.stats();
        ServiceCacheStats {
            split_hits,
            split_misses,
            compound_hits,
            compound_misses,
        }
    }
}
