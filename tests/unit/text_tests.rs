/*!
 * Tests for word splitting, caches and language services
 */

use std::sync::Arc;

use segment_mapper::app_config::{CacheConfig, RedistributionConfig};
use segment_mapper::text::cache::BoundedCache;
use segment_mapper::text::compounds::{merge_compounds, remove_compound_markers};
use segment_mapper::text::{BoundaryRules, LanguageServices, PhraseLexicon, UnicodeWordSplitter, WordSplitter};

/// Test that the least recently used entry is evicted first
#[test]
fn test_boundedCache_whenFull_shouldEvictLeastRecentlyUsed() {
    let cache: BoundedCache<&str, usize> = BoundedCache::new(2);
    cache.store("a", 1);
    cache.store("b", 2);
    assert_eq!(cache.get(&"a"), Some(1));

    cache.store("c", 3);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"a"), Some(1));
    assert_eq!(cache.evictions(), 1);
}

/// Test that a zero capacity cache never stores
#[test]
fn test_boundedCache_withZeroCapacity_shouldNotStore() {
    let cache: BoundedCache<String, String> = BoundedCache::new(0);
    let value = cache.get_or_insert_with("k".to_string(), || "v".to_string());
    assert_eq!(value, "v");
    assert!(cache.is_empty());
    let (hits, misses, rate) = cache.stats();
    assert_eq!((hits, misses), (0, 1));
    assert_eq!(rate, 0.0);
}

/// Test that repeated splits hit the cache
#[test]
fn test_services_splitWords_shouldMemoize() {
    let services = LanguageServices::default();
    let first = services.split_words("một hai ba", "vi");
    let second = services.split_words("một hai ba", "vi");
    assert_eq!(first, second);
    assert_eq!(services.count_words("một hai ba", "vi"), 3);

    let stats = services.cache_stats();
    assert_eq!(stats.split_misses, 1);
    assert_eq!(stats.split_hits, 2);
}

struct CommaSplitter;

impl WordSplitter for CommaSplitter {
    fn split_into_words(&self, text: &str, _language: &str) -> Vec<String> {
        text.split(',').map(|w| w.trim().to_string()).filter(|w| !w.is_empty()).collect()
    }
}

/// Test that a custom splitter replaces the default everywhere
#[test]
fn test_services_withSplitter_shouldUseIt() {
    let services = LanguageServices::default().with_splitter(Arc::new(CommaSplitter));
    assert_eq!(services.split_words("a b, c d", "en"), vec!["a b", "c d"]);
    assert_eq!(services.count_words("x,y,z", "en"), 3);
}

/// Test that compound marking is limited to Vietnamese and can be disabled
#[test]
fn test_services_markCompounds_shouldRespectLanguageAndSettings() {
    let lexicon = Arc::new(PhraseLexicon::from_phrases(["cà phê"]));
    let services = LanguageServices::default().with_lexicon(lexicon.clone());
    assert_eq!(services.mark_compounds("uống cà phê", "vi").as_deref(), Some("uống «cà phê»"));
    assert_eq!(services.mark_compounds("uống cà phê", "en"), None);
    assert_eq!(LanguageServices::default().mark_compounds("uống cà phê", "vi"), None);

    let disabled = RedistributionConfig {
        merge_compounds: false,
        ..RedistributionConfig::default()
    };
    let services = LanguageServices::new(&CacheConfig::default(), &disabled).with_lexicon(lexicon);
    assert_eq!(services.mark_compounds("uống cà phê", "vi"), None);
}

/// Test that a closure works as a lexicon
#[test]
fn test_mergeCompounds_withClosure_shouldMarkAndRestore() {
    let oracle = |a: &str, b: &str| a.eq_ignore_ascii_case("xin") && b == "lỗi";
    let marked = merge_compounds("Xin lỗi bạn", &oracle);
    assert_eq!(marked, "«Xin lỗi» bạn");
    assert_eq!(remove_compound_markers(&marked), "Xin lỗi bạn");
}

/// Test non-spaced scripts and empty input
#[test]
fn test_unicodeSplitter_withVariousScripts_shouldSplitSensibly() {
    assert!(UnicodeWordSplitter.split_into_words("   ", "en").is_empty());
    assert_eq!(UnicodeWordSplitter.count_words("hello big world", "en"), 3);
    let japanese = UnicodeWordSplitter.split_into_words("こんにちは 世界", "ja");
    assert!(!japanese.is_empty());
    assert!(japanese.iter().all(|w| !w.trim().is_empty()));
}

/// Test that only Vietnamese carries boundary rules
#[test]
fn test_boundaryRules_shouldExistForVietnameseOnly() {
    assert!(!BoundaryRules::for_language("vi").is_empty());
    assert!(BoundaryRules::for_language("en").is_empty());

    let rules = BoundaryRules::for_language("vi");
    let words: Vec<String> = ["Tôi", "đi", "học,", "và", "về"].iter().map(|w| w.to_string()).collect();
    // A piece ending on punctuation is always a good cut
    assert!(!rules.is_violation(&words, 3, None));
    assert!(rules.is_violation(&words, 4, None));
}

/// Test script based language detection
#[test]
fn test_services_detectLanguage_shouldRecogniseScripts() {
    let services = LanguageServices::default();
    assert_eq!(services.detect_language("Tạm biệt các bạn"), "vi");
    assert_eq!(services.detect_language("Привет мир"), "ru");
    assert_eq!(services.detect_language("こんにちは"), "ja");
    assert_eq!(services.detect_language("plain words"), "en");
}
