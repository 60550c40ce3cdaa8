/*!
 * Tests for the incremental chunk scanner
 */

use segment_mapper::alignment::{ChunkScanner, TranslationMarker};
use segment_mapper::app_config::StreamConfig;

fn scan_in_pieces(text: &str, size: usize) -> Vec<TranslationMarker> {
    let mut scanner = ChunkScanner::default();
    let chars: Vec<char> = text.chars().collect();
    let mut markers = Vec::new();
    for piece in chars.chunks(size) {
        let piece: String = piece.iter().collect();
        markers.extend(scanner.feed(&piece).completed);
    }
    markers.extend(scanner.finalize());
    markers
}

/// Test that chunking never changes the scanned markers
#[test]
fn test_feed_withAnyChunkSize_shouldYieldSameMarkers() {
    let text = "(a) Xin chào (b) thế giới (c) (bạn) khỏe không (d) cuối";
    let whole = scan_in_pieces(text, text.chars().count());
    assert_eq!(whole.len(), 4);

    for size in 1..=7 {
        assert_eq!(scan_in_pieces(text, size), whole, "chunk size {}", size);
    }
}

/// Test that markers get stream positions and trimmed contents
#[test]
fn test_feed_shouldNumberMarkersInStreamOrder() {
    let markers = scan_in_pieces("(a)  first  (a) second (b)third", 100);
    let summary: Vec<(char, usize, &str)> = markers
        .iter()
        .map(|m| (m.letter, m.position, m.content.as_str()))
        .collect();
    assert_eq!(summary, vec![('a', 1, "first"), ('a', 2, "second"), ('b', 3, "third")]);
}

/// Test that parenthesised words are content, not markers
#[test]
fn test_feed_withParenthesisedWord_shouldKeepItAsContent() {
    let markers = scan_in_pieces("(a) see (bạn) and (B) and (ab) ok", 3);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].content, "see (bạn) and (B) and (ab) ok");
}

/// Test that text before the first marker is dropped
#[test]
fn test_feed_withPreamble_shouldDropIt() {
    let markers = scan_in_pieces("Bản dịch: (a) nội dung", 4);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].content, "nội dung");
}

/// Test the partial marker reported while content is still arriving
#[test]
fn test_feed_shouldReportCurrentPartialMarker() {
    let mut scanner = ChunkScanner::default();
    let output = scanner.feed("(a) hello (b) wor");
    assert_eq!(output.completed.len(), 1);
    let current = output.current.unwrap();
    assert_eq!(current.letter, 'b');
    assert_eq!(current.position, 2);
    assert_eq!(current.partial_content, "wor");
    assert_eq!(scanner.completed_count(), 1);
}

/// Test that an empty stream yields nothing
#[test]
fn test_finalize_withoutMarkers_shouldYieldNothing() {
    let mut scanner = ChunkScanner::default();
    scanner.feed("just text");
    assert!(scanner.finalize().is_none());
    assert!(scanner.finalize().is_none());
}

/// Test that the diagnostic buffer is trimmed to its tail
#[test]
fn test_feed_beyondCeiling_shouldKeepOnlyTail() {
    let config = StreamConfig {
        buffer_ceiling: 10,
        buffer_keep_tail: 4,
        ..StreamConfig::default()
    };
    let mut scanner = ChunkScanner::new(&config);
    scanner.feed("(a) 0123456789");

    assert_eq!(scanner.buffer(), "6789");
    assert_eq!(scanner.total_chars(), 14);

    // Trimming never touches marker state
    assert_eq!(scanner.finalize().unwrap().content, "0123456789");
}
