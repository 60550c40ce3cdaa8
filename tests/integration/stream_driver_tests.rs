/*!
 * Tests for the async stream driver and the chunk simulator
 */

use futures::stream;
use segment_mapper::alignment::{drive_stream, drive_stream_with_progress, ChunkSimulator};
use segment_mapper::app_config::SimulationConfig;

use crate::common;

const SOURCE: &str = "(a) Hello there (b) General Kenobi (c) You are a bold one";
const TRANSLATION: &str = "(a) Xin chào (b) Tướng quân Kenobi (c) Ngươi thật là to gan";

/// Test that an async stream gives the same result as direct feeding
#[tokio::test]
async fn test_driveStream_shouldMatchDirectFeeding() {
    let config = common::test_config();
    let expected = common::run_chunked(SOURCE, TRANSLATION, 1000, &config);

    let mut processor = common::processor_for(SOURCE, &config);
    let chunks: Vec<String> = ["(a) Xin ch", "ào (", "b) Tướng quân Kenobi (c", ") Ngươi thật là to gan"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let stats = drive_stream(&mut processor, stream::iter(chunks)).await;

    assert_eq!(stats, expected.stats());
    assert!(processor.is_finalized());
    assert_eq!(processor.document().digest().unwrap(), expected.document().digest().unwrap());
}

/// Test that the simulator with jitter still reproduces the same alignment
#[tokio::test]
async fn test_driveStream_withJitteredSimulator_shouldBeChunkingIndependent() {
    let config = common::test_config();
    let expected = common::run_chunked(SOURCE, TRANSLATION, 1000, &config);

    for seed in [1, 2, 3] {
        let simulation = SimulationConfig {
            chunk_size: 6,
            chunk_jitter: 4,
            chunk_delay_ms: 0,
            seed: Some(seed),
        };
        let mut processor = common::processor_for(SOURCE, &config);
        let stats = drive_stream(&mut processor, ChunkSimulator::new(&simulation).stream(TRANSLATION)).await;

        assert_eq!(stats.matched, 3);
        assert_eq!(processor.document().digest().unwrap(), expected.document().digest().unwrap());
    }
}

/// Test that the progress callback sees every chunk
#[test]
fn test_driveStreamWithProgress_shouldCallBackPerChunk() {
    let config = common::test_config();
    let mut processor = common::processor_for(SOURCE, &config);
    let mut simulation = config.simulation.clone();
    simulation.chunk_size = 10;
    let mut simulator = ChunkSimulator::new(&simulation);
    let chunks = simulator.split(TRANSLATION);
    let expected_chunks = chunks.len();

    let mut seen = Vec::new();
    let stats = tokio_test::block_on(drive_stream_with_progress(&mut processor, stream::iter(chunks), |result| {
        seen.push(result.stats.processed)
    }));

    assert_eq!(seen.len(), expected_chunks);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(stats.processed, 3);
}

/// Test that an empty stream still finalizes
#[tokio::test]
async fn test_driveStream_withEmptyStream_shouldOrphanEverything() {
    let config = common::test_config();
    let mut processor = common::processor_for(SOURCE, &config);
    let stats = drive_stream(&mut processor, stream::iter(Vec::<String>::new())).await;

    assert_eq!(stats.orphaned, 3);
    assert_eq!(stats.processed, 0);
}

/// Test the chunk estimate against an actual split
#[test]
fn test_estimateChunks_withoutJitter_shouldMatchSplit() {
    let simulation = SimulationConfig {
        chunk_size: 7,
        chunk_jitter: 0,
        chunk_delay_ms: 0,
        seed: None,
    };
    let mut simulator = ChunkSimulator::new(&simulation);
    let estimate = simulator.estimate_chunks(TRANSLATION);
    assert_eq!(simulator.split(TRANSLATION).len(), estimate);
    assert_eq!(simulator.estimate_chunks(""), 0);
}
