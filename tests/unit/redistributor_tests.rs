/*!
 * Tests for translation redistribution
 */

use std::sync::Arc;

use segment_mapper::alignment::{
    DomainIndex, MarkerExtractor, MarkerStatus, OrphanHandler, RedistributionOutcome, Redistributor, SkipReason,
    StreamProcessor, UtteranceInput,
};
use segment_mapper::app_config::RedistributionConfig;
use segment_mapper::text::{LanguageServices, PhraseLexicon};

use crate::common;

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn sizes(pieces: &[Vec<String>]) -> Vec<usize> {
    pieces.iter().map(Vec::len).collect()
}

/// Test proportional splitting with rounding against the full count
#[test]
fn test_splitByWeights_shouldFollowShares() {
    let services = LanguageServices::default();
    let redistributor = Redistributor::new(&services, "en", &RedistributionConfig::default());
    let w = words("one two three four five six seven eight nine ten");

    assert_eq!(sizes(&redistributor.split_by_weights(&w, &[1.0, 1.0])), vec![5, 5]);
    assert_eq!(sizes(&redistributor.split_by_weights(&w, &[3.0, 1.0])), vec![8, 2]);
    assert_eq!(sizes(&redistributor.split_by_weights(&w, &[0.0, 0.0])), vec![5, 5]);
    assert!(redistributor.split_by_weights(&w, &[]).is_empty());
}

/// Test that scarce words still reach every piece while they last
#[test]
fn test_splitByWeights_withFewWords_shouldGiveOneWordEach() {
    let services = LanguageServices::default();
    let redistributor = Redistributor::new(&services, "en", &RedistributionConfig::default());
    let pieces = redistributor.split_by_weights(&words("alpha beta"), &[10.0, 1.0, 1.0]);
    assert_eq!(sizes(&pieces), vec![1, 1, 0]);
}

/// Test that the one-word guarantee can be switched off
#[test]
fn test_splitByWeights_withoutMinimum_shouldFollowSharesOnly() {
    let services = LanguageServices::default();
    let config = RedistributionConfig {
        min_one_word_per_utterance: false,
        ..RedistributionConfig::default()
    };
    let redistributor = Redistributor::new(&services, "en", &config);
    let pieces = redistributor.split_by_weights(&words("alpha beta"), &[10.0, 1.0, 1.0]);
    assert_eq!(sizes(&pieces), vec![2, 0, 0]);
}

/// Test that a Vietnamese cut is moved past a dangling conjunction
#[test]
fn test_splitByWeights_withVietnameseConjunction_shouldShiftCut() {
    let services = LanguageServices::default();
    let redistributor = Redistributor::new(&services, "vi", &RedistributionConfig::default());
    let pieces = redistributor.split_by_weights(&words("Tôi thích trà và cà phê sữa"), &[4.0, 3.0]);

    assert_eq!(pieces[0].join(" "), "Tôi thích trà và cà");
    assert_eq!(pieces[1].join(" "), "phê sữa");
}

/// Test that compounds are marked and never cut
#[test]
fn test_distribute_withLexicon_shouldKeepCompoundsWhole() {
    let mut config = common::test_config();
    config.target_language = "vi".to_string();
    let lexicon = PhraseLexicon::from_phrases(["hoạt động", "hàng ngày"]);
    let services = LanguageServices::default().with_lexicon(Arc::new(lexicon));
    let batches = vec![vec![
        UtteranceInput::new("I work", 0.0, 1.0),
        UtteranceInput::new("every day", 1.0, 2.0),
    ]];

    let mut processor = StreamProcessor::from_source("(a) I work every day", &batches, &config, services);
    processor.feed("(a) Tôi hoạt động hàng ngày");
    processor.finalize();

    let instance = processor.document().instance_at(1).unwrap();
    assert_eq!(
        instance.overall_translation_with_compounds.as_deref(),
        Some("Tôi «hoạt động» «hàng ngày»")
    );
    assert_eq!(instance.utterances[0].element_translation, "Tôi «hoạt động»");
    assert_eq!(instance.utterances[1].element_translation, "«hàng ngày»");
}

/// Test the three-portion split of an instance that absorbed both neighbours
#[test]
fn test_redistribute_withForwardAndBackwardMerges_shouldSplitByContentLength() {
    let config = common::test_config();
    let source = "(a) one two (b) three four (c) five six";
    let mut processor = common::processor_for(source, &config);
    processor.feed("(b) w1 w2 w3 w4 w5 w6 w7 w8 w9 w10");
    let stats = processor.finalize();

    assert_eq!((stats.matched, stats.merged, stats.orphaned), (1, 2, 0));

    let doc = processor.document();
    let target = doc.instance_at(2).unwrap();
    assert_eq!(target.status, MarkerStatus::Matched);
    let pieces: Vec<&str> = target.utterances.iter().map(|u| u.element_translation.as_str()).collect();
    // Lengths 7 + 10 + 8 over 10 words
    assert_eq!(pieces, vec!["w1 w2 w3", "w4 w5 w6 w7", "w8 w9 w10"]);

    // Merge tags become provenance once redistributed
    assert!(target.utterances.iter().all(|u| u.merged_from.is_none()));
    assert_eq!(target.utterances[0].merged_source, Some(doc.instance_at(1).unwrap().domain_index));
    assert_eq!(target.utterances[1].merged_source, None);
    assert_eq!(target.utterances[2].merged_source, Some(doc.instance_at(3).unwrap().domain_index));

    let report = processor.redistribution_report().unwrap();
    assert_eq!(report.redistributed, vec![target.domain_index]);
    assert!(report.failed.is_empty());
}

/// Test skip reasons for instances that cannot be redistributed
#[test]
fn test_redistributeInstance_withNothingToSplit_shouldSkip() {
    let config = common::test_config();
    let mut processor = common::processor_for("(a) one (b) two", &config);
    processor.feed("(a) (b) dos");
    processor.finalize();

    let services = LanguageServices::default();
    let redistributor = Redistributor::new(&services, "en", &config.redistribution);

    let mut first = processor.document().instance_at(1).unwrap().clone();
    assert_eq!(first.status, MarkerStatus::Matched);
    assert_eq!(
        redistributor.redistribute_instance(&mut first).unwrap(),
        RedistributionOutcome::Skipped(SkipReason::EmptyTranslation)
    );

    first.utterances.clear();
    assert_eq!(
        redistributor.redistribute_instance(&mut first).unwrap(),
        RedistributionOutcome::Skipped(SkipReason::NoUtterances)
    );
}

/// Test that word counts are conserved for a matched instance
#[test]
fn test_distribute_shouldConserveWords() {
    let config = common::test_config();
    let source = "(a) alpha beta gamma delta epsilon zeta";
    let mut processor =
        StreamProcessor::from_source(source, &common::split_batches_for(source), &config, LanguageServices::default());
    processor.feed("(a) uno dos tres cuatro cinco seis siete");
    processor.finalize();

    let instance = processor.document().instance_at(1).unwrap();
    let total: usize = instance
        .utterances
        .iter()
        .map(|u| common::word_count(&u.element_translation))
        .sum();
    assert_eq!(total, 7);
    assert_eq!(common::joined_elements(processor.document(), 1), "uno dos tres cuatro cinco seis siete");
}

/// Test that one failing instance does not stop the rest of the pass
#[test]
fn test_redistributeAll_withOneBrokenInstance_shouldContinueWithOthers() {
    let services = LanguageServices::default();
    let text = "(a) Hi (b) There (c) Good (d) Bye";
    let mut doc = MarkerExtractor::new(&services, "en").extract(text, &common::batches_for(text));
    let mut handler = OrphanHandler::new();
    for position in [1, 3] {
        doc.require_mut(position).unwrap().transition(MarkerStatus::Matched).unwrap();
        handler.on_match(&mut doc, position).unwrap();
    }
    handler.process_final_gaps(&mut doc).unwrap();

    let a = doc.instance_at_mut(1).unwrap();
    a.overall_translation = "xin chào bạn".to_string();
    a.utterances[1].merged_from = Some(DomainIndex::new('z', 0));
    doc.instance_at_mut(3).unwrap().overall_translation = "tạm biệt nhé".to_string();

    let redistributor = Redistributor::new(&services, "en", &RedistributionConfig::default());
    let report = redistributor.redistribute_all(&mut doc);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, DomainIndex::new('a', 0));
    assert_eq!(report.redistributed, vec![DomainIndex::new('c', 0)]);

    let c = doc.instance_at(3).unwrap();
    assert_eq!(c.utterance_count(), 2);
    assert!(c.utterances.iter().all(|u| !u.element_translation.is_empty()));
    assert_eq!(common::joined_elements(&doc, 3), "tạm biệt nhé");
}
