use std::sync::Arc;
use std::sync::atomic::Ordering;

use leksiko_storage::{BlobStore, Platform};

use super::fixtures::{
    FlakyHarness, Harness, ScriptedSource, compressed, snapshot, snapshot_with_prefix,
};
use crate::dictionary::DictionaryIndex;
use crate::error::Error;
use crate::model::PartOfSpeech;
use crate::queue::QueueType;

#[tokio::test]
async fn test_accessors_before_initialize_are_not_initialized() {
    let harness = Harness::new();
    let dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );

    assert!(!dictionary.is_initialized());
    assert!(matches!(
        dictionary.get_word(0),
        Err(Error::NotInitialized { .. })
    ));
    assert!(matches!(
        dictionary.initial_ordering(QueueType::Verbs),
        Err(Error::NotInitialized { .. })
    ));
}

#[tokio::test]
async fn test_index_accessors_check_bounds() {
    let harness = Harness::new();
    let mut dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );
    dictionary.initialize().await.expect("initialize");

    let word = dictionary.get_word(5).expect("word 5");
    assert_eq!(word.record().form, "λ5");
    let owner = word.lemma().expect("owning lemma").map(|l| l.index());
    assert_eq!(owner, Some(5));

    match dictionary.get_lemma(10) {
        Err(Error::OutOfBounds { index, len, .. }) => {
            assert_eq!(index, 10);
            assert_eq!(len, 10);
        }
        other => panic!("expected OutOfBounds, got {:?}", other.map(|l| l.index())),
    }
    assert!(matches!(
        dictionary.get_words(&[1, 42]),
        Err(Error::OutOfBounds { index: 42, .. })
    ));

    let card = dictionary.get_word_card(2).expect("card 2");
    let lemmas = card.lemmas().expect("card lemmas");
    assert_eq!(lemmas[0].record().pos_en, PartOfSpeech::Verb);
}

#[tokio::test]
async fn test_word_without_lemma_entry_has_no_lemma() {
    let mut unlinked = snapshot();
    let mut word = unlinked.words[0].clone();
    word.form = "και".to_string();
    word.lemma_index = None;
    unlinked.words.push(word);

    let harness = Harness::new();
    let mut dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&unlinked),
        false,
    );
    dictionary.initialize().await.expect("initialize");

    let word = dictionary.get_word(10).expect("word 10");
    assert_eq!(word.record().form, "και");
    assert!(word.lemma().expect("lemma lookup").is_none());
}

#[tokio::test]
async fn test_initial_orderings() {
    let harness = Harness::new();
    let mut dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );
    dictionary.initialize().await.expect("initialize");

    let ordering = |c| dictionary.initial_ordering(c).expect("ordering");
    assert_eq!(ordering(QueueType::Verbs), vec![2, 5, 9]);
    assert_eq!(ordering(QueueType::Nouns), vec![0, 3]);
    assert_eq!(ordering(QueueType::Lemmas), (0..10).collect::<Vec<_>>());
    assert_eq!(ordering(QueueType::WordCards), vec![0, 1, 2]);

    // pronoun, numeral and interjection all land in "other"
    assert_eq!(ordering(QueueType::Other), vec![4, 6, 8]);

    let mut covered: Vec<usize> = [
        QueueType::Verbs,
        QueueType::Nouns,
        QueueType::Adjectives,
        QueueType::Adverbs,
        QueueType::Other,
    ]
    .into_iter()
    .flat_map(ordering)
    .collect();
    covered.sort_unstable();
    assert_eq!(covered, ordering(QueueType::Lemmas));
}

#[tokio::test]
async fn test_cache_hit_skips_download() {
    let harness = Harness::new();
    harness
        .blob
        .save(&compressed(&snapshot_with_prefix("cached")))
        .await
        .expect("seed cache");

    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    assert_eq!(source.fetches(), 0);
    assert_eq!(dictionary.get_word(0).expect("word").record().form, "cached0");
}

#[tokio::test]
async fn test_cache_miss_downloads_and_stores() {
    let harness = Harness::new();
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    assert_eq!(source.fetches(), 1);
    assert_eq!(harness.blob.write_count(), 1);
    assert_eq!(
        harness.blob.load().await.expect("load"),
        Some(compressed(&snapshot()))
    );
}

#[tokio::test]
async fn test_corrupt_cache_falls_back_to_download() {
    let harness = Harness::new();
    harness
        .blob
        .save(b"definitely not gzip")
        .await
        .expect("seed cache");

    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    assert_eq!(source.fetches(), 1);
    assert_eq!(dictionary.lemma_count().expect("count"), 10);
}

#[tokio::test]
async fn test_without_caching_nothing_is_stored() {
    let harness = Harness::new();
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), false);

    dictionary.initialize().await.expect("initialize");
    dictionary.force_refresh().await.expect("refresh");

    assert_eq!(source.fetches(), 2);
    assert_eq!(harness.blob.write_count(), 0);
}

#[tokio::test]
async fn test_bad_download_keeps_previous_snapshot() {
    let harness = Harness::new();
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    source.replace(b"garbage".to_vec());
    let err = dictionary.force_refresh().await.unwrap_err();
    assert!(matches!(err, Error::Decompress(_)), "got {err:?}");

    assert_eq!(dictionary.get_word(0).expect("word").record().form, "λ0");
    assert_eq!(harness.blob.write_count(), 1);
}

#[tokio::test]
async fn test_cache_read_error_counts_as_miss() {
    let harness = FlakyHarness::new();
    harness
        .blob
        .inner
        .save(&compressed(&snapshot_with_prefix("cached")))
        .await
        .expect("seed cache");
    harness.blob.fail_loads.store(true, Ordering::SeqCst);

    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    assert_eq!(source.fetches(), 1);
    assert_eq!(dictionary.get_word(0).expect("word").record().form, "λ0");
}

#[tokio::test]
async fn test_failed_cache_write_keeps_previous_snapshot() {
    let harness = FlakyHarness::new();
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");

    source.replace(compressed(&snapshot_with_prefix("new")));
    harness.blob.fail_saves.store(true, Ordering::SeqCst);
    let err = dictionary.force_refresh().await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)), "got {err:?}");

    assert_eq!(source.fetches(), 2);
    assert_eq!(dictionary.get_word(0).expect("word").record().form, "λ0");
    assert_eq!(
        harness.blob.inner.load().await.expect("load"),
        Some(compressed(&snapshot()))
    );
}

#[tokio::test]
async fn test_refresh_installs_what_the_cache_returns() {
    let harness = FlakyHarness::new();
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary = DictionaryIndex::new(harness.platform.clone(), source.clone(), true);
    dictionary.initialize().await.expect("initialize");
    assert_eq!(dictionary.get_word(0).expect("word").record().form, "λ0");

    harness.blob.serve(compressed(&snapshot_with_prefix("stored")));
    dictionary.force_refresh().await.expect("refresh");

    assert_eq!(dictionary.get_word(0).expect("word").record().form, "stored0");
}

#[tokio::test]
async fn test_unsupported_platform_fails_fast() {
    let source = ScriptedSource::serving(&snapshot());
    let mut dictionary =
        DictionaryIndex::new(Arc::new(Platform::unsupported()), source.clone(), false);

    let err = dictionary.initialize().await.unwrap_err();
    assert!(matches!(err, Error::PlatformUnsupported { .. }), "got {err:?}");
    assert_eq!(source.fetches(), 0);
    assert!(!dictionary.is_initialized());
}
