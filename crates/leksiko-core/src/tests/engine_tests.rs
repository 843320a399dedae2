use std::sync::Arc;
use std::sync::atomic::Ordering;

use leksiko_storage::{KeyValueStore, Platform};
use serde_json::json;

use super::fixtures::{FlakyHarness, Harness, ScriptedSource, snapshot};
use crate::dictionary::DictionaryIndex;
use crate::engine::{CURRENT_CATEGORY_KEY, Phase, QueueEngine};
use crate::error::Error;
use crate::queue::{Direction, MoveOffset, QueueType};

async fn ready(harness: &Harness) -> (DictionaryIndex, QueueEngine) {
    let mut dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );
    dictionary.initialize().await.expect("dictionary");

    let mut queues = QueueEngine::new(harness.platform.clone());
    queues.initialize(&dictionary).await.expect("queues");
    (dictionary, queues)
}

#[tokio::test]
async fn test_fresh_engine_derives_every_category() {
    let harness = Harness::new();
    let (dictionary, queues) = ready(&harness).await;

    assert_eq!(queues.phase(), Phase::Ready);
    assert_eq!(queues.current_category(), None);
    for category in QueueType::ALL {
        assert_eq!(
            queues.ordering(category),
            dictionary.initial_ordering(category).expect("ordering"),
            "{category}"
        );
    }
    assert_eq!(queues.fronts()[&QueueType::Other], Some(4));
    // deriving is not a mutation
    assert_eq!(harness.kv.total_writes(), 0);
}

#[tokio::test]
async fn test_verbs_rotate_and_back() {
    let harness = Harness::new();
    let (_dictionary, mut queues) = ready(&harness).await;

    assert_eq!(queues.get_front(QueueType::Verbs), Some(2));

    queues.rotate(QueueType::Verbs, 1).await.expect("rotate");
    assert_eq!(queues.get_front(QueueType::Verbs), Some(9));

    queues.rotate(QueueType::Verbs, -1).await.expect("rotate");
    assert_eq!(queues.get_front(QueueType::Verbs), Some(2));
    assert_eq!(queues.ordering(QueueType::Verbs), vec![2, 5, 9]);
}

#[tokio::test]
async fn test_rotate_persists_full_ordering() {
    let harness = Harness::new();
    let (_dictionary, mut queues) = ready(&harness).await;

    queues.front_to_back(QueueType::Nouns).await.expect("rotate");

    assert_eq!(harness.kv.write_count("queue:nouns"), 1);
    assert_eq!(harness.kv.total_writes(), 1);
    let stored = harness.kv.load("queue:nouns").await.expect("load");
    assert_eq!(stored, Some(json!([3, 0])));
}

#[tokio::test]
async fn test_preview_matches_rotation() {
    let harness = Harness::new();
    let (_dictionary, mut queues) = ready(&harness).await;

    for n in [-23i64, -10, -1, 0, 1, 4, 9, 10, 31] {
        let before = queues.ordering(QueueType::Lemmas);
        let preview = queues.calculate_front_after_rotation(QueueType::Lemmas, n);
        assert_eq!(queues.ordering(QueueType::Lemmas), before, "preview mutated");

        queues.rotate(QueueType::Lemmas, n).await.expect("rotate");
        assert_eq!(queues.get_front(QueueType::Lemmas), preview, "n={n}");
    }
}

#[tokio::test]
async fn test_move_front_keeps_membership_except_pop() {
    let harness = Harness::new();
    let (_dictionary, mut queues) = ready(&harness).await;

    let mut before = queues.ordering(QueueType::Lemmas);
    queues
        .move_front_by_offset(QueueType::Lemmas, MoveOffset::Ten)
        .await
        .expect("move");
    // ten lemmas, so the front lands on the last slot
    assert_eq!(queues.ordering(QueueType::Lemmas), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);

    let mut after = queues.ordering(QueueType::Lemmas);
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after);

    queues
        .move_front_by_offset(QueueType::Lemmas, MoveOffset::Pop)
        .await
        .expect("pop");
    assert_eq!(queues.get_length(QueueType::Lemmas), 9);
    assert!(!queues.ordering(QueueType::Lemmas).contains(&1));

    let stored = harness.kv.load("queue:lemmas").await.expect("load");
    assert_eq!(stored, Some(json!([2, 3, 4, 5, 6, 7, 8, 9, 0])));
}

#[tokio::test]
async fn test_empty_queue_mutations_are_noops() {
    let harness = Harness::new();
    let (_dictionary, mut queues) = ready(&harness).await;

    for _ in 0..2 {
        queues
            .move_front_by_offset(QueueType::Adverbs, MoveOffset::Pop)
            .await
            .expect("pop");
    }
    assert_eq!(queues.get_length(QueueType::Adverbs), 0);
    let writes = harness.kv.total_writes();

    queues.rotate(QueueType::Adverbs, 3).await.expect("rotate");
    queues
        .move_front_by_offset(QueueType::Adverbs, MoveOffset::End)
        .await
        .expect("move");

    assert_eq!(queues.get_front(QueueType::Adverbs), None);
    assert_eq!(queues.calculate_front_after_rotation(QueueType::Adverbs, 1), None);
    assert_eq!(harness.kv.total_writes(), writes);
}

#[tokio::test]
async fn test_state_survives_a_new_engine() {
    let harness = Harness::new();
    let (dictionary, mut queues) = ready(&harness).await;

    queues.rotate(QueueType::Lemmas, 3).await.expect("rotate");
    queues
        .set_current_category(Some(QueueType::Adjectives))
        .await
        .expect("select");
    let rotated = queues.ordering(QueueType::Lemmas);

    let mut reopened = QueueEngine::new(harness.platform.clone());
    reopened.initialize(&dictionary).await.expect("reopen");

    assert_eq!(reopened.ordering(QueueType::Lemmas), rotated);
    assert_eq!(reopened.current_category(), Some(QueueType::Adjectives));
}

#[tokio::test]
async fn test_empty_or_unreadable_stored_orderings_are_rederived() {
    let harness = Harness::new();
    harness.kv.save("queue:verbs", json!([])).await.expect("seed");
    harness
        .kv
        .save("queue:nouns", json!("not a list"))
        .await
        .expect("seed");
    harness
        .kv
        .save(CURRENT_CATEGORY_KEY, json!("pronouns"))
        .await
        .expect("seed");

    let (_dictionary, queues) = ready(&harness).await;

    assert_eq!(queues.ordering(QueueType::Verbs), vec![2, 5, 9]);
    assert_eq!(queues.ordering(QueueType::Nouns), vec![0, 3]);
    assert_eq!(queues.current_category(), None);
}

#[tokio::test]
async fn test_stored_ordering_is_adopted_verbatim() {
    let harness = Harness::new();
    harness
        .kv
        .save("queue:verbs", json!([9, 2, 77]))
        .await
        .expect("seed");

    let (_dictionary, queues) = ready(&harness).await;
    assert_eq!(queues.ordering(QueueType::Verbs), vec![9, 2, 77]);
}

#[tokio::test]
async fn test_reseed_discards_custom_order_and_cursor() {
    let harness = Harness::new();
    let (dictionary, mut queues) = ready(&harness).await;

    queues.rotate(QueueType::Verbs, 1).await.expect("rotate");
    queues
        .set_current_category(Some(QueueType::Verbs))
        .await
        .expect("select");

    queues.reseed(&dictionary).await.expect("reseed");

    assert_eq!(queues.phase(), Phase::Ready);
    assert_eq!(queues.ordering(QueueType::Verbs), vec![2, 5, 9]);
    assert_eq!(queues.current_category(), None);
    assert_eq!(
        harness.kv.load("queue:verbs").await.expect("load"),
        Some(json!([2, 5, 9]))
    );
    assert_eq!(
        harness.kv.load(CURRENT_CATEGORY_KEY).await.expect("load"),
        None
    );
}

#[tokio::test]
async fn test_slider_rotation() {
    let harness = Harness::new();
    let (_dictionary, queues) = ready(&harness).await;

    let lemmas = QueueType::Lemmas;
    assert_eq!(queues.rotation_for_fraction(lemmas, Direction::Forward, 35.0), -3);
    assert_eq!(queues.rotation_for_fraction(lemmas, Direction::Backward, 35.0), 3);
    assert_eq!(queues.rotation_for_fraction(lemmas, Direction::Forward, 0.0), 0);
    assert_eq!(queues.rotation_for_fraction(lemmas, Direction::Backward, 250.0), 10);
}

#[tokio::test]
async fn test_unsupported_platform_cannot_initialize() {
    let harness = Harness::new();
    let (dictionary, _) = ready(&harness).await;

    let mut queues = QueueEngine::new(Arc::new(Platform::unsupported()));
    let err = queues.initialize(&dictionary).await.unwrap_err();

    assert!(matches!(err, Error::PlatformUnsupported { .. }), "got {err:?}");
    assert_eq!(queues.phase(), Phase::Uninitialized);
}

#[tokio::test]
async fn test_initialize_requires_dictionary() {
    let harness = Harness::new();
    let dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );

    let mut queues = QueueEngine::new(harness.platform.clone());
    let err = queues.initialize(&dictionary).await.unwrap_err();

    assert!(matches!(err, Error::NotInitialized { .. }), "got {err:?}");
    assert!(!queues.is_initialized());
}

#[tokio::test]
async fn test_failed_write_keeps_memory_order() {
    let harness = FlakyHarness::new();
    let mut dictionary = DictionaryIndex::new(
        harness.platform.clone(),
        ScriptedSource::serving(&snapshot()),
        false,
    );
    dictionary.initialize().await.expect("dictionary");
    let mut queues = QueueEngine::new(harness.platform.clone());
    queues.initialize(&dictionary).await.expect("queues");

    harness.kv.fail_saves.store(true, Ordering::SeqCst);

    let err = queues.front_to_back(QueueType::Nouns).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)), "got {err:?}");
    assert_eq!(queues.ordering(QueueType::Nouns), vec![3, 0]);

    let err = queues
        .move_front_by_offset(QueueType::Verbs, MoveOffset::Pop)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)), "got {err:?}");
    assert_eq!(queues.ordering(QueueType::Verbs), vec![5, 9]);

    assert_eq!(harness.kv.inner.total_writes(), 0);
    assert_eq!(harness.kv.load("queue:nouns").await.expect("load"), None);

    harness.kv.fail_saves.store(false, Ordering::SeqCst);
    queues.front_to_back(QueueType::Nouns).await.expect("rotate");
    assert_eq!(
        harness.kv.load("queue:nouns").await.expect("load"),
        Some(json!([0, 3]))
    );
}
