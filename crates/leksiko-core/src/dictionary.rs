use std::sync::Arc;

use leksiko_storage::{Platform, StorageError};

use crate::codec;
use crate::error::{Error, Result};
use crate::model::{Lemma, PartOfSpeech, Snapshot, Word, WordCard};
use crate::queue::QueueType;
use crate::source::SnapshotSource;

const COMPONENT: &str = "Dictionary";

/// Parts of speech with a category of their own; everything else is "other"
const NAMED_CATEGORIES: [PartOfSpeech; 4] = [
    PartOfSpeech::Verb,
    PartOfSpeech::Noun,
    PartOfSpeech::Adj,
    PartOfSpeech::Adv,
];

fn bounded<'a, T>(items: &'a [T], index: usize, collection: &'static str) -> Result<&'a T> {
    items.get(index).ok_or(Error::OutOfBounds {
        collection,
        index,
        len: items.len(),
    })
}

/// A word together with the snapshot it came from
#[derive(Debug, Clone, Copy)]
pub struct WordRef<'a> {
    index: usize,
    word: &'a Word,
    snapshot: &'a Snapshot,
}

impl<'a> WordRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &'a Word {
        self.word
    }

    /// The lemma this form realizes, `None` when the form has no lemma entry
    pub fn lemma(&self) -> Result<Option<LemmaRef<'a>>> {
        self.word
            .lemma_index
            .map(|index| LemmaRef::at(self.snapshot, index))
            .transpose()
    }
}

/// A lemma together with the snapshot it came from
#[derive(Debug, Clone, Copy)]
pub struct LemmaRef<'a> {
    index: usize,
    lemma: &'a Lemma,
    snapshot: &'a Snapshot,
}

impl<'a> LemmaRef<'a> {
    fn at(snapshot: &'a Snapshot, index: usize) -> Result<Self> {
        Ok(Self {
            index,
            lemma: bounded(&snapshot.lemmas, index, "Lemma")?,
            snapshot,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &'a Lemma {
        self.lemma
    }

    /// All forms of this lemma, in stored order
    pub fn words(&self) -> Result<Vec<WordRef<'a>>> {
        words_at(self.snapshot, &self.lemma.word_indices)
    }
}

/// A word card together with the snapshot it came from
#[derive(Debug, Clone, Copy)]
pub struct WordCardRef<'a> {
    index: usize,
    card: &'a WordCard,
    snapshot: &'a Snapshot,
}

impl<'a> WordCardRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn record(&self) -> &'a WordCard {
        self.card
    }

    pub fn words(&self) -> Result<Vec<WordRef<'a>>> {
        words_at(self.snapshot, &self.card.word_indices)
    }

    pub fn lemmas(&self) -> Result<Vec<LemmaRef<'a>>> {
        self.card
            .lemma_indices
            .iter()
            .map(|&i| LemmaRef::at(self.snapshot, i))
            .collect()
    }
}

fn word_at(snapshot: &Snapshot, index: usize) -> Result<WordRef<'_>> {
    Ok(WordRef {
        index,
        word: bounded(&snapshot.words, index, "Word")?,
        snapshot,
    })
}

fn words_at<'a>(snapshot: &'a Snapshot, indices: &[usize]) -> Result<Vec<WordRef<'a>>> {
    indices.iter().map(|&i| word_at(snapshot, i)).collect()
}

/// Immutable, index-addressed view over the active snapshot.
///
/// Built cheaply with [`DictionaryIndex::new`]; nothing else is valid until
/// [`DictionaryIndex::initialize`] has completed. A refresh replaces the whole
/// snapshot in one assignment, so readers never observe a partial load.
pub struct DictionaryIndex {
    platform: Arc<Platform>,
    source: Arc<dyn SnapshotSource>,
    store_locally: bool,
    snapshot: Option<Arc<Snapshot>>,
}

impl DictionaryIndex {
    pub fn new(platform: Arc<Platform>, source: Arc<dyn SnapshotSource>, store_locally: bool) -> Self {
        Self {
            platform,
            source,
            store_locally,
            snapshot: None,
        }
    }

    /// Load a snapshot, preferring the local cache when caching is enabled
    pub async fn initialize(&mut self) -> Result<()> {
        if self.store_locally {
            if let Some(snapshot) = self.load_cached().await {
                self.install(snapshot, "local cache");
                return Ok(());
            }
            return self.force_refresh().await;
        }

        self.platform.ensure_supported("download dictionary")?;
        let compressed = self.source.fetch().await?;
        let snapshot = codec::decode(&compressed)?;
        self.install(snapshot, &self.source.describe());
        Ok(())
    }

    /// Download a fresh snapshot, replacing the cached copy first when
    /// caching is enabled
    pub async fn force_refresh(&mut self) -> Result<()> {
        self.platform.ensure_supported("download dictionary")?;
        let compressed = self.source.fetch().await?;

        // decoded before the cache is touched so a bad download cannot
        // replace a good cache
        let snapshot = codec::decode(&compressed)?;

        if !self.store_locally {
            self.install(snapshot, &self.source.describe());
            return Ok(());
        }

        let store = self.platform.blob_store()?;
        store.save(&compressed).await?;
        let cached = store.load().await?.ok_or_else(|| StorageError::Backend {
            operation: "load",
            key: "snapshot".to_string(),
            message: "snapshot missing right after save".to_string(),
        })?;

        if cached == compressed {
            self.install(snapshot, "refreshed local cache");
        } else {
            tracing::warn!("Cached snapshot differs from the download, using the cached copy");
            self.install(codec::decode(&cached)?, "refreshed local cache");
        }
        Ok(())
    }

    /// Cache read; any failure counts as a miss
    async fn load_cached(&self) -> Option<Snapshot> {
        let store = match self.platform.blob_store() {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Local snapshot cache unavailable: {e}");
                return None;
            }
        };

        let compressed = match store.load().await {
            Ok(Some(compressed)) => compressed,
            Ok(None) => {
                tracing::info!("No cached snapshot, downloading");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read cached snapshot: {e}");
                return None;
            }
        };

        match codec::decode(&compressed) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Discarding unreadable cached snapshot: {e}");
                None
            }
        }
    }

    fn install(&mut self, snapshot: Snapshot, origin: &str) {
        let dangling = snapshot.dangling_links();
        if !dangling.is_empty() {
            tracing::warn!(
                "Snapshot has {} lemma/word links that do not point back",
                dangling.len()
            );
        }

        tracing::info!(
            "Loaded dictionary from {origin}: {} lemmas, {} words, {} word cards",
            snapshot.lemmas.len(),
            snapshot.words.len(),
            snapshot.word_cards.len()
        );
        self.snapshot = Some(Arc::new(snapshot));
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Result<&Snapshot> {
        self.snapshot
            .as_deref()
            .ok_or(Error::NotInitialized {
                component: COMPONENT,
            })
    }

    pub fn get_word(&self, index: usize) -> Result<WordRef<'_>> {
        word_at(self.snapshot()?, index)
    }

    pub fn get_words(&self, indices: &[usize]) -> Result<Vec<WordRef<'_>>> {
        words_at(self.snapshot()?, indices)
    }

    pub fn get_lemma(&self, index: usize) -> Result<LemmaRef<'_>> {
        LemmaRef::at(self.snapshot()?, index)
    }

    pub fn get_word_card(&self, index: usize) -> Result<WordCardRef<'_>> {
        let snapshot = self.snapshot()?;
        Ok(WordCardRef {
            index,
            card: bounded(&snapshot.word_cards, index, "WordCard")?,
            snapshot,
        })
    }

    pub fn word_count(&self) -> Result<usize> {
        Ok(self.snapshot()?.words.len())
    }

    pub fn lemma_count(&self) -> Result<usize> {
        Ok(self.snapshot()?.lemmas.len())
    }

    pub fn word_card_count(&self) -> Result<usize> {
        Ok(self.snapshot()?.word_cards.len())
    }

    /// Default membership and order of a category's queue
    pub fn initial_ordering(&self, category: QueueType) -> Result<Vec<usize>> {
        let snapshot = self.snapshot()?;

        let ordering = match category {
            QueueType::WordCards => (0..snapshot.word_cards.len()).collect(),
            QueueType::Lemmas => (0..snapshot.lemmas.len()).collect(),
            QueueType::Verbs => snapshot.lemmas_tagged(PartOfSpeech::Verb).to_vec(),
            QueueType::Nouns => snapshot.lemmas_tagged(PartOfSpeech::Noun).to_vec(),
            QueueType::Adjectives => snapshot.lemmas_tagged(PartOfSpeech::Adj).to_vec(),
            QueueType::Adverbs => snapshot.lemmas_tagged(PartOfSpeech::Adv).to_vec(),
            QueueType::Other => snapshot
                .lemmas
                .iter()
                .enumerate()
                .filter(|(_, lemma)| !NAMED_CATEGORIES.contains(&lemma.pos_en))
                .map(|(i, _)| i)
                .collect(),
        };

        Ok(ordering)
    }
}
