use std::sync::Arc;

use leksiko_config::Config;
use leksiko_storage::Platform;

use crate::dictionary::{DictionaryIndex, LemmaRef, WordCardRef};
use crate::engine::QueueEngine;
use crate::error::Result;
use crate::queue::QueueType;
use crate::source::SnapshotSource;

/// What the current category's front points at
#[derive(Debug, Clone, Copy)]
pub enum Article<'a> {
    WordCard(WordCardRef<'a>),
    Lemma(LemmaRef<'a>),
}

/// The dictionary and its queues, brought up in dependency order.
///
/// One caller drives a session; overlapping `ensure_ready` calls are ruled
/// out by `&mut self`.
pub struct Session {
    dictionary: DictionaryIndex,
    queues: QueueEngine,
}

impl Session {
    pub fn new(platform: Arc<Platform>, source: Arc<dyn SnapshotSource>, config: &Config) -> Self {
        Self {
            dictionary: DictionaryIndex::new(
                platform.clone(),
                source,
                config.storage.store_locally,
            ),
            queues: QueueEngine::new(platform),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.dictionary.is_initialized() && self.queues.is_initialized()
    }

    /// Bring both services up, dictionary first. No-op once ready.
    pub async fn ensure_ready(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        if !self.dictionary.is_initialized() {
            self.dictionary.initialize().await?;
        }
        self.queues.initialize(&self.dictionary).await?;

        tracing::info!("Session ready");
        Ok(())
    }

    /// Replace the snapshot and start every queue over with no category
    /// selected
    pub async fn force_refresh(&mut self) -> Result<()> {
        self.dictionary.force_refresh().await?;
        self.queues.reseed(&self.dictionary).await?;
        self.queues.set_current_category(None).await?;

        tracing::info!("Session refreshed");
        Ok(())
    }

    pub fn dictionary(&self) -> &DictionaryIndex {
        &self.dictionary
    }

    pub fn queues(&self) -> &QueueEngine {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut QueueEngine {
        &mut self.queues
    }

    /// Resolve the front of `category`, `None` when its queue is empty
    pub fn front_article(&self, category: QueueType) -> Result<Option<Article<'_>>> {
        let Some(index) = self.queues.get_front(category) else {
            return Ok(None);
        };

        let article = if category.indexes_word_cards() {
            Article::WordCard(self.dictionary.get_word_card(index)?)
        } else {
            Article::Lemma(self.dictionary.get_lemma(index)?)
        };
        Ok(Some(article))
    }

    /// Front of the selected category, `None` when nothing is selected
    pub fn current_article(&self) -> Result<Option<Article<'_>>> {
        match self.queues.current_category() {
            Some(category) => self.front_article(category),
            None => Ok(None),
        }
    }
}
