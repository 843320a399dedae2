//! Per-category browsing orders and the current-category cursor.

use std::collections::BTreeMap;
use std::sync::Arc;

use leksiko_storage::{KeyValueStore, Platform, load_json, save_json};

use crate::dictionary::DictionaryIndex;
use crate::error::Result;
use crate::queue::{Direction, MoveOffset, QueueType, Ring};

pub const CURRENT_CATEGORY_KEY: &str = "queue:currentQueueType";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
}

/// Seven independent queues plus the category the user is browsing.
///
/// Reads are plain borrows and never touch storage. Every mutation is
/// applied in memory first and then written under its own key, so a failed
/// write leaves the in-memory order correct while the stored copy lags.
pub struct QueueEngine {
    platform: Arc<Platform>,
    queues: BTreeMap<QueueType, Ring>,
    current: Option<QueueType>,
    phase: Phase,
}

impl QueueEngine {
    pub fn new(platform: Arc<Platform>) -> Self {
        Self {
            platform,
            queues: BTreeMap::new(),
            current: None,
            phase: Phase::Uninitialized,
        }
    }

    /// Adopt persisted orderings, deriving any that are missing from the
    /// dictionary. The dictionary must already be initialized.
    pub async fn initialize(&mut self, dictionary: &DictionaryIndex) -> Result<()> {
        let kv = self.platform.kv_store()?;
        let previous = self.phase;
        self.phase = Phase::Initializing;

        match Self::load(kv.as_ref(), dictionary).await {
            Ok((queues, current)) => {
                self.queues = queues;
                self.current = current;
                self.phase = Phase::Ready;
                tracing::info!(
                    "Queues ready, current category: {}",
                    current.map_or("none", |c| c.as_str())
                );
                Ok(())
            }
            Err(e) => {
                self.phase = previous;
                Err(e)
            }
        }
    }

    async fn load(
        kv: &dyn KeyValueStore,
        dictionary: &DictionaryIndex,
    ) -> Result<(BTreeMap<QueueType, Ring>, Option<QueueType>)> {
        let mut queues = BTreeMap::new();

        for category in QueueType::ALL {
            let key = category.storage_key();
            let stored = match load_json::<Vec<usize>>(kv, &key).await {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!("Ignoring stored ordering for {category}: {e}");
                    None
                }
            };

            let ordering = match stored {
                Some(stored) if !stored.is_empty() => {
                    warn_out_of_range(category, &stored, dictionary);
                    stored
                }
                _ => dictionary.initial_ordering(category)?,
            };
            queues.insert(category, Ring::new(ordering));
        }

        let current = match load_json::<QueueType>(kv, CURRENT_CATEGORY_KEY).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("Ignoring stored current category: {e}");
                None
            }
        };

        Ok((queues, current))
    }

    /// Throw away every custom order and the cursor, rederiving from the
    /// dictionary. Used after the snapshot was replaced.
    pub async fn reseed(&mut self, dictionary: &DictionaryIndex) -> Result<()> {
        let previous = self.phase;
        self.phase = Phase::Initializing;

        let mut queues = BTreeMap::new();
        for category in QueueType::ALL {
            match dictionary.initial_ordering(category) {
                Ok(ordering) => {
                    queues.insert(category, Ring::new(ordering));
                }
                Err(e) => {
                    self.phase = previous;
                    return Err(e);
                }
            }
        }

        self.queues = queues;
        self.current = None;
        self.phase = Phase::Ready;
        tracing::info!("Queues reseeded from dictionary");

        let kv = self.platform.kv_store()?;
        for category in QueueType::ALL {
            self.persist_with(kv.as_ref(), category).await?;
        }
        save_json(kv.as_ref(), CURRENT_CATEGORY_KEY, &self.current).await?;
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn get_front(&self, category: QueueType) -> Option<usize> {
        self.queues.get(&category).and_then(Ring::front)
    }

    pub fn get_length(&self, category: QueueType) -> usize {
        self.queues.get(&category).map_or(0, Ring::len)
    }

    /// Current order of one category, front first
    pub fn ordering(&self, category: QueueType) -> Vec<usize> {
        self.queues
            .get(&category)
            .map(Ring::to_vec)
            .unwrap_or_default()
    }

    /// Front of every category
    pub fn fronts(&self) -> BTreeMap<QueueType, Option<usize>> {
        QueueType::ALL
            .into_iter()
            .map(|category| (category, self.get_front(category)))
            .collect()
    }

    /// Cyclic shift by `n`, persisting the whole ordering
    pub async fn rotate(&mut self, category: QueueType, n: i64) -> Result<()> {
        let Some(ring) = self.queues.get_mut(&category).filter(|r| !r.is_empty()) else {
            return Ok(());
        };
        ring.rotate(n);
        tracing::debug!("Rotated {category} by {n}, front is now {:?}", ring.front());

        self.persist(category).await
    }

    pub async fn front_to_back(&mut self, category: QueueType) -> Result<()> {
        self.rotate(category, -1).await
    }

    pub async fn back_to_front(&mut self, category: QueueType) -> Result<()> {
        self.rotate(category, 1).await
    }

    /// Push the front entry back by `offset`, or drop it for [`MoveOffset::Pop`]
    pub async fn move_front_by_offset(
        &mut self,
        category: QueueType,
        offset: MoveOffset,
    ) -> Result<()> {
        let Some(ring) = self.queues.get_mut(&category) else {
            return Ok(());
        };
        let Some(moved) = ring.move_front(offset) else {
            return Ok(());
        };
        tracing::debug!("Moved {moved} in {category} by {offset}");

        self.persist(category).await
    }

    /// Front that `rotate(category, n)` would produce, without mutating
    pub fn calculate_front_after_rotation(&self, category: QueueType, n: i64) -> Option<usize> {
        let mut preview = self.queues.get(&category)?.clone();
        preview.rotate(n);
        preview.front()
    }

    /// Rotation matching a slider at `percent` of the queue length
    pub fn rotation_for_fraction(
        &self,
        category: QueueType,
        direction: Direction,
        percent: f64,
    ) -> i64 {
        let len = self.get_length(category) as f64;
        let steps = (len * percent.clamp(0.0, 100.0) / 100.0).floor() as i64;
        match direction {
            Direction::Forward => -steps,
            Direction::Backward => steps,
        }
    }

    pub fn current_category(&self) -> Option<QueueType> {
        self.current
    }

    /// Switch the cursor; a cheap single-key write
    pub async fn set_current_category(&mut self, category: Option<QueueType>) -> Result<()> {
        self.current = category;
        let kv = self.platform.kv_store()?;
        save_json(kv.as_ref(), CURRENT_CATEGORY_KEY, &category).await?;
        Ok(())
    }

    async fn persist(&self, category: QueueType) -> Result<()> {
        let kv = self.platform.kv_store()?;
        self.persist_with(kv.as_ref(), category).await
    }

    async fn persist_with(&self, kv: &dyn KeyValueStore, category: QueueType) -> Result<()> {
        save_json(kv, &category.storage_key(), &self.ordering(category)).await?;
        Ok(())
    }
}

fn warn_out_of_range(category: QueueType, stored: &[usize], dictionary: &DictionaryIndex) {
    let limit = if category.indexes_word_cards() {
        dictionary.word_card_count()
    } else {
        dictionary.lemma_count()
    };
    let Ok(limit) = limit else {
        return;
    };

    let stale = stored.iter().filter(|&&i| i >= limit).count();
    if stale > 0 {
        tracing::warn!("Stored {category} ordering has {stale} indices past the snapshot");
    }
}
