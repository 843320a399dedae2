use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Browsing category; each has its own queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QueueType {
    #[serde(rename = "words")]
    WordCards,
    #[serde(rename = "lemmas")]
    Lemmas,
    #[serde(rename = "verbs")]
    Verbs,
    #[serde(rename = "nouns")]
    Nouns,
    #[serde(rename = "adjectives")]
    Adjectives,
    #[serde(rename = "adverbs")]
    Adverbs,
    /// Lemmas that are not verbs, nouns, adjectives or adverbs
    #[serde(rename = "other")]
    Other,
}

impl QueueType {
    pub const ALL: [QueueType; 7] = [
        QueueType::WordCards,
        QueueType::Lemmas,
        QueueType::Verbs,
        QueueType::Nouns,
        QueueType::Adjectives,
        QueueType::Adverbs,
        QueueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::WordCards => "words",
            QueueType::Lemmas => "lemmas",
            QueueType::Verbs => "verbs",
            QueueType::Nouns => "nouns",
            QueueType::Adjectives => "adjectives",
            QueueType::Adverbs => "adverbs",
            QueueType::Other => "other",
        }
    }

    /// Key the ordering is persisted under
    pub fn storage_key(&self) -> String {
        format!("queue:{}", self.as_str())
    }

    /// Whether queue entries index word cards rather than lemmas
    pub fn indexes_word_cards(&self) -> bool {
        matches!(self, QueueType::WordCards)
    }
}

impl FromStr for QueueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        QueueType::ALL
            .into_iter()
            .find(|q| q.as_str() == tag)
            .ok_or_else(|| format!("unknown queue type: {s}"))
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far to push the front entry back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOffset {
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "100")]
    Hundred,
    #[serde(rename = "1000")]
    Thousand,
    /// To the very back
    #[serde(rename = "end")]
    End,
    /// Drop the front entry from the queue
    #[serde(rename = "pop")]
    Pop,
}

impl MoveOffset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveOffset::Ten => "10",
            MoveOffset::Hundred => "100",
            MoveOffset::Thousand => "1000",
            MoveOffset::End => "end",
            MoveOffset::Pop => "pop",
        }
    }

    /// Position the front entry lands on in a queue of `len`, `None` for pop
    pub fn target(&self, len: usize) -> Option<usize> {
        let last = len.saturating_sub(1);
        match self {
            MoveOffset::Ten => Some(10.min(last)),
            MoveOffset::Hundred => Some(100.min(last)),
            MoveOffset::Thousand => Some(1000.min(last)),
            MoveOffset::End => Some(last),
            MoveOffset::Pop => None,
        }
    }
}

impl FromStr for MoveOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "10" => Ok(MoveOffset::Ten),
            "100" => Ok(MoveOffset::Hundred),
            "1000" => Ok(MoveOffset::Thousand),
            "end" => Ok(MoveOffset::End),
            "pop" => Ok(MoveOffset::Pop),
            other => Err(format!("unknown move offset: {other}")),
        }
    }
}

impl fmt::Display for MoveOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a preview slider walks through the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Normalize a signed shift into `0..len`. `len` must be non-zero.
pub fn normalize_shift(n: i64, len: usize) -> usize {
    let len = len as i64;
    (((n % len) + len) % len) as usize
}

/// Ordered, duplicate-free indices read as a ring; position 0 is the front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ring {
    items: VecDeque<usize>,
}

impl Ring {
    pub fn new(items: Vec<usize>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<usize> {
        self.items.front().copied()
    }

    /// Move the last `n mod len` entries, as one block, to the front.
    /// Negative `n` shifts the other way. No-op on an empty ring.
    pub fn rotate(&mut self, n: i64) {
        if self.items.is_empty() {
            return;
        }
        let k = normalize_shift(n, self.items.len());
        self.items.rotate_right(k);
    }

    /// Take the front entry out and reinsert it according to `offset`.
    /// Returns the entry that was moved.
    pub fn move_front(&mut self, offset: MoveOffset) -> Option<usize> {
        let target = offset.target(self.items.len());
        let front = self.items.pop_front()?;
        if let Some(position) = target {
            self.items.insert(position, front);
        }
        Some(front)
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.items.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.items.iter()
    }
}
