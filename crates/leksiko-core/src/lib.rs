pub mod codec;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod model;
pub mod queue;
pub mod session;
pub mod source;

#[cfg(test)]
mod tests;

pub use self::dictionary::{DictionaryIndex, LemmaRef, WordCardRef, WordRef};
pub use self::engine::{Phase, QueueEngine};
pub use self::error::{Error, Result};
pub use self::queue::{Direction, MoveOffset, QueueType, Ring};
pub use self::session::{Article, Session};
pub use self::source::{HttpSnapshotSource, SnapshotSource};
