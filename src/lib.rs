pub mod audio;
pub mod catalog;
pub mod config;
pub mod leaderboard;
pub mod metrics;
pub mod progress;
pub mod quiz;
pub mod share;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use audio::{Cue, Drone, Tone, Waveform};
pub use catalog::{Catalog, CatalogError, CatalogLoadError, Chapter, DataPoint, Question};
pub use config::QuestConfig;
pub use leaderboard::{LeaderboardEntry, generate as generate_leaderboard};
pub use metrics::{BlockInfo, ChainSnapshot, MetricsError, MetricsReader, NodeInfo};
pub use progress::{GUEST_NAME, PlayerState, PlayerUpdate, ProgressStore};
pub use quiz::{
    Advance, AnswerReveal, ChapterOutcome, ChapterResultSink, QuizError, QuizPhase, QuizSession,
};
pub use share::ShareSummary;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
