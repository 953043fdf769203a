use std::collections::{BTreeMap, BTreeSet};

use crate::quiz::ChapterResultSink;
use crate::storage::{KeyValueStore, StorageError};

pub const GUEST_NAME: &str = "Guest Ninja";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub wallet_address: Option<String>,
    #[serde(alias = "ninjaName")]
    pub display_name: String,
    pub score: u32,
    pub completed_chapters: BTreeSet<u32>,
    /// Best score ever achieved per chapter id.
    pub chapter_scores: BTreeMap<u32, u32>,
    pub quest_started: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            wallet_address: None,
            display_name: GUEST_NAME.to_string(),
            score: 0,
            completed_chapters: BTreeSet::new(),
            chapter_scores: BTreeMap::new(),
            quest_started: false,
        }
    }
}

impl PlayerState {
    pub fn best_score(&self, chapter_id: u32) -> u32 {
        self.chapter_scores.get(&chapter_id).copied().unwrap_or(0)
    }

    pub fn has_completed(&self, chapter_id: u32) -> bool {
        self.completed_chapters.contains(&chapter_id)
    }

    /// Name shown in the HUD: the shortened identifier when one is set.
    pub fn hud_label(&self) -> String {
        match &self.wallet_address {
            Some(address) => shorten_address(address),
            None => self.display_name.clone(),
        }
    }
}

/// Fields a caller may overwrite in one [`ProgressStore::update`]. Unset
/// fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerUpdate {
    pub wallet_address: Option<Option<String>>,
    pub display_name: Option<String>,
    pub score: Option<u32>,
    pub completed_chapters: Option<BTreeSet<u32>>,
    pub chapter_scores: Option<BTreeMap<u32, u32>>,
    pub quest_started: Option<bool>,
}

impl PlayerUpdate {
    fn apply(self, state: &mut PlayerState) {
        if let Some(wallet_address) = self.wallet_address {
            state.wallet_address = wallet_address;
        }
        if let Some(display_name) = self.display_name {
            state.display_name = display_name;
        }
        if let Some(score) = self.score {
            state.score = score;
        }
        if let Some(completed_chapters) = self.completed_chapters {
            state.completed_chapters = completed_chapters;
        }
        if let Some(chapter_scores) = self.chapter_scores {
            state.chapter_scores = chapter_scores;
        }
        if let Some(quest_started) = self.quest_started {
            state.quest_started = quest_started;
        }
    }
}

/// `inj1qqqq...zzzz` style abbreviation: first six and last four characters.
pub fn shorten_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

fn display_name_for(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("Ninja {tail}")
}

/// Owns the single [`PlayerState`] record. Storage problems never reach the
/// caller: they are logged and the in-memory state keeps serving reads.
pub struct ProgressStore<S: KeyValueStore> {
    storage: S,
    key: String,
    state: PlayerState,
    /// Set while the last write or removal failed; durable storage is stale.
    unsaved: bool,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = load(&storage, &key);
        Self {
            storage,
            key,
            state,
            unsaved: false,
        }
    }

    pub fn read(&self) -> &PlayerState {
        &self.state
    }

    /// Re-reads the durable record, picking up writes made elsewhere.
    ///
    /// While a write is outstanding the in-memory state is newer than storage,
    /// so the write is retried first and nothing is read until it succeeds.
    /// Unreadable or unparsable records leave the current state untouched.
    pub fn reload(&mut self) -> &PlayerState {
        if self.unsaved {
            self.persist();
            if self.unsaved {
                return &self.state;
            }
        }

        match read_record(&self.storage, &self.key) {
            Ok(Some(state)) => self.state = state,
            // Erased by another writer, e.g. a reset in a second tab.
            Ok(None) => self.state = PlayerState::default(),
            Err(error) => log::debug!("keeping in-memory progress: {error}"),
        }
        &self.state
    }

    /// Whether the in-memory record has changes storage has not accepted yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn update(&mut self, update: PlayerUpdate) -> &PlayerState {
        update.apply(&mut self.state);
        self.persist();
        &self.state
    }

    /// Marks the quest as started, for a guest or for the given identifier.
    pub fn begin(&mut self, identifier: Option<&str>) -> &PlayerState {
        let identifier = identifier.filter(|value| !value.is_empty());
        let display_name = identifier
            .map(display_name_for)
            .unwrap_or_else(|| GUEST_NAME.to_string());

        log::info!("quest started as {display_name}");
        self.update(PlayerUpdate {
            wallet_address: Some(identifier.map(str::to_string)),
            display_name: Some(display_name),
            quest_started: Some(true),
            ..PlayerUpdate::default()
        })
    }

    /// Folds a finished chapter run into the record. Only an improvement on
    /// the chapter's best score raises the total.
    pub fn record_chapter_result(&mut self, chapter_id: u32, score: u32) -> &PlayerState {
        let previous_best = self.state.best_score(chapter_id);
        let delta = score.saturating_sub(previous_best);

        let mut completed_chapters = self.state.completed_chapters.clone();
        completed_chapters.insert(chapter_id);

        let mut chapter_scores = self.state.chapter_scores.clone();
        chapter_scores.insert(chapter_id, previous_best.max(score));
        let total = self.state.score.saturating_add(delta);

        log::debug!("chapter {chapter_id} scored {score} (best {previous_best}, +{delta})");
        self.update(PlayerUpdate {
            completed_chapters: Some(completed_chapters),
            chapter_scores: Some(chapter_scores),
            score: Some(total),
            ..PlayerUpdate::default()
        })
    }

    /// Erases the durable record and returns to the default state.
    pub fn reset(&mut self) -> &PlayerState {
        self.state = PlayerState::default();
        self.unsaved = match self.storage.remove(&self.key) {
            Ok(()) => false,
            Err(error) => {
                log::warn!("could not clear saved progress: {error}");
                true
            }
        };
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.state)
            .map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source,
            })
            .and_then(|payload| self.storage.set(&self.key, &payload));

        self.unsaved = match result {
            Ok(()) => false,
            Err(error) => {
                log::warn!("progress kept in memory only: {error}");
                true
            }
        };
    }
}

impl<S: KeyValueStore> ChapterResultSink for ProgressStore<S> {
    fn record_chapter_result(&mut self, chapter_id: u32, score: u32) {
        ProgressStore::record_chapter_result(self, chapter_id, score);
    }
}

fn read_record<S: KeyValueStore>(
    storage: &S,
    key: &str,
) -> Result<Option<PlayerState>, StorageError> {
    let Some(stored) = storage.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&stored)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

fn load<S: KeyValueStore>(storage: &S, key: &str) -> PlayerState {
    read_record(storage, key)
        .unwrap_or_else(|error| {
            log::warn!("ignoring saved progress: {error}");
            None
        })
        .unwrap_or_default()
}
