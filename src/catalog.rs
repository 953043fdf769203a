use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::progress::PlayerState;

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

const BUILTIN_CHAPTERS: &str = include_str!("../content/chapters.json");

/// Live chain metric a chapter highlights while its story is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataPoint {
    ChainId,
    BlockHeight,
    BlockTime,
    Network,
    Validators,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier unique within the owning chapter, e.g. `"2-1"`.
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index in `options` holding the correct answer.
    pub correct_answer: usize,
    /// Shown once the answer has been confirmed.
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_answer
    }

    /// Letter label used in front of an option (`A`, `B`, ...).
    pub fn option_label(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }
}

/// A story chapter together with its quiz.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// 1-based position in the quest.
    pub id: u32,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    pub color: String,
    /// Narrative text; paragraphs are separated by blank lines.
    pub story: String,
    pub lore_intro: String,
    pub data_point: DataPoint,
    pub questions: Vec<Question>,
}

impl Chapter {
    pub fn story_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
    }

    /// Highest score a single run of this chapter can earn, bonus included.
    pub fn max_score(&self) -> u32 {
        crate::quiz::max_chapter_score(self.questions.len())
    }

    /// Chapter 1 is always open; every later chapter needs its predecessor completed.
    pub fn is_unlocked_for(&self, player: &PlayerState) -> bool {
        self.id == 1 || player.completed_chapters.contains(&(self.id - 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    chapters: Vec<Chapter>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read chapter file at {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse chapter data: {source}")]
    ParseError { source: serde_json::Error },
    #[error("catalog contains no chapters")]
    Empty,
    #[error("chapter ids must run 1..=n in order; found {found} at position {position}")]
    NonContiguousIds { position: usize, found: u32 },
    #[error("chapter slug `{slug}` is used more than once")]
    DuplicateSlug { slug: String },
    #[error("chapter {chapter} has no questions")]
    NoQuestions { chapter: u32 },
    #[error("question `{question}` appears more than once in chapter {chapter}")]
    DuplicateQuestion { chapter: u32, question: String },
    #[error("question `{question}` has {count} options, expected 4")]
    WrongOptionCount { question: String, count: usize },
    #[error("question `{question}` marks option {index} correct but has only {count} options")]
    AnswerOutOfRange {
        question: String,
        index: usize,
        count: usize,
    },
}

impl PartialEq for CatalogLoadError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ReadError { path: left, .. }, Self::ReadError { path: right, .. }) => {
                left == right
            }
            (Self::ParseError { .. }, Self::ParseError { .. }) => true,
            (Self::Empty, Self::Empty) => true,
            (
                Self::NonContiguousIds {
                    position: left_position,
                    found: left_found,
                },
                Self::NonContiguousIds {
                    position: right_position,
                    found: right_found,
                },
            ) => left_position == right_position && left_found == right_found,
            (Self::DuplicateSlug { slug: left }, Self::DuplicateSlug { slug: right }) => {
                left == right
            }
            (Self::NoQuestions { chapter: left }, Self::NoQuestions { chapter: right }) => {
                left == right
            }
            (
                Self::DuplicateQuestion {
                    chapter: left_chapter,
                    question: left_question,
                },
                Self::DuplicateQuestion {
                    chapter: right_chapter,
                    question: right_question,
                },
            ) => left_chapter == right_chapter && left_question == right_question,
            (
                Self::WrongOptionCount {
                    question: left,
                    count: left_count,
                },
                Self::WrongOptionCount {
                    question: right,
                    count: right_count,
                },
            ) => left == right && left_count == right_count,
            (
                Self::AnswerOutOfRange {
                    question: left,
                    index: left_index,
                    ..
                },
                Self::AnswerOutOfRange {
                    question: right,
                    index: right_index,
                    ..
                },
            ) => left == right && left_index == right_index,
            _ => false,
        }
    }
}

impl Eq for CatalogLoadError {}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no chapter with slug `{slug}`")]
    UnknownSlug { slug: String },
    #[error("no chapter with id {id}")]
    UnknownId { id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
struct ChapterList {
    chapters: Vec<Chapter>,
}

impl Catalog {
    /// Builds a catalog after checking ordering, uniqueness and question shape.
    pub fn new(chapters: Vec<Chapter>) -> Result<Self, CatalogLoadError> {
        validate(&chapters)?;
        Ok(Self { chapters })
    }

    /// The five chapters bundled with the app.
    pub fn builtin() -> Result<Self, CatalogLoadError> {
        Self::from_json_str(BUILTIN_CHAPTERS)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogLoadError> {
        let parsed: ChapterList =
            serde_json::from_str(json).map_err(|source| CatalogLoadError::ParseError { source })?;
        Self::new(parsed.chapters)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| CatalogLoadError::ReadError {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_str(&data)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter_by_slug(&self, slug: &str) -> Result<&Chapter, CatalogError> {
        self.chapters
            .iter()
            .find(|chapter| chapter.slug == slug)
            .ok_or_else(|| CatalogError::UnknownSlug {
                slug: slug.to_string(),
            })
    }

    pub fn chapter_by_id(&self, id: u32) -> Result<&Chapter, CatalogError> {
        self.chapters
            .iter()
            .find(|chapter| chapter.id == id)
            .ok_or(CatalogError::UnknownId { id })
    }

    pub fn question_count(&self) -> usize {
        self.chapters
            .iter()
            .map(|chapter| chapter.questions.len())
            .sum()
    }

    /// Sum of every chapter's maximum score.
    pub fn max_total_score(&self) -> u32 {
        self.chapters.iter().map(Chapter::max_score).sum()
    }

    pub fn is_fully_completed(&self, player: &PlayerState) -> bool {
        self.chapters
            .iter()
            .all(|chapter| player.completed_chapters.contains(&chapter.id))
    }
}

fn validate(chapters: &[Chapter]) -> Result<(), CatalogLoadError> {
    if chapters.is_empty() {
        return Err(CatalogLoadError::Empty);
    }

    let mut slugs = HashSet::new();

    for (position, chapter) in chapters.iter().enumerate() {
        if chapter.id as usize != position + 1 {
            return Err(CatalogLoadError::NonContiguousIds {
                position,
                found: chapter.id,
            });
        }

        if !slugs.insert(chapter.slug.as_str()) {
            return Err(CatalogLoadError::DuplicateSlug {
                slug: chapter.slug.clone(),
            });
        }

        if chapter.questions.is_empty() {
            return Err(CatalogLoadError::NoQuestions {
                chapter: chapter.id,
            });
        }

        let mut question_ids = HashSet::new();
        for question in &chapter.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(CatalogLoadError::DuplicateQuestion {
                    chapter: chapter.id,
                    question: question.id.clone(),
                });
            }

            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(CatalogLoadError::WrongOptionCount {
                    question: question.id.clone(),
                    count: question.options.len(),
                });
            }

            if question.correct_answer >= question.options.len() {
                return Err(CatalogLoadError::AnswerOutOfRange {
                    question: question.id.clone(),
                    index: question.correct_answer,
                    count: question.options.len(),
                });
            }
        }
    }

    Ok(())
}
