use crate::catalog::{Chapter, Question};

/// Points for every correctly answered question.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;
/// Extra points for a chapter answered without a single mistake.
pub const PERFECT_CHAPTER_BONUS: u32 = 10;

pub fn max_chapter_score(question_count: usize) -> u32 {
    POINTS_PER_CORRECT_ANSWER * question_count as u32 + PERFECT_CHAPTER_BONUS
}

/// Receives the final score of a finished chapter run.
pub trait ChapterResultSink {
    fn record_chapter_result(&mut self, chapter_id: u32, score: u32);
}

/// Where a session stands on its current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    AwaitingSelection,
    SelectionMade,
    ResultRevealed,
    ChapterFinished,
}

/// Feedback produced when an answer is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReveal {
    pub selected: usize,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterOutcome {
    pub chapter_id: u32,
    pub score: u32,
    pub is_perfect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to advance from; the call was ignored.
    Ignored,
    NextQuestion { index: usize },
    Finished(ChapterOutcome),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("chapter {chapter_id} has no questions to ask")]
    EmptyChapter { chapter_id: u32 },
}

/// One run through a chapter's questions.
///
/// Transitions that do not apply to the current phase are ignored rather than
/// reported, so UI handlers can forward every click without checking first.
/// The running total lives only here; the result sink sees the final score
/// once, when the last question is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    chapter_id: u32,
    questions: Vec<Question>,
    current_index: usize,
    selected: Option<usize>,
    revealed: bool,
    correct_count: usize,
    points: u32,
    outcome: Option<ChapterOutcome>,
}

impl QuizSession {
    pub fn new(chapter: &Chapter) -> Result<Self, QuizError> {
        if chapter.questions.is_empty() {
            return Err(QuizError::EmptyChapter {
                chapter_id: chapter.id,
            });
        }

        Ok(Self {
            chapter_id: chapter.id,
            questions: chapter.questions.clone(),
            current_index: 0,
            selected: None,
            revealed: false,
            correct_count: 0,
            points: 0,
            outcome: None,
        })
    }

    pub fn phase(&self) -> QuizPhase {
        if self.outcome.is_some() {
            QuizPhase::ChapterFinished
        } else if self.revealed {
            QuizPhase::ResultRevealed
        } else if self.selected.is_some() {
            QuizPhase::SelectionMade
        } else {
            QuizPhase::AwaitingSelection
        }
    }

    pub fn chapter_id(&self) -> u32 {
        self.chapter_id
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn outcome(&self) -> Option<ChapterOutcome> {
        self.outcome
    }

    /// Share of the chapter already answered, counting a revealed question as done.
    pub fn progress_percent(&self) -> f64 {
        let answered = if self.outcome.is_some() {
            self.questions.len()
        } else {
            self.current_index + usize::from(self.revealed)
        };
        answered as f64 / self.questions.len() as f64 * 100.0
    }

    /// Picks an option for the current question. Changing the pick is allowed
    /// until the answer is confirmed. Returns whether the selection changed.
    pub fn select_option(&mut self, index: usize) -> bool {
        if !matches!(
            self.phase(),
            QuizPhase::AwaitingSelection | QuizPhase::SelectionMade
        ) {
            return false;
        }

        if index >= self.current_question().options.len() {
            return false;
        }

        self.selected = Some(index);
        true
    }

    /// Locks in the selected option and scores it.
    pub fn confirm(&mut self) -> Option<AnswerReveal> {
        if self.phase() != QuizPhase::SelectionMade {
            return None;
        }

        let selected = self.selected?;
        let question = &self.questions[self.current_index];
        let is_correct = question.is_correct(selected);
        let reveal = AnswerReveal {
            selected,
            correct_answer: question.correct_answer,
            is_correct,
            explanation: question.explanation.clone(),
        };

        if is_correct {
            self.points += POINTS_PER_CORRECT_ANSWER;
            self.correct_count += 1;
        }
        self.revealed = true;

        Some(reveal)
    }

    /// Moves past a revealed answer. Leaving the last question finishes the
    /// chapter and hands the final score to `sink`.
    pub fn advance(&mut self, sink: &mut impl ChapterResultSink) -> Advance {
        if self.phase() != QuizPhase::ResultRevealed {
            return Advance::Ignored;
        }

        if !self.is_last_question() {
            self.current_index += 1;
            self.selected = None;
            self.revealed = false;
            return Advance::NextQuestion {
                index: self.current_index,
            };
        }

        let is_perfect = self.correct_count == self.questions.len();
        let bonus = if is_perfect { PERFECT_CHAPTER_BONUS } else { 0 };
        let outcome = ChapterOutcome {
            chapter_id: self.chapter_id,
            score: self.points + bonus,
            is_perfect,
        };

        self.outcome = Some(outcome);
        sink.record_chapter_result(outcome.chapter_id, outcome.score);

        Advance::Finished(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataPoint;

    #[derive(Default)]
    struct RecordingSink {
        results: Vec<(u32, u32)>,
    }

    impl ChapterResultSink for RecordingSink {
        fn record_chapter_result(&mut self, chapter_id: u32, score: u32) {
            self.results.push((chapter_id, score));
        }
    }

    fn sample_chapter(correct_answers: &[usize]) -> Chapter {
        Chapter {
            id: 1,
            slug: "awakening".to_string(),
            title: "Awakening".to_string(),
            subtitle: "Genesis".to_string(),
            icon: "zap".to_string(),
            color: "cyan".to_string(),
            story: "Story".to_string(),
            lore_intro: "Intro".to_string(),
            data_point: DataPoint::ChainId,
            questions: correct_answers
                .iter()
                .enumerate()
                .map(|(index, correct_answer)| Question {
                    id: format!("1-{}", index + 1),
                    prompt: format!("Question {}", index + 1),
                    options: vec![
                        "A".to_string(),
                        "B".to_string(),
                        "C".to_string(),
                        "D".to_string(),
                    ],
                    correct_answer: *correct_answer,
                    explanation: "Explained".to_string(),
                })
                .collect(),
        }
    }

    fn answer(session: &mut QuizSession, sink: &mut RecordingSink, index: usize) -> Advance {
        assert!(session.select_option(index));
        session.confirm().expect("selection should confirm");
        session.advance(sink)
    }

    fn play(answers: &[usize], correct_answers: &[usize]) -> (ChapterOutcome, Vec<(u32, u32)>) {
        let chapter = sample_chapter(correct_answers);
        let mut session = QuizSession::new(&chapter).expect("chapter has questions");
        let mut sink = RecordingSink::default();
        let mut last = Advance::Ignored;

        for index in answers {
            last = answer(&mut session, &mut sink, *index);
        }

        match last {
            Advance::Finished(outcome) => (outcome, sink.results),
            other => panic!("chapter should be finished, got {other:?}"),
        }
    }

    #[test]
    fn perfect_two_question_chapter_scores_thirty() {
        let (outcome, results) = play(&[1, 2], &[1, 2]);

        assert_eq!(outcome.score, 30);
        assert!(outcome.is_perfect);
        assert_eq!(results, vec![(1, 30)]);
    }

    #[test]
    fn one_miss_forfeits_bonus() {
        let (outcome, results) = play(&[0, 2], &[1, 2]);

        assert_eq!(outcome.score, 10);
        assert!(!outcome.is_perfect);
        assert_eq!(results, vec![(1, 10)]);
    }

    #[test]
    fn scores_follow_correct_count() {
        let correct = [0, 1, 2, 3, 0];
        let n = correct.len() as u32;

        let (all_right, _) = play(&correct, &correct);
        assert_eq!(all_right.score, 10 * n + 10);
        assert_eq!(all_right.score, max_chapter_score(correct.len()));

        let (all_wrong, _) = play(&[3, 3, 3, 0, 3], &correct);
        assert_eq!(all_wrong.score, 0);

        let (one_wrong, _) = play(&[0, 1, 2, 3, 1], &correct);
        assert_eq!(one_wrong.score, 10 * (n - 1));
        assert!(!one_wrong.is_perfect);
    }

    #[test]
    fn walks_through_phases() {
        let chapter = sample_chapter(&[1, 2]);
        let mut session = QuizSession::new(&chapter).expect("chapter has questions");
        let mut sink = RecordingSink::default();

        assert_eq!(session.phase(), QuizPhase::AwaitingSelection);
        assert_eq!(session.confirm(), None);
        assert_eq!(session.advance(&mut sink), Advance::Ignored);

        assert!(session.select_option(0));
        assert!(session.select_option(1));
        assert_eq!(session.phase(), QuizPhase::SelectionMade);
        assert_eq!(session.advance(&mut sink), Advance::Ignored);

        let reveal = session.confirm().expect("selection confirms");
        assert!(reveal.is_correct);
        assert_eq!(reveal.selected, 1);
        assert_eq!(reveal.explanation, "Explained");
        assert_eq!(session.phase(), QuizPhase::ResultRevealed);
        assert_eq!(session.points(), 10);
        assert_eq!(session.progress_percent(), 50.0);

        assert_eq!(
            session.advance(&mut sink),
            Advance::NextQuestion { index: 1 }
        );
        assert_eq!(session.phase(), QuizPhase::AwaitingSelection);
        assert_eq!(session.selected(), None);
        assert!(session.is_last_question());
        assert!(sink.results.is_empty());
    }

    #[test]
    fn selection_is_frozen_after_confirm() {
        let chapter = sample_chapter(&[1, 2]);
        let mut session = QuizSession::new(&chapter).expect("chapter has questions");

        session.select_option(0);
        let reveal = session.confirm().expect("selection confirms");
        assert!(!reveal.is_correct);

        assert!(!session.select_option(1));
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.confirm(), None);
        assert_eq!(session.points(), 0);
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let chapter = sample_chapter(&[1]);
        let mut session = QuizSession::new(&chapter).expect("chapter has questions");

        assert!(!session.select_option(4));
        assert_eq!(session.phase(), QuizPhase::AwaitingSelection);
    }

    #[test]
    fn finished_session_ignores_further_input() {
        let chapter = sample_chapter(&[1]);
        let mut session = QuizSession::new(&chapter).expect("chapter has questions");
        let mut sink = RecordingSink::default();

        answer(&mut session, &mut sink, 1);
        assert_eq!(session.phase(), QuizPhase::ChapterFinished);
        assert_eq!(session.progress_percent(), 100.0);

        assert!(!session.select_option(0));
        assert_eq!(session.confirm(), None);
        assert_eq!(session.advance(&mut sink), Advance::Ignored);
        assert_eq!(sink.results, vec![(1, 20)]);
    }

    #[test]
    fn rejects_empty_chapter() {
        let chapter = sample_chapter(&[]);

        assert_eq!(
            QuizSession::new(&chapter),
            Err(QuizError::EmptyChapter { chapter_id: 1 })
        );
    }
}
