//! Leveling and Scoring Arithmetic
//!
//! The server stores whatever level/xp/coins the client pushes, so this
//! arithmetic is authoritative and must stay integer-exact:
//!
//! - an award of `a` XP adds `a` to xp and `a / 2` (floor) to coins
//! - xp at or above 100 rolls over: `level += xp / 100`, `xp %= 100`
//!
//! Percentages use the same float rounding the browser applies
//! (`round(part / total * 100)`, half rounds up), so scores computed here
//! match ones already stored by older clients.

use crate::error::CommandError;
use crate::model::{QuizQuestion, UserState};

/// XP needed to gain one level
pub const XP_PER_LEVEL: u32 = 100;

/// Result of applying an XP award
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpAward {
    /// XP granted
    pub amount: u32,
    /// Coins granted alongside
    pub coins_gained: u32,
    /// Levels gained by this award
    pub levels_gained: u32,
    /// Level after the award
    pub new_level: u32,
}

impl XpAward {
    /// Whether the award crossed at least one level boundary
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Apply an XP award to the state in place
pub fn award_xp(state: &mut UserState, amount: u32) -> XpAward {
    let coins_gained = amount / 2;
    state.xp = state.xp.saturating_add(amount);
    state.coins = state.coins.saturating_add(coins_gained);

    let mut levels_gained = 0;
    if state.xp >= XP_PER_LEVEL {
        levels_gained = state.xp / XP_PER_LEVEL;
        state.level = state.level.saturating_add(levels_gained);
        state.xp %= XP_PER_LEVEL;
    }

    tracing::debug!(
        amount,
        coins_gained,
        levels_gained,
        level = state.level,
        xp = state.xp,
        "Awarded XP"
    );

    XpAward {
        amount,
        coins_gained,
        levels_gained,
        new_level: state.level,
    }
}

/// `round(part / total * 100)`; a zero total yields 0
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let ratio = part as f64 / total as f64 * 100.0;
    // Math.round semantics: half rounds toward +inf
    (ratio + 0.5).floor() as u32
}

/// Outcome of grading a quiz attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizResult {
    /// Number of right answers
    pub correct: usize,
    /// Score in percent
    pub score: u32,
    /// Chosen option per question
    pub answers: Vec<usize>,
}

/// Grade a quiz attempt.
///
/// Every question must have a selected option; otherwise the attempt is
/// rejected with [`CommandError::IncompleteQuiz`] and nothing is scored.
pub fn score_quiz(
    questions: &[QuizQuestion],
    selections: &[Option<usize>],
) -> Result<QuizResult, CommandError> {
    if selections.len() < questions.len() {
        return Err(CommandError::IncompleteQuiz);
    }

    let mut answers = Vec::with_capacity(questions.len());
    let mut correct = 0;
    for (question, selection) in questions.iter().zip(selections) {
        let chosen = selection.ok_or(CommandError::IncompleteQuiz)?;
        if chosen == question.correct_option_index {
            correct += 1;
        }
        answers.push(chosen);
    }

    Ok(QuizResult {
        correct,
        score: percent(correct, questions.len()),
        answers,
    })
}
