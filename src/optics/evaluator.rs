//! Solved-state detection

use serde::{Deserialize, Serialize};

use super::trace::TracePath;

/// Outcome of evaluating one trace against the previous solved flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SolvedTransition {
    /// True only on the evaluation that first reached the receptor
    pub became_solved: bool,
    pub solved: bool,
}

/// Pure transition rule: once solved, always solved
pub fn evaluate(path: &TracePath, was_solved: bool) -> SolvedTransition {
    let hit = path.terminal.is_hit();
    SolvedTransition {
        became_solved: !was_solved && hit,
        solved: was_solved || hit,
    }
}

/// Latching evaluator owned by a puzzle session
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionEvaluator {
    solved: bool,
}

impl SolutionEvaluator {
    pub fn new(solved: bool) -> Self {
        Self { solved }
    }

    pub fn evaluate(&mut self, path: &TracePath) -> SolvedTransition {
        let transition = evaluate(path, self.solved);
        self.solved = transition.solved;
        transition
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::trace::Terminal;

    fn path(terminal: Terminal) -> TracePath {
        TracePath {
            segments: Vec::new(),
            interactions: Vec::new(),
            terminal,
        }
    }

    #[test]
    fn test_transition_table() {
        let hit = path(Terminal::HitReceptor);
        let miss = path(Terminal::ExitedBounds);

        assert_eq!(
            evaluate(&hit, false),
            SolvedTransition {
                became_solved: true,
                solved: true
            }
        );
        assert_eq!(
            evaluate(&hit, true),
            SolvedTransition {
                became_solved: false,
                solved: true
            }
        );
        assert_eq!(evaluate(&miss, false), SolvedTransition::default());
        assert_eq!(
            evaluate(&miss, true),
            SolvedTransition {
                became_solved: false,
                solved: true
            }
        );
    }

    #[test]
    fn test_cap_is_unsolved() {
        assert!(!evaluate(&path(Terminal::MaxBouncesReached), false).solved);
    }

    #[test]
    fn test_latch_reports_transition_once() {
        let mut evaluator = SolutionEvaluator::default();
        let hit = path(Terminal::HitReceptor);

        assert!(evaluator.evaluate(&hit).became_solved);
        assert!(!evaluator.evaluate(&hit).became_solved);
        assert!(!evaluator.evaluate(&path(Terminal::ExitedBounds)).became_solved);
        assert!(evaluator.is_solved());
    }

    #[test]
    fn test_latch_starts_solved_after_hydrate() {
        let mut evaluator = SolutionEvaluator::new(true);
        let transition = evaluator.evaluate(&path(Terminal::HitReceptor));
        assert!(!transition.became_solved);
        assert!(transition.solved);
    }
}
