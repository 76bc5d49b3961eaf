//! Completion evaluator — decides whether a step's requirements are met by
//! the evidence currently in hand.
//!
//! Every specified requirement must pass independently; absent requirement
//! fields are vacuously satisfied. Missing evidence fails closed: an
//! unevaluable requirement never silently passes.

use crate::curriculum::Requirements;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Runtime data supplied by UI collaborators at the moment the user tries
/// to advance. Watch percentage normally comes from the tracker's own
/// video-progress record; the counts and flags come from the form that was
/// just submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    pub watched_percent: Option<f64>,
    pub answered_count: Option<u32>,
    pub required_count: Option<u32>,
    pub words_selected: Option<u32>,
    pub sliders_completed: bool,
    pub data_submitted: bool,
}

// ---------------------------------------------------------------------------
// Blocker
// ---------------------------------------------------------------------------

/// Why a completion attempt was refused. Rendered directly to the user as
/// a "complete this step first" style message.
#[derive(Debug, Clone, PartialEq)]
pub enum Blocker {
    UnknownStep,
    StepLocked,
    WatchThreshold { required: f64, watched: Option<f64> },
    QuestionsUnanswered { answered: Option<u32>, required: Option<u32> },
    WordCount { expected: u32, selected: Option<u32> },
    SlidersIncomplete,
    NotSubmitted,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::UnknownStep => write!(f, "this step is not part of the workshop"),
            Blocker::StepLocked => write!(f, "complete the previous step first"),
            Blocker::WatchThreshold { required, watched } => match watched {
                Some(w) => write!(f, "watch at least {required}% of the video (currently {w}%)"),
                None => write!(f, "watch at least {required}% of the video"),
            },
            Blocker::QuestionsUnanswered { answered, required } => match (answered, required) {
                (Some(a), Some(r)) => write!(f, "answer all questions ({a} of {r} answered)"),
                _ => write!(f, "answer all questions before continuing"),
            },
            Blocker::WordCount { expected, selected } => match selected {
                Some(s) => write!(f, "select exactly {expected} words ({s} selected)"),
                None => write!(f, "select exactly {expected} words"),
            },
            Blocker::SlidersIncomplete => write!(f, "set both sliders before continuing"),
            Blocker::NotSubmitted => write!(f, "submit your responses before continuing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// First requirement the evidence does not satisfy, or `None` when the step
/// is completable. Deterministic, no side effects.
pub fn first_unmet(requirements: &Requirements, evidence: &Evidence) -> Option<Blocker> {
    if let Some(required) = requirements.min_watch_percent {
        let passed = evidence.watched_percent.is_some_and(|w| w >= required);
        if !passed {
            return Some(Blocker::WatchThreshold {
                required,
                watched: evidence.watched_percent,
            });
        }
    }

    if requirements.all_questions_answered {
        // Fails closed when either count is missing.
        let passed = match (evidence.answered_count, evidence.required_count) {
            (Some(answered), Some(required)) => answered >= required,
            _ => false,
        };
        if !passed {
            return Some(Blocker::QuestionsUnanswered {
                answered: evidence.answered_count,
                required: evidence.required_count,
            });
        }
    }

    if let Some(expected) = requirements.exact_word_count {
        if evidence.words_selected != Some(expected) {
            return Some(Blocker::WordCount {
                expected,
                selected: evidence.words_selected,
            });
        }
    }

    if requirements.sliders_completed && !evidence.sliders_completed {
        return Some(Blocker::SlidersIncomplete);
    }

    if requirements.data_submitted && !evidence.data_submitted {
        return Some(Blocker::NotSubmitted);
    }

    None
}

/// Boolean form of the contract: all specified requirements pass.
pub fn requirements_met(requirements: &Requirements, evidence: &Evidence) -> bool {
    first_unmet(requirements, evidence).is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> Requirements {
        Requirements::default()
    }

    #[test]
    fn empty_requirements_always_pass() {
        assert!(requirements_met(&req(), &Evidence::default()));
    }

    #[test]
    fn min_watch_boundary() {
        let requirements = Requirements {
            min_watch_percent: Some(1.0),
            ..req()
        };
        let fail = Evidence {
            watched_percent: Some(0.0),
            ..Evidence::default()
        };
        let pass = Evidence {
            watched_percent: Some(1.0),
            ..Evidence::default()
        };
        assert!(!requirements_met(&requirements, &fail));
        assert!(requirements_met(&requirements, &pass));
    }

    #[test]
    fn min_watch_fails_closed_without_evidence() {
        let requirements = Requirements {
            min_watch_percent: Some(90.0),
            ..req()
        };
        assert_eq!(
            first_unmet(&requirements, &Evidence::default()),
            Some(Blocker::WatchThreshold {
                required: 90.0,
                watched: None
            })
        );
    }

    #[test]
    fn all_questions_fails_closed_on_missing_counts() {
        let requirements = Requirements {
            all_questions_answered: true,
            ..req()
        };
        // Both counts absent: unevaluable, must not pass.
        assert!(!requirements_met(&requirements, &Evidence::default()));
        // Only one count present: still unevaluable.
        let partial = Evidence {
            answered_count: Some(3),
            ..Evidence::default()
        };
        assert!(!requirements_met(&requirements, &partial));
    }

    #[test]
    fn all_questions_requires_answered_at_least_required() {
        let requirements = Requirements {
            all_questions_answered: true,
            ..req()
        };
        let short = Evidence {
            answered_count: Some(3),
            required_count: Some(5),
            ..Evidence::default()
        };
        let exact = Evidence {
            answered_count: Some(5),
            required_count: Some(5),
            ..Evidence::default()
        };
        assert!(!requirements_met(&requirements, &short));
        assert!(requirements_met(&requirements, &exact));
    }

    #[test]
    fn exact_word_count_rejects_off_by_one() {
        let requirements = Requirements {
            exact_word_count: Some(4),
            ..req()
        };
        for (selected, expected_pass) in [(3, false), (4, true), (5, false)] {
            let evidence = Evidence {
                words_selected: Some(selected),
                ..Evidence::default()
            };
            assert_eq!(
                requirements_met(&requirements, &evidence),
                expected_pass,
                "words_selected = {selected}"
            );
        }
        assert!(!requirements_met(&requirements, &Evidence::default()));
    }

    #[test]
    fn flags_require_true_evidence() {
        let requirements = Requirements {
            sliders_completed: true,
            data_submitted: true,
            ..req()
        };
        let sliders_only = Evidence {
            sliders_completed: true,
            ..Evidence::default()
        };
        assert_eq!(
            first_unmet(&requirements, &sliders_only),
            Some(Blocker::NotSubmitted)
        );
        let both = Evidence {
            sliders_completed: true,
            data_submitted: true,
            ..Evidence::default()
        };
        assert!(requirements_met(&requirements, &both));
    }

    #[test]
    fn all_specified_requirements_must_pass_independently() {
        let requirements = Requirements {
            min_watch_percent: Some(1.0),
            sliders_completed: true,
            ..req()
        };
        let watched_only = Evidence {
            watched_percent: Some(100.0),
            ..Evidence::default()
        };
        assert_eq!(
            first_unmet(&requirements, &watched_only),
            Some(Blocker::SlidersIncomplete)
        );
    }

    #[test]
    fn blocker_messages_are_user_facing() {
        let message = Blocker::QuestionsUnanswered {
            answered: Some(3),
            required: Some(5),
        }
        .to_string();
        assert_eq!(message, "answer all questions (3 of 5 answered)");
        assert_eq!(
            Blocker::StepLocked.to_string(),
            "complete the previous step first"
        );
    }
}
