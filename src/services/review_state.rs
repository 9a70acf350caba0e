/// Where a word sits in its review lifecycle.
///
/// `New` (stage 0) -> `Learning` (1..max) -> `Graduated` (>= max). Graduated words keep
/// their record but are no longer picked for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReviewPhase {
    New,
    Learning,
    Graduated,
}

impl ReviewPhase {
    pub fn of(stage: u32, max_stages: u32) -> Self {
        if stage == 0 {
            ReviewPhase::New
        } else if stage < max_stages {
            ReviewPhase::Learning
        } else {
            ReviewPhase::Graduated
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ReviewPhase::New => "NEW",
            ReviewPhase::Learning => "LEARNING",
            ReviewPhase::Graduated => "GRADUATED",
        }
    }

    /// Whether a due record in this phase goes into the review set.
    pub fn is_reviewable(self) -> bool {
        matches!(self, ReviewPhase::Learning)
    }

    /// Presentations only move a word forward; checked on every commit in debug builds.
    pub fn can_transition_to(self, target: ReviewPhase) -> bool {
        matches!(
            (self, target),
            (ReviewPhase::New, ReviewPhase::Learning)
                | (ReviewPhase::New, ReviewPhase::Graduated)
                | (ReviewPhase::Learning, ReviewPhase::Learning)
                | (ReviewPhase::Learning, ReviewPhase::Graduated)
                | (ReviewPhase::Graduated, ReviewPhase::Graduated)
        )
    }
}
