//! Game-over feedback tiers

use serde::{Deserialize, Serialize};

/// Verdict shown on the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeedbackTier {
    Defeated,
    Fair,
    Good,
    Great,
    Heroic,
    Legendary,
}

impl FeedbackTier {
    pub fn for_score(score: u64) -> Self {
        match score {
            s if s > 1000 => FeedbackTier::Legendary,
            s if s > 750 => FeedbackTier::Heroic,
            s if s > 500 => FeedbackTier::Great,
            s if s > 250 => FeedbackTier::Good,
            s if s > 100 => FeedbackTier::Fair,
            _ => FeedbackTier::Defeated,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Legendary => "Legendary guardian!",
            FeedbackTier::Heroic => "Amazing! A true hero!",
            FeedbackTier::Great => "Great job! The princess is grateful.",
            FeedbackTier::Good => "Nice try! You're getting the hang of it.",
            FeedbackTier::Fair => "Not bad! A little more practice will do it.",
            FeedbackTier::Defeated => "The princess fell... Don't give up, try again!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds_are_exclusive() {
        assert_eq!(FeedbackTier::for_score(0), FeedbackTier::Defeated);
        assert_eq!(FeedbackTier::for_score(100), FeedbackTier::Defeated);
        assert_eq!(FeedbackTier::for_score(101), FeedbackTier::Fair);
        assert_eq!(FeedbackTier::for_score(250), FeedbackTier::Fair);
        assert_eq!(FeedbackTier::for_score(300), FeedbackTier::Good);
        assert_eq!(FeedbackTier::for_score(550), FeedbackTier::Great);
        assert_eq!(FeedbackTier::for_score(800), FeedbackTier::Heroic);
        assert_eq!(FeedbackTier::for_score(1000), FeedbackTier::Heroic);
        assert_eq!(FeedbackTier::for_score(1050), FeedbackTier::Legendary);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(FeedbackTier::Legendary > FeedbackTier::Defeated);
        assert!(!FeedbackTier::Good.message().is_empty());
    }
}
