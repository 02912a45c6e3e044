//! Progress tracking.
//!
//! Folds scheduler events into the numbers the progress dashboard shows:
//! XP, level, streak and today's counters. An accepted intervention and a
//! completed break are worth [`REWARD_XP`] each. The challenge and mindful
//! breathing pay more and each extends the streak.

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::scheduler::{ActivityKind, HideReason};

pub const REWARD_XP: u64 = 10;
pub const CHALLENGE_XP: u64 = 25;
pub const MINDFUL_XP: u64 = 15;
pub const XP_PER_LEVEL: u64 = 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub xp: u64,
    pub interventions_shown: u32,
    pub interventions_accepted: u32,
    pub interventions_dismissed: u32,
    pub interventions_timed_out: u32,
    pub breaks_suggested: u32,
    pub breaks_taken: u32,
    pub breaks_skipped: u32,
    pub challenges_completed: u32,
    pub mindful_moments: u32,
    /// Completed reward activities.
    pub streak: u32,
    pub feed_refreshes: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    stats: ProgressStats,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing XP balance.
    pub fn with_xp(xp: u64) -> Self {
        Self {
            stats: ProgressStats {
                xp,
                ..ProgressStats::default()
            },
        }
    }

    pub fn stats(&self) -> &ProgressStats {
        &self.stats
    }

    pub fn xp(&self) -> u64 {
        self.stats.xp
    }

    /// 1-based level; every [`XP_PER_LEVEL`] XP is one level.
    pub fn level(&self) -> u64 {
        1 + self.stats.xp / XP_PER_LEVEL
    }

    /// 0.0 .. 1.0 progress towards the next level.
    pub fn level_progress(&self) -> f64 {
        (self.stats.xp % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64
    }

    /// Apply one event. Returns the XP it awarded.
    pub fn apply(&mut self, event: &Event) -> u64 {
        let stats = &mut self.stats;
        let reward = match event {
            Event::InterventionShown { .. } => {
                stats.interventions_shown += 1;
                0
            }
            Event::InterventionHidden { reason, .. } => match reason {
                HideReason::Accepted => {
                    stats.interventions_accepted += 1;
                    REWARD_XP
                }
                HideReason::Dismissed => {
                    stats.interventions_dismissed += 1;
                    0
                }
                HideReason::TimedOut => {
                    stats.interventions_timed_out += 1;
                    0
                }
            },
            Event::BreakSuggested { .. } => {
                stats.breaks_suggested += 1;
                0
            }
            Event::BreakCompleted { .. } => {
                stats.breaks_taken += 1;
                REWARD_XP
            }
            Event::BreakSkipped { .. } => {
                stats.breaks_skipped += 1;
                0
            }
            Event::ActivityCompleted { kind, .. } => {
                stats.streak += 1;
                match kind {
                    ActivityKind::Challenge => {
                        stats.challenges_completed += 1;
                        CHALLENGE_XP
                    }
                    ActivityKind::Mindful => {
                        stats.mindful_moments += 1;
                        MINDFUL_XP
                    }
                }
            }
            Event::FeedRefreshed { .. } => {
                stats.feed_refreshes += 1;
                0
            }
            Event::ScrollSpanClosed { .. }
            | Event::BreakStarted { .. }
            | Event::BreakTick { .. }
            | Event::DashboardRevealed { .. }
            | Event::ChallengeWidgetRevealed { .. }
            | Event::ActivityStarted { .. }
            | Event::ChallengeTick { .. }
            | Event::BreathPhase { .. } => 0,
        };
        stats.xp = stats.xp.saturating_add(reward);
        reward
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> u64 {
        events.into_iter().map(|e| self.apply(e)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::BreakId;

    #[test]
    fn accepted_intervention_and_completed_break_reward() {
        let mut tracker = ProgressTracker::new();
        let awarded = tracker.apply_all(&[
            Event::InterventionHidden {
                reason: HideReason::Accepted,
                at: 0,
            },
            Event::InterventionHidden {
                reason: HideReason::Dismissed,
                at: 0,
            },
            Event::BreakCompleted {
                break_id: BreakId(1),
                at: 0,
            },
            Event::BreakSkipped {
                break_id: BreakId(2),
                next_suggestion_in_ms: 300_000,
                at: 0,
            },
        ]);
        assert_eq!(awarded, 20);
        assert_eq!(tracker.xp(), 20);
        let stats = tracker.stats();
        assert_eq!(stats.interventions_accepted, 1);
        assert_eq!(stats.interventions_dismissed, 1);
        assert_eq!(stats.breaks_taken, 1);
        assert_eq!(stats.breaks_skipped, 1);
    }

    #[test]
    fn activities_pay_their_own_rewards_and_extend_streak() {
        let mut tracker = ProgressTracker::new();
        let awarded = tracker.apply_all(&[
            Event::ActivityStarted {
                kind: ActivityKind::Challenge,
                at: 0,
            },
            Event::ActivityCompleted {
                kind: ActivityKind::Challenge,
                at: 120_000,
            },
            Event::ActivityCompleted {
                kind: ActivityKind::Mindful,
                at: 150_000,
            },
        ]);
        assert_eq!(awarded, 40);
        let stats = tracker.stats();
        assert_eq!(stats.challenges_completed, 1);
        assert_eq!(stats.mindful_moments, 1);
        assert_eq!(stats.streak, 2);
    }

    #[test]
    fn level_arithmetic() {
        let tracker = ProgressTracker::with_xp(1_250);
        assert_eq!(tracker.level(), 2);
        assert!((tracker.level_progress() - 0.25).abs() < f64::EPSILON);

        let fresh = ProgressTracker::new();
        assert_eq!(fresh.level(), 1);
        assert_eq!(fresh.level_progress(), 0.0);
    }
}
