// Transcription credit ledger
//
// Credits are measured in seconds of audio. Every transcription debits
// the estimated duration up front; every plan purchase tops up both the
// remaining and total counters (top-ups add, they never reset).

use serde::{Deserialize, Serialize};

use crate::error::OperationError;

/// Fallback estimate when the uploaded audio carries no duration.
pub const DEFAULT_USAGE_ESTIMATE_SECS: u64 = 60;

/// Credits granted to every fresh account.
pub const FREE_TIER_SECONDS: u64 = 300;

/// Per-user usage allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredits {
    pub plan: String,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
}

impl Default for UserCredits {
    fn default() -> Self {
        Self {
            plan: "Free".to_string(),
            remaining_seconds: FREE_TIER_SECONDS,
            total_seconds: FREE_TIER_SECONDS,
        }
    }
}

impl UserCredits {
    /// Whether the ledger covers an estimated usage.
    pub fn can_afford(&self, estimate_secs: u64) -> bool {
        self.remaining_seconds >= estimate_secs
    }

    /// Check affordability, returning the shortfall on failure so the
    /// caller can tell the user exactly how much is missing.
    pub fn ensure_affordable(&self, estimate_secs: u64) -> Result<(), OperationError> {
        if self.can_afford(estimate_secs) {
            Ok(())
        } else {
            Err(OperationError::InsufficientBalance {
                required_secs: estimate_secs,
                remaining_secs: self.remaining_seconds,
            })
        }
    }

    /// Deduct usage. Remaining saturates at zero; total is untouched.
    pub fn debit(&self, amount_secs: u64) -> UserCredits {
        UserCredits {
            plan: self.plan.clone(),
            remaining_seconds: self.remaining_seconds.saturating_sub(amount_secs),
            total_seconds: self.total_seconds,
        }
    }

    /// Apply a plan purchase: both counters grow by the plan's minutes
    /// and the plan label is replaced. Top-ups are additive even when the
    /// new plan is a lower tier than the current one.
    pub fn credit(&self, added_minutes: u64, new_plan: &str) -> UserCredits {
        let added_secs = added_minutes * 60;
        UserCredits {
            plan: new_plan.to_string(),
            remaining_seconds: self.remaining_seconds + added_secs,
            total_seconds: self.total_seconds + added_secs,
        }
    }
}

/// Integer seconds to debit for a piece of audio: the ceiling of its
/// duration, or [`DEFAULT_USAGE_ESTIMATE_SECS`] when unknown.
pub fn estimate_usage(duration_secs: Option<f64>) -> u64 {
    match duration_secs {
        Some(d) if d.is_finite() && d > 0.0 => d.ceil() as u64,
        _ => DEFAULT_USAGE_ESTIMATE_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_ceils() {
        assert_eq!(estimate_usage(Some(119.2)), 120);
        assert_eq!(estimate_usage(Some(120.0)), 120);
        assert_eq!(estimate_usage(Some(0.4)), 1);
    }

    #[test]
    fn test_estimate_fallback() {
        assert_eq!(estimate_usage(None), 60);
        assert_eq!(estimate_usage(Some(0.0)), 60);
        assert_eq!(estimate_usage(Some(f64::NAN)), 60);
    }

    #[test]
    fn test_debit_saturates_at_zero() {
        let credits = UserCredits {
            plan: "Free".to_string(),
            remaining_seconds: 100,
            total_seconds: 300,
        };
        let after = credits.debit(250);
        assert_eq!(after.remaining_seconds, 0);
        assert_eq!(after.total_seconds, 300);
    }

    #[test]
    fn test_credit_is_additive() {
        let credits = UserCredits {
            plan: "Free".to_string(),
            remaining_seconds: 120,
            total_seconds: 300,
        };
        let after = credits.credit(500, "Standart");
        assert_eq!(after.remaining_seconds, 30_120);
        assert_eq!(after.total_seconds, 30_300);
        assert_eq!(after.plan, "Standart");
    }

    #[test]
    fn test_crediting_in_parts_equals_crediting_sum() {
        let credits = UserCredits::default();
        let split = credits.credit(300, "Giriş").credit(200, "Giriş");
        let whole = credits.credit(500, "Giriş");
        assert_eq!(split.remaining_seconds, whole.remaining_seconds);
        assert_eq!(split.total_seconds, whole.total_seconds);
    }

    #[test]
    fn test_insufficient_balance_carries_shortfall() {
        let credits = UserCredits {
            plan: "Free".to_string(),
            remaining_seconds: 300,
            total_seconds: 300,
        };
        assert!(!credits.can_afford(400));

        match credits.ensure_affordable(400) {
            Err(OperationError::InsufficientBalance {
                required_secs,
                remaining_secs,
            }) => {
                assert_eq!(required_secs - remaining_secs, 100);
            }
            other => panic!("expected insufficient balance, got {:?}", other),
        }
    }
}
