use serde::{Deserialize, Serialize};

use super::domain::round_cents;
use super::tables::{CommissionSchedule, CommissionTier, DiscountPolicy};
use super::QuoteError;

/// Baseline protection states. Any quote below the computed baseline needs a
/// manager sign-off; equality stays within policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineState {
    WithinPolicy,
    RequiresApproval,
}

pub(crate) struct BaselineReview {
    pub state: BaselineState,
    pub discount_from_baseline: f64,
}

pub(crate) fn review_baseline(base_price: f64, quoted_price: f64) -> BaselineReview {
    if quoted_price < base_price {
        BaselineReview {
            state: BaselineState::RequiresApproval,
            discount_from_baseline: round_cents(base_price - quoted_price),
        }
    } else {
        BaselineReview {
            state: BaselineState::WithinPolicy,
            discount_from_baseline: 0.0,
        }
    }
}

/// Independent of the approval gate: would this discount push the period past
/// its budget?
pub(crate) fn exceeds_budget(used: f64, this_discount: f64, policy: &DiscountPolicy) -> bool {
    used + this_discount > policy.monthly_budget
}

/// Pick the first bracket whose threshold the margin meets, scanning from the
/// highest threshold down. Falls closed to the catch-all tier.
pub(crate) fn classify_tier<'a>(
    gross_margin_percent: f64,
    schedule: &'a CommissionSchedule,
) -> Result<&'a CommissionTier, QuoteError> {
    schedule
        .tiers()
        .iter()
        .find(|tier| gross_margin_percent >= tier.margin_threshold_percent)
        .or_else(|| schedule.catch_all())
        .ok_or(QuoteError::CommissionScheduleEmpty)
}

/// Commission is paid on gross margin, not on the sale price.
pub(crate) fn commission_amount(gross_margin: f64, tier: &CommissionTier) -> f64 {
    round_cents(gross_margin * tier.rate_percent / 100.0)
}
