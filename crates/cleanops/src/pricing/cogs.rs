use super::domain::{round_cents, CogsBreakdown};
use super::tables::CostModel;

/// Compute the cost-of-goods-sold breakdown for one visit.
///
/// Revenue at or below zero yields an all-zero breakdown; the margin
/// percentage is guarded so degenerate inputs never divide by zero.
pub fn compute_cogs(
    revenue: f64,
    billable_hours: f64,
    is_realtor_referral: bool,
    cost_model: &CostModel,
) -> CogsBreakdown {
    if revenue <= 0.0 {
        return CogsBreakdown::zeroed();
    }

    let contractor_cost = billable_hours.max(0.0) * cost_model.hourly_rate;
    let referral_commission = if is_realtor_referral {
        revenue * cost_model.realtor_rate
    } else {
        0.0
    };

    let total = contractor_cost
        + cost_model.supplies_flat
        + cost_model.transportation_flat
        + referral_commission;
    let gross_margin = revenue - total;
    let gross_margin_percent = gross_margin / revenue * 100.0;

    CogsBreakdown {
        contractor_cost: round_cents(contractor_cost),
        supplies_cost: cost_model.supplies_flat,
        transportation_cost: cost_model.transportation_flat,
        referral_commission: round_cents(referral_commission),
        total: round_cents(total),
        gross_margin: round_cents(gross_margin),
        gross_margin_percent,
    }
}
