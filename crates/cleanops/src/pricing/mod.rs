//! Pricing and commission engine for service quotes.
//!
//! The pipeline is a pure, synchronous computation: tier lookup and
//! adjustment accumulation produce a base price, the cost model turns the
//! final price into a COGS breakdown, and the commission schedule classifies
//! the resulting gross margin. Estimate persistence and the approval
//! workflow live behind the traits in [`repository`].

pub(crate) mod cogs;
pub mod domain;
pub mod import;
pub(crate) mod policy;
pub mod repository;
pub mod router;
pub(crate) mod rules;
pub mod service;
pub mod tables;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use cogs::compute_cogs;
pub use domain::{
    round_cents, CogsBreakdown, Frequency, PetSituation, PriceComponent, PricingResult,
    PropertyType, QuoteFactor, ServiceRequestInput, ServiceType,
};
pub use import::{tier_table_from_path, tier_table_from_reader, TierImportError};
pub use policy::BaselineState;
pub use repository::{
    ApprovalError, ApprovalPublisher, CustomerProfile, DiscountApprovalRequest, EstimateId,
    EstimateRecord, EstimateRepository, EstimateStatus, EstimateStatusView, RepositoryError,
};
pub use router::estimate_router;
pub use service::{EstimateService, EstimateServiceError, EstimateSubmission};
pub use tables::{
    Adjustment, AdjustmentSchedule, CommissionSchedule, CommissionTier, CostModel, DiscountPolicy,
    PricingConfig, PricingConfigError, PricingTier, PricingTierTable,
};
pub use visibility::{can_view_financials, QuoteView, Role};

use tracing::error;

/// Errors surfaced while pricing a single request.
///
/// The first two variants are caller-correctable validation failures; the
/// rest indicate a rate-card defect and are treated as fatal.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("square footage must be greater than zero (got {square_footage})")]
    InvalidSquareFootage { square_footage: u32 },
    #[error("quoted price override must not be negative (got {quoted:.2})")]
    InvalidOverridePrice { quoted: f64 },
    #[error("no pricing tier covers {square_footage} sq ft; rate card is misconfigured")]
    TierLookupFailed { square_footage: u32 },
    #[error("adjustment table '{table}' has no entry for the requested key")]
    AdjustmentLookupFailed { table: &'static str },
    #[error("commission schedule has no tiers")]
    CommissionScheduleEmpty,
}

impl QuoteError {
    /// True when the caller can fix the request; false for rate-card defects.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuoteError::InvalidSquareFootage { .. } | QuoteError::InvalidOverridePrice { .. }
        )
    }
}

/// Stateless quote calculator bound to one validated rate card.
pub struct QuoteEngine {
    config: PricingConfig,
}

impl QuoteEngine {
    /// Build an engine, refusing misconfigured rate cards up front.
    pub fn new(config: PricingConfig) -> Result<Self, PricingConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine over the company standard rate card.
    pub fn standard() -> Self {
        Self {
            config: PricingConfig::standard(),
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a request with no discount-budget usage context.
    pub fn quote(&self, input: &ServiceRequestInput) -> Result<PricingResult, QuoteError> {
        self.quote_with_usage(input, 0.0)
    }

    /// Price a request, folding in the discount already consumed this period
    /// so the budget flag reflects cumulative usage.
    pub fn quote_with_usage(
        &self,
        input: &ServiceRequestInput,
        discount_used: f64,
    ) -> Result<PricingResult, QuoteError> {
        if let Some(quoted) = input.quoted_price_override {
            if quoted < 0.0 {
                return Err(QuoteError::InvalidOverridePrice { quoted });
            }
        }

        let (components, totals) = rules::accumulate_price(input, &self.config).map_err(|err| {
            if !err.is_validation() {
                error!(square_footage = input.square_footage, %err, "rate card lookup failed");
            }
            err
        })?;

        let base_price = round_cents(totals.base_price);
        let quoted_price = round_cents(input.quoted_price_override.unwrap_or(base_price));
        let final_price = quoted_price;

        let cogs = compute_cogs(
            final_price,
            totals.billable_hours,
            input.is_realtor_referral,
            &self.config.cost_model,
        );

        let review = policy::review_baseline(base_price, quoted_price);
        let exceeds_budget = policy::exceeds_budget(
            discount_used,
            review.discount_from_baseline,
            &self.config.discount_policy,
        );

        let tier = policy::classify_tier(cogs.gross_margin_percent, &self.config.commission)
            .map_err(|err| {
                error!(%err, "commission classification failed");
                err
            })?;
        let commission_amount = policy::commission_amount(cogs.gross_margin, tier);
        let discount_not_allowed =
            cogs.gross_margin_percent < self.config.discount_policy.minimum_margin_percent;

        Ok(PricingResult {
            base_price,
            quoted_price,
            final_price,
            billable_hours: totals.billable_hours,
            gross_margin: cogs.gross_margin,
            gross_margin_percent: cogs.gross_margin_percent,
            cogs,
            commission_tier: tier.name.clone(),
            commission_rate_percent: tier.rate_percent,
            commission_amount,
            is_below_baseline: review.state == BaselineState::RequiresApproval,
            discount_from_baseline: review.discount_from_baseline,
            requires_approval: review.state == BaselineState::RequiresApproval,
            exceeds_budget,
            discount_not_allowed,
            components,
        })
    }
}
