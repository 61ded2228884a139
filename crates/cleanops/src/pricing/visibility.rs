use serde::{Deserialize, Serialize};

use super::domain::{CogsBreakdown, PriceComponent, PricingResult};

/// Back-office roles. Financial visibility is a single capability check so
/// presentation code never re-implements role comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    SalesRep,
    Dispatcher,
    Worker,
}

/// Whether a role may see margin, COGS, and commission figures.
pub fn can_view_financials(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Manager | Role::SalesRep)
}

/// Role-filtered projection of a pricing result. Price and approval flags are
/// always visible; the financial fields are withheld for roles without the
/// capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteView {
    pub base_price: f64,
    pub quoted_price: f64,
    pub final_price: f64,
    pub billable_hours: f64,
    pub requires_approval: bool,
    pub exceeds_budget: bool,
    pub discount_not_allowed: bool,
    pub discount_from_baseline: f64,
    pub components: Vec<PriceComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cogs: Option<CogsBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_margin_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_amount: Option<f64>,
}

impl QuoteView {
    pub fn for_role(result: &PricingResult, role: Role) -> Self {
        let financials = can_view_financials(role);

        Self {
            base_price: result.base_price,
            quoted_price: result.quoted_price,
            final_price: result.final_price,
            billable_hours: result.billable_hours,
            requires_approval: result.requires_approval,
            exceeds_budget: result.exceeds_budget,
            discount_not_allowed: result.discount_not_allowed,
            discount_from_baseline: result.discount_from_baseline,
            components: result.components.clone(),
            cogs: financials.then_some(result.cogs),
            gross_margin: financials.then_some(result.gross_margin),
            gross_margin_percent: financials.then_some(result.gross_margin_percent),
            commission_tier: financials.then(|| result.commission_tier.clone()),
            commission_amount: financials.then_some(result.commission_amount),
        }
    }
}
