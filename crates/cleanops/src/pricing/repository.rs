use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{PricingResult, ServiceRequestInput};

/// Identifier wrapper for stored estimates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstimateId(pub String);

/// Customer metadata captured alongside a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: String,
    pub contact: String,
    pub service_address: String,
}

/// Workflow states for a stored estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateStatus {
    Drafted,
    PendingApproval,
    Confirmed,
    Declined,
}

impl EstimateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EstimateStatus::Drafted => "drafted",
            EstimateStatus::PendingApproval => "pending_approval",
            EstimateStatus::Confirmed => "confirmed",
            EstimateStatus::Declined => "declined",
        }
    }
}

/// Repository record pairing the request, its pricing, and workflow status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub estimate_id: EstimateId,
    pub customer: CustomerProfile,
    pub request: ServiceRequestInput,
    pub pricing: PricingResult,
    pub status: EstimateStatus,
    pub created_on: NaiveDate,
}

impl EstimateRecord {
    /// Period key for discount-budget accounting.
    pub fn period(&self) -> String {
        self.created_on.format("%Y-%m").to_string()
    }

    pub fn status_view(&self) -> EstimateStatusView {
        EstimateStatusView {
            estimate_id: self.estimate_id.clone(),
            status: self.status.label(),
            final_price: self.pricing.final_price,
            requires_approval: self.pricing.requires_approval,
            discount_from_baseline: self.pricing.discount_from_baseline,
        }
    }
}

/// Sanitized status payload exposed over HTTP; no financials.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateStatusView {
    pub estimate_id: EstimateId,
    pub status: &'static str,
    pub final_price: f64,
    pub requires_approval: bool,
    pub discount_from_baseline: f64,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EstimateRepository: Send + Sync {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError>;
    fn update(&self, record: EstimateRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError>;
    /// Baseline discount already granted in the `YYYY-MM` period, counting
    /// estimates that are pending or confirmed.
    fn discount_used(&self, period: &str) -> Result<f64, RepositoryError>;
    fn pending_approval(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("estimate already exists")]
    Conflict,
    #[error("estimate not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for the discount-approval workflow (manager review queue).
pub trait ApprovalPublisher: Send + Sync {
    fn publish(&self, request: DiscountApprovalRequest) -> Result<(), ApprovalError>;
}

/// Payload handed to the approval workflow when a quote drops below baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountApprovalRequest {
    pub estimate_id: EstimateId,
    pub discount_from_baseline: f64,
    pub exceeds_budget: bool,
    pub justification: String,
}

/// Approval dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("approval transport unavailable: {0}")]
    Transport(String),
}
