use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{PricingResult, ServiceRequestInput};
use super::repository::{
    ApprovalError, ApprovalPublisher, CustomerProfile, DiscountApprovalRequest, EstimateId,
    EstimateRecord, EstimateRepository, EstimateStatus, RepositoryError,
};
use super::tables::{PricingConfig, PricingConfigError};
use super::{QuoteEngine, QuoteError};

/// Inbound estimate submission: customer metadata, the quote request, and an
/// optional justification for below-baseline pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateSubmission {
    pub customer: CustomerProfile,
    pub request: ServiceRequestInput,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}

/// Service composing the quote engine, estimate repository, and the
/// discount-approval queue.
pub struct EstimateService<R, A> {
    engine: Arc<QuoteEngine>,
    repository: Arc<R>,
    approvals: Arc<A>,
}

static ESTIMATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_estimate_id() -> EstimateId {
    let id = ESTIMATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EstimateId(format!("est-{id:06}"))
}

impl<R, A> EstimateService<R, A>
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        approvals: Arc<A>,
        config: PricingConfig,
    ) -> Result<Self, PricingConfigError> {
        let engine = Arc::new(QuoteEngine::new(config)?);
        Ok(Self {
            engine,
            repository,
            approvals,
        })
    }

    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Price a request against the period's discount usage without storing
    /// anything.
    pub fn price(
        &self,
        request: &ServiceRequestInput,
        period: &str,
    ) -> Result<PricingResult, EstimateServiceError> {
        let used = self.repository.discount_used(period)?;
        Ok(self.engine.quote_with_usage(request, used)?)
    }

    /// Submit a new estimate. Below-baseline quotes need a justification and
    /// land in `PendingApproval`; quotes under the margin floor are refused.
    pub fn submit(
        &self,
        submission: EstimateSubmission,
    ) -> Result<EstimateRecord, EstimateServiceError> {
        let EstimateSubmission {
            customer,
            request,
            justification,
            submitted_on,
        } = submission;

        let created_on = submitted_on.unwrap_or_else(|| Local::now().date_naive());
        let period = created_on.format("%Y-%m").to_string();
        let pricing = self.price(&request, &period)?;

        if pricing.discount_not_allowed {
            return Err(EstimateServiceError::MarginFloor {
                gross_margin_percent: pricing.gross_margin_percent,
            });
        }

        let justification = if pricing.requires_approval {
            match justification {
                Some(text) if !text.trim().is_empty() => Some(text),
                _ => return Err(EstimateServiceError::JustificationRequired),
            }
        } else {
            justification
        };

        let status = if pricing.requires_approval {
            EstimateStatus::PendingApproval
        } else {
            EstimateStatus::Drafted
        };

        let record = EstimateRecord {
            estimate_id: next_estimate_id(),
            customer,
            request,
            pricing,
            status,
            created_on,
        };

        let stored = self.repository.insert(record)?;

        if stored.status == EstimateStatus::PendingApproval {
            let request = DiscountApprovalRequest {
                estimate_id: stored.estimate_id.clone(),
                discount_from_baseline: stored.pricing.discount_from_baseline,
                exceeds_budget: stored.pricing.exceeds_budget,
                justification: justification.unwrap_or_default(),
            };
            // A stored PendingApproval record with no queued request would
            // wait forever; downgrade it if the queue refuses the request.
            if let Err(publish_error) = self.approvals.publish(request) {
                let mut downgraded = stored;
                downgraded.status = EstimateStatus::Drafted;
                self.repository.update(downgraded.clone())?;
                warn!(
                    estimate_id = %downgraded.estimate_id.0,
                    %publish_error,
                    "approval publish failed; estimate downgraded to drafted"
                );
                return Err(publish_error.into());
            }
            info!(
                estimate_id = %stored.estimate_id.0,
                shortfall = stored.pricing.discount_from_baseline,
                "discount approval requested"
            );
        }

        Ok(stored)
    }

    /// Fetch an estimate for API responses.
    pub fn get(&self, estimate_id: &EstimateId) -> Result<EstimateRecord, EstimateServiceError> {
        let record = self
            .repository
            .fetch(estimate_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Apply a manager decision to a pending estimate.
    pub fn resolve_approval(
        &self,
        estimate_id: &EstimateId,
        approved: bool,
    ) -> Result<EstimateRecord, EstimateServiceError> {
        let mut record = self
            .repository
            .fetch(estimate_id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status != EstimateStatus::PendingApproval {
            return Err(EstimateServiceError::NotAwaitingApproval {
                status: record.status.label(),
            });
        }

        record.status = if approved {
            EstimateStatus::Confirmed
        } else {
            EstimateStatus::Declined
        };
        self.repository.update(record.clone())?;

        info!(
            estimate_id = %record.estimate_id.0,
            approved,
            "discount decision recorded"
        );

        Ok(record)
    }
}

/// Error raised by the estimate service.
#[derive(Debug, thiserror::Error)]
pub enum EstimateServiceError {
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Approval(#[from] ApprovalError),
    #[error("gross margin {gross_margin_percent:.1}% is under the discount floor; estimate blocked")]
    MarginFloor { gross_margin_percent: f64 },
    #[error("below-baseline quotes require a written justification")]
    JustificationRequired,
    #[error("estimate is not awaiting approval (status: {status})")]
    NotAwaitingApproval { status: &'static str },
}
