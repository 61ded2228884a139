use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::pricing::repository::{
    ApprovalError, ApprovalPublisher, CustomerProfile, DiscountApprovalRequest, EstimateId,
    EstimateRecord, EstimateRepository, EstimateStatus, RepositoryError,
};
use crate::pricing::{
    EstimateService, Frequency, PetSituation, PricingConfig, PropertyType, ServiceRequestInput,
    ServiceType,
};

pub(super) fn request() -> ServiceRequestInput {
    ServiceRequestInput {
        square_footage: 2100,
        property_type: PropertyType::House,
        service_type: ServiceType::Recurring,
        frequency: Frequency::Weekly,
        pet_situation: PetSituation::None,
        is_realtor_referral: false,
        quoted_price_override: None,
    }
}

pub(super) fn customer() -> CustomerProfile {
    CustomerProfile {
        name: "Dana Whitfield".to_string(),
        contact: "dana@example.com".to_string(),
        service_address: "412 Maple Ct".to_string(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<EstimateId, EstimateRecord>>>,
}

impl EstimateRepository for MemoryRepository {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.estimate_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.estimate_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EstimateRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.estimate_id) {
            guard.insert(record.estimate_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn discount_used(&self, period: &str) -> Result<f64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.period() == period)
            .filter(|record| {
                matches!(
                    record.status,
                    EstimateStatus::PendingApproval | EstimateStatus::Confirmed
                )
            })
            .map(|record| record.pricing.discount_from_baseline)
            .sum())
    }

    fn pending_approval(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == EstimateStatus::PendingApproval)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApprovals {
    requests: Arc<Mutex<Vec<DiscountApprovalRequest>>>,
}

impl MemoryApprovals {
    pub(super) fn requests(&self) -> Vec<DiscountApprovalRequest> {
        self.requests.lock().expect("approval mutex poisoned").clone()
    }
}

impl ApprovalPublisher for MemoryApprovals {
    fn publish(&self, request: DiscountApprovalRequest) -> Result<(), ApprovalError> {
        self.requests
            .lock()
            .expect("approval mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    EstimateService<MemoryRepository, MemoryApprovals>,
    Arc<MemoryRepository>,
    Arc<MemoryApprovals>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let approvals = Arc::new(MemoryApprovals::default());
    let service = EstimateService::new(
        repository.clone(),
        approvals.clone(),
        PricingConfig::standard(),
    )
    .expect("standard rate card valid");
    (service, repository, approvals)
}
