use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;

use cleanops::config::AppConfig;
use cleanops::error::AppError;
use cleanops::pricing::{
    tier_table_from_path, ApprovalError, ApprovalPublisher, DiscountApprovalRequest, EstimateId,
    EstimateRecord, EstimateRepository, EstimateStatus, Frequency, PetSituation, PricingConfig,
    PropertyType, RepositoryError, Role, ServiceType,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pricing: Arc<PricingConfig>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEstimateRepository {
    records: Arc<Mutex<HashMap<EstimateId, EstimateRecord>>>,
}

impl EstimateRepository for InMemoryEstimateRepository {
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
pub(crate) struct InMemoryApprovalQueue {
    requests: Arc<Mutex<Vec<DiscountApprovalRequest>>>,
}

impl ApprovalPublisher for InMemoryApprovalQueue {
    fn publish(&self, request: DiscountApprovalRequest) -> Result<(), ApprovalError> {
        let mut guard = self.requests.lock().expect("approval mutex poisoned");
        guard.push(request);
        Ok(())
    }
}

impl InMemoryApprovalQueue {
    pub(crate) fn requests(&self) -> Vec<DiscountApprovalRequest> {
        self.requests.lock().expect("approval mutex poisoned").clone()
    }
}

/// Build the deployable rate card: company standard plus any environment
/// overrides (discount budget, replacement tier-table CSV).
pub(crate) fn load_pricing_config(config: &AppConfig) -> Result<PricingConfig, AppError> {
    let mut pricing = PricingConfig::standard();

    if let Some(budget) = config.pricing.monthly_discount_budget {
        pricing.discount_policy.monthly_budget = budget;
    }

    if let Some(path) = &config.pricing.tier_table_csv {
        let table = tier_table_from_path(path)?;
        pricing = pricing.with_tier_table(table);
    }

    pricing.validate().map_err(AppError::from)?;
    Ok(pricing)
}

fn parse_wire_enum<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.trim().to_string()))
        .map_err(|_| format!("'{raw}' is not a recognized {what}"))
}

pub(crate) fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    parse_wire_enum(raw, "property type")
}

pub(crate) fn parse_service_type(raw: &str) -> Result<ServiceType, String> {
    parse_wire_enum(raw, "service type")
}

pub(crate) fn parse_frequency(raw: &str) -> Result<Frequency, String> {
    parse_wire_enum(raw, "frequency")
}

pub(crate) fn parse_pet_situation(raw: &str) -> Result<PetSituation, String> {
    parse_wire_enum(raw, "pet situation")
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, String> {
    parse_wire_enum(raw, "role")
}
