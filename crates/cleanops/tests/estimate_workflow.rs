//! Integration coverage for the estimate intake and approval workflow,
//! exercised through the public service facade and the HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use cleanops::pricing::{
        ApprovalError, ApprovalPublisher, CustomerProfile, DiscountApprovalRequest, EstimateId,
        EstimateRecord, EstimateRepository, EstimateService, EstimateStatus, EstimateSubmission,
        Frequency, PetSituation, PricingConfig, PropertyType, RepositoryError, ServiceRequestInput,
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

    pub(super) fn submission() -> EstimateSubmission {
        EstimateSubmission {
            customer: CustomerProfile {
                name: "Priya Raman".to_string(),
                contact: "priya@example.com".to_string(),
                service_address: "88 Linden Ave".to_string(),
            },
            request: request(),
            justification: None,
            submitted_on: NaiveDate::from_ymd_opt(2026, 8, 10),
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        records: Arc<Mutex<HashMap<EstimateId, EstimateRecord>>>,
    }

    impl EstimateRepository for MemoryRepository {
        fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&record.estimate_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.estimate_id.clone(), record.clone());
            Ok(record)
        }

        fn update(&self, record: EstimateRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(record.estimate_id.clone(), record);
            Ok(())
        }

        fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }

        fn discount_used(&self, period: &str) -> Result<f64, RepositoryError> {
            let guard = self.records.lock().expect("lock");
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
            let guard = self.records.lock().expect("lock");
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
            self.requests.lock().expect("lock").clone()
        }
    }

    impl ApprovalPublisher for MemoryApprovals {
        fn publish(&self, request: DiscountApprovalRequest) -> Result<(), ApprovalError> {
            self.requests.lock().expect("lock").push(request);
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
}

mod workflow {
    use super::common::*;
    use cleanops::pricing::{EstimateRepository, EstimateServiceError, EstimateStatus};

    #[test]
    fn standard_submission_is_drafted_without_approval() {
        let (service, repository, approvals) = build_service();
        let record = service.submit(submission()).expect("submission succeeds");

        assert_eq!(record.status, EstimateStatus::Drafted);
        assert!(approvals.requests().is_empty());

        let stored = repository
            .fetch(&record.estimate_id)
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.pricing.final_price, record.pricing.final_price);
    }

    #[test]
    fn discounted_submission_raises_an_approval_request() {
        let (service, _, approvals) = build_service();

        let mut discounted = submission();
        discounted.request.quoted_price_override = Some(150.0);
        discounted.justification = Some("matching a competitor bid".to_string());

        let record = service.submit(discounted).expect("submission succeeds");
        assert_eq!(record.status, EstimateStatus::PendingApproval);

        let requests = approvals.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].estimate_id, record.estimate_id);
        assert!(requests[0].discount_from_baseline > 0.0);
    }

    #[test]
    fn manager_approval_confirms_the_estimate() {
        let (service, _, _) = build_service();

        let mut discounted = submission();
        discounted.request.quoted_price_override = Some(150.0);
        discounted.justification = Some("loyal customer".to_string());
        let record = service.submit(discounted).expect("submission succeeds");

        let resolved = service
            .resolve_approval(&record.estimate_id, true)
            .expect("decision applies");
        assert_eq!(resolved.status, EstimateStatus::Confirmed);
    }

    #[test]
    fn unprofitable_submission_is_refused_outright() {
        let (service, _, approvals) = build_service();

        let mut unprofitable = submission();
        unprofitable.request.quoted_price_override = Some(70.0);
        unprofitable.justification = Some("any price to win".to_string());

        assert!(matches!(
            service.submit(unprofitable),
            Err(EstimateServiceError::MarginFloor { .. })
        ));
        assert!(approvals.requests().is_empty());
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use cleanops::pricing::estimate_router;

    fn build_router() -> (axum::Router, Arc<super::common::MemoryApprovals>) {
        let (service, _, approvals) = build_service();
        (estimate_router(Arc::new(service)), approvals)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn post_estimates_returns_created_view() {
        let (router, _) = build_router();
        let payload = serde_json::to_value(submission()).expect("serialize");

        let response = router
            .oneshot(post_json("/api/v1/estimates", payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload.get("estimate_id").is_some());
        assert_eq!(
            payload.get("status").and_then(Value::as_str),
            Some("drafted")
        );
        assert!(payload.get("commission_amount").is_none());
    }

    #[tokio::test]
    async fn discount_without_justification_is_unprocessable() {
        let (router, approvals) = build_router();
        let mut submission = submission();
        submission.request.quoted_price_override = Some(150.0);
        let payload = serde_json::to_value(submission).expect("serialize");

        let response = router
            .oneshot(post_json("/api/v1/estimates", payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(approvals.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_enum_spelling_is_a_bad_request() {
        let (router, _) = build_router();
        let mut payload = serde_json::to_value(submission()).expect("serialize");
        payload["request"]["property_type"] = Value::String("castle".to_string());

        let response = router
            .oneshot(post_json("/api/v1/estimates", payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload.get("error").is_some());
    }

    #[tokio::test]
    async fn zero_square_footage_is_a_bad_request() {
        let (router, _) = build_router();
        let mut submission = submission();
        submission.request.square_footage = 0;
        let payload = serde_json::to_value(submission).expect("serialize");

        let response = router
            .oneshot(post_json("/api/v1/estimates", payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_estimate_round_trips_the_status() {
        let (service, _, _) = build_service();
        let service = Arc::new(service);
        let record = service.submit(submission()).expect("submission succeeds");

        let router = estimate_router(service);
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/estimates/{}", record.estimate_id.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("estimate_id").and_then(Value::as_str),
            Some(record.estimate_id.0.as_str())
        );
        assert_eq!(
            payload.get("status").and_then(Value::as_str),
            Some("drafted")
        );
    }

    #[tokio::test]
    async fn unknown_estimate_is_not_found() {
        let (router, _) = build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/estimates/est-999999")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn decision_endpoint_confirms_pending_estimates() {
        let (service, _, _) = build_service();
        let service = Arc::new(service);

        let mut discounted = submission();
        discounted.request.quoted_price_override = Some(150.0);
        discounted.justification = Some("competitor match".to_string());
        let record = service.submit(discounted).expect("submission succeeds");

        let router = estimate_router(service);
        let response = router
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/estimates/{}/decision", record.estimate_id.0),
                json!({ "approved": true }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("status").and_then(Value::as_str),
            Some("confirmed")
        );

        // A second decision conflicts; the estimate is no longer pending.
        let response = router
            .oneshot(post_json(
                &format!("/api/v1/estimates/{}/decision", record.estimate_id.0),
                json!({ "approved": false }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
