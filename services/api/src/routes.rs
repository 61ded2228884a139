use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use cleanops::error::AppError;
use cleanops::pricing::router::json_rejection_response;
use cleanops::pricing::{
    estimate_router, tier_table_from_reader, ApprovalPublisher, EstimateRepository,
    EstimateService, QuoteEngine, QuoteView, Role, ServiceRequestInput,
};

#[derive(Debug, Deserialize)]
pub(crate) struct PriceQuoteRequest {
    #[serde(flatten)]
    pub(crate) request: ServiceRequestInput,
    #[serde(default)]
    pub(crate) role: Option<Role>,
    #[serde(default)]
    pub(crate) discount_used_to_date: f64,
    /// Optional rate-card CSV export to price against instead of the
    /// deployed card.
    #[serde(default)]
    pub(crate) tier_csv: Option<String>,
}

pub(crate) fn with_estimate_routes<R, A>(service: Arc<EstimateService<R, A>>) -> axum::Router
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    estimate_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/quotes/price",
            axum::routing::post(price_quote_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Pure pricing endpoint: no estimate is stored, nothing is published.
pub(crate) async fn price_quote_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<PriceQuoteRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => match price_quote(&state, payload) {
            Ok(view) => Json(view).into_response(),
            Err(err) => err.into_response(),
        },
        Err(rejection) => json_rejection_response(rejection),
    }
}

fn price_quote(state: &AppState, payload: PriceQuoteRequest) -> Result<QuoteView, AppError> {
    let PriceQuoteRequest {
        request,
        role,
        discount_used_to_date,
        tier_csv,
    } = payload;

    let engine = match tier_csv {
        Some(csv) => {
            let table = tier_table_from_reader(csv.as_bytes())?;
            let config = state.pricing.as_ref().clone().with_tier_table(table);
            QuoteEngine::new(config)?
        }
        None => QuoteEngine::new(state.pricing.as_ref().clone())?,
    };

    let result = engine.quote_with_usage(&request, discount_used_to_date)?;
    // Least privilege when the caller does not say who is asking.
    Ok(QuoteView::for_role(&result, role.unwrap_or(Role::Worker)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryApprovalQueue, InMemoryEstimateRepository};
    use axum::body::Body;
    use axum::http::Request;
    use cleanops::pricing::{Frequency, PetSituation, PricingConfig, PropertyType, ServiceType};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new()
            .build_recorder()
            .handle();
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(handle),
            pricing: Arc::new(PricingConfig::standard()),
        }
    }

    fn sample_request() -> ServiceRequestInput {
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

    #[tokio::test]
    async fn price_quote_returns_filtered_view() {
        let request = PriceQuoteRequest {
            request: sample_request(),
            role: Some(Role::Worker),
            discount_used_to_date: 0.0,
            tier_csv: None,
        };

        let view = price_quote(&test_state(), request).expect("quote prices");
        assert!((view.base_price - 184.06).abs() <= 0.01);
        assert!(view.commission_amount.is_none());
        assert!(!view.requires_approval);
    }

    #[tokio::test]
    async fn price_quote_without_role_hides_financials() {
        let request = PriceQuoteRequest {
            request: sample_request(),
            role: None,
            discount_used_to_date: 0.0,
            tier_csv: None,
        };

        let view = price_quote(&test_state(), request).expect("quote prices");
        assert!(view.commission_amount.is_none());
        assert!(view.gross_margin_percent.is_none());
        assert!(view.cogs.is_none());

        let request = PriceQuoteRequest {
            request: sample_request(),
            role: Some(Role::Manager),
            discount_used_to_date: 0.0,
            tier_csv: None,
        };
        let view = price_quote(&test_state(), request).expect("quote prices");
        assert!(view.commission_amount.is_some());
    }

    #[tokio::test]
    async fn price_quote_accepts_inline_rate_card() {
        let csv = "\
Min Sq Ft,Max Sq Ft,Base Hours,Base Price,Size Hours,Size Price
0,,2.0,200.00,1.0,50.00
";
        let request = PriceQuoteRequest {
            request: sample_request(),
            role: None,
            discount_used_to_date: 0.0,
            tier_csv: Some(csv.to_string()),
        };

        let view = price_quote(&test_state(), request).expect("quote prices");
        assert!((view.base_price - 250.00).abs() < 0.005);
    }

    #[tokio::test]
    async fn price_quote_rejects_zero_footage() {
        let mut input = sample_request();
        input.square_footage = 0;
        let request = PriceQuoteRequest {
            request: input,
            role: None,
            discount_used_to_date: 0.0,
            tier_csv: None,
        };

        let result = price_quote(&test_state(), request);
        assert!(matches!(result, Err(AppError::Quote(_))));
    }

    #[tokio::test]
    async fn unknown_enum_spelling_answers_bad_request() {
        let repository = Arc::new(InMemoryEstimateRepository::default());
        let approvals = Arc::new(InMemoryApprovalQueue::default());
        let service = Arc::new(
            EstimateService::new(repository, approvals, PricingConfig::standard())
                .expect("standard rate card valid"),
        );
        let app = with_estimate_routes(service).layer(Extension(test_state()));

        let body = json!({
            "square_footage": 1200,
            "property_type": "castle",
            "service_type": "recurring",
            "frequency": "weekly",
            "pet_situation": "none"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/quotes/price")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
