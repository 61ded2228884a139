use crate::infra::{
    parse_frequency, parse_pet_situation, parse_property_type, parse_role, parse_service_type,
    InMemoryApprovalQueue, InMemoryEstimateRepository,
};
use chrono::Local;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use cleanops::error::AppError;
use cleanops::pricing::{
    tier_table_from_path, CustomerProfile, EstimateService, EstimateSubmission, Frequency,
    PetSituation, PricingConfig, PropertyType, QuoteEngine, QuoteView, Role, ServiceRequestInput,
    ServiceType,
};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Square footage of the property
    #[arg(long)]
    pub(crate) square_footage: u32,
    /// Property type (house, apartment, office, studio, warehouse)
    #[arg(long, default_value = "house", value_parser = parse_property_type)]
    pub(crate) property_type: PropertyType,
    /// Service type (turn_1..turn_4, deep_clean_blue, deep_clean_shine,
    /// deep_combo, move_in_out, one_time, recurring)
    #[arg(long, default_value = "recurring", value_parser = parse_service_type)]
    pub(crate) service_type: ServiceType,
    /// Visit frequency (weekly, bi_weekly, monthly)
    #[arg(long, default_value = "weekly", value_parser = parse_frequency)]
    pub(crate) frequency: Frequency,
    /// Pet situation (none, dog_1_2, dog_3_plus, cat_1_2, cat_3_plus,
    /// dog_cat, dog_cat_3_plus)
    #[arg(long, default_value = "none", value_parser = parse_pet_situation)]
    pub(crate) pets: PetSituation,
    /// Apply the realtor-referral commission to the cost model
    #[arg(long)]
    pub(crate) realtor_referral: bool,
    /// Quote a price other than the computed baseline
    #[arg(long)]
    pub(crate) override_price: Option<f64>,
    /// Price against a rate-card CSV export instead of the standard card
    #[arg(long)]
    pub(crate) tier_csv: Option<PathBuf>,
    /// Role deciding which financial fields are shown
    #[arg(long, default_value = "manager", value_parser = parse_role)]
    pub(crate) role: Role,
    /// Emit the full view as JSON instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Price the demo against a rate-card CSV export
    #[arg(long)]
    pub(crate) tier_csv: Option<PathBuf>,
}

fn build_engine(tier_csv: Option<PathBuf>) -> Result<QuoteEngine, AppError> {
    let config = match tier_csv {
        Some(path) => {
            let table = tier_table_from_path(path)?;
            PricingConfig::standard().with_tier_table(table)
        }
        None => PricingConfig::standard(),
    };
    Ok(QuoteEngine::new(config)?)
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        square_footage,
        property_type,
        service_type,
        frequency,
        pets,
        realtor_referral,
        override_price,
        tier_csv,
        role,
        json,
    } = args;

    let engine = build_engine(tier_csv)?;
    let input = ServiceRequestInput {
        square_footage,
        property_type,
        service_type,
        frequency,
        pet_situation: pets,
        is_realtor_referral: realtor_referral,
        quoted_price_override: override_price,
    };

    let result = engine.quote(&input)?;
    let view = QuoteView::for_role(&result, role);

    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("unable to render quote: {err}"),
        }
        return Ok(());
    }

    render_quote(&view);
    Ok(())
}

fn render_quote(view: &QuoteView) {
    println!("Quote for {:.2} billable hours", view.billable_hours);
    println!("Price buildup:");
    for component in &view.components {
        println!(
            "  - {:?}: {:+.2} h / {:+.2} USD ({})",
            component.factor, component.hours, component.dollars, component.notes
        );
    }
    println!("Base price: ${:.2}", view.base_price);
    println!("Final price: ${:.2}", view.final_price);

    if view.requires_approval {
        println!(
            "Below baseline by ${:.2} -> manager approval required",
            view.discount_from_baseline
        );
    }
    if view.exceeds_budget {
        println!("Discount budget for the period would be exceeded");
    }
    if view.discount_not_allowed {
        println!("Margin under the floor: discounting is not allowed on this deal");
    }

    match (view.gross_margin, view.gross_margin_percent) {
        (Some(margin), Some(percent)) => {
            println!("Gross margin: ${margin:.2} ({percent:.1}%)");
        }
        _ => println!("Financial details hidden for this role"),
    }
    if let (Some(tier), Some(amount)) = (&view.commission_tier, view.commission_amount) {
        println!("Commission: {tier} -> ${amount:.2}");
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { tier_csv } = args;

    println!("CleanOps estimate workflow demo");

    let config = match tier_csv {
        Some(path) => PricingConfig::standard().with_tier_table(tier_table_from_path(path)?),
        None => PricingConfig::standard(),
    };

    let repository = Arc::new(InMemoryEstimateRepository::default());
    let approvals = Arc::new(InMemoryApprovalQueue::default());
    let service = EstimateService::new(repository, approvals.clone(), config)?;

    let customer = CustomerProfile {
        name: "Jordan Blake".to_string(),
        contact: "jordan@example.com".to_string(),
        service_address: "2100 Birchwood Dr".to_string(),
    };
    let request = ServiceRequestInput {
        square_footage: 2100,
        property_type: PropertyType::House,
        service_type: ServiceType::Recurring,
        frequency: Frequency::Weekly,
        pet_situation: PetSituation::Dog12,
        is_realtor_referral: false,
        quoted_price_override: None,
    };

    let today = Local::now().date_naive();

    println!("\n1. Standard estimate at the computed baseline");
    let record = match service.submit(EstimateSubmission {
        customer: customer.clone(),
        request: request.clone(),
        justification: None,
        submitted_on: Some(today),
    }) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    let view = record.status_view();
    println!(
        "  {} -> status {} at ${:.2}",
        view.estimate_id.0, view.status, view.final_price
    );
    render_quote(&QuoteView::for_role(&record.pricing, Role::Manager));

    println!("\n2. Discounted estimate routed through approval");
    let mut discounted = request;
    discounted.quoted_price_override = Some(150.0);
    let discounted_record = match service.submit(EstimateSubmission {
        customer,
        request: discounted,
        justification: Some("Competitor bid match for the whole block".to_string()),
        submitted_on: Some(today),
    }) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "  {} -> status {} (budget period {})",
        discounted_record.estimate_id.0,
        discounted_record.status.label(),
        discounted_record.period()
    );

    for pending in approvals.requests() {
        println!(
            "  Approval queue: {} short ${:.2} (budget exceeded: {})",
            pending.estimate_id.0, pending.discount_from_baseline, pending.exceeds_budget
        );
    }

    let resolved = match service.resolve_approval(&discounted_record.estimate_id, true) {
        Ok(record) => record,
        Err(err) => {
            println!("  Decision failed: {err}");
            return Ok(());
        }
    };
    println!(
        "  Manager approved -> status {}",
        resolved.status.label()
    );

    Ok(())
}
