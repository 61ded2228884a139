use super::domain::{PriceComponent, QuoteFactor, ServiceRequestInput};
use super::tables::{Adjustment, PricingConfig};
use super::QuoteError;

pub(crate) struct PriceTotals {
    pub base_price: f64,
    pub billable_hours: f64,
}

/// Accumulate the tier baseline and the four adjustment tables into a base
/// price. Adjustments are additive, so application order never matters.
pub(crate) fn accumulate_price(
    input: &ServiceRequestInput,
    config: &PricingConfig,
) -> Result<(Vec<PriceComponent>, PriceTotals), QuoteError> {
    if input.square_footage == 0 {
        return Err(QuoteError::InvalidSquareFootage {
            square_footage: input.square_footage,
        });
    }

    let tier = config
        .tier_table
        .tier_for(input.square_footage)
        .ok_or(QuoteError::TierLookupFailed {
            square_footage: input.square_footage,
        })?;

    let mut components = Vec::new();
    let mut total_hours = tier.base_time_hours + tier.size_time_hours;
    let mut total_dollars = tier.base_price + tier.size_price;

    components.push(PriceComponent {
        factor: QuoteFactor::BaseTier,
        hours: total_hours,
        dollars: total_dollars,
        notes: match tier.max {
            Some(max) => format!("{}-{} sq ft band", tier.min, max),
            None => format!("{}+ sq ft band", tier.min),
        },
    });

    let service = lookup(
        config.adjustments.service.get(&input.service_type).copied(),
        "service",
    )?;
    push_component(
        &mut components,
        QuoteFactor::ServiceType,
        service,
        format!("{:?}", input.service_type),
    );

    let property = lookup(
        config
            .adjustments
            .property
            .get(&input.property_type)
            .copied(),
        "property",
    )?;
    push_component(
        &mut components,
        QuoteFactor::PropertyType,
        property,
        format!("{:?}", input.property_type),
    );

    let frequency = lookup(
        config.adjustments.frequency.get(&input.frequency).copied(),
        "frequency",
    )?;
    push_component(
        &mut components,
        QuoteFactor::Frequency,
        frequency,
        format!("{:?}", input.frequency),
    );

    let pets = lookup(
        config.adjustments.pets.get(&input.pet_situation).copied(),
        "pets",
    )?;
    push_component(
        &mut components,
        QuoteFactor::Pets,
        pets,
        format!("{:?}", input.pet_situation),
    );

    for adjustment in [service, property, frequency, pets] {
        total_hours += adjustment.hours;
        total_dollars += adjustment.dollars;
    }

    // Negative accumulations clamp to zero, never a negative price or time.
    let totals = PriceTotals {
        base_price: total_dollars.max(0.0),
        billable_hours: total_hours.max(0.0),
    };

    Ok((components, totals))
}

fn lookup(adjustment: Option<Adjustment>, table: &'static str) -> Result<Adjustment, QuoteError> {
    adjustment.ok_or(QuoteError::AdjustmentLookupFailed { table })
}

fn push_component(
    components: &mut Vec<PriceComponent>,
    factor: QuoteFactor,
    adjustment: Adjustment,
    notes: String,
) {
    components.push(PriceComponent {
        factor,
        hours: adjustment.hours,
        dollars: adjustment.dollars,
        notes,
    });
}
