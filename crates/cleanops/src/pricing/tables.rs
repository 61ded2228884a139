use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Frequency, PetSituation, PropertyType, ServiceType};

/// One square-footage band of the rate card. `max` is inclusive; the last
/// band leaves it open so the table covers `[0, ∞)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min: u32,
    pub max: Option<u32>,
    pub base_time_hours: f64,
    pub base_price: f64,
    pub size_time_hours: f64,
    pub size_price: f64,
}

impl PricingTier {
    pub fn contains(&self, square_footage: u32) -> bool {
        square_footage >= self.min && self.max.map_or(true, |max| square_footage <= max)
    }
}

/// Ordered, gap-free square-footage rate card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTierTable {
    tiers: Vec<PricingTier>,
}

impl PricingTierTable {
    pub fn new(tiers: Vec<PricingTier>) -> Result<Self, PricingConfigError> {
        let table = Self { tiers };
        table.validate()?;
        Ok(table)
    }

    pub fn tier_for(&self, square_footage: u32) -> Option<&PricingTier> {
        self.tiers.iter().find(|tier| tier.contains(square_footage))
    }

    pub fn tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    fn validate(&self) -> Result<(), PricingConfigError> {
        let first = self.tiers.first().ok_or(PricingConfigError::EmptyTierTable)?;
        if first.min != 0 {
            return Err(PricingConfigError::TierCoverageGap { from: 0 });
        }

        for window in self.tiers.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            let prev_max = prev.max.ok_or(PricingConfigError::TierCoverageGap {
                from: next.min,
            })?;
            if next.min != prev_max + 1 {
                return Err(PricingConfigError::TierCoverageGap { from: prev_max + 1 });
            }
        }

        let last = self.tiers.last().ok_or(PricingConfigError::EmptyTierTable)?;
        if last.max.is_some() {
            return Err(PricingConfigError::TierTableNotOpenEnded);
        }

        Ok(())
    }
}

/// Additive time/dollar delta applied on top of the tier baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub hours: f64,
    pub dollars: f64,
}

impl Adjustment {
    pub const NONE: Adjustment = Adjustment {
        hours: 0.0,
        dollars: 0.0,
    };

    pub const fn new(hours: f64, dollars: f64) -> Self {
        Self { hours, dollars }
    }
}

/// The four adjustment tables. House, weekly, recurring, and no-pets are the
/// zero-delta baseline; every enum variant must carry an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSchedule {
    pub service: BTreeMap<ServiceType, Adjustment>,
    pub property: BTreeMap<PropertyType, Adjustment>,
    pub frequency: BTreeMap<Frequency, Adjustment>,
    pub pets: BTreeMap<PetSituation, Adjustment>,
}

impl AdjustmentSchedule {
    fn validate(&self) -> Result<(), PricingConfigError> {
        for service in ServiceType::ALL {
            if !self.service.contains_key(&service) {
                return Err(PricingConfigError::MissingAdjustment {
                    table: "service",
                    key: format!("{service:?}"),
                });
            }
        }
        for property in PropertyType::ALL {
            if !self.property.contains_key(&property) {
                return Err(PricingConfigError::MissingAdjustment {
                    table: "property",
                    key: format!("{property:?}"),
                });
            }
        }
        for frequency in Frequency::ALL {
            if !self.frequency.contains_key(&frequency) {
                return Err(PricingConfigError::MissingAdjustment {
                    table: "frequency",
                    key: format!("{frequency:?}"),
                });
            }
        }
        for pets in PetSituation::ALL {
            if !self.pets.contains_key(&pets) {
                return Err(PricingConfigError::MissingAdjustment {
                    table: "pets",
                    key: format!("{pets:?}"),
                });
            }
        }
        Ok(())
    }
}

/// Direct cost model for a single visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub hourly_rate: f64,
    pub supplies_flat: f64,
    pub transportation_flat: f64,
    pub realtor_rate: f64,
}

/// One commission bracket; thresholds are gross-margin percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub name: String,
    pub margin_threshold_percent: f64,
    pub rate_percent: f64,
}

/// Commission brackets ordered highest threshold first, ending in a
/// 0%-threshold catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    tiers: Vec<CommissionTier>,
}

impl CommissionSchedule {
    pub fn new(tiers: Vec<CommissionTier>) -> Result<Self, PricingConfigError> {
        let schedule = Self { tiers };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn tiers(&self) -> &[CommissionTier] {
        &self.tiers
    }

    /// Lowest bracket, used when nothing else matches.
    pub fn catch_all(&self) -> Option<&CommissionTier> {
        self.tiers.last()
    }

    fn validate(&self) -> Result<(), PricingConfigError> {
        let last = self
            .tiers
            .last()
            .ok_or(PricingConfigError::EmptyCommissionSchedule)?;
        if last.margin_threshold_percent != 0.0 {
            return Err(PricingConfigError::MissingCommissionCatchAll);
        }

        for window in self.tiers.windows(2) {
            let (higher, lower) = (&window[0], &window[1]);
            if higher.margin_threshold_percent <= lower.margin_threshold_percent {
                return Err(PricingConfigError::CommissionThresholdsUnordered);
            }
            if higher.rate_percent < lower.rate_percent {
                return Err(PricingConfigError::CommissionRatesNotMonotonic);
            }
        }

        Ok(())
    }
}

/// Discount governance dials for the baseline policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub monthly_budget: f64,
    pub minimum_margin_percent: f64,
}

/// Complete engine configuration: rate card, adjustment tables, cost model,
/// commission brackets, and discount policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub tier_table: PricingTierTable,
    pub adjustments: AdjustmentSchedule,
    pub cost_model: CostModel,
    pub commission: CommissionSchedule,
    pub discount_policy: DiscountPolicy,
}

impl PricingConfig {
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        self.tier_table.validate()?;
        self.adjustments.validate()?;
        self.commission.validate()?;
        Ok(())
    }

    /// The company rate card as transcribed from the estimating spreadsheet.
    pub fn standard() -> Self {
        let tier_table = PricingTierTable {
            tiers: vec![
                tier(0, Some(999), 1.00, 88.12, 0.50, 24.41),
                tier(1000, Some(1499), 1.50, 101.87, 0.75, 38.12),
                tier(1500, Some(1999), 2.00, 112.53, 1.00, 52.66),
                tier(2000, Some(2499), 2.25, 118.41, 1.25, 65.65),
                tier(2500, Some(2999), 2.50, 129.84, 1.50, 78.94),
                tier(3000, Some(3999), 3.00, 147.19, 2.00, 101.12),
                tier(4000, Some(4999), 3.50, 168.75, 2.50, 126.56),
                tier(5000, None, 4.00, 195.00, 3.00, 155.00),
            ],
        };

        let mut service = BTreeMap::new();
        service.insert(ServiceType::Turn1, Adjustment::new(-0.75, -25.00));
        service.insert(ServiceType::Turn2, Adjustment::new(-0.50, -15.00));
        service.insert(ServiceType::Turn3, Adjustment::new(-0.25, -10.00));
        service.insert(ServiceType::Turn4, Adjustment::NONE);
        service.insert(ServiceType::DeepCleanBlue, Adjustment::new(1.50, 60.00));
        service.insert(ServiceType::DeepCleanShine, Adjustment::new(2.00, 85.00));
        service.insert(ServiceType::DeepCombo, Adjustment::new(3.00, 120.00));
        service.insert(ServiceType::MoveInOut, Adjustment::new(3.50, 140.00));
        service.insert(ServiceType::OneTime, Adjustment::new(0.50, 35.00));
        service.insert(ServiceType::Recurring, Adjustment::NONE);

        let mut property = BTreeMap::new();
        property.insert(PropertyType::House, Adjustment::NONE);
        property.insert(PropertyType::Apartment, Adjustment::new(-0.25, -10.00));
        property.insert(PropertyType::Office, Adjustment::new(0.50, 15.00));
        property.insert(PropertyType::Studio, Adjustment::new(-0.50, -20.00));
        property.insert(PropertyType::Warehouse, Adjustment::new(1.00, 40.00));

        let mut frequency = BTreeMap::new();
        frequency.insert(Frequency::Weekly, Adjustment::NONE);
        frequency.insert(Frequency::BiWeekly, Adjustment::new(0.25, 10.00));
        frequency.insert(Frequency::Monthly, Adjustment::new(0.50, 25.00));

        let mut pets = BTreeMap::new();
        pets.insert(PetSituation::None, Adjustment::NONE);
        pets.insert(PetSituation::Dog12, Adjustment::new(0.25, 10.00));
        pets.insert(PetSituation::Dog3Plus, Adjustment::new(0.50, 20.00));
        pets.insert(PetSituation::Cat12, Adjustment::new(0.25, 5.00));
        pets.insert(PetSituation::Cat3Plus, Adjustment::new(0.50, 15.00));
        pets.insert(PetSituation::DogCat, Adjustment::new(0.50, 20.00));
        pets.insert(PetSituation::DogCat3Plus, Adjustment::new(0.75, 30.00));

        let commission = CommissionSchedule {
            tiers: vec![
                bracket("EXCELLENT", 60.0, 12.0),
                bracket("GOOD", 45.0, 10.0),
                bracket("FAIR", 30.0, 8.0),
                bracket("POOR", 0.0, 5.0),
            ],
        };

        Self {
            tier_table,
            adjustments: AdjustmentSchedule {
                service,
                property,
                frequency,
                pets,
            },
            cost_model: CostModel {
                hourly_rate: 22.50,
                supplies_flat: 7.73,
                transportation_flat: 11.60,
                realtor_rate: 0.05,
            },
            commission,
            discount_policy: DiscountPolicy {
                monthly_budget: 500.00,
                minimum_margin_percent: 10.0,
            },
        }
    }

    pub fn with_tier_table(mut self, tier_table: PricingTierTable) -> Self {
        self.tier_table = tier_table;
        self
    }
}

fn tier(
    min: u32,
    max: Option<u32>,
    base_time_hours: f64,
    base_price: f64,
    size_time_hours: f64,
    size_price: f64,
) -> PricingTier {
    PricingTier {
        min,
        max,
        base_time_hours,
        base_price,
        size_time_hours,
        size_price,
    }
}

fn bracket(name: &str, margin_threshold_percent: f64, rate_percent: f64) -> CommissionTier {
    CommissionTier {
        name: name.to_string(),
        margin_threshold_percent,
        rate_percent,
    }
}

/// Rate-card defects. These are programming/configuration mistakes, not
/// caller errors; the engine refuses to start on them.
#[derive(Debug, thiserror::Error)]
pub enum PricingConfigError {
    #[error("pricing tier table is empty")]
    EmptyTierTable,
    #[error("pricing tier table has a coverage gap starting at {from} sq ft")]
    TierCoverageGap { from: u32 },
    #[error("pricing tier table must leave its last band open-ended")]
    TierTableNotOpenEnded,
    #[error("adjustment table '{table}' is missing an entry for {key}")]
    MissingAdjustment { table: &'static str, key: String },
    #[error("commission schedule is empty")]
    EmptyCommissionSchedule,
    #[error("commission schedule lacks a 0%-threshold catch-all tier")]
    MissingCommissionCatchAll,
    #[error("commission thresholds must be strictly descending")]
    CommissionThresholdsUnordered,
    #[error("commission rates must not decrease as margin thresholds rise")]
    CommissionRatesNotMonotonic,
}
