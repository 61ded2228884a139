use serde::{Deserialize, Serialize};

/// Property categories the operation services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    House,
    Apartment,
    Office,
    Studio,
    Warehouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Office,
        PropertyType::Studio,
        PropertyType::Warehouse,
    ];
}

/// Service catalog entries. Turns are rental turnovers graded by scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[serde(rename = "turn_1")]
    Turn1,
    #[serde(rename = "turn_2")]
    Turn2,
    #[serde(rename = "turn_3")]
    Turn3,
    #[serde(rename = "turn_4")]
    Turn4,
    DeepCleanBlue,
    DeepCleanShine,
    DeepCombo,
    MoveInOut,
    OneTime,
    Recurring,
}

impl ServiceType {
    pub const ALL: [ServiceType; 10] = [
        ServiceType::Turn1,
        ServiceType::Turn2,
        ServiceType::Turn3,
        ServiceType::Turn4,
        ServiceType::DeepCleanBlue,
        ServiceType::DeepCleanShine,
        ServiceType::DeepCombo,
        ServiceType::MoveInOut,
        ServiceType::OneTime,
        ServiceType::Recurring,
    ];
}

/// Visit cadence for recurring work; weekly is the pricing baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Weekly, Frequency::BiWeekly, Frequency::Monthly];
}

/// Household pet situation as captured on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PetSituation {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "dog_1_2")]
    Dog12,
    #[serde(rename = "dog_3_plus")]
    Dog3Plus,
    #[serde(rename = "cat_1_2")]
    Cat12,
    #[serde(rename = "cat_3_plus")]
    Cat3Plus,
    #[serde(rename = "dog_cat")]
    DogCat,
    #[serde(rename = "dog_cat_3_plus")]
    DogCat3Plus,
}

impl PetSituation {
    pub const ALL: [PetSituation; 7] = [
        PetSituation::None,
        PetSituation::Dog12,
        PetSituation::Dog3Plus,
        PetSituation::Cat12,
        PetSituation::Cat3Plus,
        PetSituation::DogCat,
        PetSituation::DogCat3Plus,
    ];
}

/// One service request as submitted by a sales rep; constructed fresh per calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequestInput {
    pub square_footage: u32,
    pub property_type: PropertyType,
    pub service_type: ServiceType,
    pub frequency: Frequency,
    pub pet_situation: PetSituation,
    #[serde(default)]
    pub is_realtor_referral: bool,
    #[serde(default)]
    pub quoted_price_override: Option<f64>,
}

/// Factors contributing to the accumulated price, for transparent audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteFactor {
    BaseTier,
    ServiceType,
    PropertyType,
    Frequency,
    Pets,
}

/// Discrete time/dollar contribution to a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComponent {
    pub factor: QuoteFactor,
    pub hours: f64,
    pub dollars: f64,
    pub notes: String,
}

/// Cost-of-goods-sold breakdown for a single service visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CogsBreakdown {
    pub contractor_cost: f64,
    pub supplies_cost: f64,
    pub transportation_cost: f64,
    pub referral_commission: f64,
    pub total: f64,
    pub gross_margin: f64,
    pub gross_margin_percent: f64,
}

impl CogsBreakdown {
    pub(crate) fn zeroed() -> Self {
        Self {
            contractor_cost: 0.0,
            supplies_cost: 0.0,
            transportation_cost: 0.0,
            referral_commission: 0.0,
            total: 0.0,
            gross_margin: 0.0,
            gross_margin_percent: 0.0,
        }
    }
}

/// Full output of the pricing pipeline. Nothing here is persisted by the
/// engine itself; estimate records are the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub base_price: f64,
    pub quoted_price: f64,
    pub final_price: f64,
    pub billable_hours: f64,
    pub cogs: CogsBreakdown,
    pub gross_margin: f64,
    pub gross_margin_percent: f64,
    pub commission_tier: String,
    pub commission_rate_percent: f64,
    pub commission_amount: f64,
    pub is_below_baseline: bool,
    pub discount_from_baseline: f64,
    pub requires_approval: bool,
    pub exceeds_budget: bool,
    pub discount_not_allowed: bool,
    pub components: Vec<PriceComponent>,
}

/// Round a dollar amount to whole cents. The tier tables come out of a
/// spreadsheet, so result fields are normalized the same way.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
