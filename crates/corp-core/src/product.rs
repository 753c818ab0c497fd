//! Manufactured products: development, finishing, and per-city stock.

use crate::city::City;
use crate::constants;
use crate::industry::IndustryType;
use crate::material::MaterialName;
use crate::office::JobFactors;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product's state in one city.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCityData {
    /// Units in storage.
    pub stored: f64,
    /// Production rate over the last cycle, units/second.
    pub production_rate: f64,
    /// Units/second sold during the last SALE phase.
    pub actual_sell_rate: f64,
    /// Desired sell amount formula (`MAX`, `PROD`, `INV`).
    pub desired_sell_amount: Option<String>,
    /// Desired sell price formula (`MP`).
    pub desired_sell_price: Option<String>,
    /// Quality-blended effective rating of the local stock.
    pub effective_rating: f64,
    /// Material cost of producing one unit here, labor-inflated; doubles as
    /// the product's market price.
    pub production_cost: f64,
    /// Manual cap on production, units per second.
    pub production_limit: Option<f64>,
}

/// A multi-city manufactured good. Starts in development; finishing is a
/// one-time transition that closes the design attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, unique within its division.
    pub name: String,
    /// Market demand; drifts down over time.
    pub demand: f64,
    /// Market competition; drifts up over time, capped at 99.99.
    pub competition: f64,
    /// Declared markup. Divides into effective rating to set the markup
    /// limit; zero is invalid and repaired with a diagnostic at sale time.
    pub markup: f64,
    /// Overall design rating, closed at finish.
    pub rating: f64,
    /// Design quality, closed at finish.
    pub quality: f64,
    /// Development progress in [0, 100]; monotonic until finished.
    pub development_progress: f64,
    /// Whether development completed. Never reverts.
    pub finished: bool,
    /// City the product is developed in.
    pub creation_city: City,
    /// Funds invested in design at creation.
    pub design_investment: f64,
    /// Funds invested in marketing at creation.
    pub advertising_investment: f64,
    /// Employee output accumulated over the development period, by role.
    pub creation_job_factors: JobFactors,
    /// Materials consumed per unit produced.
    pub required_materials: BTreeMap<MaterialName, f64>,
    /// Storage units one unit occupies.
    pub size: f64,
    /// Market-TA1 auto-pricing.
    pub market_ta1: bool,
    /// Market-TA2 auto-pricing.
    pub market_ta2: bool,
    /// Per-city stock and sale state.
    pub city_data: BTreeMap<City, ProductCityData>,
}

impl Product {
    /// Begin developing a product in `creation_city`.
    pub fn new(
        name: impl Into<String>,
        creation_city: City,
        design_investment: f64,
        advertising_investment: f64,
    ) -> Self {
        Product {
            name: name.into(),
            demand: 0.0,
            competition: 0.0,
            markup: 0.0,
            rating: 0.0,
            quality: 0.0,
            development_progress: 0.0,
            finished: false,
            creation_city,
            design_investment,
            advertising_investment,
            creation_job_factors: JobFactors::default(),
            required_materials: BTreeMap::new(),
            size: 0.05,
            market_ta1: false,
            market_ta2: false,
            city_data: BTreeMap::new(),
        }
    }

    /// Per-city state, creating a default entry on first use.
    pub fn city_data_mut(&mut self, city: City) -> &mut ProductCityData {
        self.city_data.entry(city).or_default()
    }

    /// Advance development by one batch of cycles using the creating
    /// office's per-role output. No-op once finished.
    pub fn advance_development(&mut self, market_cycles: f64, office_output: &JobFactors) {
        if self.finished {
            return;
        }
        let total = office_output.total();
        if total <= 0.0 {
            return;
        }
        let management_factor = 1.0 + office_output.management / (1.2 * total);
        let progress = constants::PRODUCT_DEVELOPMENT_RATE
            * (office_output.engineer.powf(0.34) + office_output.operations.powf(0.2))
            * management_factor;
        self.development_progress += progress * market_cycles;

        self.creation_job_factors.operations += office_output.operations * market_cycles;
        self.creation_job_factors.engineer += office_output.engineer * market_cycles;
        self.creation_job_factors.business += office_output.business * market_cycles;
        self.creation_job_factors.management += office_output.management * market_cycles;
        self.creation_job_factors.research += office_output.research * market_cycles;
    }

    /// One-time finish transition: close quality, rating, markup, and the
    /// launch market position. Idempotent by construction — callers gate on
    /// `development_progress >= 100`, and a finished product ignores
    /// further calls.
    pub fn finish<R: Rng>(&mut self, research_points: f64, industry: IndustryType, rng: &mut R) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.development_progress = 100.0;

        let data = industry.data();
        let factors = self.creation_job_factors;
        let total = factors.total().max(1.0);
        let engineer_ratio = factors.engineer / total;
        let business_ratio = factors.business / total;
        let management_ratio = factors.management / total;
        let operations_ratio = factors.operations / total;
        let research_ratio = factors.research / total;

        let design_mult = 1.0 + self.design_investment.max(0.0).powf(0.1) / 100.0;
        let balance_mult = 1.2 * engineer_ratio
            + 0.9 * management_ratio
            + 1.3 * research_ratio
            + 1.5 * operations_ratio
            + business_ratio;
        let science_mult = 1.0 + research_points.max(0.0).powf(data.science_factor) / 800.0;
        let total_mult = balance_mult * design_mult * science_mult;

        self.quality = (total_mult * (0.1 * factors.engineer + 0.05 * factors.research).powf(0.65))
            .max(constants::MIN_MATERIAL_QUALITY);
        self.rating =
            (self.quality * (1.0 + 0.2 * business_ratio + 0.3 * management_ratio)).max(0.1);

        let advert_mult = 1.0 + self.advertising_investment.max(0.0).powf(0.1) / 100.0;
        self.markup = 100.0 / (advert_mult * (self.quality + 0.001).powf(0.65));

        self.demand =
            (20.0 + rng.gen_range(0.0..40.0) + self.advertising_investment / 1e9).min(100.0);
        self.competition = rng.gen_range(0.0..70.0);

        // The recipe is fixed at finish: one unit consumes the industry's
        // required materials.
        for &(material, qty) in data.required_materials {
            self.required_materials.insert(material, qty);
        }
    }

    /// Markup limit for one city's stock: the premium the effective rating
    /// sustains, shrunk by the declared markup.
    pub fn markup_limit(&self, city: City) -> f64 {
        let rating = self
            .city_data
            .get(&city)
            .map(|d| d.effective_rating)
            .unwrap_or(0.0);
        rating.max(0.001) / self.markup
    }

    /// Market drift for a finished product: demand decays, competition
    /// grows, faster in volatile industries.
    pub fn process_market<R: Rng>(
        &mut self,
        market_cycles: f64,
        industry: IndustryType,
        rng: &mut R,
    ) {
        if !self.finished {
            return;
        }
        let mut change = rng.gen_range(0..4u8) as f64 * constants::PRODUCT_MARKET_DRIFT_STEP;
        if change == 0.0 {
            return;
        }
        if industry.volatile_product_market() {
            change *= 3.0;
        }
        change *= market_cycles;
        self.demand = (self.demand - change).max(constants::MIN_PRODUCT_DEMAND);
        self.competition = (self.competition + change).min(constants::MAX_COMPETITION);
    }
}
