//! One industry line of business: the per-phase pipeline over its
//! warehouses, offices, and products.

use crate::context::{CorpMultipliers, CycleContext};
use crate::sale::{self, SaleEnv, Sellable};
use crate::state::CorpState;
use corp_core::research::{combined_effects, ResearchEffects};
use corp_core::{
    constants, City, IndustryType, JobFactors, MaterialName, OfficeSpace, Product, Research,
    Warehouse,
};
use corp_econ as econ;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::error;

fn default_production_mult() -> f64 {
    1.0
}

/// A corporation's division: one industry, one set of per-city warehouses
/// and offices, and the products it develops.
///
/// A division never advances the corporation's phase; it executes the logic
/// bound to the phase it is handed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Division {
    /// Unique division name.
    pub name: String,
    /// The industry this division is locked into.
    pub industry: IndustryType,
    /// Accumulated research points.
    pub research_points: f64,
    /// Completed research.
    pub researched: BTreeSet<Research>,
    /// Market awareness from advertising.
    pub awareness: f64,
    /// Market popularity; decays every cycle.
    pub popularity: f64,
    /// Advertising campaigns bought so far; drives the next campaign's cost.
    pub num_adverts: u32,
    /// Revenue of the last closed cycle, per second.
    pub last_cycle_revenue: f64,
    /// Expenses of the last closed cycle, per second.
    pub last_cycle_expenses: f64,
    /// Revenue accumulating in the current cycle, absolute.
    pub this_cycle_revenue: f64,
    /// Expenses accumulating in the current cycle, absolute.
    pub this_cycle_expenses: f64,
    /// Production multiplier from boost-material stock. Derived; recomputed
    /// every production phase and on load.
    #[serde(skip, default = "default_production_mult")]
    pub production_mult: f64,
    /// Warehouses by city.
    pub warehouses: BTreeMap<City, Warehouse>,
    /// Offices by city.
    pub offices: BTreeMap<City, OfficeSpace>,
    /// Products by name.
    pub products: BTreeMap<String, Product>,
}

/// Production a staffed office supports: concave in Operations and
/// Engineer output, with Management as a multiplicative modifier.
fn office_productivity(output: &JobFactors, for_product: bool) -> f64 {
    let total = output.operations + output.engineer + output.management;
    if total <= 0.0 {
        return 0.0;
    }
    let management_factor = 1.0 + output.management / (1.2 * total);
    let prod = (output.operations.powf(0.4) + output.engineer.powf(0.3)) * management_factor;
    let prod = constants::OFFICE_BALANCING_MULT * prod;
    if for_product {
        // Products are harder to create.
        0.5 * prod
    } else {
        prod
    }
}

impl Division {
    /// New division with the default starting office and warehouse in
    /// Sector-12.
    pub fn new(name: impl Into<String>, industry: IndustryType) -> Self {
        let mut division = Division {
            name: name.into(),
            industry,
            research_points: 0.0,
            researched: BTreeSet::new(),
            awareness: 0.0,
            popularity: 0.0,
            num_adverts: 0,
            last_cycle_revenue: 0.0,
            last_cycle_expenses: 0.0,
            this_cycle_revenue: 0.0,
            this_cycle_expenses: 0.0,
            production_mult: 1.0,
            warehouses: BTreeMap::new(),
            offices: BTreeMap::new(),
            products: BTreeMap::new(),
        };
        division.expand(City::Sector12);
        division
    }

    /// Open a warehouse and office in `city`. Idempotent; funds are the
    /// caller's concern.
    pub(crate) fn expand(&mut self, city: City) {
        self.warehouses
            .entry(city)
            .or_insert_with(|| Warehouse::new(city, constants::WAREHOUSE_INITIAL_SIZE));
        self.offices
            .entry(city)
            .or_insert_with(|| OfficeSpace::new(city, constants::OFFICE_INITIAL_SIZE));
    }

    /// Whether this division completed `research`.
    pub fn has_research(&self, research: Research) -> bool {
        self.researched.contains(&research)
    }

    /// Combined research multipliers.
    pub fn research_effects(&self) -> ResearchEffects {
        combined_effects(&self.researched)
    }

    /// Products this division can carry, counting capacity research.
    pub fn max_products(&self) -> u32 {
        if !self.industry.data().makes_products {
            return 0;
        }
        let mut extra = 0;
        if self.has_research(Research::UpgradeCapacityI) {
            extra += 1;
        }
        if self.has_research(Research::UpgradeCapacityII) {
            extra += 1;
        }
        constants::MAX_PRODUCTS_BASE + extra
    }

    /// Cost of the next advertising campaign.
    pub fn advert_cost(&self) -> f64 {
        constants::ADVERT_BASE_COST * 1.06f64.powi(self.num_adverts as i32)
    }

    /// Run one advertising campaign: awareness and popularity jump by the
    /// combined advertising multipliers.
    pub(crate) fn apply_advert<R: Rng>(&mut self, corp_advertising_mult: f64, rng: &mut R) {
        let mult = corp_advertising_mult * self.research_effects().advertising;
        self.awareness = ((self.awareness + 3.0 * mult) * (1.005 * mult)).min(f64::MAX);
        let jitter = 1.0 + f64::from(rng.gen_range(1..=3u8)) / 200.0;
        self.popularity = ((self.popularity + mult) * (jitter * mult)).min(f64::MAX);
        self.num_adverts += 1;
    }

    /// Recompute the production multiplier from boost-material stock across
    /// every warehouse.
    pub fn calculate_production_factors(&mut self) {
        let data = self.industry.data();
        let mut mult_sum = 0.0;
        for wh in self.warehouses.values() {
            let city_mult = (0.002 * wh.material(MaterialName::RealEstate).stored + 1.0)
                .powf(data.real_estate_factor)
                * (0.002 * wh.material(MaterialName::Hardware).stored + 1.0)
                    .powf(data.hardware_factor)
                * (0.002 * wh.material(MaterialName::Robots).stored + 1.0).powf(data.robot_factor)
                * (0.002 * wh.material(MaterialName::AiCores).stored + 1.0)
                    .powf(data.ai_core_factor);
            mult_sum += city_mult.powf(0.73);
        }
        self.production_mult = if mult_sum < 1.0 { 1.0 } else { mult_sum };
    }

    /// Storage units of product stock held in `city`, counted into the
    /// warehouse's fill level on top of materials.
    fn product_stock_size(&self, city: City) -> f64 {
        self.products
            .values()
            .map(|p| p.city_data.get(&city).map_or(0.0, |d| d.stored) * p.size)
            .sum()
    }

    /// Recompute a warehouse's fill level from materials plus product stock.
    pub fn update_warehouse_size_used(&mut self, city: City) {
        let product_part = self.product_stock_size(city);
        if let Some(wh) = self.warehouses.get_mut(&city) {
            wh.update_material_size_used();
            wh.size_used += product_part;
        }
    }

    /// Execute the logic bound to `state` for this division. EXPORT is
    /// resolved by the corporation, which alone can see both sides of a
    /// transfer.
    pub fn process(&mut self, state: CorpState, ctx: &mut CycleContext, corp: &CorpMultipliers) {
        match state {
            CorpState::Start => self.process_start(ctx, corp),
            CorpState::Purchase => self.process_purchase(ctx),
            CorpState::Production => self.process_production(ctx, corp),
            CorpState::Sale => self.process_sale_phase(ctx, corp),
            CorpState::Export => {}
        }
    }

    /// START: close out accumulators, pay salaries, drift markets, decay
    /// popularity, apply DreamSense. No resource flow happens here.
    fn process_start(&mut self, ctx: &mut CycleContext, corp: &CorpMultipliers) {
        let cycles = ctx.cycles();
        let cycle_seconds = ctx.cycle_seconds();

        if !self.this_cycle_revenue.is_finite() || !self.this_cycle_expenses.is_finite() {
            ctx.raise(format!(
                "non-finite revenue/expenses computed for division {:?}; resetting to zero",
                self.name
            ));
            self.this_cycle_revenue = 0.0;
            self.this_cycle_expenses = 0.0;
        }
        self.last_cycle_revenue = self.this_cycle_revenue / cycle_seconds;
        self.last_cycle_expenses = self.this_cycle_expenses / cycle_seconds;
        self.this_cycle_revenue = 0.0;
        self.this_cycle_expenses = 0.0;

        let employee_mults = self.research_effects().employee;
        let mut salaries = 0.0;
        for office in self.offices.values_mut() {
            salaries += office.process(cycles, &employee_mults);
        }
        self.this_cycle_expenses += salaries;

        self.process_material_market(ctx);
        self.process_product_market(ctx);

        self.popularity =
            (self.popularity - cycles * constants::POPULARITY_DECAY_PER_CYCLE).max(0.0);

        let popularity_gain = corp.dream_sense_gain;
        if popularity_gain > 0.0 {
            let awareness_gain = popularity_gain * 4.0;
            self.awareness = (self.awareness + awareness_gain * cycles).min(f64::MAX);
            self.popularity = (self.popularity + popularity_gain * cycles).min(f64::MAX);
        }
    }

    /// Drift demand/competition/price for every material this industry
    /// deals with. Boost materials drift on top, even when the recipe
    /// already covered them.
    fn process_material_market(&mut self, ctx: &mut CycleContext) {
        let data = self.industry.data();
        for wh in self.warehouses.values_mut() {
            for (name, _) in data.required_materials {
                wh.material_mut(*name).process_market(&mut ctx.rng);
            }
            for name in data.produced_materials {
                wh.material_mut(*name).process_market(&mut ctx.rng);
            }
            for name in MaterialName::PRODUCTION_BOOSTERS {
                wh.material_mut(name).process_market(&mut ctx.rng);
            }
        }
    }

    /// Drift product demand down and competition up.
    fn process_product_market(&mut self, ctx: &mut CycleContext) {
        let cycles = ctx.cycles();
        let industry = self.industry;
        for product in self.products.values_mut() {
            product.process_market(cycles, industry, &mut ctx.rng);
        }
    }

    /// PURCHASE: buy required materials at fixed rates, or via smart supply
    /// sized from the previous cycle's production, bounded by free space.
    fn process_purchase(&mut self, ctx: &mut CycleContext) {
        let cycle_seconds = ctx.cycle_seconds();
        let required = self.industry.data().required_materials;
        let cities: Vec<City> = self.warehouses.keys().copied().collect();
        let mut expenses = 0.0;

        for city in cities {
            let product_part = self.product_stock_size(city);
            let Some(wh) = self.warehouses.get_mut(&city) else {
                continue;
            };

            // Fixed-rate buys for every material; smart-supply candidates
            // for recipe inputs.
            let mut smart: Vec<(MaterialName, f64, f64)> = Vec::new();
            for name in MaterialName::ALL {
                let per_unit = required
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, qty)| *qty);
                match per_unit {
                    Some(qty) if wh.smart_supply_enabled => {
                        let mut buy = qty * wh.smart_supply_store * cycle_seconds;
                        let max_amt = (wh.free_space() / name.info().size).floor();
                        buy = buy.min(max_amt);
                        if buy > 0.0 {
                            smart.push((name, buy, qty));
                        }
                    }
                    _ => {
                        let free = wh.free_space();
                        let mat = wh.material_mut(name);
                        let max_amt = (free / name.info().size).floor();
                        let buy = (mat.buy_rate * cycle_seconds).min(max_amt);
                        if buy > 0.0 {
                            let price = mat.market_price;
                            mat.absorb(buy, 1.0, price);
                            expenses += buy * price;
                        }
                        wh.update_material_size_used();
                        wh.size_used += product_part;
                    }
                }
            }

            if !smart.is_empty() {
                // The scarcest input bounds how much product the batch can
                // support; align every input to that ratio.
                let mut worst = f64::INFINITY;
                for (_, buy, qty) in &smart {
                    worst = worst.min(buy / qty);
                }
                for (_, buy, qty) in &mut smart {
                    *buy = worst * *qty;
                }

                // Shrink the whole batch to the available space.
                let total_size: f64 = smart.iter().map(|(n, buy, _)| buy * n.info().size).sum();
                let free = wh.free_space();
                if total_size > free && total_size > 0.0 {
                    let shrink = free / total_size;
                    for (_, buy, _) in &mut smart {
                        *buy = (*buy * shrink).floor();
                    }
                }

                // Credit stock already on hand or already inbound.
                for (name, buy, _) in &mut smart {
                    match wh.smart_supply_option(*name) {
                        corp_core::SmartSupplyOption::Ignore => {}
                        corp_core::SmartSupplyOption::Leftovers => {
                            *buy = (*buy - wh.material(*name).stored).max(0.0);
                        }
                        corp_core::SmartSupplyOption::Imports => {
                            *buy = (*buy - wh.material(*name).import_rate * cycle_seconds).max(0.0);
                        }
                    }
                }

                for (name, buy, _) in &smart {
                    let mat = wh.material_mut(*name);
                    let price = mat.market_price;
                    mat.absorb(*buy, 1.0, price);
                    mat.buy_rate = *buy / cycle_seconds;
                    expenses += *buy * price;
                }
                wh.update_material_size_used();
                wh.size_used += product_part;
            }
        }
        self.this_cycle_expenses += expenses;
    }

    /// PRODUCTION: accrue research, convert recipe inputs into produced
    /// materials, advance development, and produce finished products.
    fn process_production(&mut self, ctx: &mut CycleContext, corp: &CorpMultipliers) {
        self.calculate_production_factors();
        let effects = self.research_effects();
        let cycles = ctx.cycles();
        let cycle_seconds = ctx.cycle_seconds();
        let data = self.industry.data();

        let sci_mult = corp.scientific_research * effects.scientific_research;
        let mut gained = 0.0;
        for office in self.offices.values() {
            gained += constants::RESEARCH_POINT_RATE
                * office.production_by_job.research.max(0.0).sqrt()
                * sci_mult;
        }
        self.research_points += gained * cycles;

        let cities: Vec<City> = self.warehouses.keys().copied().collect();
        for &city in &cities {
            let Some(office) = self.offices.get(&city) else {
                debug_assert!(false, "warehouse without an office in {city}");
                error!(division = %self.name, %city, "warehouse without an office; skipping production");
                continue;
            };
            let output = office.production_by_job;
            let productivity = office_productivity(&output, false);
            let production_mult = self.production_mult;
            let product_part = self.product_stock_size(city);
            let Some(wh) = self.warehouses.get_mut(&city) else {
                continue;
            };

            wh.smart_supply_store = 0.0;

            if let Some(&lead_material) = data.produced_materials.first() {
                let max_prod =
                    productivity * production_mult * corp.production * effects.production;
                let mut prod = match wh.material(lead_material).production_limit {
                    Some(limit) => max_prod.min(limit),
                    None => max_prod,
                };
                prod *= cycle_seconds;

                // Net storage footprint of one production unit.
                let mut net_size: f64 = data
                    .produced_materials
                    .iter()
                    .map(|m| m.info().size)
                    .sum();
                for (req, qty) in data.required_materials {
                    net_size -= req.info().size * qty;
                }
                if net_size > 0.0 {
                    prod = prod.min((wh.free_space() / net_size).floor());
                }
                if prod < 0.0 {
                    prod = 0.0;
                }

                wh.smart_supply_store += prod / cycle_seconds;

                let mut producible_frac: f64 = 1.0;
                for (req, qty) in data.required_materials {
                    let need = qty * prod;
                    let have = wh.material(*req).stored;
                    if have < need {
                        producible_frac = producible_frac.min(have / need);
                    }
                }
                if producible_frac <= 0.0 {
                    producible_frac = 0.0;
                    prod = 0.0;
                }

                if producible_frac > 0.0 && prod > 0.0 {
                    let divider = data.required_materials.len() as f64;
                    let mut avg_quality = 0.0;
                    for (req, qty) in data.required_materials {
                        let consumed = qty * prod * producible_frac;
                        let mat = wh.material_mut(*req);
                        // producible_frac already guarantees the stock is
                        // there; the clamp only absorbs float overshoot.
                        mat.consume(consumed);
                        mat.production_rate = -consumed / cycle_seconds;
                        avg_quality += mat.quality / divider;
                    }
                    let avg_quality = avg_quality.max(1.0);

                    let mut fresh_quality = output.engineer / 90.0
                        + self.research_points.max(0.0).powf(data.science_factor)
                        + wh.material(MaterialName::AiCores).stored.max(0.0)
                            .powf(data.ai_core_factor)
                            / 10e3;
                    let quality_cap = fresh_quality.powf(0.5).max(1.0);
                    fresh_quality = fresh_quality.min(avg_quality * quality_cap);

                    let made = prod * producible_frac;
                    for name in data.produced_materials {
                        let mat = wh.material_mut(*name);
                        mat.quality = ((mat.quality * mat.stored + fresh_quality * made)
                            / (mat.stored + made))
                            .max(1.0);
                        mat.average_price = (mat.average_price * mat.stored
                            + mat.market_price * made)
                            / (mat.stored + made);
                        mat.stored += made;
                    }
                } else {
                    for (req, _) in data.required_materials {
                        wh.material_mut(*req).production_rate = 0.0;
                    }
                }

                let rate = prod * producible_frac / cycle_seconds;
                for name in data.produced_materials {
                    wh.material_mut(*name).production_rate = rate;
                }
            } else {
                // Product-only industries still consume materials, so the
                // recipe inputs' production rates reset here.
                for (req, _) in data.required_materials {
                    wh.material_mut(*req).production_rate = 0.0;
                }
            }

            wh.update_material_size_used();
            wh.size_used += product_part;
        }

        self.develop_products(ctx, cycles);
        self.produce_products(ctx, corp, &effects, &cities);
    }

    /// Advance the first product still in development; finish it when its
    /// progress crosses 100.
    fn develop_products(&mut self, ctx: &mut CycleContext, cycles: f64) {
        let mut finish_name: Option<String> = None;
        for (name, product) in self.products.iter_mut() {
            if product.finished {
                continue;
            }
            match self.offices.get(&product.creation_city) {
                None => {
                    debug_assert!(false, "product {name} developed in a city without an office");
                    error!(
                        division = %self.name,
                        product = %name,
                        city = %product.creation_city,
                        "product developed in a city without an office; skipping"
                    );
                    continue;
                }
                Some(office) => {
                    product.advance_development(cycles, &office.production_by_job);
                    if product.development_progress >= 100.0 {
                        finish_name = Some(name.clone());
                    }
                    // Only one product develops at a time.
                    break;
                }
            }
        }
        if let Some(name) = finish_name {
            let research_points = self.research_points;
            let industry = self.industry;
            if let Some(product) = self.products.get_mut(&name) {
                product.finish(research_points, industry, &mut ctx.rng);
            }
        }
    }

    /// Produce every finished product, city by city.
    fn produce_products(
        &mut self,
        ctx: &mut CycleContext,
        corp: &CorpMultipliers,
        effects: &ResearchEffects,
        cities: &[City],
    ) {
        let cycle_seconds = ctx.cycle_seconds();
        let product_names: Vec<String> = self
            .products
            .iter()
            .filter(|(_, p)| p.finished)
            .map(|(n, _)| n.clone())
            .collect();

        for name in product_names {
            for &city in cities {
                let Some(office) = self.offices.get(&city) else {
                    continue;
                };
                let productivity = office_productivity(&office.production_by_job, true);
                let production_mult = self.production_mult;
                let (Some(wh), Some(product)) = (
                    self.warehouses.get_mut(&city),
                    self.products.get_mut(&name),
                ) else {
                    continue;
                };

                let max_prod = productivity
                    * production_mult
                    * corp.production
                    * effects.production
                    * effects.product_production;
                let limit = product.city_data.get(&city).and_then(|d| d.production_limit);
                let mut prod = match limit {
                    Some(l) => max_prod.min(l),
                    None => max_prod,
                };
                prod *= cycle_seconds;

                let mut net_size = product.size;
                for (req, qty) in &product.required_materials {
                    net_size -= req.info().size * qty;
                }
                if net_size > 0.0 {
                    prod = prod.min((wh.free_space() / net_size).floor());
                }
                if prod < 0.0 {
                    prod = 0.0;
                }

                wh.smart_supply_store += prod / cycle_seconds;

                let mut producible_frac: f64 = 1.0;
                for (req, qty) in &product.required_materials {
                    let need = qty * prod;
                    let have = wh.material(*req).stored;
                    if have < need {
                        producible_frac = producible_frac.min(have / need);
                    }
                }

                if producible_frac > 0.0 && prod > 0.0 {
                    let mut avg_quality = 1.0;
                    for (req, qty) in &product.required_materials {
                        let consumed = qty * prod * producible_frac;
                        let mat = wh.material_mut(*req);
                        mat.consume(consumed);
                        mat.production_rate -= consumed / cycle_seconds;
                        avg_quality += mat.quality;
                    }
                    avg_quality /= product.required_materials.len().max(1) as f64;

                    let made = prod * producible_frac;
                    let effective = product
                        .rating
                        .min(avg_quality * product.rating.max(0.0).powf(0.5));
                    let city_data = product.city_data_mut(city);
                    city_data.effective_rating = (city_data.effective_rating * city_data.stored
                        + effective * made)
                        / (city_data.stored + made);
                    city_data.stored += made;
                }

                let rate = prod * producible_frac.max(0.0) / cycle_seconds;
                product.city_data_mut(city).production_rate = rate;

                self.update_warehouse_size_used(city);
            }
        }
    }

    /// SALE: resolve pricing and transfer stock to revenue for every
    /// material and finished product.
    fn process_sale_phase(&mut self, ctx: &mut CycleContext, corp: &CorpMultipliers) {
        let effects = self.research_effects();
        let advertising = econ::advertising_factors(
            self.awareness,
            self.popularity,
            self.industry.data().advertising_factor,
        )
        .total;
        let sales_mult = corp.sales * effects.sales;
        let cities: Vec<City> = self.warehouses.keys().copied().collect();
        let division_name = self.name.clone();
        let mut revenue_total = 0.0;

        for &city in &cities {
            let Some(office) = self.offices.get(&city) else {
                continue;
            };
            let business_factor =
                econ::effect_with_factors(1.0 + office.production_by_job.business, 0.26, 10e3);
            let env = SaleEnv {
                division: &division_name,
                city,
                business_factor,
                advertising_factor: advertising,
                sales_mult,
            };

            if let Some(wh) = self.warehouses.get_mut(&city) {
                for name in MaterialName::ALL {
                    let mat = wh.material_mut(name);
                    revenue_total += sale::process_sale(Sellable::Material(mat), &env, ctx);
                }
            }

            let product_names: Vec<String> = self
                .products
                .iter()
                .filter(|(_, p)| p.finished)
                .map(|(n, _)| n.clone())
                .collect();
            for pname in product_names {
                // A product's market price is its labor-inflated material
                // cost at current market prices.
                let cost = {
                    let (Some(wh), Some(product)) =
                        (self.warehouses.get(&city), self.products.get(&pname))
                    else {
                        continue;
                    };
                    let raw: f64 = product
                        .required_materials
                        .iter()
                        .map(|(req, qty)| qty * wh.material(*req).market_price)
                        .sum();
                    raw * constants::BASE_PRODUCT_PROFIT_MULT
                };
                let Some(product) = self.products.get_mut(&pname) else {
                    continue;
                };
                product.city_data_mut(city).production_cost = cost;
                revenue_total +=
                    sale::process_sale(Sellable::Product { product, city }, &env, ctx);
            }

            self.update_warehouse_size_used(city);
        }
        self.this_cycle_revenue += revenue_total;
    }
}
