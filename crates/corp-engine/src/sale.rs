//! Shared sale resolution for materials and finished products.
//!
//! Both kinds flow through one routine behind a tagged [`Sellable`] view:
//! the variant carries the per-kind fields (a material's warehouse state, a
//! product's per-city state) and the routine dispatches explicitly instead
//! of probing types at runtime.

use crate::context::CycleContext;
use corp_core::{City, Material, Product};
use corp_econ as econ;
use corp_expr::Symbols;
use tracing::error;

/// Division-level sale parameters shared by every item sold in one city.
pub(crate) struct SaleEnv<'a> {
    /// Division name, for diagnostics.
    pub division: &'a str,
    /// City being processed.
    pub city: City,
    /// Business-staff multiplier.
    pub business_factor: f64,
    /// Awareness/popularity multiplier.
    pub advertising_factor: f64,
    /// Corporation sales multiplier × research sales multiplier.
    pub sales_mult: f64,
}

/// Tagged view over the two sellable kinds.
pub(crate) enum Sellable<'a> {
    /// A material in a warehouse.
    Material(&'a mut Material),
    /// A finished product's stock in one city. `production_cost` must be
    /// computed by the caller beforehand; it doubles as the market price.
    Product {
        product: &'a mut Product,
        city: City,
    },
}

/// Scalar snapshot of the item, extracted once so the sale math does not
/// hold borrows into the entity tree.
struct ItemView {
    name: String,
    stored: f64,
    production_rate: f64,
    desired_amount: Option<String>,
    desired_price: Option<String>,
    market_ta1: bool,
    market_ta2: bool,
    market_price: f64,
    markup_limit: f64,
    quality_factor: f64,
    demand: f64,
    competition: f64,
}

fn view(item: &mut Sellable<'_>, ctx: &mut CycleContext, env: &SaleEnv<'_>) -> ItemView {
    match item {
        Sellable::Material(mat) => ItemView {
            name: mat.name.to_string(),
            stored: mat.stored,
            production_rate: mat.production_rate,
            desired_amount: mat.desired_sell_amount.clone(),
            desired_price: mat.desired_sell_price.clone(),
            market_ta1: mat.market_ta1,
            market_ta2: mat.market_ta2,
            market_price: mat.market_price,
            markup_limit: mat.markup_limit(),
            quality_factor: mat.quality + 0.001,
            demand: mat.demand,
            competition: mat.competition,
        },
        Sellable::Product { product, city } => {
            if product.markup == 0.0 {
                ctx.raise(format!(
                    "markup of product {:?} in {} is 0; resetting to 1",
                    product.name, env.division
                ));
                product.markup = 1.0;
            }
            let markup_limit = product.markup_limit(*city);
            let name = product.name.clone();
            let market_ta1 = product.market_ta1;
            let market_ta2 = product.market_ta2;
            let demand = product.demand;
            let competition = product.competition;
            let data = product.city_data_mut(*city);
            ItemView {
                name,
                stored: data.stored,
                production_rate: data.production_rate,
                desired_amount: data.desired_sell_amount.clone(),
                desired_price: data.desired_sell_price.clone(),
                market_ta1,
                market_ta2,
                market_price: data.production_cost,
                markup_limit,
                quality_factor: 0.5 * data.effective_rating.max(0.0).powf(0.65),
                demand,
                competition,
            }
        }
    }
}

fn record(item: &mut Sellable<'_>, sold: f64, rate: f64) {
    match item {
        Sellable::Material(mat) => {
            mat.stored = (mat.stored - sold).max(0.0);
            mat.actual_sell_rate = rate;
        }
        Sellable::Product { product, city } => {
            let data = product.city_data_mut(*city);
            data.stored = (data.stored - sold).max(0.0);
            data.actual_sell_rate = rate;
        }
    }
}

/// Resolve one item's sale for the current batch and return the revenue.
///
/// Evaluation failures and degenerate pricing raise diagnostics and sell
/// nothing; they never abort the cycle.
pub(crate) fn process_sale(
    mut item: Sellable<'_>,
    env: &SaleEnv<'_>,
    ctx: &mut CycleContext,
) -> f64 {
    let cycle_seconds = ctx.cycle_seconds();
    let view = view(&mut item, ctx, env);

    let Some(amount_formula) = view.desired_amount.as_deref() else {
        record(&mut item, 0.0, 0.0);
        return 0.0;
    };

    // The amount gets re-multiplied by the batch length later, so MAX is
    // the per-second rate the current inventory supports.
    let adjusted_qty = view.stored / cycle_seconds;
    let symbols = Symbols::sell_amount(adjusted_qty, view.production_rate, view.stored);
    let desired_rate = match corp_expr::evaluate(amount_formula, &symbols) {
        Ok(v) if v.is_finite() => v.max(0.0),
        Ok(v) => {
            ctx.raise(format!(
                "sell amount for {} in {}'s {} office evaluated to {v}; selling nothing",
                view.name, env.division, env.city
            ));
            record(&mut item, 0.0, 0.0);
            return 0.0;
        }
        Err(e) => {
            ctx.raise(format!(
                "error evaluating sell amount for {} in {}'s {} office: {e}",
                view.name, env.division, env.city
            ));
            record(&mut item, 0.0, 0.0);
            return 0.0;
        }
    };

    let market_factor = econ::market_factor(view.demand, view.competition);
    let rate_factor = view.quality_factor
        * market_factor
        * env.business_factor
        * env.sales_mult
        * env.advertising_factor;

    let price = if view.market_ta2 {
        let out = econ::ta2_price(desired_rate, rate_factor, view.market_price, view.markup_limit);
        if out.fallback {
            ctx.raise(format!(
                "degenerate Market-TA2 inputs for {} in {}'s {} office; selling at the markup ceiling",
                view.name, env.division, env.city
            ));
        }
        out.price
    } else if view.market_ta1 {
        view.market_price + view.markup_limit
    } else {
        let Some(price_formula) = view.desired_price.as_deref() else {
            record(&mut item, 0.0, 0.0);
            return 0.0;
        };
        match corp_expr::evaluate(price_formula, &Symbols::sell_price(view.market_price)) {
            Ok(v) if v.is_finite() => v,
            Ok(v) => {
                ctx.raise(format!(
                    "sell price for {} in {}'s {} office evaluated to {v}; selling nothing",
                    view.name, env.division, env.city
                ));
                record(&mut item, 0.0, 0.0);
                return 0.0;
            }
            Err(e) => {
                ctx.raise(format!(
                    "error evaluating sell price for {} in {}'s {} office: {e}",
                    view.name, env.division, env.city
                ));
                record(&mut item, 0.0, 0.0);
                return 0.0;
            }
        }
    };

    let markup_mult = econ::markup_multiplier(price, view.market_price, view.markup_limit);
    let max_rate = rate_factor * markup_mult;

    let mut sold = desired_rate.min(max_rate) * cycle_seconds;
    sold = sold.min(view.stored);
    if sold < 0.0 {
        debug_assert!(false, "sale amount went negative for {}", view.name);
        error!(
            item = %view.name,
            division = env.division,
            city = %env.city,
            "sale amount computed negative; skipping"
        );
        record(&mut item, 0.0, 0.0);
        return 0.0;
    }
    if sold > 0.0 && price >= 0.0 {
        record(&mut item, sold, sold / cycle_seconds);
        sold * price
    } else {
        record(&mut item, 0.0, 0.0);
        0.0
    }
}
