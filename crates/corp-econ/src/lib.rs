#![deny(warnings)]

//! Economic math for the corporation engine.
//!
//! This crate provides the pure pricing helpers shared by material and
//! product sales:
//! - Markup multiplier (penalty above the markup ceiling, bonus below market)
//! - Closed-form Market-TA2 price inversion for a target sale quantity
//! - Concave "effect with factors" aggregation used for staffing multipliers
//! - Market and advertising sale factors
//!
//! Every function here is total over finite inputs: degenerate cases clamp
//! or fall back instead of failing, because one good's bad configuration
//! must never abort the cycle that is processing its siblings.

use tracing::warn;

/// Sentinel multiplier returned when the selling price is zero or negative.
/// Downstream the sale itself is rejected before any revenue is booked, so
/// the magnitude only matters in that it dwarfs every legitimate multiplier.
pub const DISCARD_MULTIPLIER: f64 = 1e12;

/// Multiplier applied to the maximum sale rate based on how the selling
/// price relates to the market price and the quality-derived markup limit.
///
/// - `price == market`: 1 (neutral).
/// - `market < price <= market + limit`: still 1; the premium is free up to
///   the ceiling the good's quality can sustain.
/// - `price > market + limit`: quadratic penalty `(limit / (price - market))²`.
/// - `0 < price < market`: bonus `market / price`.
/// - `price <= 0`: [`DISCARD_MULTIPLIER`].
/// - non-finite `price`: 1 (the caller surfaces the bad value separately).
pub fn markup_multiplier(selling_price: f64, market_price: f64, markup_limit: f64) -> f64 {
    if !selling_price.is_finite() {
        return 1.0;
    }
    if selling_price > market_price {
        if selling_price > market_price + markup_limit {
            let over = selling_price - market_price;
            (markup_limit / over).powi(2)
        } else {
            1.0
        }
    } else if selling_price <= 0.0 {
        DISCARD_MULTIPLIER
    } else {
        market_price / selling_price
    }
}

/// Outcome of the Market-TA2 closed-form inversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ta2Price {
    /// The computed sale price.
    pub price: f64,
    /// True when the inputs were degenerate and the price fell back to
    /// `market_price + markup_limit`. Callers raise a diagnostic for this.
    pub fallback: bool,
}

/// Solve for the price that yields `desired_rate` units per second.
///
/// The max-sale-rate formula is `rate = rate_factor / markup²` for prices
/// above market, where `markup = (price - market_price) / markup_limit`.
/// Inverting: `price = markup_limit / sqrt(desired_rate / rate_factor)
/// + market_price`.
///
/// `rate_factor` is the product of every non-markup factor (quality/rating,
/// market, business, advertising, corporation and research sale
/// multipliers). Degenerate inputs never fail: a zero desired rate prices
/// at market (there is nothing to sell), and a zero `rate_factor` with a
/// nonzero desired rate falls back to the markup ceiling.
pub fn ta2_price(
    desired_rate: f64,
    rate_factor: f64,
    market_price: f64,
    markup_limit: f64,
) -> Ta2Price {
    if desired_rate <= 0.0 {
        return Ta2Price {
            price: market_price,
            fallback: false,
        };
    }
    let denominator = (desired_rate / rate_factor).sqrt();
    if rate_factor == 0.0 || denominator == 0.0 || !denominator.is_finite() {
        warn!(
            desired_rate,
            rate_factor, "degenerate Market-TA2 inputs; selling at the markup ceiling"
        );
        return Ta2Price {
            price: market_price + markup_limit,
            fallback: true,
        };
    }
    Ta2Price {
        price: markup_limit / denominator + market_price,
        fallback: false,
    }
}

/// Concave diminishing-returns aggregation: `n^exp + n / linear` for
/// `n > 1`, else 1. `exp` is expected in `(0, 1)`; smaller exponents mean
/// stronger diminishing returns.
pub fn effect_with_factors(n: f64, exp_factor: f64, linear_factor: f64) -> f64 {
    if n <= 1.0 {
        return 1.0;
    }
    n.powf(exp_factor) + n / linear_factor
}

/// Sale multiplier from a good's demand and competition, floored at 0.1 so
/// a saturated market slows sales to a crawl without stopping them.
pub fn market_factor(demand: f64, competition: f64) -> f64 {
    (demand * (100.0 - competition) / 100.0).max(0.1)
}

/// Sale multipliers derived from a division's awareness and popularity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvertisingFactors {
    /// Combined factor applied to sales.
    pub total: f64,
    /// Awareness-only component.
    pub awareness: f64,
    /// Popularity-only component.
    pub popularity: f64,
    /// Popularity-to-awareness ratio component.
    pub ratio: f64,
}

/// Compute advertising factors. `advert_exponent` is the industry's
/// advertising factor, an exponent < 1 giving diminishing returns.
pub fn advertising_factors(
    awareness: f64,
    popularity: f64,
    advert_exponent: f64,
) -> AdvertisingFactors {
    let awareness_fac = (awareness + 1.0).powf(advert_exponent);
    let popularity_fac = (popularity + 1.0).powf(advert_exponent);
    let ratio = if awareness == 0.0 {
        0.01
    } else {
        ((popularity + 0.001) / awareness).max(0.01)
    };
    AdvertisingFactors {
        total: (awareness_fac * popularity_fac * ratio).powf(0.85),
        awareness: awareness_fac,
        popularity: popularity_fac,
        ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn markup_neutral_at_market_price() {
        assert_eq!(markup_multiplier(10.0, 10.0, 2.0), 1.0);
    }

    #[test]
    fn markup_bonus_below_market() {
        assert_eq!(markup_multiplier(5.0, 10.0, 2.0), 2.0);
        assert_eq!(markup_multiplier(2.5, 10.0, 2.0), 4.0);
    }

    #[test]
    fn markup_free_premium_up_to_limit() {
        assert_eq!(markup_multiplier(11.0, 10.0, 2.0), 1.0);
        // Exactly at the ceiling the penalty branch is not yet taken.
        assert_eq!(markup_multiplier(12.0, 10.0, 2.0), 1.0);
    }

    #[test]
    fn markup_quadratic_penalty_above_limit() {
        // price - market = 4, limit = 2 => (2/4)^2 = 0.25
        assert_eq!(markup_multiplier(14.0, 10.0, 2.0), 0.25);
        // price - market = 20 => (2/20)^2 = 0.01
        assert_eq!(markup_multiplier(30.0, 10.0, 2.0), 0.01);
    }

    #[test]
    fn markup_discards_non_positive_price() {
        assert_eq!(markup_multiplier(0.0, 10.0, 2.0), DISCARD_MULTIPLIER);
        assert_eq!(markup_multiplier(-5.0, 10.0, 2.0), DISCARD_MULTIPLIER);
    }

    #[test]
    fn markup_tolerates_non_finite_price() {
        assert_eq!(markup_multiplier(f64::NAN, 10.0, 2.0), 1.0);
        assert_eq!(markup_multiplier(f64::INFINITY, 10.0, 2.0), 1.0);
    }

    #[test]
    fn ta2_zero_quantity_prices_at_market() {
        let out = ta2_price(0.0, 50.0, 10.0, 2.0);
        assert_eq!(out.price, 10.0);
        assert!(!out.fallback);
    }

    #[test]
    fn ta2_zero_factor_falls_back_to_ceiling() {
        let out = ta2_price(5.0, 0.0, 10.0, 2.0);
        assert_eq!(out.price, 12.0);
        assert!(out.fallback);
    }

    #[test]
    fn ta2_inverts_the_sale_rate_formula() {
        let rate_factor = 80.0;
        let market = 10.0;
        let limit = 2.0;
        let desired = 5.0;
        let out = ta2_price(desired, rate_factor, market, limit);
        assert!(!out.fallback);
        // Plugging the price back into the forward formula recovers the
        // desired rate: rate = rate_factor * (limit / (price - market))².
        let recovered = rate_factor * (limit / (out.price - market)).powi(2);
        assert!((recovered - desired).abs() < 1e-9);
    }

    #[test]
    fn effect_with_factors_is_concave() {
        assert_eq!(effect_with_factors(0.5, 0.26, 10e3), 1.0);
        assert_eq!(effect_with_factors(1.0, 0.26, 10e3), 1.0);
        let small = effect_with_factors(10.0, 0.26, 10e3);
        let large = effect_with_factors(1000.0, 0.26, 10e3);
        assert!(small > 1.0);
        assert!(large > small);
        // Far sublinear: a 100x input buys much less than 100x output.
        assert!(large < small * 100.0);
    }

    #[test]
    fn market_factor_basics() {
        assert_eq!(market_factor(1.0, 0.0), 1.0);
        assert_eq!(market_factor(50.0, 50.0), 25.0);
        // Floor at 0.1 for dead markets.
        assert_eq!(market_factor(0.0, 99.0), 0.1);
    }

    #[test]
    fn advertising_ratio_guard() {
        let f = advertising_factors(0.0, 0.0, 0.04);
        assert_eq!(f.ratio, 0.01);
        assert!(f.total > 0.0);
        let g = advertising_factors(100.0, 80.0, 0.04);
        assert!(g.total > f.total);
    }

    proptest! {
        #[test]
        fn markup_is_positive(price in 0.01f64..1e6, market in 0.01f64..1e6, limit in 0.0f64..1e3) {
            let m = markup_multiplier(price, market, limit);
            prop_assert!(m > 0.0);
        }

        #[test]
        fn markup_monotone_in_overprice(market in 1.0f64..1e3, limit in 0.1f64..10.0, d in 1.0f64..100.0) {
            // Beyond the ceiling, raising the price never raises the multiplier.
            let p1 = market + limit + d;
            let p2 = p1 + 1.0;
            prop_assert!(markup_multiplier(p2, market, limit) <= markup_multiplier(p1, market, limit));
        }

        #[test]
        fn ta2_price_is_at_least_market(desired in 0.0f64..1e6, factor in 0.0f64..1e6,
                                        market in 0.01f64..1e4, limit in 0.0f64..1e2) {
            let out = ta2_price(desired, factor, market, limit);
            prop_assert!(out.price >= market);
        }

        #[test]
        fn ta2_more_quantity_means_lower_price(factor in 1.0f64..1e4, market in 1.0f64..1e3,
                                               limit in 0.1f64..10.0, q in 1.0f64..1e3) {
            let cheap = ta2_price(q * 2.0, factor, market, limit);
            let dear = ta2_price(q, factor, market, limit);
            prop_assert!(cheap.price <= dear.price);
        }
    }
}
