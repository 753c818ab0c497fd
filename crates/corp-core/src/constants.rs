//! Tuning constants for the simulation.

/// Real-time seconds covered by one market cycle. Batch processing of
/// `market_cycles` cycles scales every per-second rate by
/// `market_cycles * SECONDS_PER_MARKET_CYCLE`.
pub const SECONDS_PER_MARKET_CYCLE: f64 = 10.0;

/// Storage units of a newly built warehouse.
pub const WAREHOUSE_INITIAL_SIZE: f64 = 100.0;

/// Employee capacity of a newly opened office.
pub const OFFICE_INITIAL_SIZE: u32 = 3;

/// Base number of products a product-making division can carry; research
/// can raise this.
pub const MAX_PRODUCTS_BASE: u32 = 3;

/// Labor markup on a product's raw-material production cost.
pub const BASE_PRODUCT_PROFIT_MULT: f64 = 5.0;

/// Floor for material quality after blending.
pub const MIN_MATERIAL_QUALITY: f64 = 0.1;

/// Ceiling for market competition.
pub const MAX_COMPETITION: f64 = 99.99;

/// Floor for product demand after market drift.
pub const MIN_PRODUCT_DEMAND: f64 = 0.001;

/// Floor for a drifting market price.
pub const MIN_MARKET_PRICE: f64 = 0.01;

/// Popularity lost per market cycle.
pub const POPULARITY_DECAY_PER_CYCLE: f64 = 1e-4;

/// Divisor turning material quality into the markup limit, the price
/// premium the material can sustain before sales collapse.
pub const MATERIAL_MARKUP_FACTOR: f64 = 100.0;

/// Step size of random product demand/competition drift, per cycle.
pub const PRODUCT_MARKET_DRIFT_STEP: f64 = 4e-4;

/// Research points granted per unit of sqrt(R&D output) per cycle.
pub const RESEARCH_POINT_RATE: f64 = 0.004;

/// Generic balancing multiplier on office productivity.
pub const OFFICE_BALANCING_MULT: f64 = 0.05;

/// Base rate at which product development progresses.
pub const PRODUCT_DEVELOPMENT_RATE: f64 = 0.01;

/// Passive awareness/popularity gain per DreamSense level, per cycle.
pub const DREAM_SENSE_GAIN_PER_LEVEL: f64 = 1e-3;

/// Base employee salary, per employee per second.
pub const EMPLOYEE_SALARY_RATE: f64 = 3.0;

/// Morale/energy lost per market cycle.
pub const MORALE_DECAY_PER_CYCLE: f64 = 2e-3;

/// Morale/energy floor; staff never decay below this without events.
pub const MIN_EMPLOYEE_MORALE: f64 = 50.0;

/// Base cost of an advertising campaign.
pub const ADVERT_BASE_COST: f64 = 1e9;

/// Cost of opening an office in a new city.
pub const OFFICE_INITIAL_COST: f64 = 4e9;

/// Cost of building a warehouse in a new city.
pub const WAREHOUSE_INITIAL_COST: f64 = 5e9;
