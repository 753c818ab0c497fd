//! Inbound policy surface: validated accessors and mutators for everything
//! a player (or the automation layer) may configure.
//!
//! Every mutator checks the full division/city/material reference chain and
//! parses player formulas before committing anything, so a bad call fails
//! loudly instead of silently configuring nothing.

use crate::error::EngineError;
use crate::{Corporation, Division};
use corp_core::{
    constants, validate_quantity, City, IndustryType, Material, MaterialExport, MaterialName,
    Product, Research, SmartSupplyOption, Warehouse,
};
use rand::Rng;

impl Corporation {
    /// Shared access to a division.
    pub fn division(&self, name: &str) -> Result<&Division, EngineError> {
        self.divisions
            .get(name)
            .ok_or_else(|| EngineError::UnknownDivision(name.to_string()))
    }

    /// Mutable access to a division.
    pub fn division_mut(&mut self, name: &str) -> Result<&mut Division, EngineError> {
        self.divisions
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownDivision(name.to_string()))
    }

    /// Create a division, charging the industry's starting cost.
    pub fn create_division(
        &mut self,
        name: &str,
        industry: IndustryType,
    ) -> Result<(), EngineError> {
        if self.divisions.contains_key(name) {
            return Err(EngineError::DuplicateDivision(name.to_string()));
        }
        let cost = industry.data().starting_cost;
        if self.funds < cost {
            return Err(EngineError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            });
        }
        self.funds -= cost;
        self.divisions
            .insert(name.to_string(), Division::new(name, industry));
        Ok(())
    }

    /// Open an office and warehouse for `division` in `city`.
    pub fn expand_division(&mut self, division: &str, city: City) -> Result<(), EngineError> {
        let div = self.division(division)?;
        if div.warehouses.contains_key(&city) || div.offices.contains_key(&city) {
            return Err(EngineError::CityTaken {
                division: division.to_string(),
                city,
            });
        }
        let cost = constants::OFFICE_INITIAL_COST + constants::WAREHOUSE_INITIAL_COST;
        if self.funds < cost {
            return Err(EngineError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            });
        }
        self.funds -= cost;
        self.division_mut(division)?.expand(city);
        Ok(())
    }

    /// Buy one advertising campaign for `division`.
    pub fn hire_advert<R: Rng>(&mut self, division: &str, rng: &mut R) -> Result<(), EngineError> {
        let cost = self.division(division)?.advert_cost();
        if self.funds < cost {
            return Err(EngineError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            });
        }
        self.funds -= cost;
        let advertising_mult = self.advertising_mult;
        self.division_mut(division)?
            .apply_advert(advertising_mult, rng);
        Ok(())
    }

    /// Spend research points to complete `research` for `division`.
    pub fn unlock_research(
        &mut self,
        division: &str,
        research: Research,
    ) -> Result<(), EngineError> {
        let div = self.division_mut(division)?;
        if div.has_research(research) {
            return Ok(());
        }
        if let Some(prerequisite) = research.prerequisite() {
            if !div.has_research(prerequisite) {
                return Err(EngineError::MissingPrerequisite {
                    research,
                    prerequisite,
                });
            }
        }
        let cost = research.cost();
        if div.research_points < cost {
            return Err(EngineError::InsufficientResearchPoints {
                research,
                cost,
                available: div.research_points,
            });
        }
        div.research_points -= cost;
        div.researched.insert(research);
        Ok(())
    }

    /// Shared access to a warehouse.
    pub fn warehouse(&self, division: &str, city: City) -> Result<&Warehouse, EngineError> {
        self.division(division)?
            .warehouses
            .get(&city)
            .ok_or_else(|| EngineError::NoWarehouse {
                division: division.to_string(),
                city,
            })
    }

    fn warehouse_mut(&mut self, division: &str, city: City) -> Result<&mut Warehouse, EngineError> {
        let name = division.to_string();
        self.division_mut(division)?
            .warehouses
            .get_mut(&city)
            .ok_or(EngineError::NoWarehouse {
                division: name,
                city,
            })
    }

    /// Shared access to a material.
    pub fn material(
        &self,
        division: &str,
        city: City,
        material: MaterialName,
    ) -> Result<&Material, EngineError> {
        Ok(self.warehouse(division, city)?.material(material))
    }

    fn material_mut(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
    ) -> Result<&mut Material, EngineError> {
        Ok(self.warehouse_mut(division, city)?.material_mut(material))
    }

    /// Shared access to a product.
    pub fn product(&self, division: &str, product: &str) -> Result<&Product, EngineError> {
        self.division(division)?
            .products
            .get(product)
            .ok_or_else(|| EngineError::UnknownProduct {
                division: division.to_string(),
                product: product.to_string(),
            })
    }

    fn product_mut(&mut self, division: &str, product: &str) -> Result<&mut Product, EngineError> {
        let (division_name, product_name) = (division.to_string(), product.to_string());
        self.division_mut(division)?
            .products
            .get_mut(product)
            .ok_or(EngineError::UnknownProduct {
                division: division_name,
                product: product_name,
            })
    }

    /// Set a material's desired sell amount and price formulas. `None`
    /// disables selling. Formulas are parsed eagerly; a malformed one is
    /// rejected here rather than raising cycle diagnostics forever.
    pub fn set_material_sell(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
        amount: Option<String>,
        price: Option<String>,
    ) -> Result<(), EngineError> {
        validate_formula(amount.as_deref())?;
        validate_formula(price.as_deref())?;
        let mat = self.material_mut(division, city, material)?;
        mat.desired_sell_amount = amount;
        mat.desired_sell_price = price;
        Ok(())
    }

    /// Set a product's desired sell amount and price formulas in one city.
    pub fn set_product_sell(
        &mut self,
        division: &str,
        product: &str,
        city: City,
        amount: Option<String>,
        price: Option<String>,
    ) -> Result<(), EngineError> {
        validate_formula(amount.as_deref())?;
        validate_formula(price.as_deref())?;
        // The city must be one the division operates in.
        self.warehouse(division, city)?;
        let data = self.product_mut(division, product)?.city_data_mut(city);
        data.desired_sell_amount = amount;
        data.desired_sell_price = price;
        Ok(())
    }

    /// Set a material's fixed purchase rate, units/second.
    pub fn set_material_buy_rate(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
        rate: f64,
    ) -> Result<(), EngineError> {
        validate_quantity(rate)?;
        self.material_mut(division, city, material)?.buy_rate = rate;
        Ok(())
    }

    /// Cap a material's production, units/second. `None` removes the cap.
    pub fn set_material_production_limit(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
        limit: Option<f64>,
    ) -> Result<(), EngineError> {
        if let Some(limit) = limit {
            validate_quantity(limit)?;
        }
        self.material_mut(division, city, material)?.production_limit = limit;
        Ok(())
    }

    /// Cap a product's production in one city, units/second.
    pub fn set_product_production_limit(
        &mut self,
        division: &str,
        product: &str,
        city: City,
        limit: Option<f64>,
    ) -> Result<(), EngineError> {
        if let Some(limit) = limit {
            validate_quantity(limit)?;
        }
        self.warehouse(division, city)?;
        self.product_mut(division, product)?
            .city_data_mut(city)
            .production_limit = limit;
        Ok(())
    }

    /// Toggle smart supply for one warehouse.
    pub fn set_smart_supply(
        &mut self,
        division: &str,
        city: City,
        enabled: bool,
    ) -> Result<(), EngineError> {
        self.warehouse_mut(division, city)?.smart_supply_enabled = enabled;
        Ok(())
    }

    /// Configure how smart supply accounts for existing stock of one
    /// material.
    pub fn set_smart_supply_option(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
        option: SmartSupplyOption,
    ) -> Result<(), EngineError> {
        self.warehouse_mut(division, city)?
            .smart_supply_options
            .insert(material, option);
        Ok(())
    }

    /// Toggle Market-TA tiers for a material. Each tier requires its
    /// research.
    pub fn set_material_market_ta(
        &mut self,
        division: &str,
        city: City,
        material: MaterialName,
        ta1: bool,
        ta2: bool,
    ) -> Result<(), EngineError> {
        let div = self.division(division)?;
        if ta1 && !div.has_research(Research::MarketTa1) {
            return Err(EngineError::MissingResearch {
                operation: "Market-TA.I pricing",
                research: Research::MarketTa1,
            });
        }
        if ta2 && !div.has_research(Research::MarketTa2) {
            return Err(EngineError::MissingResearch {
                operation: "Market-TA.II pricing",
                research: Research::MarketTa2,
            });
        }
        let mat = self.material_mut(division, city, material)?;
        mat.market_ta1 = ta1;
        mat.market_ta2 = ta2;
        Ok(())
    }

    /// Toggle Market-TA tiers for a product.
    pub fn set_product_market_ta(
        &mut self,
        division: &str,
        product: &str,
        ta1: bool,
        ta2: bool,
    ) -> Result<(), EngineError> {
        let div = self.division(division)?;
        if ta1 && !div.has_research(Research::MarketTa1) {
            return Err(EngineError::MissingResearch {
                operation: "Market-TA.I pricing",
                research: Research::MarketTa1,
            });
        }
        if ta2 && !div.has_research(Research::MarketTa2) {
            return Err(EngineError::MissingResearch {
                operation: "Market-TA.II pricing",
                research: Research::MarketTa2,
            });
        }
        let prod = self.product_mut(division, product)?;
        prod.market_ta1 = ta1;
        prod.market_ta2 = ta2;
        Ok(())
    }

    /// Add a standing export rule. The source and target reference chains
    /// and the amount formula are all validated; exporting a material to
    /// its own warehouse is rejected.
    pub fn add_export(
        &mut self,
        source_division: &str,
        source_city: City,
        material: MaterialName,
        target_division: &str,
        target_city: City,
        amount: String,
    ) -> Result<(), EngineError> {
        corp_expr::parse(&amount).map_err(|source| EngineError::InvalidExpression {
            text: amount.clone(),
            source,
        })?;
        if source_division == target_division && source_city == target_city {
            return Err(EngineError::SelfExport);
        }
        self.warehouse(source_division, source_city)?;
        self.warehouse(target_division, target_city)?;
        self.material_mut(source_division, source_city, material)?
            .exports
            .push(MaterialExport {
                division: target_division.to_string(),
                city: target_city,
                amount,
            });
        Ok(())
    }

    /// Remove the first export rule matching the target.
    pub fn remove_export(
        &mut self,
        source_division: &str,
        source_city: City,
        material: MaterialName,
        target_division: &str,
        target_city: City,
    ) -> Result<(), EngineError> {
        let mat = self.material_mut(source_division, source_city, material)?;
        match mat
            .exports
            .iter()
            .position(|e| e.division == target_division && e.city == target_city)
        {
            Some(pos) => {
                mat.exports.remove(pos);
                Ok(())
            }
            None => Err(EngineError::UnknownExport {
                material,
                division: target_division.to_string(),
                city: target_city,
            }),
        }
    }

    /// Start developing a product, charging the design and advertising
    /// investments.
    pub fn develop_product(
        &mut self,
        division: &str,
        product_name: &str,
        creation_city: City,
        design_investment: f64,
        advertising_investment: f64,
    ) -> Result<(), EngineError> {
        validate_quantity(design_investment)?;
        validate_quantity(advertising_investment)?;
        let div = self.division(division)?;
        if !div.industry.data().makes_products {
            return Err(EngineError::NoProducts(div.industry));
        }
        if div.products.contains_key(product_name) {
            return Err(EngineError::DuplicateProduct(product_name.to_string()));
        }
        if div.products.len() as u32 >= div.max_products() {
            return Err(EngineError::TooManyProducts(div.max_products()));
        }
        if !div.offices.contains_key(&creation_city) {
            return Err(EngineError::NoOffice {
                division: division.to_string(),
                city: creation_city,
            });
        }
        let cost = design_investment + advertising_investment;
        if self.funds < cost {
            return Err(EngineError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            });
        }
        self.funds -= cost;
        self.division_mut(division)?.products.insert(
            product_name.to_string(),
            Product::new(
                product_name,
                creation_city,
                design_investment,
                advertising_investment,
            ),
        );
        Ok(())
    }

    /// Drop a product line.
    pub fn discontinue_product(
        &mut self,
        division: &str,
        product: &str,
    ) -> Result<(), EngineError> {
        let div = self.division_mut(division)?;
        let division_name = div.name.clone();
        if div.products.remove(product).is_none() {
            return Err(EngineError::UnknownProduct {
                division: division_name,
                product: product.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_formula(formula: Option<&str>) -> Result<(), EngineError> {
    if let Some(text) = formula {
        corp_expr::parse(text).map_err(|source| EngineError::InvalidExpression {
            text: text.to_string(),
            source,
        })?;
    }
    Ok(())
}
