//! Per-city material storage.

use crate::city::City;
use crate::material::{Material, MaterialName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How smart supply accounts for stock that is already on hand or already
/// on its way when sizing a purchase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmartSupplyOption {
    /// Buy the full computed amount.
    #[default]
    Ignore,
    /// Subtract leftover stock from the computed amount.
    Leftovers,
    /// Subtract incoming imports from the computed amount.
    Imports,
}

/// A division's warehouse in one city. Owns the per-material state; product
/// stock is owned by the products themselves and only counted into
/// `size_used` by the division.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    /// City this warehouse is in.
    pub city: City,
    /// Storage capacity in storage units.
    pub size: f64,
    /// Storage units in use. Derived from contents; recomputed, never
    /// independently mutated. Not persisted.
    #[serde(skip)]
    pub size_used: f64,
    /// Whether smart supply sizes purchases from production needs.
    pub smart_supply_enabled: bool,
    /// Per-material smart supply stock accounting.
    pub smart_supply_options: BTreeMap<MaterialName, SmartSupplyOption>,
    /// Production rate of the previous cycle, units/second; sizes the next
    /// smart-supply purchase.
    pub smart_supply_store: f64,
    /// Material state, keyed by the closed material set. Every material has
    /// an entry; construction and restore guarantee it.
    pub materials: BTreeMap<MaterialName, Material>,
}

impl Warehouse {
    /// New warehouse with every material at baseline state.
    pub fn new(city: City, size: f64) -> Self {
        let materials = MaterialName::ALL
            .iter()
            .map(|&name| (name, Material::new(name)))
            .collect();
        Warehouse {
            city,
            size,
            size_used: 0.0,
            smart_supply_enabled: false,
            smart_supply_options: BTreeMap::new(),
            smart_supply_store: 0.0,
            materials,
        }
    }

    /// Shared access to one material's state.
    ///
    /// The map covers the closed material set by construction; a missing
    /// entry is a corrupted-state defect, not a user error.
    pub fn material(&self, name: MaterialName) -> &Material {
        self.materials
            .get(&name)
            .expect("warehouse holds every material")
    }

    /// Mutable access to one material's state.
    pub fn material_mut(&mut self, name: MaterialName) -> &mut Material {
        self.materials
            .get_mut(&name)
            .expect("warehouse holds every material")
    }

    /// The smart-supply option configured for `name`.
    pub fn smart_supply_option(&self, name: MaterialName) -> SmartSupplyOption {
        self.smart_supply_options
            .get(&name)
            .copied()
            .unwrap_or_default()
    }

    /// Recompute `size_used` from material contents alone. The division
    /// adds product stock on top of this.
    pub fn update_material_size_used(&mut self) {
        self.size_used = self
            .materials
            .values()
            .map(|m| m.stored * m.name.info().size)
            .sum();
    }

    /// Free storage units, never negative.
    pub fn free_space(&self) -> f64 {
        (self.size - self.size_used).max(0.0)
    }

    /// Re-establish construction invariants after deserialization: refill
    /// any material entry a hand-edited or older save dropped, and
    /// recompute the derived fill level.
    pub fn restore(&mut self) {
        for name in MaterialName::ALL {
            self.materials.entry(name).or_insert_with(|| Material::new(name));
        }
        self.update_material_size_used();
    }
}
