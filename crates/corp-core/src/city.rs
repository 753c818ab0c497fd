//! The closed set of cities a division can operate in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A city a division may hold an office and a warehouse in.
///
/// The set is closed: city-keyed maps are populated from [`City::ALL`] and
/// an invalid city is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum City {
    /// Aevum
    Aevum,
    /// Chongqing
    Chongqing,
    /// Ishima
    Ishima,
    /// New Tokyo
    NewTokyo,
    /// Sector-12, the default starting city.
    Sector12,
    /// Volhaven
    Volhaven,
}

impl City {
    /// Every city, in stable iteration order.
    pub const ALL: [City; 6] = [
        City::Aevum,
        City::Chongqing,
        City::Ishima,
        City::NewTokyo,
        City::Sector12,
        City::Volhaven,
    ];
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            City::Aevum => "Aevum",
            City::Chongqing => "Chongqing",
            City::Ishima => "Ishima",
            City::NewTokyo => "New Tokyo",
            City::Sector12 => "Sector-12",
            City::Volhaven => "Volhaven",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_sorted_and_unique() {
        let mut sorted = City::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, City::ALL.to_vec());
    }

    #[test]
    fn serde_roundtrip() {
        let s = serde_json::to_string(&City::NewTokyo).unwrap();
        let back: City = serde_json::from_str(&s).unwrap();
        assert_eq!(back, City::NewTokyo);
    }
}
