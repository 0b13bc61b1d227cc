//! Minable commodities
//!
//! The table is fixed at compile time. Deeper resources are rarer, heavier
//! relative to their footprint, and worth more.

use serde::{Deserialize, Serialize};

/// A commodity that can be found in a vein and sold at the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Copper,
    Iron,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Ruby,
    Diamond,
}

impl ResourceType {
    /// Every resource, commonest first
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Copper,
        ResourceType::Iron,
        ResourceType::Silver,
        ResourceType::Gold,
        ResourceType::Platinum,
        ResourceType::Emerald,
        ResourceType::Ruby,
        ResourceType::Diamond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Copper => "Copper",
            ResourceType::Iron => "Iron",
            ResourceType::Silver => "Silver",
            ResourceType::Gold => "Gold",
            ResourceType::Platinum => "Platinum",
            ResourceType::Emerald => "Emerald",
            ResourceType::Ruby => "Ruby",
            ResourceType::Diamond => "Diamond",
        }
    }

    /// Sale price at the processor
    pub fn value(&self) -> u64 {
        match self {
            ResourceType::Copper => 30,
            ResourceType::Iron => 60,
            ResourceType::Silver => 100,
            ResourceType::Gold => 250,
            ResourceType::Platinum => 500,
            ResourceType::Emerald => 800,
            ResourceType::Ruby => 1200,
            ResourceType::Diamond => 2500,
        }
    }

    /// Cargo space consumed by one unit
    pub fn weight(&self) -> u32 {
        match self {
            ResourceType::Copper => 5,
            ResourceType::Iron | ResourceType::Silver => 10,
            ResourceType::Gold | ResourceType::Emerald => 15,
            ResourceType::Platinum | ResourceType::Ruby => 20,
            ResourceType::Diamond => 25,
        }
    }

    /// Rows below the surface before this resource may generate
    pub fn min_depth(&self) -> u32 {
        match self {
            ResourceType::Copper => 1,
            ResourceType::Iron => 4,
            ResourceType::Silver => 10,
            ResourceType::Gold => 18,
            ResourceType::Platinum => 28,
            ResourceType::Emerald => 38,
            ResourceType::Ruby => 50,
            ResourceType::Diamond => 62,
        }
    }

    /// Base hardness of a vein of this resource
    pub fn hardness(&self) -> f32 {
        match self {
            ResourceType::Copper => 2.0,
            ResourceType::Iron => 2.5,
            ResourceType::Silver => 3.0,
            ResourceType::Gold => 3.5,
            ResourceType::Platinum => 4.0,
            ResourceType::Emerald => 4.5,
            ResourceType::Ruby => 5.0,
            ResourceType::Diamond => 6.0,
        }
    }

    /// Probability band width at `min_depth`
    pub fn base_chance(&self) -> f32 {
        match self {
            ResourceType::Copper => 0.08,
            ResourceType::Iron => 0.06,
            ResourceType::Silver => 0.04,
            ResourceType::Gold => 0.03,
            ResourceType::Platinum => 0.02,
            ResourceType::Emerald => 0.015,
            ResourceType::Ruby => 0.012,
            ResourceType::Diamond => 0.008,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarer_resources_are_deeper_and_pricier() {
        for pair in ResourceType::ALL.windows(2) {
            let (common, rare) = (pair[0], pair[1]);
            assert!(rare.min_depth() > common.min_depth(), "{:?}", rare);
            assert!(rare.value() > common.value(), "{:?}", rare);
            assert!(rare.base_chance() < common.base_chance(), "{:?}", rare);
        }
    }

    #[test]
    fn test_every_resource_has_positive_stats() {
        for r in ResourceType::ALL {
            assert!(r.weight() > 0);
            assert!(r.hardness() > 0.0);
            assert!(!r.name().is_empty());
        }
    }
}
