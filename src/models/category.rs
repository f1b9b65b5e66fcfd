//! Expense categories
//!
//! The category set is closed: every ledger line maps to exactly one variant,
//! with `Other` catching anything that has no dedicated bucket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a CAM expense line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    PropertyTax,
    Insurance,
    UtilitiesWater,
    UtilitiesElectric,
    UtilitiesGas,
    UtilitiesTrash,
    MaintenanceRepair,
    Landscaping,
    Janitorial,
    Security,
    ManagementFee,
    Legal,
    Accounting,
    Marketing,
    CapitalImprovement,
    PestControl,
    Hvac,
    RoofRepair,
    ParkingLot,
    Signage,
    Other,
}

impl ExpenseCategory {
    /// Every category, in declaration order
    pub const ALL: [ExpenseCategory; 21] = [
        ExpenseCategory::PropertyTax,
        ExpenseCategory::Insurance,
        ExpenseCategory::UtilitiesWater,
        ExpenseCategory::UtilitiesElectric,
        ExpenseCategory::UtilitiesGas,
        ExpenseCategory::UtilitiesTrash,
        ExpenseCategory::MaintenanceRepair,
        ExpenseCategory::Landscaping,
        ExpenseCategory::Janitorial,
        ExpenseCategory::Security,
        ExpenseCategory::ManagementFee,
        ExpenseCategory::Legal,
        ExpenseCategory::Accounting,
        ExpenseCategory::Marketing,
        ExpenseCategory::CapitalImprovement,
        ExpenseCategory::PestControl,
        ExpenseCategory::Hvac,
        ExpenseCategory::RoofRepair,
        ExpenseCategory::ParkingLot,
        ExpenseCategory::Signage,
        ExpenseCategory::Other,
    ];

    /// Stable snake_case key, matching the serialized form
    pub fn key(&self) -> &'static str {
        match self {
            ExpenseCategory::PropertyTax => "property_tax",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::UtilitiesWater => "utilities_water",
            ExpenseCategory::UtilitiesElectric => "utilities_electric",
            ExpenseCategory::UtilitiesGas => "utilities_gas",
            ExpenseCategory::UtilitiesTrash => "utilities_trash",
            ExpenseCategory::MaintenanceRepair => "maintenance_repair",
            ExpenseCategory::Landscaping => "landscaping",
            ExpenseCategory::Janitorial => "janitorial",
            ExpenseCategory::Security => "security",
            ExpenseCategory::ManagementFee => "management_fee",
            ExpenseCategory::Legal => "legal",
            ExpenseCategory::Accounting => "accounting",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::CapitalImprovement => "capital_improvement",
            ExpenseCategory::PestControl => "pest_control",
            ExpenseCategory::Hvac => "hvac",
            ExpenseCategory::RoofRepair => "roof_repair",
            ExpenseCategory::ParkingLot => "parking_lot",
            ExpenseCategory::Signage => "signage",
            ExpenseCategory::Other => "other",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::PropertyTax => "Property Tax",
            ExpenseCategory::Insurance => "Insurance",
            ExpenseCategory::UtilitiesWater => "Utilities - Water",
            ExpenseCategory::UtilitiesElectric => "Utilities - Electric",
            ExpenseCategory::UtilitiesGas => "Utilities - Gas",
            ExpenseCategory::UtilitiesTrash => "Utilities - Trash",
            ExpenseCategory::MaintenanceRepair => "Maintenance & Repair",
            ExpenseCategory::Landscaping => "Landscaping",
            ExpenseCategory::Janitorial => "Janitorial",
            ExpenseCategory::Security => "Security",
            ExpenseCategory::ManagementFee => "Management Fee",
            ExpenseCategory::Legal => "Legal",
            ExpenseCategory::Accounting => "Accounting",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::CapitalImprovement => "Capital Improvement",
            ExpenseCategory::PestControl => "Pest Control",
            ExpenseCategory::Hvac => "HVAC",
            ExpenseCategory::RoofRepair => "Roof Repair",
            ExpenseCategory::ParkingLot => "Parking Lot",
            ExpenseCategory::Signage => "Signage",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key() == normalized)
            .ok_or_else(|| format!("Unknown expense category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_snake_case_keys() {
        for category in ExpenseCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.key()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "utilities_water".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::UtilitiesWater
        );
        assert_eq!(
            "Parking Lot".parse::<ExpenseCategory>().unwrap(),
            ExpenseCategory::ParkingLot
        );
        assert!("elevator".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_unknown_category_rejected_on_deserialize() {
        let result: Result<ExpenseCategory, _> = serde_json::from_str("\"elevator\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExpenseCategory::Hvac.to_string(), "HVAC");
        assert_eq!(ExpenseCategory::Other.to_string(), "Other");
    }
}
