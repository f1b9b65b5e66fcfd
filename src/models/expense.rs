//! Expense ledger line items
//!
//! Expenses are supplied by the ledger collaborator. The engine only reads
//! them; it never edits an amount in place. Gross-up produces adjusted copies
//! instead (see `services::gross_up`).

use serde::{Deserialize, Serialize};

use super::category::ExpenseCategory;
use super::ids::ExpenseItemId;
use super::money::Money;
use super::period::Period;
use crate::error::{CamError, CamResult};

/// One categorized cost for a property and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(default)]
    pub id: ExpenseItemId,
    pub category: ExpenseCategory,
    pub amount: Money,
    /// Whether the cost scales with occupancy (eligible for gross-up)
    #[serde(default)]
    pub is_variable: bool,
    pub period: Period,
    #[serde(default)]
    pub description: String,
}

impl ExpenseItem {
    /// Create a fixed (non-variable) expense
    pub fn new(category: ExpenseCategory, amount: Money, period: Period) -> Self {
        Self {
            id: ExpenseItemId::new(),
            category,
            amount,
            is_variable: false,
            period,
            description: String::new(),
        }
    }

    /// Create an occupancy-sensitive expense
    pub fn variable(category: ExpenseCategory, amount: Money, period: Period) -> Self {
        Self {
            is_variable: true,
            ..Self::new(category, amount, period)
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate the item
    pub fn validate(&self) -> CamResult<()> {
        if self.amount.is_negative() {
            return Err(CamError::InvalidInput(format!(
                "Expense {} ({}) has negative amount {}",
                self.id, self.category, self.amount
            )));
        }
        self.period.validate()
    }
}
