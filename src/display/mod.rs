//! Display formatting for terminal output

pub mod reconciliation;

pub use reconciliation::{
    format_allocation_table, format_category_table, format_reconciliation_list,
    format_reconciliation_summary,
};
