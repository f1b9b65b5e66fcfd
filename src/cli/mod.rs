//! CLI command handlers
//!
//! Bridges clap argument parsing in `main` with the service layer.

pub mod export;
pub mod reconcile;
pub mod request;

pub use export::{handle_export, ExportFormat};
pub use reconcile::{
    handle_calculate, handle_finalize, handle_history, handle_list, handle_show,
    handle_statement,
};
pub use request::CalculationRequest;
