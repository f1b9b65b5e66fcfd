//! cam-engine - CAM reconciliation and allocation for commercial real estate
//!
//! Calculates each tenant's share of a property's common area maintenance
//! (CAM) expenses for a reconciliation period. For every tenant the engine
//! applies, in order: category exclusions, the tenant's share of the pool,
//! admin fee, base-year or expense-stop credit, CAM cap, and occupancy
//! proration, then rounds once to cents.
//!
//! # Architecture
//!
//! - `models`: plain records (expenses, lease terms, reconciliations, money)
//! - `services`: the calculation engine and the reconciliation lifecycle
//! - `storage`: JSON file persistence with optimistic versioning
//! - `audit`: append-only log of lifecycle transitions
//! - `reports`, `export`, `display`: output over calculated reconciliations
//! - `config`, `cli`: settings, paths and the `camrec` command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use cam_engine::models::{AllocationMethod, Period, PropertyId, Reconciliation};
//! use cam_engine::services::{aggregator, CalculationInput};
//!
//! let mut rec = Reconciliation::new_draft(
//!     PropertyId::new(),
//!     Period::annual(2025)?,
//!     AllocationMethod::ProRataSf,
//!     building_sf,
//! );
//! let input = CalculationInput::new(expenses, leases, building_sf);
//! aggregator::calculate(&mut rec, &input)?;
//! aggregator::finalize(&mut rec)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CamError, CamResult};
