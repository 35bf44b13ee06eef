//! # DER Compliance Engine
//!
//! Dispatch-constraint compliance engine for distributed energy resource (DER)
//! enrollment programs. Given a program's configured dispatch limits and a
//! contract's dispatch history, the engine computes a once-per-day snapshot of
//! how actual dispatch behavior compares against those limits across five
//! rolling windows (day, week, month, year, program lifetime).
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain types — windows, metrics, programs, contracts,
//!   dispatch events, opt-out responses, and the persisted constraint summary
//! - [`time`]: Rolling-window start resolution for an evaluation date
//! - [`constraints`]: Constraint shapes, two-tier warning/violation
//!   evaluation, and the per-program constraint builder
//! - [`ingestion`]: Day-boundary normalization of raw dispatch instructions
//!   and best-effort batch ingestion
//! - [`db`]: Repository traits, in-memory backend, factory, and configuration
//! - [`services`]: Evaluation orchestration (`run_daily_evaluation`)
//!
//! The engine owns no HTTP surface and no scheduler; an external trigger
//! supplies the evaluation date and consumes the run report.

// Allow large error types - EngineError carries rich context for run reports
#![allow(clippy::result_large_err)]

pub mod constraints;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod models;
pub mod services;
pub mod time;

pub use error::EngineError;
pub use models::{
    Contract, ContractId, ContractStatus, ConstraintSummary, DispatchEvent, MetricKind,
    OptOutResponse, ProgramConfig, ProgramId, WindowKind,
};
pub use services::{run_daily_evaluation, EvaluationOptions, RunReport};
