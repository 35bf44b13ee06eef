//! High-level business logic services.
//!
//! These functions contain repository-agnostic orchestration that works with
//! any implementation of the repository traits.

pub mod evaluation;

pub use evaluation::{
    evaluate_contract, run_daily_evaluation, ContractFailure, EvaluationOptions, RunReport,
};
