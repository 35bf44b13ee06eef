//! Data-store module for the compliance engine.
//!
//! This module provides abstractions for store operations via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service Layer (services::evaluation, ingestion)        │
//! │  - Constraint building and evaluation orchestration      │
//! │  - Batch ingestion, run reports                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! │  - ContractRepository (active-contract paging)           │
//! │  - ProgramRepository (constraint configuration)          │
//! │  - DispatchEventRepository (events + aggregation)        │
//! │  - SummaryRepository (unique per contract/day)           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use config::EngineConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    AggregateSpec, ContractRepository, DispatchEventRepository, FullRepository, ProgramRepository,
    RepositoryError, RepositoryResult, SummaryRepository,
};
