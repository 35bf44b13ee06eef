//! Repository trait definitions for the compliance data store.
//!
//! Responsibilities are split across focused traits so implementations stay
//! testable and a SQL backend can grow one concern at a time:
//!
//! - [`error`]: Error types for repository operations
//! - [`contracts`]: Active-contract paging and existence checks
//! - [`programs`]: Read-only program constraint configuration
//! - [`events`]: Dispatch-event storage and grouped aggregation
//! - [`summaries`]: Constraint-summary persistence (unique per contract/day)
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let page = repo.fetch_active_contracts(0, 100).await?;
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod contracts;
pub mod error;
pub mod events;
pub mod programs;
pub mod summaries;

// Re-export error types
pub use error::{RepositoryError, RepositoryResult};

// Re-export all traits
pub use contracts::ContractRepository;
pub use events::{AggregateSpec, DispatchEventRepository};
pub use programs::ProgramRepository;
pub use summaries::SummaryRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all four
/// repository traits.
pub trait FullRepository:
    ContractRepository + ProgramRepository + DispatchEventRepository + SummaryRepository
{
}

// Blanket implementation: any type implementing all four traits automatically implements FullRepository
impl<T> FullRepository for T where
    T: ContractRepository + ProgramRepository + DispatchEventRepository + SummaryRepository
{
}
