pub mod builder;
pub mod model;

pub use builder::*;
pub use model::*;
