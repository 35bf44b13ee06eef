pub mod periods;

pub use periods::*;
