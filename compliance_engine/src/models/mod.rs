pub mod contract;
pub mod dispatch;
pub mod macros;
pub mod metric;
pub mod opt_out;
pub mod program;
pub mod summary;
pub mod window;

pub use contract::*;
pub use dispatch::*;
pub use metric::*;
pub use opt_out::*;
pub use program::*;
pub use summary::*;
pub use window::*;
