//! Weekly-target rotation.

pub mod resolver;
pub mod window;

pub use resolver::Resolver;
pub use window::{CountWindow, week_start};
