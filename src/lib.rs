//! rotor - weekly-target source rotation for news training
//!
//! Users review news items source by source. Each user has a weekly quota per
//! source and training type; rotor works out which source a user should be
//! served next, given how much of each quota is already done.

pub mod domain;
pub mod error;
pub mod rotation;
pub mod store;

pub use error::{Result, RotorError};
