//! Data types, configuration and statistics shared by the pingload crates.
mod config;
mod constants;
mod data;
mod distribution;
mod error;
mod stats;

pub use config::*;
pub use constants::*;
pub use data::*;
pub use distribution::*;
pub use error::*;
pub use stats::*;
