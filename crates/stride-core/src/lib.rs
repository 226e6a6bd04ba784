pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod io;
pub mod markdown;
pub mod metrics;
pub mod paths;
pub mod sprint;
pub mod sprint_data;
pub mod types;
pub mod validate;

pub use error::{Result, StrideError};
