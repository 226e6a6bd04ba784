pub mod list;
pub mod metrics;
pub mod show;
pub mod status;
pub mod validate;
