//! Job board back end: the recruiter posting wizard and candidate search helpers.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use error::AppError;
