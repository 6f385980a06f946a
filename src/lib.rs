//! Synthetic renewable-energy dataset generator.
//!
//! Produces per-site, per-day production, price and revenue records for a
//! fleet of solar, wind and storage sites, degrades them with controlled
//! missing values and outliers, and summarises the result.

#[cfg(feature = "api")]
pub mod api;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod io;
pub mod model;
pub mod quality;
pub mod sites;
pub mod summary;
pub mod telemetry;

pub use config::GeneratorConfig;
pub use dataset::{DailyRecord, Dataset, Field};
pub use error::GenerationError;
pub use generator::{GenerationOutput, Generator, generate};
pub use summary::SummaryDocument;
