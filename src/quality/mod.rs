//! Controlled data-quality degradation and the outlier bounds used to
//! recognise it afterwards.

pub mod detect;
pub mod inject;

pub use detect::OutlierThresholds;
pub use inject::QualityInjector;
