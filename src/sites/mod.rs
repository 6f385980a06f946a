//! Fleet catalog: site types, site records, and the registry.

pub mod registry;
pub mod types;

pub use registry::SiteRegistry;
pub use types::{KWH_PER_MW_DAY, Site, SiteType};
