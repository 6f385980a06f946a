//! The fixed fleet catalog.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::types::{Site, SiteType};
use crate::error::GenerationError;

/// Ordered, immutable catalog of sites.
///
/// Registry order is the secondary sort key of the dataset (after date), so
/// it is preserved exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SiteRegistry {
    sites: Vec<Site>,
}

impl SiteRegistry {
    /// The built-in six-site fleet: three solar farms, two wind farms and one
    /// grid-scale battery.
    pub fn builtin() -> Self {
        Self {
            sites: builtin_sites(),
        }
    }

    /// Builds a registry from a custom catalog.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the catalog is empty, contains a
    /// duplicate or blank `site_id`, or a non-positive capacity.
    pub fn new(sites: Vec<Site>) -> Result<Self, GenerationError> {
        if sites.is_empty() {
            return Err(GenerationError::invalid_parameter(
                "sites",
                "at least one site is required",
            ));
        }
        let mut seen = HashSet::new();
        for site in &sites {
            if site.site_id.trim().is_empty() {
                return Err(GenerationError::invalid_parameter(
                    "sites.site_id",
                    "must not be empty",
                ));
            }
            if !seen.insert(site.site_id.as_str()) {
                return Err(GenerationError::invalid_parameter(
                    "sites.site_id",
                    format!("duplicate site id \"{}\"", site.site_id),
                ));
            }
            if !(site.capacity_mw.is_finite() && site.capacity_mw > 0.0) {
                return Err(GenerationError::invalid_parameter(
                    "sites.capacity_mw",
                    format!("site \"{}\" must have a positive capacity", site.site_id),
                ));
            }
        }
        Ok(Self { sites })
    }

    /// All sites in registry order.
    pub fn list_sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Looks a site up by id.
    ///
    /// # Errors
    ///
    /// `UnresolvedSiteReference` when no site carries `site_id`.
    pub fn resolve(&self, site_id: &str) -> Result<&Site, GenerationError> {
        self.sites
            .iter()
            .find(|s| s.site_id == site_id)
            .ok_or_else(|| GenerationError::UnresolvedSiteReference(site_id.to_string()))
    }

    /// Number of sites per technology class.
    pub fn count_by_type(&self) -> BTreeMap<SiteType, usize> {
        let mut counts = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.site_type).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

pub(crate) fn builtin_sites() -> Vec<Site> {
    vec![
        Site::new("SOLAR001", "Desert Sun Solar Farm", SiteType::Solar, 50.0),
        Site::new("SOLAR002", "Coastal Solar Array", SiteType::Solar, 35.0),
        Site::new("SOLAR003", "Mountain Ridge Solar", SiteType::Solar, 60.0),
        Site::new("WIND001", "Prairie Wind Farm", SiteType::Wind, 100.0),
        Site::new("WIND002", "Offshore Wind Array", SiteType::Wind, 150.0),
        Site::new("BATT001", "Grid Scale Battery", SiteType::Battery, 200.0),
    ]
}
