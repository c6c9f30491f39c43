use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{Appendix, ClassificationRecord};

/// Which appendix facets are switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FacetSet {
    pub appendix1: bool,
    pub appendix2: bool,
    pub appendix3: bool,
}

impl Default for FacetSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FacetSet {
    pub fn all() -> Self {
        Self {
            appendix1: true,
            appendix2: true,
            appendix3: true,
        }
    }

    pub fn none() -> Self {
        Self {
            appendix1: false,
            appendix2: false,
            appendix3: false,
        }
    }

    pub fn from_appendices(appendices: impl IntoIterator<Item = Appendix>) -> Self {
        let mut facets = Self::none();
        for appendix in appendices {
            facets.set(appendix, true);
        }
        facets
    }

    pub fn contains(&self, appendix: Appendix) -> bool {
        match appendix {
            Appendix::One => self.appendix1,
            Appendix::Two => self.appendix2,
            Appendix::Three => self.appendix3,
        }
    }

    pub fn set(&mut self, appendix: Appendix, active: bool) {
        match appendix {
            Appendix::One => self.appendix1 = active,
            Appendix::Two => self.appendix2 = active,
            Appendix::Three => self.appendix3 = active,
        }
    }

    /// Active appendices in order
    pub fn active(&self) -> Vec<Appendix> {
        Appendix::ALL
            .into_iter()
            .filter(|&appendix| self.contains(appendix))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.appendix1 || self.appendix2 || self.appendix3)
    }

    pub fn is_all(&self) -> bool {
        self.appendix1 && self.appendix2 && self.appendix3
    }

    /// True when the record cites at least one active appendix
    pub fn admits(&self, record: &ClassificationRecord) -> bool {
        Appendix::ALL
            .into_iter()
            .any(|appendix| self.contains(appendix) && record.cites(appendix))
    }
}

/// Keep the records citing at least one active appendix.
///
/// No active facet yields nothing; all three active returns the input as is.
pub fn filter<'a>(
    results: &[&'a ClassificationRecord],
    facets: &FacetSet,
) -> Vec<&'a ClassificationRecord> {
    if facets.is_empty() {
        return Vec::new();
    }
    if facets.is_all() {
        return results.to_vec();
    }
    results
        .iter()
        .copied()
        .filter(|record| facets.admits(record))
        .collect()
}
