use crate::models::{AgeBand, AgeScheme};

/// Maps an age in months to an [`AgeBand`].
///
/// Thresholds are inclusive upper bounds: an age exactly on a threshold
/// belongs to the younger band. Unknown age maps to the oldest band.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeGrouper {
    scheme: AgeScheme,
}

impl AgeGrouper {
    pub fn new(scheme: AgeScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> AgeScheme {
        self.scheme
    }

    pub fn band(&self, age_months: Option<u32>) -> AgeBand {
        let Some(months) = age_months else {
            return self.scheme.oldest();
        };

        self.scheme
            .thresholds()
            .iter()
            .find(|(upper, _)| months <= *upper)
            .map(|(_, band)| *band)
            .unwrap_or_else(|| self.scheme.oldest())
    }
}
