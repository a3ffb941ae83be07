use serde::{Deserialize, Serialize};

/// Age range used to tailor guidance.
///
/// Variants are declared youngest first; the derived `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "0-3_months")]
    ZeroToThreeMonths,
    #[serde(rename = "3-6_months")]
    ThreeToSixMonths,
    #[serde(rename = "3-12_months")]
    ThreeToTwelveMonths,
    #[serde(rename = "6-12_months")]
    SixToTwelveMonths,
    #[serde(rename = "1-3_years")]
    OneToThreeYears,
    #[serde(rename = "2-3_years")]
    TwoToThreeYears,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::ZeroToThreeMonths,
        AgeBand::ThreeToSixMonths,
        AgeBand::ThreeToTwelveMonths,
        AgeBand::SixToTwelveMonths,
        AgeBand::OneToThreeYears,
        AgeBand::TwoToThreeYears,
    ];

    /// Wire tag, e.g. `0-3_months`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroToThreeMonths => "0-3_months",
            Self::ThreeToSixMonths => "3-6_months",
            Self::ThreeToTwelveMonths => "3-12_months",
            Self::SixToTwelveMonths => "6-12_months",
            Self::OneToThreeYears => "1-3_years",
            Self::TwoToThreeYears => "2-3_years",
        }
    }

    /// Human readable label, e.g. `0-3 months`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Half-open month range `[start, end)` the band stands for.
    pub fn months(&self) -> (u32, u32) {
        match self {
            Self::ZeroToThreeMonths => (0, 3),
            Self::ThreeToSixMonths => (3, 6),
            Self::ThreeToTwelveMonths => (3, 12),
            Self::SixToTwelveMonths => (6, 12),
            Self::OneToThreeYears => (12, 36),
            Self::TwoToThreeYears => (24, 36),
        }
    }

    /// True when every age in `other` also falls in `self`.
    pub fn covers(&self, other: AgeBand) -> bool {
        let (start, end) = self.months();
        let (other_start, other_end) = other.months();
        start <= other_start && other_end <= end
    }
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeBand::ALL
            .into_iter()
            .find(|band| band.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown age band: {s}"))
    }
}

/// Which set of bands the age grouper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeScheme {
    /// 0-3 months, 3-6 months, 6-12 months, 1-3 years.
    #[default]
    Detailed,
    /// 0-3 months, 3-12 months, 1-3 years.
    Coarse,
}

impl AgeScheme {
    /// Upper bound (inclusive, in months) of every band but the last, paired with the band.
    pub fn thresholds(&self) -> &'static [(u32, AgeBand)] {
        match self {
            Self::Detailed => &[
                (3, AgeBand::ZeroToThreeMonths),
                (6, AgeBand::ThreeToSixMonths),
                (12, AgeBand::SixToTwelveMonths),
            ],
            Self::Coarse => &[
                (3, AgeBand::ZeroToThreeMonths),
                (12, AgeBand::ThreeToTwelveMonths),
            ],
        }
    }

    /// The band used for ages above every threshold and for unknown ages.
    pub fn oldest(&self) -> AgeBand {
        AgeBand::OneToThreeYears
    }

    /// Bands this scheme produces, youngest first.
    pub fn bands(&self) -> Vec<AgeBand> {
        self.thresholds()
            .iter()
            .map(|(_, band)| *band)
            .chain(std::iter::once(self.oldest()))
            .collect()
    }
}

impl std::fmt::Display for AgeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detailed => write!(f, "detailed"),
            Self::Coarse => write!(f, "coarse"),
        }
    }
}

impl std::str::FromStr for AgeScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "coarse" => Ok(Self::Coarse),
            _ => Err(format!("Unknown age scheme: {s}")),
        }
    }
}
