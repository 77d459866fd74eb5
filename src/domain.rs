use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerifError;

/// Forecast model scheme (`general.csc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelScheme {
    HarmonieArome,
    Arome,
    Alaro,
}

impl ModelScheme {
    pub fn name(self) -> &'static str {
        match self {
            ModelScheme::HarmonieArome => "HARMONIE_AROME",
            ModelScheme::Arome => "AROME",
            ModelScheme::Alaro => "ALARO",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            ModelScheme::HarmonieArome => "HA",
            ModelScheme::Arome => "AR",
            ModelScheme::Alaro => "AL",
        }
    }
}

impl fmt::Display for ModelScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelScheme {
    type Err = VerifError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "HARMONIE_AROME" => Ok(ModelScheme::HarmonieArome),
            "AROME" => Ok(ModelScheme::Arome),
            "ALARO" => Ok(ModelScheme::Alaro),
            _ => Err(VerifError::UnknownModel(value.to_string())),
        }
    }
}

/// Case study name: `<event_type>_<domain>_<YYYYMMDD>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(event_type: &str, domain_name: &str, first_init: &str) -> Self {
        let day = first_init.get(..8).unwrap_or(first_init);
        Self([event_type, domain_name, day].join("_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Experiment name: `<cnmexp>_<cycle>_<scheme abbreviation>_<domain>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpId(String);

impl ExpId {
    pub fn new(experiment: &str, cycle: &str, scheme: ModelScheme, domain_name: &str) -> Self {
        let cycle = cycle.to_lowercase();
        Self([experiment, cycle.as_str(), scheme.abbreviation(), domain_name].join("_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn inset(&self, margin: f64) -> Self {
        Self {
            lon_min: self.lon_min + margin,
            lon_max: self.lon_max - margin,
            lat_min: self.lat_min + margin,
            lat_max: self.lat_max - margin,
        }
    }

    /// `[lon_min, lon_max, lat_min, lat_max]`, the layout the case document uses.
    pub fn to_array(&self) -> [f64; 4] {
        [self.lon_min, self.lon_max, self.lat_min, self.lat_max]
    }
}

/// Grid geometry of the forecast domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainGeometry {
    pub nimax: i64,
    pub njmax: i64,
    pub xdx: f64,
    pub xdy: f64,
    pub xlatcen: f64,
    pub xloncen: f64,
    pub xlat0: f64,
    pub xlon0: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_name_truncates_to_day() {
        let case = CaseId::new("heavy_rain", "SPAIN", "2023010112");
        assert_eq!(case.as_str(), "heavy_rain_SPAIN_20230101");
    }

    #[test]
    fn inset_shrinks_every_side() {
        let bbox = BoundingBox {
            lon_min: -10.0,
            lon_max: 5.0,
            lat_min: 35.0,
            lat_max: 45.0,
        };
        assert_eq!(bbox.inset(1.0).to_array(), [-9.0, 4.0, 36.0, 44.0]);
    }
}
