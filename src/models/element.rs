use serde::{Deserialize, Serialize};

/// The core GHCN-Daily elements. Records may carry any other code; this list
/// is descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCode {
    Precipitation,
    Snowfall,
    SnowDepth,
    MaxTemperature,
    MinTemperature,
}

impl ElementCode {
    pub const ALL: [ElementCode; 5] = [
        ElementCode::Precipitation,
        ElementCode::Snowfall,
        ElementCode::SnowDepth,
        ElementCode::MaxTemperature,
        ElementCode::MinTemperature,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "PRCP" => Some(ElementCode::Precipitation),
            "SNOW" => Some(ElementCode::Snowfall),
            "SNWD" => Some(ElementCode::SnowDepth),
            "TMAX" => Some(ElementCode::MaxTemperature),
            "TMIN" => Some(ElementCode::MinTemperature),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ElementCode::Precipitation => "PRCP",
            ElementCode::Snowfall => "SNOW",
            ElementCode::SnowDepth => "SNWD",
            ElementCode::MaxTemperature => "TMAX",
            ElementCode::MinTemperature => "TMIN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ElementCode::Precipitation => "Precipitation",
            ElementCode::Snowfall => "Snowfall",
            ElementCode::SnowDepth => "Snow depth",
            ElementCode::MaxTemperature => "Maximum temperature",
            ElementCode::MinTemperature => "Minimum temperature",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            ElementCode::Precipitation => "tenths of mm",
            ElementCode::Snowfall | ElementCode::SnowDepth => "mm",
            ElementCode::MaxTemperature | ElementCode::MinTemperature => "tenths of degrees C",
        }
    }
}

impl std::fmt::Display for ElementCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.units())
    }
}
