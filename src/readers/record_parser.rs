use crate::models::WeatherRecord;
use crate::utils::constants::REQUIRED_FIELDS;
use crate::utils::sanitize_station_id;
use std::fmt;

pub type ParseOutcome = std::result::Result<WeatherRecord, SkipReason>;

/// Why a line did not produce a record. Skips are never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyLine,
    TooFewFields,
    MissingRequiredField,
    ParseError(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyLine => f.write_str("empty line"),
            SkipReason::TooFewFields => f.write_str("too few fields"),
            SkipReason::MissingRequiredField => f.write_str("missing required field"),
            SkipReason::ParseError(detail) => write!(f, "parse error: {}", detail),
        }
    }
}

/// Per-reason skip counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipTally {
    pub empty_lines: u64,
    pub too_few_fields: u64,
    pub missing_required: u64,
    pub parse_errors: u64,
}

impl SkipTally {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::EmptyLine => self.empty_lines += 1,
            SkipReason::TooFewFields => self.too_few_fields += 1,
            SkipReason::MissingRequiredField => self.missing_required += 1,
            SkipReason::ParseError(_) => self.parse_errors += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.empty_lines + self.too_few_fields + self.missing_required + self.parse_errors
    }
}

/// Turns one `stationId,date,element,value[,mFlag,qFlag,sFlag,obsTime]` line
/// into a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRecordParser;

impl CsvRecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode then parse. Invalid UTF-8 sequences become U+FFFD and the line
    /// is kept.
    pub fn parse_bytes(&self, line: &[u8]) -> ParseOutcome {
        self.parse(&String::from_utf8_lossy(line))
    }

    pub fn parse(&self, line: &str) -> ParseOutcome {
        if line.trim().is_empty() {
            return Err(SkipReason::EmptyLine);
        }

        // `split` keeps trailing empty fields: "a,b,c," has four.
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < REQUIRED_FIELDS {
            return Err(SkipReason::TooFewFields);
        }

        let station_id = parts[0].trim();
        let date = parts[1].trim();
        let element = parts[2].trim();
        let value = parts[3].trim();

        if station_id.is_empty() || date.is_empty() || element.is_empty() {
            return Err(SkipReason::MissingRequiredField);
        }

        if sanitize_station_id(station_id).is_empty() {
            return Err(SkipReason::ParseError(format!(
                "station id '{}' has no storable characters",
                station_id
            )));
        }

        let optional = |index: usize| parts.get(index).copied().unwrap_or("");

        Ok(WeatherRecord::new(
            station_id.to_string(),
            date.to_string(),
            element.to_string(),
            value.to_string(),
        )
        .with_m_flag(optional(4))
        .with_q_flag(optional(5))
        .with_s_flag(optional(6))
        .with_obs_time(optional(7)))
    }
}
