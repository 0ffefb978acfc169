use crate::models::WeatherRecord;
use serde::Serialize;

/// Optional element and date constraints on a station's records.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl RecordFilter {
    pub fn new(element_type: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            element_type: present(element_type),
            start_date: present(start_date),
            end_date: present(end_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element_type.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn matches(&self, record: &WeatherRecord) -> bool {
        self.element_type
            .as_deref()
            .map_or(true, |element| record.is_element(element))
            && record.is_within(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Keep the records `filter` accepts, preserving their order.
pub fn filter_records(records: Vec<WeatherRecord>, filter: &RecordFilter) -> Vec<WeatherRecord> {
    if filter.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| filter.matches(r)).collect()
}
