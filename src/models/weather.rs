use serde::{Deserialize, Serialize};

/// One daily observation from the GHCN-Daily by-year file.
///
/// Field order is the serialized order. Optional flags are either absent or
/// hold a non-empty trimmed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub station_id: String,

    /// YYYYMMDD, compared lexicographically.
    pub date: String,

    pub element: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m_flag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_flag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s_flag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obs_time: Option<String>,
}

impl WeatherRecord {
    pub fn new(station_id: String, date: String, element: String, value: String) -> Self {
        Self {
            station_id,
            date,
            element,
            value,
            m_flag: None,
            q_flag: None,
            s_flag: None,
            obs_time: None,
        }
    }

    pub fn with_m_flag(mut self, flag: &str) -> Self {
        self.m_flag = non_empty(flag);
        self
    }

    pub fn with_q_flag(mut self, flag: &str) -> Self {
        self.q_flag = non_empty(flag);
        self
    }

    pub fn with_s_flag(mut self, flag: &str) -> Self {
        self.s_flag = non_empty(flag);
        self
    }

    pub fn with_obs_time(mut self, obs_time: &str) -> Self {
        self.obs_time = non_empty(obs_time);
        self
    }

    /// Case-insensitive exact match on the element code.
    pub fn is_element(&self, element: &str) -> bool {
        self.element.eq_ignore_ascii_case(element)
    }

    /// Inclusive lexicographic date bounds; `None` leaves that side open.
    pub fn is_within(&self, start_date: Option<&str>, end_date: Option<&str>) -> bool {
        start_date.map_or(true, |start| self.date.as_str() >= start)
            && end_date.map_or(true, |end| self.date.as_str() <= end)
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
