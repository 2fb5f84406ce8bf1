use chrono::{Datelike, NaiveDate};

use crate::patterns::extract_year;

pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// One row of the reports file. `None` marks an empty CSV cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub recipients_raw: Option<String>,
    pub replies_raw: Option<String>,
    pub date_of_report: Option<String>,
    pub coroner_area: Option<String>,
    pub coroner_name: Option<String>,
    pub category: Option<String>,
    pub inquest: Option<String>,
    pub circumstances: Option<String>,
}

impl Report {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date_of_report.as_deref().and_then(parse_report_date)
    }

    pub fn year(&self) -> Option<String> {
        self.date_of_report.as_deref().and_then(extract_year)
    }

    pub fn recipients(&self) -> Vec<&str> {
        self.recipients_raw
            .as_deref()
            .map(|raw| split_entries(raw).collect())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.category
            .as_deref()
            .map(|raw| split_entries(raw).collect())
            .unwrap_or_default()
    }

    /// The text the cause-of-death labeling reads.
    pub fn cause_section(&self) -> Option<String> {
        match (self.inquest.as_deref(), self.circumstances.as_deref()) {
            (Some(inquest), Some(circumstances)) => {
                Some(format!("{}\n\n{}", inquest, circumstances))
            }
            (Some(inquest), None) => Some(inquest.to_string()),
            _ => None,
        }
    }
}

/// Splits a pipe-delimited field, trimming entries and dropping empty ones.
pub fn split_entries(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|').map(str::trim).filter(|entry| !entry.is_empty())
}

pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Span between two dates in fractional years.
pub fn year_span(earliest: NaiveDate, latest: NaiveDate) -> f64 {
    (latest.year() - earliest.year()) as f64
        + (latest.month() as f64 - earliest.month() as f64) / 12.0
        + (latest.day() as f64 - earliest.day() as f64) / 365.0
}
