use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A value in a statistics section of `statistics.toml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(u64),
    Float(f64),
    Range(Vec<f64>),
    Date(NaiveDate),
}

impl From<usize> for StatValue {
    fn from(value: usize) -> Self {
        StatValue::Count(value as u64)
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Count(value)
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Float(value)
    }
}

impl From<NaiveDate> for StatValue {
    fn from(value: NaiveDate) -> Self {
        StatValue::Date(value)
    }
}

/// Statistics for one section, keyed by a human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionStats(pub BTreeMap<String, StatValue>);

impl SectionStats {
    pub fn insert(&mut self, key: &str, value: impl Into<StatValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.0.get(key)
    }

    /// Adds mean, median and interquartile range of `counts`, e.g. "mean per area".
    pub fn insert_summary(&mut self, label: &str, plural: &str, counts: &ValueCounts) {
        let values = counts.values();
        if let Some(mean) = mean(&values) {
            self.insert(&format!("mean per {}", label), round1(mean));
        }
        if let Some(median) = quantile(&values, 0.5) {
            self.insert(&format!("median per {}", label), median);
        }
        if let (Some(lower), Some(upper)) = (quantile(&values, 0.25), quantile(&values, 0.75)) {
            self.0.insert(
                format!("IQR of {}", plural),
                StatValue::Range(vec![lower, upper]),
            );
        }
    }
}

/// Counts per key, sorted by descending count then ascending key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts {
    pub key_name: String,
    pub counts: Vec<(String, u64)>,
}

impl ValueCounts {
    pub fn from_map(key_name: &str, map: HashMap<String, u64>) -> Self {
        let mut counts: Vec<(String, u64)> = map.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self {
            key_name: key_name.to_string(),
            counts,
        }
    }

    /// Counts keyed in ascending key order instead of by count.
    pub fn sorted_by_key(mut self) -> Self {
        self.counts.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.iter().any(|(k, _)| k == key)
    }

    pub fn head(&self, n: usize) -> Self {
        Self {
            key_name: self.key_name.clone(),
            counts: self.counts.iter().take(n).cloned().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.counts.iter().map(|(_, count)| *count as f64).collect()
    }
}

/// Counts of `(row, column)` pairs, e.g. reports per year and area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTab {
    pub index_name: String,
    /// Sorted, unless narrowed with [`CrossTab::select`].
    pub columns: Vec<String>,
    pub rows: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CrossTab {
    pub fn new(index_name: &str) -> Self {
        Self {
            index_name: index_name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_pairs<I>(index_name: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::new(index_name);
        for (row, column) in pairs {
            table.add(row, column, 1);
        }
        table
    }

    pub fn add(&mut self, row: String, column: String, count: u64) {
        if let Err(position) = self.columns.binary_search(&column) {
            self.columns.insert(position, column.clone());
        }
        *self.rows.entry(row).or_default().entry(column).or_insert(0) += count;
    }

    pub fn get(&self, row: &str, column: &str) -> u64 {
        self.rows
            .get(row)
            .and_then(|columns| columns.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// Keeps only the given columns, in their given order.
    pub fn select(&self, columns: &[&str]) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|(row, counts)| {
                let kept = counts
                    .iter()
                    .filter(|(column, _)| columns.contains(&column.as_str()))
                    .map(|(column, count)| (column.clone(), *count))
                    .collect();
                (row.clone(), kept)
            })
            .collect();

        Self {
            index_name: self.index_name.clone(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }

    /// Header and rows with missing cells filled with 0.
    pub fn to_records(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let mut header = vec![self.index_name.clone()];
        header.extend(self.columns.iter().cloned());

        let records = self
            .rows
            .iter()
            .map(|(row, counts)| {
                let mut record = vec![row.clone()];
                record.extend(
                    self.columns
                        .iter()
                        .map(|column| counts.get(column).copied().unwrap_or(0).to_string()),
                );
                record
            })
            .collect();

        (header, records)
    }
}

/// Counts every key produced by `keys` across `items`, in parallel.
pub fn count_values<T, F>(items: &[T], keys: F) -> HashMap<String, u64>
where
    T: Sync,
    F: Fn(&T) -> Vec<String> + Sync + Send,
{
    let partial_counts: Vec<HashMap<String, u64>> = items
        .par_iter()
        .fold(HashMap::new, |mut acc, item| {
            for key in keys(item) {
                *acc.entry(key).or_insert(0) += 1;
            }
            acc
        })
        .collect();

    // Merge all results from fold operations
    let mut counts = HashMap::new();
    for partial in partial_counts {
        for (key, count) in partial {
            *counts.entry(key).or_insert(0) += count;
        }
    }
    counts
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile with linear interpolation between the closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn percent(n: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(n as f64 / total as f64 * 100.0)
}
