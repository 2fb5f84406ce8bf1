use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Columns;
use crate::report::Report;

/// A CSV file held in memory with its header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        info!(action = "start", component = "csv_read", file_path = ?path, "Reading reports");

        if !path.exists() {
            anyhow::bail!("Reports file not found: {:?}", path);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let table = Self::from_reader(&mut reader)
            .with_context(|| format!("reading {}", path.display()))?;

        info!(
            action = "complete",
            component = "csv_read",
            row_count = table.rows.len(),
            column_count = table.headers.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Reports loaded"
        );
        Ok(table)
    }

    pub fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let headers = reader
            .headers()
            .context("reading CSV header row")?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = headers.len();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("reading CSV row {}", index + 2))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // Rows are padded or cut to line up with the header
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// The cell value, `None` for a missing column or an empty cell.
    pub fn cell(&self, row: usize, column: Option<usize>) -> Option<&str> {
        let value = self.rows.get(row)?.get(column?)?;
        if value.is_empty() {
            None
        } else {
            Some(value.as_str())
        }
    }

    /// Sets `name` on every row, appending the column when it does not exist yet.
    pub fn set_column<I>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        let index = match self.column(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };

        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
    }

    pub fn reports(&self, columns: &Columns) -> Vec<Report> {
        let lookup = |name: &str| {
            let index = self.column(name);
            if index.is_none() {
                warn!(action = "lookup", component = "columns", column = name, "Column missing from reports, treating as empty");
            }
            index
        };

        let recipients = lookup(&columns.recipients);
        let replies = lookup(&columns.replies);
        let date = lookup(&columns.date);
        let area = lookup(&columns.area);
        let name = lookup(&columns.name);
        let category = lookup(&columns.category);
        let inquest = lookup(&columns.inquest);
        let circumstances = lookup(&columns.circumstances);

        let owned = |row: usize, column: Option<usize>| self.cell(row, column).map(str::to_string);

        (0..self.rows.len())
            .map(|row| Report {
                recipients_raw: owned(row, recipients),
                replies_raw: owned(row, replies),
                date_of_report: owned(row, date),
                coroner_area: owned(row, area),
                coroner_name: owned(row, name),
                category: owned(row, category),
                inquest: owned(row, inquest),
                circumstances: owned(row, circumstances),
            })
            .collect()
    }
}

/// Known categories from a JSON array of objects whose values are category names.
pub fn load_categories(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading categories: {}", path.display()))?;
    let entries: Vec<BTreeMap<String, String>> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing JSON: {}", path.display()))?;

    let categories: BTreeSet<String> = entries
        .into_iter()
        .flat_map(|entry| entry.into_values())
        .collect();

    info!(action = "loaded", component = "categories_file", category_count = categories.len(), file_path = ?path, "Loaded known categories");
    Ok(categories.into_iter().collect())
}

/// Coroner names from a JSON array of strings.
pub fn load_coroner_names(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading coroner names: {}", path.display()))?;
    let names: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing JSON: {}", path.display()))?;

    info!(action = "loaded", component = "coroner_names_file", name_count = names.len(), file_path = ?path, "Loaded coroner names");
    Ok(names)
}
