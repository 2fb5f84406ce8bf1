use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::counts::{CountSection, OutputTable, Table};
use crate::stats::{SectionStats, ValueCounts};

/// Statistics from every section of one run, keyed by section title.
pub type Statistics = BTreeMap<String, SectionStats>;

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    match table {
        Table::Rows(rows) => rows.write(path),
        Table::Counts(counts) => write_records(path, &counts_header(counts), &counts_records(counts)),
        Table::Cross(cross) => {
            let (header, records) = cross.to_records();
            write_records(path, &header, &records)
        }
    }
}

fn counts_header(counts: &ValueCounts) -> Vec<String> {
    vec![counts.key_name.clone(), "count".to_string()]
}

fn counts_records(counts: &ValueCounts) -> Vec<Vec<String>> {
    counts
        .counts
        .iter()
        .map(|(key, count)| vec![key.clone(), count.to_string()])
        .collect()
}

fn write_records(path: &Path, header: &[String], records: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Writes every table of `section` under `<out_dir>/<section dir>/`.
pub fn write_section(out_dir: &Path, section: &CountSection) -> Result<Vec<PathBuf>> {
    let dir = out_dir.join(section.section.dir());
    fs::create_dir_all(&dir).with_context(|| format!("create_dir_all {}", dir.display()))?;

    let mut written = Vec::with_capacity(section.tables.len());
    for OutputTable { file_name, table } in &section.tables {
        let path = dir.join(file_name);
        write_table(&path, table)?;
        written.push(path);
    }

    info!(
        action = "write",
        component = "count_tables",
        section = section.section.title(),
        table_count = written.len(),
        directory = ?dir,
        "Wrote count tables"
    );
    Ok(written)
}

/// Merges `statistics` into the TOML file at `path`, keeping sections it does not replace.
pub fn write_statistics(path: &Path, statistics: &Statistics) -> Result<()> {
    let mut document: toml::Table = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading statistics: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing TOML: {}", path.display()))?
    } else {
        toml::Table::new()
    };

    for (title, section) in statistics {
        let value = toml::Value::try_from(section)
            .with_context(|| format!("serializing statistics section '{}'", title))?;
        document.insert(title.clone(), value);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create_dir_all {}", parent.display()))?;
    }
    let rendered = toml::to_string(&document).context("serializing statistics")?;
    fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;

    info!(
        action = "write",
        component = "statistics",
        section_count = statistics.len(),
        file_path = ?path,
        "Statistics saved"
    );
    Ok(())
}
