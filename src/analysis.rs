use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::counts::{self, CountSection, References, Section};
use crate::dataset::{self, ReportTable};
use crate::labels::{self, CauseLabeler, HashingEmbedder};
use crate::output::{self, Statistics};
use crate::report::Report;
use crate::response::ResponseClassifier;
use crate::utils::format_number;

#[derive(Debug, Clone)]
pub struct CountOptions {
    pub reports: PathBuf,
    pub out_dir: PathBuf,
    pub statistics: PathBuf,
    pub today: NaiveDate,
    pub sections: Vec<Section>,
    pub workers: Option<usize>,
}

impl CountOptions {
    /// Configured values, with `today` set to the local date and every section enabled.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            reports: cfg.paths.reports.clone(),
            out_dir: cfg.paths.out_dir.clone(),
            statistics: cfg.paths.statistics.clone(),
            today: Local::now().date_naive(),
            sections: Section::ALL.to_vec(),
            workers: None,
        }
    }
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub report_count: usize,
    /// Earliest and latest report dates, and the days between them.
    pub date_range: Option<(NaiveDate, NaiveDate, i64)>,
    pub sections: Vec<CountSection>,
}

impl AnalysisResult {
    pub fn statistics(&self) -> Statistics {
        self.sections
            .iter()
            .map(|section| {
                (
                    section.section.title().to_string(),
                    section.statistics.clone(),
                )
            })
            .collect()
    }

    pub fn section(&self, section: Section) -> Option<&CountSection> {
        self.sections.iter().find(|s| s.section == section)
    }
}

pub fn thread_pool(workers: Option<usize>) -> Result<rayon::ThreadPool> {
    let max_workers = workers.unwrap_or_else(|| {
        let cpu_count = num_cpus::get();
        std::cmp::min(cpu_count, 8)
    });

    info!(action = "configure", component = "thread_pool", worker_count = max_workers, "Using workers for processing");

    rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .build()
        .context("building worker thread pool")
}

pub fn load_references(cfg: &Config, sections: &[Section]) -> Result<References> {
    let mut references = References::default();

    if sections.contains(&Section::Category) {
        if let Some(path) = cfg.paths.categories() {
            references.categories = Some(dataset::load_categories(path)?);
        }
    }
    if sections.contains(&Section::Gender) || sections.contains(&Section::Name) {
        if let Some(path) = cfg.paths.coroner_names() {
            references.coroner_names = Some(dataset::load_coroner_names(path)?);
        }
    }

    Ok(references)
}

pub fn date_range(reports: &[Report]) -> Option<(NaiveDate, NaiveDate, i64)> {
    let dates: Vec<NaiveDate> = reports.iter().filter_map(Report::date).collect();
    let earliest = *dates.iter().min()?;
    let latest = *dates.iter().max()?;
    Some((earliest, latest, (latest - earliest).num_days()))
}

/// Runs the requested count sections over an already loaded table.
pub fn count_reports(
    table: &ReportTable,
    cfg: &Config,
    references: &References,
    today: NaiveDate,
    sections: &[Section],
) -> AnalysisResult {
    let reports = table.reports(&cfg.columns);
    let mut results = Vec::with_capacity(sections.len());

    for section in Section::ALL.iter().filter(|s| sections.contains(s)) {
        let start_time = Instant::now();
        let result = match section {
            Section::Area => counts::area_counts(&reports),
            Section::Category => {
                counts::category_counts(&reports, references.categories.as_deref())
            }
            Section::Gender => {
                counts::gender_counts(&reports, references.coroner_names.as_deref())
            }
            Section::Name => counts::name_counts(
                &reports,
                references.coroner_names.as_deref(),
                cfg.counts.top_names,
            ),
            Section::Year => counts::year_counts(&reports),
            Section::Sent => counts::sent_counts(&reports),
            Section::Response => {
                let classifier = ResponseClassifier::new(&cfg.response);
                let classifications = counts::classify_reports(&reports, &classifier, today);
                counts::response_counts(table, &reports, &classifications)
            }
        };

        info!(
            action = "complete",
            component = "counts",
            section = section.title(),
            distinct_values = result.headline.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Section counted"
        );
        results.push(result);
    }

    AnalysisResult {
        report_count: reports.len(),
        date_range: date_range(&reports),
        sections: results,
    }
}

pub fn analyze_reports(options: &CountOptions, cfg: &Config) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", "Starting report analysis");

    let table = ReportTable::read(&options.reports)?;
    let references = load_references(cfg, &options.sections)?;

    let pool = thread_pool(options.workers)?;
    let result = pool.install(|| {
        count_reports(&table, cfg, &references, options.today, &options.sections)
    });

    for section in &result.sections {
        output::write_section(&options.out_dir, section)?;
    }
    output::write_statistics(&options.statistics, &result.statistics())?;

    info!(
        action = "complete",
        component = "analysis",
        report_count = result.report_count,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(result)
}

#[derive(Debug, Clone)]
pub struct LabelOptions {
    pub reports: PathBuf,
    pub causes: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub max_num: usize,
    pub min_similarity: f64,
    pub workers: Option<usize>,
}

impl LabelOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            reports: cfg.paths.reports.clone(),
            causes: cfg.labels.causes.clone(),
            output: cfg.labels.output.clone(),
            column: cfg.labels.column.clone(),
            max_num: cfg.labels.max_num,
            min_similarity: cfg.labels.min_similarity,
            workers: None,
        }
    }
}

/// Labels every report and writes the table with the label column added.
pub fn label_reports(options: &LabelOptions, cfg: &Config) -> Result<usize> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "labeling", "Starting cause labeling");

    let mut table = ReportTable::read(&options.reports)?;
    let causes = labels::load_causes(&options.causes)?;
    if causes.is_empty() {
        warn!(action = "load", component = "causes_file", file_path = ?options.causes, "No causes found, every label will be empty");
    }
    let reports = table.reports(&cfg.columns);

    let embedder = HashingEmbedder::new(cfg.labels.dimensions);
    let pool = thread_pool(options.workers)?;
    let report_labels = pool.install(|| {
        let labeler = CauseLabeler::new(&embedder, causes, options.max_num, options.min_similarity);
        labeler.label_reports(&reports)
    });

    let labeled = report_labels.iter().filter(|l| !l.is_empty()).count();
    table.set_column(
        &options.column,
        report_labels.iter().map(|l| labels::format_labels(l)),
    );

    if let Some(parent) = options.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create_dir_all {}", parent.display()))?;
    }
    table.write(&options.output)?;

    info!(
        action = "complete",
        component = "labeling",
        labeled_count = labeled,
        output = ?options.output,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Labeling completed successfully"
    );
    Ok(labeled)
}

pub fn print_analysis_results(result: &AnalysisResult, top: Option<usize>) {
    println!("\n--- Prevention of Future Deaths Report Analysis ---");
    println!(
        "Reports analysed: {}",
        format_number(result.report_count as u64)
    );

    match &result.date_range {
        Some((earliest, latest, days_between)) => println!(
            "Date range: {} to {} ({} days)",
            earliest.format("%B %-d, %Y"),
            latest.format("%B %-d, %Y"),
            format_number((*days_between).max(0) as u64)
        ),
        None => println!("Date range: No data available"),
    }

    for section in &result.sections {
        println!(
            "\n{} ({} distinct values):",
            section.section.title(),
            format_number(section.headline.len() as u64)
        );
        for (key, value) in &section.statistics.0 {
            println!("  {}: {}", key, crate::utils::format_stat(value));
        }

        if let Some(top_count) = top {
            println!(
                "  Top {}:",
                std::cmp::min(top_count, section.headline.len())
            );
            for (key, count) in section.headline.counts.iter().take(top_count) {
                println!("  - {}: {}", key, format_number(*count));
            }
        }
    }
}
