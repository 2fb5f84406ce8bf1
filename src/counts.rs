use chrono::NaiveDate;
use clap::ValueEnum;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::dataset::ReportTable;
use crate::patterns::{gender_of, Gender};
use crate::report::{year_span, Report};
use crate::response::{Classification, ReplyStatus, ResponseClassifier, ResponseStatus};
use crate::stats::{count_values, CrossTab, SectionStats, ValueCounts};

pub const STATUS_COLUMN: &str = "response status";
pub const RECIPIENTS_COLUMN: &str = "no. recipients";
pub const REPLIES_COLUMN: &str = "no. replies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Section {
    Area,
    Category,
    Gender,
    Name,
    Year,
    Sent,
    Response,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Area,
        Section::Category,
        Section::Gender,
        Section::Name,
        Section::Year,
        Section::Sent,
        Section::Response,
    ];

    /// Table name in `statistics.toml`.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Area => "coroner areas",
            Section::Category => "death categories",
            Section::Gender => "coroner gender",
            Section::Name => "coroner name",
            Section::Year => "year",
            Section::Sent => "recipients",
            Section::Response => "responses",
        }
    }

    /// Sub-directory of the output directory.
    pub fn dir(&self) -> &'static str {
        match self {
            Section::Area => "area",
            Section::Category => "category",
            Section::Gender => "gender",
            Section::Name => "name",
            Section::Year => "year",
            Section::Sent => "sent",
            Section::Response => "response",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Table {
    Counts(ValueCounts),
    Cross(CrossTab),
    Rows(ReportTable),
}

#[derive(Debug, Clone)]
pub struct OutputTable {
    pub file_name: String,
    pub table: Table,
}

impl OutputTable {
    fn new(file_name: &str, table: Table) -> Self {
        Self {
            file_name: file_name.to_string(),
            table,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountSection {
    pub section: Section,
    pub statistics: SectionStats,
    pub tables: Vec<OutputTable>,
    /// The table printed in the summary.
    pub headline: ValueCounts,
}

/// Reference lists that refine some of the counts.
#[derive(Debug, Clone, Default)]
pub struct References {
    pub categories: Option<Vec<String>>,
    pub coroner_names: Option<Vec<String>>,
}

fn year_pairs<F>(reports: &[Report], key: F) -> Vec<(String, String)>
where
    F: Fn(&Report) -> Vec<String>,
{
    reports
        .iter()
        .filter_map(|report| Some((report.year()?, key(report))))
        .flat_map(|(year, keys)| keys.into_iter().map(move |k| (year.clone(), k)))
        .collect()
}

pub fn area_counts(reports: &[Report]) -> CountSection {
    let area = |report: &Report| report.coroner_area.iter().cloned().collect::<Vec<_>>();

    let area_years = CrossTab::from_pairs("year", year_pairs(reports, area));
    let sum_counts = ValueCounts::from_map("coroner_area", count_values(reports, area));

    let mut statistics = SectionStats::default();
    statistics.insert(
        "no. parsed reports",
        reports.iter().filter(|r| r.coroner_area.is_some()).count(),
    );
    statistics.insert("no. areas", sum_counts.len());
    statistics.insert_summary("area", "areas", &sum_counts);

    CountSection {
        section: Section::Area,
        statistics,
        tables: vec![
            OutputTable::new("area-years.csv", Table::Cross(area_years)),
            OutputTable::new("area-counts.csv", Table::Counts(sum_counts.clone())),
        ],
        headline: sum_counts,
    }
}

pub fn category_counts(reports: &[Report], known: Option<&[String]>) -> CountSection {
    let categories = |report: &Report| {
        report
            .categories()
            .into_iter()
            .filter(|category| known.map_or(true, |known| known.iter().any(|k| k == category)))
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    let category_years = CrossTab::from_pairs("year", year_pairs(reports, categories));
    let sum_counts = ValueCounts::from_map("category", count_values(reports, categories));

    let mut statistics = SectionStats::default();
    statistics.insert(
        "no. reports parsed",
        reports.iter().filter(|r| r.category.is_some()).count(),
    );
    statistics.insert("no. categories in reports", sum_counts.total());
    statistics.insert("no. categories", sum_counts.len());
    statistics.insert_summary("category", "categories", &sum_counts);

    CountSection {
        section: Section::Category,
        statistics,
        tables: vec![
            OutputTable::new("category-years.csv", Table::Cross(category_years)),
            OutputTable::new("category-counts.csv", Table::Counts(sum_counts.clone())),
        ],
        headline: sum_counts,
    }
}

pub fn gender_counts(reports: &[Report], coroner_names: Option<&[String]>) -> CountSection {
    let gender = |report: &Report| {
        report
            .coroner_name
            .as_deref()
            .map(|name| gender_of(name).to_string())
            .into_iter()
            .collect::<Vec<_>>()
    };

    let gender_years = CrossTab::from_pairs("year", year_pairs(reports, gender));
    let sum_counts = ValueCounts::from_map("gender", count_values(reports, gender));

    let mut statistics = SectionStats::default();
    if let Some(names) = coroner_names {
        let website_counts = ValueCounts::from_map(
            "gender",
            count_values(names, |name| vec![gender_of(name).to_string()]),
        );
        for gender in Gender::ALL {
            statistics.insert(
                &format!("no. coroners {}", gender),
                website_counts.get(gender.as_str()),
            );
        }
    }
    for gender in Gender::ALL {
        statistics.insert(
            &format!("no. reports {}", gender),
            sum_counts.get(gender.as_str()),
        );
    }

    CountSection {
        section: Section::Gender,
        statistics,
        tables: vec![
            OutputTable::new("gender-years.csv", Table::Cross(gender_years)),
            OutputTable::new("gender-counts.csv", Table::Counts(sum_counts.clone())),
        ],
        headline: sum_counts,
    }
}

pub fn name_counts(
    reports: &[Report],
    coroner_names: Option<&[String]>,
    top_n: usize,
) -> CountSection {
    let name = |report: &Report| report.coroner_name.iter().cloned().collect::<Vec<_>>();

    let name_years = CrossTab::from_pairs("year", year_pairs(reports, name));
    let sum_counts = ValueCounts::from_map("coroner_name", count_values(reports, name));

    let mut statistics = SectionStats::default();
    statistics.insert(
        "no. reports parsed",
        reports.iter().filter(|r| r.coroner_name.is_some()).count(),
    );
    statistics.insert("no. coroner names in reports", sum_counts.len());
    if let Some(names) = coroner_names {
        let with_reports = names.iter().filter(|n| sum_counts.contains(n)).count();
        statistics.insert("no. names in society with reports", with_reports);
        statistics.insert(
            "no. names in society without reports",
            names.len() - with_reports,
        );
    }
    statistics.insert_summary("name", "names", &sum_counts);

    let top_counts = sum_counts.head(top_n);
    let top_names: Vec<&str> = top_counts.keys().collect();
    let top_years = name_years.select(&top_names);

    CountSection {
        section: Section::Name,
        statistics,
        tables: vec![
            OutputTable::new("top-name-counts.csv", Table::Counts(top_counts.clone())),
            OutputTable::new("name-years.csv", Table::Cross(name_years)),
            OutputTable::new("top-name-years.csv", Table::Cross(top_years)),
            OutputTable::new("name-counts.csv", Table::Counts(sum_counts)),
        ],
        headline: top_counts,
    }
}

pub fn year_counts(reports: &[Report]) -> CountSection {
    let year_counts = ValueCounts::from_map(
        "year",
        count_values(reports, |report| report.year().into_iter().collect()),
    )
    .sorted_by_key();

    let dates: Vec<NaiveDate> = reports.iter().filter_map(Report::date).collect();
    let parsed = year_counts.total();

    let mut statistics = SectionStats::default();
    statistics.insert("no. reports parsed", parsed);
    statistics.insert("no. years covered", year_counts.len());
    statistics.insert_summary("year", "years", &year_counts);

    if let (Some(earliest), Some(latest)) = (dates.iter().min(), dates.iter().max()) {
        let span = year_span(*earliest, *latest);
        if span > 0.0 {
            statistics.insert("mean per year", crate::stats::round1(parsed as f64 / span));
        }
        statistics.insert("earliest report", *earliest);
        statistics.insert("latest report", *latest);
    }

    CountSection {
        section: Section::Year,
        statistics,
        tables: vec![OutputTable::new(
            "year-counts.csv",
            Table::Counts(year_counts.clone()),
        )],
        headline: year_counts,
    }
}

pub fn sent_counts(reports: &[Report]) -> CountSection {
    let recipients = |report: &Report| {
        report
            .recipients()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    let recipient_counts = ValueCounts::from_map("recipient", count_values(reports, recipients));

    let with_recipients = reports
        .iter()
        .filter(|report| !report.recipients().is_empty())
        .count();

    let mut statistics = SectionStats::default();
    statistics.insert("no. reports with recipients", with_recipients);
    statistics.insert("no. recipients", recipient_counts.total());
    statistics.insert("no. distinct recipients", recipient_counts.len());
    if with_recipients > 0 {
        statistics.insert(
            "mean recipients per report",
            crate::stats::round1(recipient_counts.total() as f64 / with_recipients as f64),
        );
    }

    CountSection {
        section: Section::Sent,
        statistics,
        tables: vec![OutputTable::new(
            "recipient-counts.csv",
            Table::Counts(recipient_counts.clone()),
        )],
        headline: recipient_counts,
    }
}

/// Classifies every report in parallel, keeping input order.
pub fn classify_reports(
    reports: &[Report],
    classifier: &ResponseClassifier,
    today: NaiveDate,
) -> Vec<Classification> {
    let start_time = Instant::now();
    let classifications: Vec<Classification> = reports
        .par_iter()
        .map(|report| classifier.classify(report, today))
        .collect();

    info!(
        action = "complete",
        component = "response_classification",
        report_count = classifications.len(),
        today = %today,
        duration_ms = start_time.elapsed().as_millis(),
        "Classified report responses"
    );
    classifications
}

/// Copies `table` with the response columns set from `classifications`.
pub fn augment_table(table: &ReportTable, classifications: &[Classification]) -> ReportTable {
    let mut augmented = table.clone();
    augmented.set_column(
        STATUS_COLUMN,
        classifications.iter().map(|c| c.status.to_string()),
    );
    augmented.set_column(
        RECIPIENTS_COLUMN,
        classifications.iter().map(|c| c.recipient_count.to_string()),
    );
    augmented.set_column(
        REPLIES_COLUMN,
        classifications.iter().map(|c| c.reply_count.to_string()),
    );
    augmented
}

fn status_by<F>(
    index_name: &str,
    reports: &[Report],
    classifications: &[Classification],
    field: F,
) -> CrossTab
where
    F: Fn(&Report) -> Option<&String>,
{
    CrossTab::from_pairs(
        index_name,
        reports
            .iter()
            .zip(classifications)
            .filter_map(|(report, c)| Some((field(report)?.clone(), c.status.to_string()))),
    )
}

pub fn response_counts(
    table: &ReportTable,
    reports: &[Report],
    classifications: &[Classification],
) -> CountSection {
    let mut status_map: HashMap<String, u64> = ResponseStatus::ALL
        .iter()
        .map(|status| (status.to_string(), 0))
        .collect();
    for classification in classifications {
        *status_map
            .entry(classification.status.to_string())
            .or_insert(0) += 1;
    }
    let status_counts = ValueCounts::from_map(STATUS_COLUMN, status_map);

    let area_responses = status_by("coroner_area", reports, classifications, |r| {
        r.coroner_area.as_ref()
    });
    let name_responses = status_by("coroner_name", reports, classifications, |r| {
        r.coroner_name.as_ref()
    });

    let mut recipient_responses = CrossTab::new("recipient");
    for recipient in classifications.iter().flat_map(|c| &c.recipients) {
        recipient_responses.add(recipient.recipient.clone(), recipient.status.to_string(), 1);
    }
    let recipient_statuses: Vec<&str> = ReplyStatus::ALL.iter().map(|s| s.as_str()).collect();
    let recipient_responses = recipient_responses.select(&recipient_statuses);

    let total = classifications.len() as u64;
    let with_requests = total - status_counts.get(ResponseStatus::NoRequests.as_str());
    let completed = status_counts.get(ResponseStatus::Completed.as_str());

    let mut statistics = SectionStats::default();
    statistics.insert("no. reports", total);
    statistics.insert("no. reports with requests", with_requests);
    for status in ResponseStatus::ALL {
        statistics.insert(
            &format!("no. {}", status),
            status_counts.get(status.as_str()),
        );
    }
    statistics.insert(
        "no. recipients",
        classifications.iter().map(|c| c.recipient_count).sum::<usize>(),
    );
    statistics.insert(
        "no. replies",
        classifications.iter().map(|c| c.reply_count).sum::<usize>(),
    );
    statistics.insert(
        "no. recipients responded",
        classifications.iter().map(|c| c.responded_count).sum::<usize>(),
    );
    statistics.insert(
        "percent completed",
        crate::stats::percent(completed, with_requests),
    );

    CountSection {
        section: Section::Response,
        statistics,
        tables: vec![
            OutputTable::new(
                "reports-responses.csv",
                Table::Rows(augment_table(table, classifications)),
            ),
            OutputTable::new("response-counts.csv", Table::Counts(status_counts.clone())),
            OutputTable::new("area-responses.csv", Table::Cross(area_responses)),
            OutputTable::new("name-responses.csv", Table::Cross(name_responses)),
            OutputTable::new("recipient-responses.csv", Table::Cross(recipient_responses)),
        ],
        headline: status_counts,
    }
}
