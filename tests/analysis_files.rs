mod common;

use common::{today, write_file, REPORTS_CSV};
use pfd_stats::analysis::{analyze_reports, label_reports, CountOptions, LabelOptions};
use pfd_stats::counts::Section;
use pfd_stats::dataset::ReportTable;
use pfd_stats::output::write_statistics;
use pfd_stats::stats::SectionStats;
use pfd_stats::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn counts_write_tables_and_statistics() {
    let tmp = TempDir::new().expect("create temp dir");
    let reports = write_file(tmp.path(), "reports.csv", REPORTS_CSV);
    let statistics = write_file(tmp.path(), "statistics.toml", "[other]\nkept = 1\n");

    let cfg = Config::default();
    let options = CountOptions {
        reports,
        out_dir: tmp.path().join("counts"),
        statistics: statistics.clone(),
        today: today(),
        sections: Section::ALL.to_vec(),
        workers: Some(2),
    };
    let result = analyze_reports(&options, &cfg).expect("analysis succeeds");
    assert_eq!(result.report_count, 4);
    assert_eq!(result.sections.len(), Section::ALL.len());

    for file in [
        "area/area-counts.csv",
        "area/area-years.csv",
        "category/category-counts.csv",
        "gender/gender-years.csv",
        "name/top-name-years.csv",
        "year/year-counts.csv",
        "sent/recipient-counts.csv",
        "response/response-counts.csv",
        "response/reports-responses.csv",
    ] {
        assert!(options.out_dir.join(file).exists(), "missing {}", file);
    }

    let year_counts = fs::read_to_string(options.out_dir.join("year/year-counts.csv")).unwrap();
    assert_eq!(year_counts, "year,count\n2020,2\n2021,1\n");

    let augmented = ReportTable::read(&options.out_dir.join("response/reports-responses.csv")).unwrap();
    let status = augmented.column("response status").expect("status column");
    let statuses: Vec<&str> = augmented.rows.iter().map(|row| row[status].as_str()).collect();
    assert_eq!(statuses, vec!["completed", "overdue", "no requests", "failed"]);

    let written: toml::Table = toml::from_str(&fs::read_to_string(&statistics).unwrap()).unwrap();
    assert!(written.contains_key("other"));
    assert!(written.contains_key("coroner areas"));
    assert_eq!(
        written["responses"]["no. completed"].as_integer(),
        Some(1)
    );
    assert_eq!(
        written["year"]["earliest report"].as_str(),
        Some("2020-02-01")
    );
}

#[test]
fn only_selected_sections_run() {
    let tmp = TempDir::new().expect("create temp dir");
    let reports = write_file(tmp.path(), "reports.csv", REPORTS_CSV);

    let mut options = CountOptions::from_config(&Config::default());
    options.reports = reports;
    options.out_dir = tmp.path().join("counts");
    options.statistics = tmp.path().join("nested/statistics.toml");
    options.sections = vec![Section::Response];

    let result = analyze_reports(&options, &Config::default()).expect("analysis succeeds");
    assert_eq!(result.sections.len(), 1);
    assert!(result.section(Section::Response).is_some());
    assert!(!options.out_dir.join("area").exists());
    assert!(options.statistics.exists());
}

#[test]
fn missing_reports_file_is_an_error() {
    let tmp = TempDir::new().expect("create temp dir");
    let mut options = CountOptions::from_config(&Config::default());
    options.reports = tmp.path().join("absent.csv");

    let err = analyze_reports(&options, &Config::default()).unwrap_err();
    assert!(err.to_string().contains("Reports file not found"));
}

#[test]
fn statistics_sections_replace_existing_ones() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = write_file(tmp.path(), "statistics.toml", "[year]\nstale = true\n");

    let mut section = SectionStats::default();
    section.insert("no. years covered", 2usize);
    let statistics = [("year".to_string(), section)].into_iter().collect();
    write_statistics(&path, &statistics).expect("write statistics");

    let written: toml::Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(written["year"].get("stale").is_none());
    assert_eq!(written["year"]["no. years covered"].as_integer(), Some(2));
}

#[test]
fn labels_are_written_to_the_output_column() {
    let tmp = TempDir::new().expect("create temp dir");
    let reports = write_file(tmp.path(), "reports.csv", REPORTS_CSV);
    let causes = write_file(
        tmp.path(),
        "causes.txt",
        "# causes of death\nDrowning\n\nroad traffic collision\noverdose\n",
    );

    let cfg = Config::default();
    let options = LabelOptions {
        reports,
        causes,
        output: tmp.path().join("out/labelled.csv"),
        column: "tags".into(),
        max_num: 5,
        min_similarity: 0.3,
        workers: Some(1),
    };
    let labeled = label_reports(&options, &cfg).expect("labeling succeeds");
    assert_eq!(labeled, 2);

    let table = ReportTable::read(&options.output).unwrap();
    let tags = table.column("tags").expect("tags column");
    assert!(table.rows[0][tags].starts_with("drowning ("));
    assert!(table.rows[1][tags].starts_with("road traffic collision ("));
    assert_eq!(table.rows[2][tags], "");
}
