#![allow(dead_code)]

use chrono::NaiveDate;
use pfd_stats::dataset::ReportTable;
use pfd_stats::Report;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORTS_CSV: &str = "\
date_of_report,coroner_name,coroner_area,category,this_report_is_being_sent_to,reply_urls,inquest,circumstances
01/02/2020,Mr John Smith,London,Suicide | Road,NHS England | Police,https://www.judiciary.uk/wp-content/uploads/2020/03/Response-from-NHS-England.pdf | https://www.judiciary.uk/wp-content/uploads/2020/04/Response-from-Police.pdf,He was found in the river. The cause of death was drowning,
15/06/2020,Mrs Jane Doe,Kent,Road,Council,,Inquest into a road traffic collision,The car left the road
10/03/2021,Mr John Smith,London,Other | Road,,,,
bad date,Dr Who,,Suicide,Trust,,,
";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2024, 6, 1)
}

pub fn report(recipients: Option<&str>, replies: Option<&str>, date_of_report: &str) -> Report {
    Report {
        recipients_raw: recipients.map(str::to_string),
        replies_raw: replies.map(str::to_string),
        date_of_report: Some(date_of_report.to_string()),
        ..Default::default()
    }
}

pub fn table(csv_text: &str) -> ReportTable {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    ReportTable::from_reader(&mut reader).expect("parse fixture CSV")
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture file");
    path
}
