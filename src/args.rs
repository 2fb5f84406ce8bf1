use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::counts::Section;

#[derive(Parser, Debug)]
#[command(
    name = "pfd-stats",
    about = "Count and tabulate coroner prevention of future deaths reports",
    version,
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config TOML. If omitted, uses ./pfd-stats.toml if present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of worker threads
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count reports by area, category, gender, name, year, recipient and response status
    Counts {
        /// The .csv file containing the reports
        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// Directory for the count tables
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Statistics file to merge the results into
        #[arg(short, long)]
        statistics: Option<PathBuf>,

        /// Date the response windows are measured to (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Only run these sections
        #[arg(long, value_enum, value_delimiter = ',')]
        only: Vec<Section>,

        /// Number of top entries to display per section
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Tag each report with its most likely causes of death
    Label {
        /// The .csv file containing the reports
        #[arg(short, long)]
        reports: Option<PathBuf>,

        /// The .txt file containing the causes of death
        #[arg(short, long)]
        causes: Option<PathBuf>,

        /// The .csv file to output the labelled reports to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The column to output the labels to
        #[arg(short, long)]
        label: Option<String>,

        /// Maximum number of causes per report
        #[arg(long)]
        max_num: Option<usize>,

        /// Minimum similarity for a cause to be kept
        #[arg(long)]
        min_similarity: Option<f64>,
    },

    /// Initialize pfd-stats.toml with default settings
    Init,
}
