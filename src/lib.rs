pub mod analysis;
pub mod args;
pub mod config;
pub mod counts;
pub mod dataset;
pub mod labels;
pub mod output;
pub mod patterns;
pub mod report;
pub mod response;
pub mod stats;
pub mod utils;

pub use analysis::{analyze_reports, label_reports, AnalysisResult, CountOptions, LabelOptions};
pub use args::Args;
pub use config::{init_default_config, Config};
pub use report::Report;
pub use response::{classify, Classification, ReplyStatus, ResponseClassifier, ResponseStatus};
