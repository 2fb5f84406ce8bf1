use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::stats::StatValue;

/// `RUST_LOG` wins over `--verbose` when set.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .try_init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

pub fn format_stat(value: &StatValue) -> String {
    match value {
        StatValue::Count(count) => format_number(*count),
        StatValue::Float(value) => value.to_string(),
        StatValue::Range(values) => format!(
            "[{}]",
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        StatValue::Date(date) => date.format("%B %-d, %Y").to_string(),
    }
}

pub fn validate_args(args: &Args) -> anyhow::Result<()> {
    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    match &args.command {
        Command::Counts { top: Some(0), .. } => {
            anyhow::bail!("--top must be greater than 0");
        }
        Command::Label {
            max_num: Some(0), ..
        } => {
            anyhow::bail!("--max-num must be greater than 0");
        }
        Command::Label {
            min_similarity: Some(similarity),
            ..
        } if !(-1.0..=1.0).contains(similarity) => {
            anyhow::bail!("--min-similarity must be between -1 and 1");
        }
        _ => {}
    }

    Ok(())
}
