use anyhow::Result;
use clap::Parser;
use tracing::error;

use pfd_stats::analysis::{print_analysis_results, CountOptions, LabelOptions};
use pfd_stats::args::{Args, Command};
use pfd_stats::utils::{setup_logging, validate_args};
use pfd_stats::{analyze_reports, init_default_config, label_reports, Config};

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Counts {
            reports,
            out_dir,
            statistics,
            today,
            only,
            top,
        } => {
            let cfg = Config::resolve(args.config.as_deref())?;
            let mut options = CountOptions::from_config(&cfg);
            options.workers = args.workers;
            if let Some(reports) = reports {
                options.reports = reports;
            }
            if let Some(out_dir) = out_dir {
                options.out_dir = out_dir;
            }
            if let Some(statistics) = statistics {
                options.statistics = statistics;
            }
            if let Some(today) = today {
                options.today = today;
            }
            if !only.is_empty() {
                options.sections = only;
            }

            let result = analyze_reports(&options, &cfg)?;
            print_analysis_results(&result, top);
        }
        Command::Label {
            reports,
            causes,
            output,
            label,
            max_num,
            min_similarity,
        } => {
            let cfg = Config::resolve(args.config.as_deref())?;
            let mut options = LabelOptions::from_config(&cfg);
            options.workers = args.workers;
            if let Some(reports) = reports {
                options.reports = reports;
            }
            if let Some(causes) = causes {
                options.causes = causes;
            }
            if let Some(output) = output {
                options.output = output;
            }
            if let Some(label) = label {
                options.column = label;
            }
            if let Some(max_num) = max_num {
                options.max_num = max_num;
            }
            if let Some(min_similarity) = min_similarity {
                options.min_similarity = min_similarity;
            }

            let labeled = label_reports(&options, &cfg)?;
            println!(
                "Labelled {} reports, written to {}",
                labeled,
                options.output.display()
            );
        }
        Command::Init => init_default_config()?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
