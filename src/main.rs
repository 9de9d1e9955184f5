use clap::Parser;

use falsecolor::cli::{self, Args, Command, PreviewArgs};
use falsecolor::config::Config;
use falsecolor::logger;

/// Print an error and exit with status 1.
fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn main() {
    let args = Args::parse();

    // The preview owns the terminal, so only warnings get through there
    let default_level = match args.command {
        None | Some(Command::Preview(_)) => "warn",
        Some(_) => "info",
    };
    logger::init(default_level);

    // An explicit --config must load; the default location falls back to
    // built-in settings
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) if args.config.is_some() => fail(e),
        Err(e) => {
            eprintln!("Warning: {}", e);
            eprintln!("Using default settings.\n");
            Config::default()
        }
    };
    let formula = args
        .formula
        .map(Into::into)
        .unwrap_or(config.exposure.formula);

    match args.command {
        Some(Command::Annotate(annotate)) => match cli::run_annotate(&config, &annotate) {
            Ok((output, stats)) => cli::print_annotation(&output, &stats),
            Err(e) => fail(e),
        },
        Some(Command::Exposure(exposure)) => {
            for line in cli::exposure_report(&config, formula, &exposure) {
                println!("{}", line);
            }
        }
        Some(Command::Config { action }) => {
            if let Err(e) = cli::handle_config_action(&action, &config, args.config.as_deref()) {
                fail(e);
            }
        }
        Some(Command::Preview(preview)) => run_preview(&config, formula, &preview),
        None => run_preview(&config, formula, &PreviewArgs::default()),
    }
}

fn run_preview(config: &Config, formula: falsecolor::exposure::ExposureFormula, args: &PreviewArgs) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(format!("Failed to create async runtime: {}", e)),
    };
    if let Err(e) = rt.block_on(cli::run_preview(config, formula, args)) {
        fail(e);
    }
}
