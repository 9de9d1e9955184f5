//! Command-line interface definitions and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{AnnotateArgs, Args, Command, ConfigAction, ExposureArgs, PreviewArgs};
pub use commands::{
    default_output_path, exposure_report, handle_config_action, print_annotation, run_annotate,
    run_preview, CliResult,
};
pub use enums::{Control, Formula};
