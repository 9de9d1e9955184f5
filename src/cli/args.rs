//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Control, Formula};

/// Live pseudo-color preview and luminance-annotated stills
#[derive(Parser, Debug)]
#[command(name = "falsecolor")]
#[command(version, about = "Pseudo-color camera preview with exposure controls", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Exposure quantity formula (overrides config)
    #[arg(long, global = true)]
    pub formula: Option<Formula>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Live preview in the terminal (default)
    Preview(PreviewArgs),
    /// Annotate a still image with pseudo-color, legend and statistics
    Annotate(AnnotateArgs),
    /// Resolve one control input into ISO, exposure time and E
    Exposure(ExposureArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct PreviewArgs {
    /// Loop a still image instead of the synthetic test pattern
    #[arg(long)]
    pub still: Option<PathBuf>,

    /// Preview frame rate (overrides config)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Sensor orientation in degrees (overrides config)
    #[arg(long)]
    pub orientation: Option<i32>,

    /// Directory for captured snapshots (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Hide status line
    #[arg(long)]
    pub no_status: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AnnotateArgs {
    /// Still image to annotate (gray level in the red channel)
    pub input: PathBuf,

    /// Brightness metadata: a decimal or "numerator/denominator"
    #[arg(long, short, allow_hyphen_values = true)]
    pub brightness: Option<String>,

    /// Output path (default: <input>-annotated.png)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Legend width in pixels (overrides config)
    #[arg(long)]
    pub legend_width: Option<u32>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExposureArgs {
    /// Control to move
    #[arg(long)]
    pub control: Control,

    /// Control position (0 to max_progress)
    #[arg(long)]
    pub progress: u32,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["falsecolor"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
        assert!(args.formula.is_none());
    }

    #[test]
    fn test_preview_flags() {
        let args = Args::parse_from([
            "falsecolor",
            "preview",
            "--still",
            "in.png",
            "--fps",
            "15",
            "--orientation",
            "270",
            "--no-status",
        ]);
        match args.command {
            Some(Command::Preview(p)) => {
                assert_eq!(p.still, Some(PathBuf::from("in.png")));
                assert_eq!(p.fps, Some(15));
                assert_eq!(p.orientation, Some(270));
                assert!(p.no_status);
                assert!(p.output_dir.is_none());
            }
            other => panic!("Expected Preview, got {:?}", other),
        }
    }

    #[test]
    fn test_annotate_args() {
        let args = Args::parse_from([
            "falsecolor",
            "annotate",
            "shot.jpg",
            "--brightness",
            "-3/2",
            "-o",
            "out.png",
        ]);
        match args.command {
            Some(Command::Annotate(a)) => {
                assert_eq!(a.input, PathBuf::from("shot.jpg"));
                assert_eq!(a.brightness.as_deref(), Some("-3/2"));
                assert_eq!(a.output, Some(PathBuf::from("out.png")));
                assert!(a.legend_width.is_none());
            }
            other => panic!("Expected Annotate, got {:?}", other),
        }
    }

    #[test]
    fn test_exposure_args() {
        let args = Args::parse_from([
            "falsecolor",
            "exposure",
            "--control",
            "brightness",
            "--progress",
            "2500",
        ]);
        match args.command {
            Some(Command::Exposure(e)) => {
                assert_eq!(e.control, Control::Brightness);
                assert_eq!(e.progress, 2500);
            }
            other => panic!("Expected Exposure, got {:?}", other),
        }
    }

    #[test]
    fn test_exposure_requires_control() {
        assert!(Args::try_parse_from(["falsecolor", "exposure", "--progress", "1"]).is_err());
        assert!(Args::try_parse_from([
            "falsecolor",
            "exposure",
            "--control",
            "zoom",
            "--progress",
            "1"
        ])
        .is_err());
    }

    #[test]
    fn test_global_config_and_formula() {
        let args = Args::parse_from([
            "falsecolor",
            "config",
            "show",
            "--config",
            "/tmp/c.toml",
            "--formula",
            "iso-time-aperture",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(args.formula, Some(Formula::IsoTimeAperture));
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }
}
