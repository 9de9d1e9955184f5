//! Subcommand handlers for preview, annotate, exposure and config actions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::args::{AnnotateArgs, ConfigAction, ExposureArgs, PreviewArgs};
use crate::camera::{mid_reference, FrameSource, SimulatedSensor};
use crate::config::{default_path, init_config, Config};
use crate::event_loop::{self, Preview, PreviewOptions};
use crate::exposure::{
    format_exposure_time, ControlInput, ControlKind, ExposureCoordinator, ExposureFormula,
    NullSink,
};
use crate::live::{LiveRenderer, SharedGain};
use crate::ramp::LIVE_RAMP;
use crate::snapshot::{load_still, Annotator, SnapshotStats};
use crate::terminal::RawModeGuard;
use crate::viewport::{Orientation, SharedViewport};

/// Error type shared by the subcommand handlers.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Run the live preview until the user quits.
pub async fn run_preview(
    config: &Config,
    formula: ExposureFormula,
    args: &PreviewArgs,
) -> CliResult<()> {
    let mut settings = config.source_settings();
    if let Some(fps) = args.fps {
        settings.fps = fps.max(1);
    }
    if let Some(degrees) = args.orientation {
        settings.orientation = Orientation::from_degrees(degrees);
    }

    let mut source = match &args.still {
        Some(path) => FrameSource::still(path, settings)?,
        None => FrameSource::synthetic(settings)?,
    };
    let settings = source.settings().clone();

    let viewport = Arc::new(SharedViewport::new());
    viewport.set_source_size(settings.width, settings.height, settings.orientation);

    let gain = Arc::new(SharedGain::new(config.preview.initial_gain));
    let mut renderer = LiveRenderer::new(viewport, Arc::clone(&gain));
    renderer.prepare(LIVE_RAMP)?;

    let mut caps = config.hardware_caps();
    caps.orientation = settings.orientation;
    let sensor = SimulatedSensor::new(
        source.response(),
        mid_reference(&caps, formula),
        formula,
        caps.aperture(),
    );
    let exposure = ExposureCoordinator::new(
        caps,
        config.controls.max_progress,
        formula,
        Box::new(sensor),
        gain,
    );

    let options = PreviewOptions {
        annotator: Annotator::new(config.annotator_config()),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.snapshot.output_dir.clone()),
        step: config.controls.step,
        fps: settings.fps,
    };
    let mut preview = Preview::new(renderer, source.slot(), exposure, options);
    if args.no_status {
        preview.status_bar_mut().visible = false;
    }

    source.start()?;
    log::info!(
        "Preview started: {}x{} at {} fps, orientation {}°",
        settings.width,
        settings.height,
        settings.fps,
        settings.orientation.degrees()
    );

    let mut guard = RawModeGuard::enter()?;
    let result = event_loop::run(&mut preview).await;
    let restored = guard.exit();
    source.stop();

    result?;
    restored?;
    log::info!("Preview stopped after {} capture(s)", preview.exposure().captures());
    Ok(())
}

/// `<input stem>-annotated.png` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    input.with_file_name(format!("{}-annotated.png", stem))
}

/// Annotate a still on disk and write the result.
///
/// Returns where the image was written and the statistics printed on it.
pub fn run_annotate(config: &Config, args: &AnnotateArgs) -> CliResult<(PathBuf, SnapshotStats)> {
    let mut annotator_config = config.annotator_config();
    if let Some(width) = args.legend_width {
        annotator_config.legend_width = width;
    }

    let image = load_still(&args.input)?;
    let annotated = Annotator::new(annotator_config).annotate(&image, args.brightness.as_deref())?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    annotated.save(&output)?;
    log::info!(
        "Annotated {} ({}x{}) -> {}",
        args.input.display(),
        image.width(),
        image.height(),
        output.display()
    );
    Ok((output, annotated.stats))
}

/// Print what `annotate` produced.
pub fn print_annotation(output: &Path, stats: &SnapshotStats) {
    for line in stats.lines() {
        println!("{}", line);
    }
    let thresholds: Vec<String> = stats
        .estimate
        .thresholds
        .iter()
        .map(|t| format!("{:.2}", t))
        .collect();
    println!("Band thresholds: {}", thresholds.join(" / "));
    println!("Saved {}", output.display());
}

/// Resolve one control input against the configured hardware and describe
/// the outcome, one line per quantity.
pub fn exposure_report(
    config: &Config,
    formula: ExposureFormula,
    args: &ExposureArgs,
) -> Vec<String> {
    let gain = Arc::new(SharedGain::new(config.preview.initial_gain));
    let mut exposure = ExposureCoordinator::new(
        config.hardware_caps(),
        config.controls.max_progress,
        formula,
        Box::new(NullSink),
        gain,
    );

    let kind = ControlKind::from(args.control);
    let mut lines = vec![format!(
        "control: {} @ {}/{}",
        kind.as_str(),
        args.progress.min(exposure.max_progress()),
        exposure.max_progress()
    )];

    if exposure.apply(ControlInput::new(kind, args.progress)).is_none() {
        lines.push("input ignored: hardware range unavailable".to_string());
    }

    let settings = exposure.state().settings;
    lines.push(format!("ISO: {}", settings.iso));
    lines.push(format!(
        "exposure: {} ({} ns)",
        format_exposure_time(settings.exposure_ns),
        settings.exposure_ns
    ));
    lines.push(format!("gain: {:.2}", exposure.gain()));
    lines.push(format!("mode: {}", exposure.mode_label()));
    lines.push(format!("formula: {}", formula.as_str()));
    lines.push(exposure.display());
    lines
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: &ConfigAction,
    config: &Config,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            if path.exists() {
                println!("# Config file: {} (exists)", path.display());
            } else {
                println!("# Config file: {} (not found, showing defaults)", path.display());
            }
            println!();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init => {
            init_config(&path)?;
            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
