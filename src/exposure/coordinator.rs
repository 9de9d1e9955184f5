//! Reconciles the ISO, exposure-time and brightness controls.
//!
//! Whichever control was touched last is authoritative. ISO and exposure
//! time are fine, independent controls; brightness is a coarse control that
//! drives both from one position and also sets the preview gain. Touching
//! ISO or exposure time returns the brightness control to neutral, touching
//! brightness returns both fine controls to neutral.

use std::sync::Arc;

use super::types::{
    format_exposure_time, format_exposure_value, ExposureFormula, ExposureSettings, HardwareCaps,
};
use crate::live::{gain_for_progress, SharedGain};

/// Receives resolved exposure settings (the camera-control side).
pub trait ExposureSink: Send {
    /// Apply a new (ISO, exposure time) pair to the hardware.
    fn apply(&mut self, settings: ExposureSettings);

    /// Called after every applied change with the updated `E: ...` string.
    fn exposure_changed(&mut self, _display: &str) {}
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ExposureSink for NullSink {
    fn apply(&mut self, _settings: ExposureSettings) {}
}

/// The three manual controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Iso,
    Exposure,
    Brightness,
}

impl ControlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::Iso => "iso",
            ControlKind::Exposure => "exposure",
            ControlKind::Brightness => "brightness",
        }
    }
}

/// A control moved to a new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInput {
    pub kind: ControlKind,
    pub progress: u32,
}

impl ControlInput {
    pub fn new(kind: ControlKind, progress: u32) -> Self {
        Self { kind, progress }
    }
}

/// Which control currently owns the exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposureMode {
    #[default]
    Auto,
    IsoManual,
    ExposureManual,
    BrightnessManual,
}

impl ExposureMode {
    /// Short label shown next to the brightness control.
    pub fn label(self) -> &'static str {
        match self {
            ExposureMode::Auto => "auto",
            _ => "manual",
        }
    }
}

/// Control positions plus the resolved settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub mode: ExposureMode,
    pub iso_progress: u32,
    pub exposure_progress: u32,
    pub brightness_progress: u32,
    pub settings: ExposureSettings,
}

impl ControlState {
    pub fn new(settings: ExposureSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Recorded position of a control.
    pub fn progress(&self, kind: ControlKind) -> u32 {
        match kind {
            ControlKind::Iso => self.iso_progress,
            ControlKind::Exposure => self.exposure_progress,
            ControlKind::Brightness => self.brightness_progress,
        }
    }
}

/// Compute the state after `input`.
///
/// Returns `None` when the range the input needs was never reported; the
/// input is then ignored. Brightness needs both ranges.
pub fn transition(
    state: &ControlState,
    input: ControlInput,
    caps: &HardwareCaps,
    max_progress: u32,
) -> Option<ControlState> {
    let progress = input.progress.min(max_progress);
    let mut next = *state;

    match input.kind {
        ControlKind::Iso => {
            let range = caps.iso_range?;
            next.mode = ExposureMode::IsoManual;
            next.iso_progress = progress;
            next.brightness_progress = 0;
            next.settings.iso = range.lerp(progress, max_progress);
        }
        ControlKind::Exposure => {
            let range = caps.exposure_range?;
            next.mode = ExposureMode::ExposureManual;
            next.exposure_progress = progress;
            next.brightness_progress = 0;
            next.settings.exposure_ns = range.lerp(progress, max_progress);
        }
        ControlKind::Brightness => {
            let iso_range = caps.iso_range?;
            let exposure_range = caps.exposure_range?;
            next.mode = if progress == 0 {
                ExposureMode::Auto
            } else {
                ExposureMode::BrightnessManual
            };
            next.iso_progress = 0;
            next.exposure_progress = 0;
            next.brightness_progress = progress;
            next.settings = ExposureSettings {
                iso: iso_range.lerp(progress, max_progress),
                exposure_ns: exposure_range.lerp(progress, max_progress),
            };
        }
    }

    Some(next)
}

/// Owns the control state and pushes every change to the sink and the gain.
pub struct ExposureCoordinator {
    caps: HardwareCaps,
    max_progress: u32,
    formula: ExposureFormula,
    state: ControlState,
    sink: Box<dyn ExposureSink>,
    gain: Arc<SharedGain>,
    captures: u32,
}

impl std::fmt::Debug for ExposureCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureCoordinator")
            .field("caps", &self.caps)
            .field("max_progress", &self.max_progress)
            .field("formula", &self.formula)
            .field("state", &self.state)
            .field("captures", &self.captures)
            .finish_non_exhaustive()
    }
}

impl ExposureCoordinator {
    pub fn new(
        caps: HardwareCaps,
        max_progress: u32,
        formula: ExposureFormula,
        sink: Box<dyn ExposureSink>,
        gain: Arc<SharedGain>,
    ) -> Self {
        let state = ControlState::new(caps.initial_settings());
        let mut coordinator = Self {
            caps,
            max_progress,
            formula,
            state,
            sink,
            gain,
            captures: 0,
        };
        // Start the hardware at the settings the controls report
        if coordinator.caps.iso_range.is_some() && coordinator.caps.exposure_range.is_some() {
            coordinator.push_settings();
        }
        coordinator
    }

    fn push_settings(&mut self) {
        self.sink.apply(self.state.settings);
        let display = self.display();
        self.sink.exposure_changed(&display);
    }

    /// Handle a control input. Returns the applied settings, or `None` if
    /// the input was ignored.
    pub fn apply(&mut self, input: ControlInput) -> Option<ExposureSettings> {
        if input.kind == ControlKind::Brightness {
            self.gain
                .set(gain_for_progress(input.progress, self.max_progress));
        }

        let Some(next) = transition(&self.state, input, &self.caps, self.max_progress) else {
            log::debug!("Ignoring {:?}: hardware range not available", input.kind);
            return None;
        };
        self.state = next;
        self.push_settings();

        let settings = next.settings;
        log::debug!(
            "{:?} -> ISO {} / {} ({:?}, {})",
            input.kind,
            settings.iso,
            format_exposure_time(settings.exposure_ns),
            next.mode,
            self.display()
        );
        Some(settings)
    }

    /// Move a control by `delta` from its recorded position.
    pub fn step(&mut self, kind: ControlKind, delta: i64) -> Option<ExposureSettings> {
        let current = self.state.progress(kind) as i64;
        let progress = (current + delta).clamp(0, self.max_progress as i64) as u32;
        self.apply(ControlInput::new(kind, progress))
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn caps(&self) -> &HardwareCaps {
        &self.caps
    }

    pub fn max_progress(&self) -> u32 {
        self.max_progress
    }

    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Exposure quantity for the current settings.
    pub fn exposure_value(&self) -> f64 {
        self.formula
            .evaluate(self.state.settings, self.caps.aperture())
    }

    /// `E: %.2f` for the current settings.
    pub fn display(&self) -> String {
        format_exposure_value(self.exposure_value())
    }

    pub fn exposure_time_label(&self) -> String {
        format_exposure_time(self.state.settings.exposure_ns)
    }

    pub fn mode_label(&self) -> &'static str {
        self.state.mode.label()
    }

    /// Index the next successful capture will get.
    pub fn next_capture_index(&self) -> u32 {
        self.captures + 1
    }

    /// Count a captured still and return the new total.
    pub fn record_capture(&mut self) -> u32 {
        self.captures += 1;
        self.captures
    }

    pub fn captures(&self) -> u32 {
        self.captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::ValueRange;
    use std::sync::Mutex;

    const MAX: u32 = 5000;

    fn caps() -> HardwareCaps {
        HardwareCaps {
            iso_range: ValueRange::new(100, 1600),
            exposure_range: ValueRange::new(1_000_000, 500_000_000),
            apertures: vec![1.8],
            ..HardwareCaps::default()
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        applied: Arc<Mutex<Vec<ExposureSettings>>>,
        displays: Arc<Mutex<Vec<String>>>,
    }

    impl ExposureSink for Recorder {
        fn apply(&mut self, settings: ExposureSettings) {
            self.applied.lock().unwrap().push(settings);
        }

        fn exposure_changed(&mut self, display: &str) {
            self.displays.lock().unwrap().push(display.to_string());
        }
    }

    #[test]
    fn test_iso_resets_brightness_only() {
        let start = ControlState {
            mode: ExposureMode::BrightnessManual,
            iso_progress: 0,
            exposure_progress: 1200,
            brightness_progress: 3000,
            settings: ExposureSettings {
                iso: 500,
                exposure_ns: 42_000_000,
            },
        };
        let next = transition(&start, ControlInput::new(ControlKind::Iso, MAX), &caps(), MAX)
            .unwrap();
        assert_eq!(next.mode, ExposureMode::IsoManual);
        assert_eq!(next.brightness_progress, 0);
        assert_eq!(next.exposure_progress, 1200);
        assert_eq!(next.iso_progress, MAX);
        assert_eq!(next.settings.iso, 1600);
        assert_eq!(next.settings.exposure_ns, 42_000_000);
    }

    #[test]
    fn test_exposure_resets_brightness_only() {
        let start = ControlState {
            iso_progress: 700,
            brightness_progress: 10,
            ..ControlState::new(caps().initial_settings())
        };
        let next = transition(&start, ControlInput::new(ControlKind::Exposure, 0), &caps(), MAX)
            .unwrap();
        assert_eq!(next.mode, ExposureMode::ExposureManual);
        assert_eq!(next.brightness_progress, 0);
        assert_eq!(next.iso_progress, 700);
        assert_eq!(next.settings.exposure_ns, 1_000_000);
    }

    #[test]
    fn test_brightness_drives_both() {
        let start = ControlState {
            iso_progress: 100,
            exposure_progress: 200,
            ..ControlState::default()
        };
        let next = transition(
            &start,
            ControlInput::new(ControlKind::Brightness, 2500),
            &caps(),
            MAX,
        )
        .unwrap();
        assert_eq!(next.mode, ExposureMode::BrightnessManual);
        assert_eq!((next.iso_progress, next.exposure_progress), (0, 0));
        assert_eq!(next.settings.iso, 850);
        assert_eq!(next.settings.exposure_ns, 250_500_000);
    }

    #[test]
    fn test_brightness_zero_is_auto() {
        let next = transition(
            &ControlState::default(),
            ControlInput::new(ControlKind::Brightness, 0),
            &caps(),
            MAX,
        )
        .unwrap();
        assert_eq!(next.mode, ExposureMode::Auto);
        assert_eq!(next.mode.label(), "auto");
        assert_eq!(ExposureMode::IsoManual.label(), "manual");
    }

    #[test]
    fn test_missing_ranges_are_ignored() {
        let no_iso = HardwareCaps {
            iso_range: None,
            ..caps()
        };
        let state = ControlState::default();
        assert!(transition(&state, ControlInput::new(ControlKind::Iso, 10), &no_iso, MAX).is_none());
        assert!(
            transition(&state, ControlInput::new(ControlKind::Brightness, 10), &no_iso, MAX)
                .is_none()
        );
        assert!(
            transition(&state, ControlInput::new(ControlKind::Exposure, 10), &no_iso, MAX)
                .is_some()
        );
    }

    #[test]
    fn test_coordinator_pushes_to_sink() {
        let recorder = Recorder::default();
        let gain = Arc::new(SharedGain::default());
        let mut coordinator = ExposureCoordinator::new(
            caps(),
            MAX,
            ExposureFormula::IsoTime,
            Box::new(recorder.clone()),
            Arc::clone(&gain),
        );

        let applied = coordinator.apply(ControlInput::new(ControlKind::Brightness, 2500));
        assert_eq!(
            applied,
            Some(ExposureSettings {
                iso: 850,
                exposure_ns: 250_500_000
            })
        );
        assert_eq!(gain.get(), 1.25);
        assert_eq!(coordinator.display(), "E: 212.93");
        assert_eq!(
            recorder.displays.lock().unwrap().last().map(String::as_str),
            Some("E: 212.93")
        );
        assert_eq!(recorder.applied.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_initial_settings_reach_sink() {
        let recorder = Recorder::default();
        let coordinator = ExposureCoordinator::new(
            caps(),
            MAX,
            ExposureFormula::IsoTime,
            Box::new(recorder.clone()),
            Arc::new(SharedGain::default()),
        );
        assert_eq!(
            recorder.applied.lock().unwrap().as_slice(),
            &[ExposureSettings {
                iso: 100,
                exposure_ns: 1_000_000
            }]
        );
        assert_eq!(
            recorder.displays.lock().unwrap().as_slice(),
            &[coordinator.display()]
        );
    }

    #[test]
    fn test_missing_range_skips_initial_push() {
        let recorder = Recorder::default();
        let no_exposure = HardwareCaps {
            exposure_range: None,
            ..caps()
        };
        ExposureCoordinator::new(
            no_exposure,
            MAX,
            ExposureFormula::IsoTime,
            Box::new(recorder.clone()),
            Arc::new(SharedGain::default()),
        );
        assert!(recorder.applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fine_controls_leave_gain() {
        let gain = Arc::new(SharedGain::new(1.5));
        let mut coordinator = ExposureCoordinator::new(
            caps(),
            MAX,
            ExposureFormula::IsoTime,
            Box::new(NullSink),
            Arc::clone(&gain),
        );
        coordinator.apply(ControlInput::new(ControlKind::Iso, 100));
        assert_eq!(gain.get(), 1.5);
    }

    #[test]
    fn test_step_clamps() {
        let mut coordinator = ExposureCoordinator::new(
            caps(),
            MAX,
            ExposureFormula::IsoTime,
            Box::new(NullSink),
            Arc::new(SharedGain::default()),
        );
        coordinator.step(ControlKind::Iso, -100);
        assert_eq!(coordinator.state().iso_progress, 0);
        coordinator.step(ControlKind::Iso, 9000);
        assert_eq!(coordinator.state().iso_progress, MAX);
        assert_eq!(coordinator.state().settings.iso, 1600);
    }

    #[test]
    fn test_capture_counter() {
        let mut coordinator = ExposureCoordinator::new(
            caps(),
            MAX,
            ExposureFormula::IsoTime,
            Box::new(NullSink),
            Arc::new(SharedGain::default()),
        );
        assert_eq!(coordinator.next_capture_index(), 1);
        assert_eq!(coordinator.record_capture(), 1);
        assert_eq!(coordinator.next_capture_index(), 2);
        assert_eq!(coordinator.record_capture(), 2);
        assert_eq!(coordinator.captures(), 2);
    }
}
