//! Runtime tunables for the clock appliance.
//!
//! [`Config`] carries every interval and threshold the tasks consult. Hosts may
//! load an optional [`Settings`] record; anything it leaves unset keeps the
//! built-in default, and a missing record falls back to defaults entirely.

use core::time::Duration;

use log::info;

use crate::error::Error;

/// Cycles without input before the display sleeps.
pub const DEFAULT_IDLE_THRESHOLD: u32 = 200;
/// Process task cadence while awake (1/60 s).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
/// Idle monitor cadence, awake or asleep.
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_micros(16_667);
/// Render task cadence while awake.
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(10);
/// Coarse cadence for render/process while the display sleeps.
pub const DEFAULT_SLEEP_POLL: Duration = Duration::from_millis(500);
/// Pause after a Mode toggle so a held key does not bounce between modes.
pub const DEFAULT_MODE_SETTLE: Duration = Duration::from_millis(50);
/// How long informational action text stays up.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(2);
/// How long an action failure message stays up.
pub const DEFAULT_FAILURE_NOTICE: Duration = Duration::from_secs(2);
/// Clock snapshot refresh cadence.
pub const DEFAULT_CLOCK_REFRESH: Duration = Duration::from_secs(1);
/// Time persistence cadence.
pub const DEFAULT_PERSIST_INTERVAL: Duration = Duration::from_secs(1);

/// Resolved configuration consulted by every task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub idle_threshold: u32,
    pub frame_interval: Duration,
    pub idle_poll: Duration,
    pub render_interval: Duration,
    pub sleep_poll: Duration,
    pub mode_settle: Duration,
    pub notice_duration: Duration,
    pub failure_notice: Duration,
    pub clock_refresh: Duration,
    pub persist_interval: Duration,
    /// Enables Select on the clock face as a shortcut into clock edit.
    pub clock_edit_shortcut: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            idle_poll: DEFAULT_IDLE_POLL,
            render_interval: DEFAULT_RENDER_INTERVAL,
            sleep_poll: DEFAULT_SLEEP_POLL,
            mode_settle: DEFAULT_MODE_SETTLE,
            notice_duration: DEFAULT_NOTICE_DURATION,
            failure_notice: DEFAULT_FAILURE_NOTICE,
            clock_refresh: DEFAULT_CLOCK_REFRESH,
            persist_interval: DEFAULT_PERSIST_INTERVAL,
            clock_edit_shortcut: true,
        }
    }
}

/// Optional overrides loaded from a settings file.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Settings {
    pub idle_threshold: Option<u32>,
    pub frame_interval_ms: Option<u32>,
    pub sleep_poll_ms: Option<u32>,
    pub notice_ms: Option<u32>,
    pub failure_notice_ms: Option<u32>,
    pub persist_interval_ms: Option<u32>,
    pub clock_edit_shortcut: Option<bool>,
}

impl Config {
    /// Resolves the configuration from a settings lookup.
    ///
    /// A failed lookup is not an error for the appliance: it is logged and the
    /// defaults apply.
    pub fn resolve(settings: Result<Settings, Error>) -> Self {
        match settings {
            Ok(settings) => Self::default().with_settings(&settings),
            Err(err) => {
                info!("using default settings ({err})");
                Self::default()
            }
        }
    }

    /// Applies every override present in `settings`.
    ///
    /// Zero thresholds and zero intervals are ignored; they would either sleep
    /// the display immediately or spin the scheduler.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        if let Some(threshold) = settings.idle_threshold
            && threshold > 0
        {
            self.idle_threshold = threshold;
        }
        if let Some(interval) = non_zero_millis(settings.frame_interval_ms) {
            self.frame_interval = interval;
        }
        if let Some(interval) = non_zero_millis(settings.sleep_poll_ms) {
            self.sleep_poll = interval;
        }
        if let Some(duration) = non_zero_millis(settings.notice_ms) {
            self.notice_duration = duration;
        }
        if let Some(duration) = non_zero_millis(settings.failure_notice_ms) {
            self.failure_notice = duration;
        }
        if let Some(interval) = non_zero_millis(settings.persist_interval_ms) {
            self.persist_interval = interval;
        }
        if let Some(enabled) = settings.clock_edit_shortcut {
            self.clock_edit_shortcut = enabled;
        }
        self
    }
}

fn non_zero_millis(value: Option<u32>) -> Option<Duration> {
    value
        .filter(|millis| *millis > 0)
        .map(|millis| Duration::from_millis(u64::from(millis)))
}
