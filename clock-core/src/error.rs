//! Error taxonomy shared by the clock core and its hosts.
//!
//! Collaborators report [`ServiceError`]s; the core folds them into the
//! appliance-level [`Error`] when logging or surfacing diagnostics. Nothing here
//! allocates, so every message is a `&'static str`.

use core::fmt;

use crate::scheduler::TaskFault;

/// Optional peripheral that may be missing or unresponsive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Peripheral {
    Display,
    Storage,
    Network,
    Sensors,
}

impl Peripheral {
    /// Returns the lowercase label used in logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Sensors => "sensors",
        }
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure reported by an external collaborator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ServiceError {
    /// The peripheral backing the service is absent.
    Unavailable(Peripheral),
    /// The peripheral is present but the request did not succeed.
    Failed(&'static str),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(peripheral) => write!(f, "{peripheral} unavailable"),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

/// Short user-facing message attached to a leaf action that could not finish.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActionFailure {
    message: &'static str,
}

impl ActionFailure {
    /// Creates a failure carrying the text shown on the LCD.
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }

    /// Returns the text shown on the LCD.
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // LCD messages use embedded newlines for layout.
        for (index, part) in self.message.split('\n').enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// Appliance-level error categories.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A peripheral was missing at boot; the dependent feature degrades.
    HardwareUnavailable(Peripheral),
    /// A leaf action could not complete.
    ActionFailure(ActionFailure),
    /// A scheduled task stopped permanently.
    SchedulerTaskFault {
        task: &'static str,
        fault: TaskFault,
    },
    /// Optional settings were absent; defaults apply.
    ConfigMissing(&'static str),
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(peripheral) => Self::HardwareUnavailable(peripheral),
            ServiceError::Failed(reason) => Self::ActionFailure(ActionFailure::new(reason)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareUnavailable(peripheral) => {
                write!(f, "hardware unavailable: {peripheral}")
            }
            Self::ActionFailure(failure) => write!(f, "action failed: {failure}"),
            Self::SchedulerTaskFault { task, fault } => {
                write!(f, "task `{task}` faulted: {fault}")
            }
            Self::ConfigMissing(source) => write!(f, "settings missing: {source}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    #[test]
    fn service_errors_map_onto_taxonomy() {
        assert_eq!(
            Error::from(ServiceError::Unavailable(Peripheral::Storage)),
            Error::HardwareUnavailable(Peripheral::Storage)
        );
        assert_eq!(
            Error::from(ServiceError::Failed("timeout")),
            Error::ActionFailure(ActionFailure::new("timeout"))
        );
    }

    #[test]
    fn multi_line_failures_render_on_one_log_line() {
        let mut text: String<48> = String::new();
        write!(
            text,
            "{}",
            Error::ActionFailure(ActionFailure::new("Connect to WiFi\nfirst!"))
        )
        .unwrap();
        assert_eq!(text.as_str(), "action failed: Connect to WiFi first!");
    }
}
