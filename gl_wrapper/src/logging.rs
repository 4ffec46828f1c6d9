use std::fmt::Display;

use env_logger::{Builder, Env};
use log::SetLoggerError;

/// Installs `env_logger` as the global logger.
///
/// `filter` uses the `RUST_LOG` syntax and takes precedence over the
/// environment; with neither set, `info` and above is shown. Fails if a
/// logger is already installed.
pub fn init_logging(filter: Option<&str>) -> Result<(), SetLoggerError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }

    builder.try_init()?;
    log::debug!("logger installed");

    Ok(())
}

/// Result of a step that can be reported as success or failure.
pub trait Outcome {
    fn succeeded(&self) -> bool;

    fn failure_reason(&self) -> Option<String> {
        None
    }
}

impl Outcome for bool {
    fn succeeded(&self) -> bool {
        *self
    }
}

impl<T> Outcome for Option<T> {
    fn succeeded(&self) -> bool {
        self.is_some()
    }
}

impl<T, E: Display> Outcome for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }

    fn failure_reason(&self) -> Option<String> {
        self.as_ref().err().map(|e| e.to_string())
    }
}

/// Runs `step`, logging the call and whether it succeeded.
///
/// The outcome is handed back untouched.
pub fn logged<R: Outcome>(name: &str, step: impl FnOnce() -> R) -> R {
    log::debug!("calling {name}");

    let outcome = step();

    if outcome.succeeded() {
        log::debug!("{name} succeeded");
    } else {
        match outcome.failure_reason() {
            Some(reason) => log::error!("{name} failed: {reason}"),
            None => log::error!("{name} failed"),
        }
    }

    outcome
}
