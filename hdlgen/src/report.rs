//! Diagnostics produced by a generation run.

use crate::hdl::Dialect;

use log::{error, info, warn};

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Sink for diagnostics. The library never prints anything itself.
pub trait Reporter: Sync {
    fn report(&self, severity: Severity, message: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl CollectingReporter {
    pub fn new() -> CollectingReporter {
        CollectingReporter::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, severity: Severity, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((severity, message.to_string()));
    }
}

/// Outcome of a successful generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    pub dialect: Dialect,
    pub output_dir: PathBuf,
    /// Written files, in write order. The top circuit's file is last.
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_reporter_filters_by_severity() {
        let reporter = CollectingReporter::new();
        reporter.report(Severity::Warning, "w1");
        reporter.report(Severity::Info, "i1");
        reporter.report(Severity::Warning, "w2");

        assert_eq!(reporter.messages(Severity::Warning), vec!["w1", "w2"]);
        assert_eq!(reporter.entries().len(), 3);
    }
}
