//! Diagnostics reporting for pipeline stages.
//!
//! Stages never log through a global logger directly. They report to an
//! injected [`DiagnosticsSink`]; [`TracingSink`] forwards to `tracing` and
//! [`MemorySink`] keeps entries for inspection.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, info, warn};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Pipeline,
    TimeWindow,
    ReplyChain,
    Semantic,
    QualityFilter,
    Assembly,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Pipeline => write!(f, "pipeline"),
            Stage::TimeWindow => write!(f, "time-window"),
            Stage::ReplyChain => write!(f, "reply-chain"),
            Stage::Semantic => write!(f, "semantic"),
            Stage::QualityFilter => write!(f, "quality-filter"),
            Stage::Assembly => write!(f, "assembly"),
        }
    }
}

/// A single leveled message from a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub stage: Stage,
    pub message: String,
}

/// Receiver for pipeline diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);

    fn debug(&self, stage: Stage, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Debug,
            stage,
            message,
        });
    }

    fn info(&self, stage: Stage, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Info,
            stage,
            message,
        });
    }

    fn warn(&self, stage: Stage, message: String) {
        self.record(Diagnostic {
            level: DiagnosticLevel::Warn,
            stage,
            message,
        });
    }
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let stage = diagnostic.stage;
        match diagnostic.level {
            DiagnosticLevel::Debug => debug!(stage = %stage, "{}", diagnostic.message),
            DiagnosticLevel::Info => info!(stage = %stage, "{}", diagnostic.message),
            DiagnosticLevel::Warn => warn!(stage = %stage, "{}", diagnostic.message),
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Entries recorded by one stage at or above `level`.
    pub fn filtered(&self, stage: Stage, level: DiagnosticLevel) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.stage == stage && d.level >= level)
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
