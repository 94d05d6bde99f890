// src/config/model.rs

use std::fmt;

use crate::types::{ActionPreference, ExecutionPolicy};

/// The six preference levels the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKind {
    Debug,
    Error,
    Information,
    Progress,
    Verbose,
    Warning,
}

impl PreferenceKind {
    pub const ALL: [PreferenceKind; 6] = [
        PreferenceKind::Debug,
        PreferenceKind::Error,
        PreferenceKind::Information,
        PreferenceKind::Progress,
        PreferenceKind::Verbose,
        PreferenceKind::Warning,
    ];

    /// Map a command-line option name (without the leading dash) to the
    /// preference it sets. Matching is ASCII case-insensitive.
    pub fn from_option(name: &str) -> Option<Self> {
        let table = [
            ("Debug", PreferenceKind::Debug),
            ("ErrorAction", PreferenceKind::Error),
            ("InformationAction", PreferenceKind::Information),
            ("ProgressAction", PreferenceKind::Progress),
            ("VerboseAction", PreferenceKind::Verbose),
            ("WarningAction", PreferenceKind::Warning),
        ];
        table
            .iter()
            .find(|(option, _)| option.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
    }

    /// Upper-case identifier used when exporting the level to a child
    /// process environment.
    pub fn env_name(self) -> &'static str {
        match self {
            PreferenceKind::Debug => "DEBUG",
            PreferenceKind::Error => "ERROR",
            PreferenceKind::Information => "INFORMATION",
            PreferenceKind::Progress => "PROGRESS",
            PreferenceKind::Verbose => "VERBOSE",
            PreferenceKind::Warning => "WARNING",
        }
    }
}

impl fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PreferenceKind::Debug => "debug",
            PreferenceKind::Error => "error",
            PreferenceKind::Information => "information",
            PreferenceKind::Progress => "progress",
            PreferenceKind::Verbose => "verbose",
            PreferenceKind::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// Preference levels, one per [`PreferenceKind`].
///
/// Defaults follow the usual shell conventions: errors, warnings and progress
/// are shown, debug/verbose/information chatter is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub debug: ActionPreference,
    pub error: ActionPreference,
    pub information: ActionPreference,
    pub progress: ActionPreference,
    pub verbose: ActionPreference,
    pub warning: ActionPreference,
}

impl Preferences {
    pub fn get(&self, kind: PreferenceKind) -> ActionPreference {
        match kind {
            PreferenceKind::Debug => self.debug,
            PreferenceKind::Error => self.error,
            PreferenceKind::Information => self.information,
            PreferenceKind::Progress => self.progress,
            PreferenceKind::Verbose => self.verbose,
            PreferenceKind::Warning => self.warning,
        }
    }

    pub fn set(&mut self, kind: PreferenceKind, value: ActionPreference) {
        let slot = match kind {
            PreferenceKind::Debug => &mut self.debug,
            PreferenceKind::Error => &mut self.error,
            PreferenceKind::Information => &mut self.information,
            PreferenceKind::Progress => &mut self.progress,
            PreferenceKind::Verbose => &mut self.verbose,
            PreferenceKind::Warning => &mut self.warning,
        };
        *slot = value;
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            debug: ActionPreference::SilentlyContinue,
            error: ActionPreference::Continue,
            information: ActionPreference::SilentlyContinue,
            progress: ActionPreference::Continue,
            verbose: ActionPreference::SilentlyContinue,
            warning: ActionPreference::Continue,
        }
    }
}

/// Everything parsed from the command line that influences execution.
///
/// Built once by the CLI parser, then wrapped in an `Arc` and never mutated
/// again; every invocation created during the process shares the same
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub preferences: Preferences,

    /// `None` leaves the engine's own default in place.
    pub execution_policy: Option<ExecutionPolicy>,

    /// `-InputString`: stream stdin line by line into the named command.
    pub input_as_stream: bool,

    /// `-OutputString`: route output items to stdout/stderr as text.
    pub output_as_string: bool,
}

impl Configuration {
    pub fn effective_execution_policy(&self) -> ExecutionPolicy {
        self.execution_policy.unwrap_or(ExecutionPolicy::Default)
    }
}
