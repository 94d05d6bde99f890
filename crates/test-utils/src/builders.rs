#![allow(dead_code)]

use scripthost::cli::CliArgs;
use scripthost::config::{Configuration, PreferenceKind};
use scripthost::modes::Mode;
use scripthost::types::{ActionPreference, ExecutionPolicy};

/// Builder for `Configuration` to simplify test setup.
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            config: Configuration::default(),
        }
    }

    pub fn preference(mut self, kind: PreferenceKind, value: ActionPreference) -> Self {
        self.config.preferences.set(kind, value);
        self
    }

    pub fn error_action(self, value: ActionPreference) -> Self {
        self.preference(PreferenceKind::Error, value)
    }

    pub fn execution_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.config.execution_policy = Some(policy);
        self
    }

    pub fn input_string(mut self) -> Self {
        self.config.input_as_stream = true;
        self
    }

    pub fn output_string(mut self) -> Self {
        self.config.output_as_string = true;
        self
    }

    pub fn build(self) -> Configuration {
        self.config
    }

    pub fn repl(self) -> CliArgs {
        CliArgs {
            config: self.config,
            mode: Mode::Repl,
        }
    }

    pub fn stdin_script(self, args: &[&str]) -> CliArgs {
        CliArgs {
            config: self.config,
            mode: Mode::StdinScript {
                args: args.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    pub fn command(self, name: &str, args: &[&str]) -> CliArgs {
        CliArgs {
            config: self.config,
            mode: Mode::NamedCommand {
                name: name.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
