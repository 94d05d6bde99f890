// src/config/validate.rs

use crate::config::model::Configuration;
use crate::errors::{HostError, Result};
use crate::modes::Mode;

/// Reject flag combinations that cannot be honoured by the selected mode.
///
/// Runs before stdin is touched and before any engine work starts.
pub fn validate_mode(mode: &Mode, cfg: &Configuration) -> Result<()> {
    if !cfg.input_as_stream {
        return Ok(());
    }

    match mode {
        Mode::Repl => Err(HostError::invalid_argument(
            "-InputString requires a command to stream input into",
        )),
        Mode::StdinScript { .. } => Err(HostError::invalid_argument(
            "-InputString cannot be combined with '-': standard input is already read as the script",
        )),
        Mode::NamedCommand { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming() -> Configuration {
        Configuration {
            input_as_stream: true,
            ..Configuration::default()
        }
    }

    #[test]
    fn every_mode_is_valid_without_streaming() {
        let cfg = Configuration::default();
        assert!(validate_mode(&Mode::Repl, &cfg).is_ok());
        assert!(validate_mode(&Mode::StdinScript { args: vec![] }, &cfg).is_ok());
        assert!(
            validate_mode(
                &Mode::NamedCommand {
                    name: "cat".into(),
                    args: vec![]
                },
                &cfg
            )
            .is_ok()
        );
    }

    #[test]
    fn streaming_needs_a_named_command() {
        let cfg = streaming();
        assert!(matches!(
            validate_mode(&Mode::Repl, &cfg),
            Err(HostError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_mode(&Mode::StdinScript { args: vec![] }, &cfg),
            Err(HostError::InvalidArgument(_))
        ));
        assert!(
            validate_mode(
                &Mode::NamedCommand {
                    name: "cat".into(),
                    args: vec![]
                },
                &cfg
            )
            .is_ok()
        );
    }
}
