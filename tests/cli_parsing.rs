use scripthost::cli::parse_from;
use scripthost::config::Configuration;
use scripthost::errors::HostError;
use scripthost::modes::Mode;
use scripthost::types::{ActionPreference, ExecutionPolicy};

#[test]
fn output_string_error_action_named_command() {
    let args = parse_from(["-OutputString", "-ErrorAction", "Stop", "echo", "hello"]).unwrap();

    assert!(args.config.output_as_string);
    assert!(!args.config.input_as_stream);
    assert_eq!(args.config.preferences.error, ActionPreference::Stop);
    assert_eq!(
        args.mode,
        Mode::NamedCommand {
            name: "echo".into(),
            args: vec!["hello".into()],
        }
    );
}

#[test]
fn no_command_selects_repl() {
    let args = parse_from(["-VerboseAction", "Continue"]).unwrap();
    assert_eq!(args.mode, Mode::Repl);
    assert_eq!(args.config.preferences.verbose, ActionPreference::Continue);

    let empty: [&str; 0] = [];
    let args = parse_from(empty).unwrap();
    assert_eq!(args.mode, Mode::Repl);
    assert_eq!(args.config, Configuration::default());
}

#[test]
fn dash_selects_stdin_script_with_positionals() {
    let args = parse_from(["-ExecutionPolicy", "bypass", "-", "one", "-Debug", "two"]).unwrap();
    assert_eq!(args.config.execution_policy, Some(ExecutionPolicy::Bypass));
    // Everything after the selector is positional, even option-looking tokens.
    assert_eq!(
        args.mode,
        Mode::StdinScript {
            args: vec!["one".into(), "-Debug".into(), "two".into()],
        }
    );
    assert_eq!(args.config.preferences.debug, ActionPreference::SilentlyContinue);
}

#[test]
fn all_preference_options() {
    let args = parse_from([
        "-Debug",
        "Continue",
        "-ErrorAction",
        "Ignore",
        "-InformationAction",
        "Continue",
        "-ProgressAction",
        "SilentlyContinue",
        "-VerboseAction",
        "Inquire",
        "-WarningAction",
        "Stop",
        "cmd",
    ])
    .unwrap();

    let p = &args.config.preferences;
    assert_eq!(p.debug, ActionPreference::Continue);
    assert_eq!(p.error, ActionPreference::Ignore);
    assert_eq!(p.information, ActionPreference::Continue);
    assert_eq!(p.progress, ActionPreference::SilentlyContinue);
    assert_eq!(p.verbose, ActionPreference::Inquire);
    assert_eq!(p.warning, ActionPreference::Stop);
}

#[test]
fn option_names_are_case_insensitive() {
    let args = parse_from(["-outputstring", "-INPUTSTRING", "-erroraction", "stop", "cat"]).unwrap();
    assert!(args.config.output_as_string);
    assert!(args.config.input_as_stream);
    assert_eq!(args.config.preferences.error, ActionPreference::Stop);
}

#[test]
fn later_option_wins() {
    let args = parse_from(["-ErrorAction", "Stop", "-ErrorAction", "Continue"]).unwrap();
    assert_eq!(args.config.preferences.error, ActionPreference::Continue);
}

#[test]
fn unknown_option_is_invalid_argument() {
    let err = parse_from(["-Frobnicate", "echo"]).unwrap_err();
    assert!(matches!(err, HostError::InvalidArgument(_)), "{err}");
    assert!(err.to_string().contains("-Frobnicate"));
}

#[test]
fn bad_enum_value_is_invalid_argument() {
    let err = parse_from(["-ErrorAction", "Loudly", "echo"]).unwrap_err();
    assert!(matches!(err, HostError::InvalidArgument(_)), "{err}");

    let err = parse_from(["-ExecutionPolicy", "Sometimes"]).unwrap_err();
    assert!(matches!(err, HostError::InvalidArgument(_)), "{err}");
}

#[test]
fn missing_value_is_invalid_argument() {
    let err = parse_from(["-ExecutionPolicy"]).unwrap_err();
    assert!(matches!(err, HostError::InvalidArgument(_)), "{err}");
}

#[test]
fn os_arguments_pass_through_unchanged() {
    use std::ffi::OsString;

    let args = scripthost::cli::parse_os_from(
        ["-InputString", "grep", "héllo"].map(OsString::from),
    )
    .unwrap();
    assert_eq!(
        args.mode,
        Mode::NamedCommand {
            name: "grep".into(),
            args: vec!["héllo".into()],
        }
    );
}

#[cfg(unix)]
#[test]
fn non_unicode_argument_is_rejected() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let raw = OsString::from_vec(b"caf\xe9".to_vec());
    let err = scripthost::cli::parse_os_from([OsString::from("cat"), raw]).unwrap_err();
    assert!(
        matches!(err, HostError::InvalidArgument(ref m) if m.contains("not valid Unicode")),
        "{err}"
    );
}
