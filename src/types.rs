use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// How the engine reacts to one category of signal (errors, warnings,
/// verbose chatter, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionPreference {
    #[value(name = "SilentlyContinue")]
    SilentlyContinue,
    #[value(name = "Stop")]
    Stop,
    #[value(name = "Continue")]
    Continue,
    #[value(name = "Inquire")]
    Inquire,
    #[value(name = "Ignore")]
    Ignore,
    #[value(name = "Suspend")]
    Suspend,
    #[value(name = "Break")]
    Break,
}

/// Restriction level controlling which scripts the engine may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionPolicy {
    #[value(name = "Unrestricted")]
    Unrestricted,
    #[value(name = "RemoteSigned")]
    RemoteSigned,
    #[value(name = "AllSigned")]
    AllSigned,
    #[value(name = "Restricted")]
    Restricted,
    #[value(name = "Default")]
    Default,
    #[value(name = "Bypass")]
    Bypass,
    #[value(name = "Undefined")]
    Undefined,
}

impl ExecutionPolicy {
    /// Whether free-form script text may run under this policy.
    ///
    /// Script text handed to the host is never signed, so `AllSigned`
    /// refuses it just like `Restricted`.
    pub fn allows_scripts(self) -> bool {
        !matches!(self, ExecutionPolicy::Restricted | ExecutionPolicy::AllSigned)
    }
}

/// Shared parsing for the enumerated option values: case-insensitive, with
/// the accepted spellings listed on failure.
fn parse_value_enum<T: ValueEnum>(s: &str, what: &str) -> Result<T, String> {
    T::from_str(s.trim(), true).map_err(|_| {
        let expected: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|pv| pv.get_name().to_string())
            .collect();
        format!("invalid {what}: {s} (expected one of: {})", expected.join(", "))
    })
}

fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|pv| pv.get_name().to_string())
        .unwrap_or_default()
}

impl FromStr for ActionPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value_enum(s, "action preference")
    }
}

impl FromStr for ExecutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_value_enum(s, "execution policy")
    }
}

impl fmt::Display for ActionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_name(self))
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_name(self))
    }
}
