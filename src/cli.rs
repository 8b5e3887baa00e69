use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::error::IfstatError;

#[derive(Parser, Debug)]
#[command(
    name = "ifstat",
    version,
    about = "Log a network interface's input/output throughput to a CSV file"
)]
pub struct Cli {
    /// File to write data to (truncated if it exists)
    pub outfile: PathBuf,

    /// Interval of data retrieval in seconds
    #[arg(value_parser = validate_interval)]
    pub interval: u64,

    /// Network interface to retrieve data from
    pub interface: String,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// Parse the command line.
///
/// `--help` and `--version` print and exit 0 right here; every other
/// parse failure comes back as [`IfstatError::Usage`] holding clap's
/// error text followed by the usage line.
pub fn parse_from<I, T>(args: I) -> Result<Cli, IfstatError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => {
            let mut msg = e.render().to_string();
            // Value errors don't carry the usage line on their own
            if !msg.contains("Usage:") {
                msg.push_str(&format!("\n{}\n", Cli::command().render_usage()));
            }
            IfstatError::Usage(msg)
        }
    })
}

fn validate_interval(s: &str) -> Result<u64, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a whole number of seconds"));
    }
    s.parse()
        .map_err(|_| format!("'{s}' is too large for an interval"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, IfstatError> {
        parse_from(args)
    }

    #[test]
    fn test_three_positionals() {
        let cli = parse(&["ifstat", "out.csv", "5", "em0"]).unwrap();
        assert_eq!(cli.outfile, PathBuf::from("out.csv"));
        assert_eq!(cli.interval, 5);
        assert_eq!(cli.interval(), Duration::from_secs(5));
        assert_eq!(cli.interface, "em0");
    }

    #[test]
    fn test_zero_interval_is_allowed() {
        let cli = parse(&["ifstat", "out.csv", "0", "lo"]).unwrap();
        assert_eq!(cli.interval(), Duration::ZERO);
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(matches!(
            parse(&["ifstat", "out.csv", "5"]),
            Err(IfstatError::Usage(_))
        ));
        assert!(matches!(
            parse(&["ifstat", "out.csv", "5", "em0", "extra"]),
            Err(IfstatError::Usage(_))
        ));
    }

    #[test]
    fn test_non_numeric_interval() {
        match parse(&["ifstat", "out.csv", "abc", "em0"]) {
            Err(IfstatError::Usage(msg)) => {
                assert!(msg.contains("abc"));
                assert!(msg.contains("Usage: ifstat"));
                assert!(msg.contains("<INTERVAL>"));
            }
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_interval() {
        assert_eq!(validate_interval("10"), Ok(10));
        assert_eq!(validate_interval("007"), Ok(7));
        assert!(validate_interval("").is_err());
        assert!(validate_interval("+5").is_err());
        assert!(validate_interval("1.5").is_err());
        assert!(validate_interval("-1").is_err());
        assert!(validate_interval("99999999999999999999999").is_err());
    }
}
