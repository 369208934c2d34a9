//! Command-line interface handling for the game logic worker.
//!
//! Deployed workers receive their receptionist address and connection tuning
//! on the command line; these options override the configuration file.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use worker_connector::{LinkProtocol, SecurityMode};

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Run as a deployed (headless) worker
    pub headless: bool,
    /// Optional override for the receptionist host
    pub receptionist_host: Option<String>,
    /// Optional override for the receptionist port
    pub receptionist_port: Option<u16>,
    /// Optional override for the link protocol
    pub link_protocol: Option<LinkProtocol>,
    /// Optional override for channel security (headless only)
    pub security_type: Option<SecurityMode>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("Game Logic Worker")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Simulation worker that connects to a receptionist and installs load balancing")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("worker.toml"),
            )
            .arg(
                Arg::new("headless")
                    .long("headless")
                    .help("Run as a deployed worker (applies command-line connection settings)")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("receptionist-host")
                    .long("receptionist-host")
                    .value_name("HOST")
                    .help("Receptionist host (e.g., 127.0.0.1)"),
            )
            .arg(
                Arg::new("receptionist-port")
                    .long("receptionist-port")
                    .value_name("PORT")
                    .help("Receptionist port (e.g., 7777)")
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("link-protocol")
                    .long("link-protocol")
                    .value_name("PROTOCOL")
                    .help("Link protocol (kcp, tcp)")
                    .value_parser(|s: &str| s.parse::<LinkProtocol>()),
            )
            .arg(
                Arg::new("security-type")
                    .long("security-type")
                    .value_name("TYPE")
                    .help("Channel security for headless workers (insecure, secure)")
                    .value_parser(|s: &str| s.parse::<SecurityMode>()),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Parses the process arguments; exits with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("worker.toml")),
            headless: matches.get_flag("headless"),
            receptionist_host: matches.get_one::<String>("receptionist-host").cloned(),
            receptionist_port: matches.get_one::<u16>("receptionist-port").copied(),
            link_protocol: matches.get_one::<LinkProtocol>("link-protocol").copied(),
            security_type: matches.get_one::<SecurityMode>("security-type").copied(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["game_logic_worker"]).unwrap();

        assert_eq!(args.config_path, PathBuf::from("worker.toml"));
        assert!(!args.headless);
        assert!(args.receptionist_host.is_none());
        assert!(args.receptionist_port.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_headless_overrides() {
        let args = CliArgs::try_parse_from([
            "game_logic_worker",
            "--headless",
            "--receptionist-host",
            "10.1.2.3",
            "--receptionist-port",
            "22000",
            "--link-protocol",
            "tcp",
            "--security-type",
            "insecure",
            "--json-logs",
        ])
        .unwrap();

        assert!(args.headless);
        assert_eq!(args.receptionist_host.as_deref(), Some("10.1.2.3"));
        assert_eq!(args.receptionist_port, Some(22000));
        assert_eq!(args.link_protocol, Some(LinkProtocol::Tcp));
        assert_eq!(args.security_type, Some(SecurityMode::Insecure));
        assert!(args.json_logs);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(CliArgs::try_parse_from(["game_logic_worker", "--receptionist-port", "70000"]).is_err());
        assert!(CliArgs::try_parse_from(["game_logic_worker", "--link-protocol", "udp"]).is_err());
        assert!(CliArgs::try_parse_from(["game_logic_worker", "--security-type", "maybe"]).is_err());
    }
}
