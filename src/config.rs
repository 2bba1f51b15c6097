//! Server configuration
//!
//! Parsed from the command line with clap; `Config::default()` gives the
//! same values for library and test use.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::message::Style;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8989;

/// Default admission ceiling
pub const DEFAULT_MAX_CLIENTS: usize = 10;

/// Default welcome banner file
pub const DEFAULT_BANNER: &str = "Welcome.txt";

/// Default maximum inbound line length in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Default per-session outbound channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Line chat server
#[derive(Debug, Clone, Parser)]
#[command(name = "line_chat", version, about)]
pub struct Config {
    /// Port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Maximum number of concurrent clients
    #[arg(long, default_value_t = DEFAULT_MAX_CLIENTS)]
    pub max_clients: usize,

    /// Welcome banner shown before the username prompt
    #[arg(long, default_value = DEFAULT_BANNER)]
    pub banner: PathBuf,

    /// Disable ANSI colours
    #[arg(long)]
    pub plain: bool,

    /// Maximum accepted line length in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH, value_parser = positive)]
    pub max_line_length: usize,

    /// Outbound lines buffered per client
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY, value_parser = positive)]
    pub channel_capacity: usize,
}

/// Parse a count that must be at least 1
fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Config {
    /// Socket address to bind
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Output style for server → client lines
    pub fn style(&self) -> Style {
        if self.plain {
            Style::Plain
        } else {
            Style::Decorated
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            max_clients: DEFAULT_MAX_CLIENTS,
            banner: PathBuf::from(DEFAULT_BANNER),
            plain: false,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_match_default() {
        let parsed = Config::try_parse_from(["line_chat"]).unwrap();
        let default = Config::default();

        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.max_clients, default.max_clients);
        assert_eq!(parsed.banner, default.banner);
        assert_eq!(parsed.style(), Style::Decorated);
    }

    #[test]
    fn test_parse_port_and_flags() {
        let config = Config::try_parse_from([
            "line_chat",
            "9000",
            "--host",
            "127.0.0.1",
            "--max-clients",
            "2",
            "--plain",
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_clients, 2);
        assert_eq!(config.style(), Style::Plain);
    }

    #[test]
    fn test_parse_invalid_port() {
        assert!(Config::try_parse_from(["line_chat", "not-a-port"]).is_err());
        assert!(Config::try_parse_from(["line_chat", "70000"]).is_err());
    }

    #[test]
    fn test_parse_buffer_sizes_must_be_positive() {
        assert!(Config::try_parse_from(["line_chat", "--channel-capacity", "0"]).is_err());
        assert!(Config::try_parse_from(["line_chat", "--max-line-length", "0"]).is_err());
        assert!(Config::try_parse_from(["line_chat", "--channel-capacity", "-3"]).is_err());

        let config = Config::try_parse_from([
            "line_chat",
            "--channel-capacity",
            "1",
            "--max-line-length",
            "64",
        ])
        .unwrap();
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.max_line_length, 64);
    }
}
