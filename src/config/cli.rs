use crate::net::http::parse_download_url;
use crate::utils::error::{ExtError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "extlib")]
#[command(about = "File, network and system utilities from the extlib library")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit diagnostics as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sort a file of fixed-size records in place
    Sort {
        path: String,
        #[arg(long, help = "Record size in bytes")]
        size: usize,
        #[arg(long, help = "In-memory presort block size in bytes")]
        block_size: Option<usize>,
    },
    /// Binary search a sorted file of fixed-size records
    Search {
        path: String,
        key: String,
        #[arg(long, help = "Record size in bytes")]
        size: usize,
        #[arg(long, help = "Interpret the key as hexadecimal bytes")]
        hex: bool,
    },
    /// Download a URL to a file
    Get {
        url: String,
        #[arg(long, short, help = "Destination file")]
        output: Option<String>,
        #[arg(long, help = "Request timeout in seconds")]
        timeout: Option<u64>,
    },
    /// Show CPU core counts, vendor and brand
    Cores {
        #[arg(long, help = "Print as JSON")]
        json: bool,
    },
    /// Open a TCP connection and report the addresses in use
    Connect {
        host: String,
        port: u16,
        #[arg(long, help = "Connect timeout in seconds")]
        timeout: Option<u64>,
    },
    /// Show the IPv4 address used for outbound traffic
    Hostip,
    /// Print pseudo-random numbers
    Rand {
        #[arg(long, value_enum, default_value_t = Generator::Kiss)]
        generator: Generator,
        #[arg(long, default_value = "10")]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Format a 32-bit address value as a dotted quad
    Ntoa { value: String },
    /// Resolve a host name or dotted quad to an IPv4 address
    Aton { host: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    Fast,
    Kiss,
    Xoshiro,
}

/// Parses a decimal or `0x`-prefixed hexadecimal u32.
pub fn parse_u32(field: &str, value: &str) -> Result<u32> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|e| ExtError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Decodes a hex string such as `"00ff10"` into bytes.
pub fn parse_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| ExtError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    if value.len() % 2 != 0 {
        return Err(invalid("hex key needs an even number of digits"));
    }
    (0..value.len())
        .step_by(2)
        .map(|i| {
            value
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| invalid("hex key contains a non-hex digit"))
        })
        .collect()
}

impl CliConfig {
    /// The search key as raw bytes, for the `search` command.
    pub fn search_key(&self) -> Result<Vec<u8>> {
        match &self.command {
            Command::Search { key, hex: true, .. } => parse_hex("key", key),
            Command::Search { key, .. } => Ok(key.as_bytes().to_vec()),
            _ => Err(ExtError::invalid_argument("not a search command")),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }

        match &self.command {
            Command::Sort {
                path,
                size,
                block_size,
            } => {
                validation::validate_path("path", path)?;
                validation::validate_positive_number("size", *size, 1)?;
                if let Some(block_size) = block_size {
                    validation::validate_positive_number("block_size", *block_size, *size)?;
                }
            }
            Command::Search { path, size, .. } => {
                validation::validate_path("path", path)?;
                let key = self.search_key()?;
                if key.is_empty() {
                    return Err(ExtError::InvalidConfigValueError {
                        field: "key".to_string(),
                        value: String::new(),
                        reason: "Search key cannot be empty".to_string(),
                    });
                }
                validation::validate_record_size(*size, key.len())?;
            }
            Command::Get {
                url,
                output,
                timeout,
            } => {
                parse_download_url(url)?;
                if let Some(output) = output {
                    validation::validate_path("output", output)?;
                }
                if let Some(timeout) = timeout {
                    validation::validate_range("timeout", *timeout, 1, 3600)?;
                }
            }
            Command::Rand { count, .. } => {
                validation::validate_range("count", *count, 1, 1_000_000)?;
            }
            Command::Ntoa { value } => {
                parse_u32("value", value)?;
            }
            Command::Aton { host } => {
                if host.trim().is_empty() {
                    return Err(ExtError::MissingConfigError {
                        field: "host".to_string(),
                    });
                }
            }
            Command::Connect {
                host,
                port,
                timeout,
            } => {
                if host.trim().is_empty() {
                    return Err(ExtError::MissingConfigError {
                        field: "host".to_string(),
                    });
                }
                validation::validate_positive_number("port", *port as usize, 1)?;
                if let Some(timeout) = timeout {
                    validation::validate_range("timeout", *timeout, 1, 3600)?;
                }
            }
            Command::Cores { .. } | Command::Hostip => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("extlib").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_sort_command() {
        let config = parse(&["sort", "data.bin", "--size", "8", "--block-size", "4096", "-v"]);
        assert!(config.verbose);
        match config.command {
            Command::Sort {
                ref path,
                size,
                block_size,
            } => {
                assert_eq!(path, "data.bin");
                assert_eq!(size, 8);
                assert_eq!(block_size, Some(4096));
            }
            ref other => panic!("unexpected command {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sort_block_smaller_than_record_is_rejected() {
        let config = parse(&["sort", "data.bin", "--size", "64", "--block-size", "32"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_search_key_decoding() {
        let config = parse(&["search", "data.bin", "00ff", "--size", "4", "--hex"]);
        assert_eq!(config.search_key().unwrap(), vec![0x00, 0xff]);
        assert!(config.validate().is_ok());

        let config = parse(&["search", "data.bin", "hello", "--size", "4"]);
        assert!(config.validate().is_err());

        let config = parse(&["search", "data.bin", "0g", "--size", "4", "--hex"]);
        assert!(config.search_key().is_err());
    }

    #[test]
    fn test_get_validation() {
        assert!(parse(&["get", "https://example.com/a.bin"]).validate().is_ok());
        assert!(parse(&["get", "example.com"]).validate().is_ok());
        assert!(parse(&["get", "not a url"]).validate().is_err());
        assert!(parse(&["get", "ftp://example.com/a.bin"]).validate().is_err());
        assert!(parse(&["get", "https://example.com", "--timeout", "0"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_connect_validation() {
        let config = parse(&["connect", "localhost", "8080", "--timeout", "3"]);
        match config.command {
            Command::Connect {
                ref host,
                port,
                timeout,
            } => {
                assert_eq!(host, "localhost");
                assert_eq!(port, 8080);
                assert_eq!(timeout, Some(3));
            }
            ref other => panic!("unexpected command {:?}", other),
        }
        assert!(config.validate().is_ok());

        assert!(parse(&["connect", "localhost", "0"]).validate().is_err());
        assert!(parse(&["connect", " ", "80"]).validate().is_err());
        assert!(parse(&["connect", "localhost", "80", "--timeout", "0"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("value", "0x6f9fcfff").unwrap(), 0x6f9fcfff);
        assert_eq!(parse_u32("value", "16777343").unwrap(), 0x0100007f);
        assert!(parse_u32("value", "-1").is_err());
        assert!(parse(&["ntoa", "nope"]).validate().is_err());
    }

    #[test]
    fn test_rand_defaults() {
        let config = parse(&["rand"]);
        match config.command {
            Command::Rand {
                generator,
                count,
                seed,
            } => {
                assert_eq!(generator, Generator::Kiss);
                assert_eq!(count, 10);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
