use crate::print::{PrintLevel, Printer};
use crate::utils::error::{ExtError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SORT_BLOCK_SIZE: usize = 1 << 20;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SOCKET_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtConfig {
    pub print: Option<PrintConfig>,
    pub sort: Option<SortConfig>,
    pub net: Option<NetConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintConfig {
    pub level: Option<PrintLevel>,
    pub output_level: Option<PrintLevel>,
    pub output_file: Option<String>,
    pub append: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub block_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetConfig {
    pub http_timeout_seconds: Option<u64>,
    pub socket_timeout_seconds: Option<u64>,
}

impl ExtConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the value of the environment variable `VAR`.
    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExtError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(print) = &self.print {
            if let Some(file) = &print.output_file {
                validation::validate_path("print.output_file", file)?;
            }
        }

        if let Some(block_size) = self.sort.as_ref().and_then(|s| s.block_size) {
            validation::validate_positive_number("sort.block_size", block_size, 1)?;
        }

        if let Some(net) = &self.net {
            if let Some(timeout) = net.http_timeout_seconds {
                validation::validate_range("net.http_timeout_seconds", timeout, 1, 3600)?;
            }
            if let Some(timeout) = net.socket_timeout_seconds {
                validation::validate_range("net.socket_timeout_seconds", timeout, 1, 3600)?;
            }
        }

        Ok(())
    }

    pub fn print_level(&self) -> PrintLevel {
        self.print
            .as_ref()
            .and_then(|p| p.level)
            .unwrap_or(PrintLevel::Log)
    }

    pub fn output_level(&self) -> PrintLevel {
        self.print
            .as_ref()
            .and_then(|p| p.output_level)
            .unwrap_or(PrintLevel::None)
    }

    pub fn output_file(&self) -> Option<&str> {
        self.print.as_ref().and_then(|p| p.output_file.as_deref())
    }

    pub fn sort_block_size(&self) -> usize {
        self.sort
            .as_ref()
            .and_then(|s| s.block_size)
            .unwrap_or(DEFAULT_SORT_BLOCK_SIZE)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.net
                .as_ref()
                .and_then(|n| n.http_timeout_seconds)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
        )
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(
            self.net
                .as_ref()
                .and_then(|n| n.socket_timeout_seconds)
                .unwrap_or(DEFAULT_SOCKET_TIMEOUT_SECONDS),
        )
    }

    /// Applies the print section to `printer`, opening the log file if one
    /// is configured.
    pub fn apply_print(&self, printer: &Printer) -> Result<()> {
        printer.set_print_level(self.print_level());
        printer.set_output_level(self.output_level());
        if let Some(file) = self.output_file() {
            let append = self.print.as_ref().and_then(|p| p.append).unwrap_or(true);
            printer.set_output_file(file, append)?;
        }
        Ok(())
    }
}

impl Validate for ExtConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[print]
level = "debug"
output_level = "warn"
output_file = "extlib.log"
append = false

[sort]
block_size = 4096

[net]
http_timeout_seconds = 10
socket_timeout_seconds = 2
"#;

        let config = ExtConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.print_level(), PrintLevel::Debug);
        assert_eq!(config.output_level(), PrintLevel::Warn);
        assert_eq!(config.output_file(), Some("extlib.log"));
        assert_eq!(config.sort_block_size(), 4096);
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.socket_timeout(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_empty_config() {
        let config = ExtConfig::from_toml_str("").unwrap();
        assert_eq!(config.print_level(), PrintLevel::Log);
        assert_eq!(config.output_level(), PrintLevel::None);
        assert_eq!(config.output_file(), None);
        assert_eq!(config.sort_block_size(), DEFAULT_SORT_BLOCK_SIZE);
        assert_eq!(
            config.http_timeout(),
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS)
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("EXTLIB_TEST_LOG_FILE", "/tmp/extlib-test.log");

        let toml_content = r#"
[print]
output_file = "${EXTLIB_TEST_LOG_FILE}"
"#;

        let config = ExtConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_file(), Some("/tmp/extlib-test.log"));

        std::env::remove_var("EXTLIB_TEST_LOG_FILE");
    }

    #[test]
    fn test_unset_env_var_is_kept() {
        let config = ExtConfig::from_toml_str(
            r#"
[print]
output_file = "${EXTLIB_SURELY_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert_eq!(config.output_file(), Some("${EXTLIB_SURELY_UNSET_VARIABLE}"));
    }

    #[test]
    fn test_config_validation() {
        let config = ExtConfig::from_toml_str("[sort]\nblock_size = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = ExtConfig::from_toml_str("[net]\nhttp_timeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        assert!(matches!(
            ExtConfig::from_toml_str("[print]\nlevel = \"loud\"\n"),
            Err(ExtError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file_and_apply() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_path = dir.path().join("out.log");
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "[print]\nlevel = \"warn\"\noutput_level = \"log\"\noutput_file = {:?}\n",
            log_path.to_str().unwrap()
        )
        .unwrap();

        let config = ExtConfig::from_file(temp_file.path()).unwrap();
        let printer = Printer::with_sinks(Box::new(std::io::sink()), Box::new(std::io::sink()));
        config.apply_print(&printer).unwrap();

        assert_eq!(printer.print_level(), PrintLevel::Warn);
        assert_eq!(printer.output_level(), PrintLevel::Log);
        printer.print_ext(None, PrintLevel::Log, 1, "x.rs", format_args!("logged"));
        printer.close_output();
        assert!(std::fs::read_to_string(&log_path)
            .unwrap()
            .ends_with("- logged\n"));
    }
}
