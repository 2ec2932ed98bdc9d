//! Configuration for the contact service.

use anyhow::{bail, Context, Result};
use contact_store::phone::{default_prefixes, parse_prefix_table};
use contact_store::PhoneNormalizer;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Contact storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Phone normalization rules
    #[serde(default)]
    pub phone: PhoneConfig,

    /// Submission handling
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// vCard export
    #[serde(default)]
    pub export: ExportConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the contacts JSON file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, contacts are in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneConfig {
    /// Calling code prepended to local numbers
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Bare prefixes recognised as country codes, e.g. "254=KE,255=TZ"
    #[serde(default)]
    pub country_prefixes: Option<String>,

    /// Shortest digit count treated as a local subscriber number
    #[serde(default = "default_local_len")]
    pub local_min_len: usize,

    /// Longest digit count treated as a local subscriber number
    #[serde(default = "default_local_len")]
    pub local_max_len: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactsConfig {
    /// Marker prepended to every submitted name
    #[serde(default)]
    pub name_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// File name offered in the download's Content-Disposition
    #[serde(default = "default_export_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,

    /// Submissions per minute, counted apart from the global quota
    #[serde(default = "default_submit_rpm")]
    pub submit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            persist: true,
        }
    }
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
            country_prefixes: None,
            local_min_len: default_local_len(),
            local_max_len: default_local_len(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: default_export_filename(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
            submit_per_minute: default_submit_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/contacts.json")
}

fn default_true() -> bool {
    true
}

fn default_country_code() -> String {
    "+254".into()
}

fn default_local_len() -> usize {
    9
}

fn default_export_filename() -> String {
    "contacts.vcf".into()
}

fn default_global_rpm() -> u32 {
    120
}

fn default_submit_rpm() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

impl PhoneConfig {
    /// Build the normalizer described by this section.
    pub fn normalizer(&self) -> Result<PhoneNormalizer> {
        let prefixes = match &self.country_prefixes {
            Some(table) => parse_prefix_table(table).context("Invalid phone.country_prefixes")?,
            None => default_prefixes(),
        };

        Ok(PhoneNormalizer::new(
            &self.default_country_code,
            prefixes,
            (self.local_min_len, self.local_max_len),
        ))
    }
}

impl ExportConfig {
    /// Check the file name can go into a quoted `Content-Disposition` value.
    pub fn validate(&self) -> Result<()> {
        let name = &self.filename;
        if name.trim().is_empty() {
            bail!("export.filename must not be empty");
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_graphic() || *c == ' ') || matches!(*c, '"' | '\\' | '/'))
        {
            bail!("export.filename contains unsupported character {:?}", c);
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.export.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.storage.persist);
        assert_eq!(config.storage.path, PathBuf::from("data/contacts.json"));
        assert_eq!(config.export.filename, "contacts.vcf");
        assert!(config.export.validate().is_ok());
        assert_eq!(config.rate_limit.global_per_minute, 120);
        assert_eq!(config.rate_limit.submit_per_minute, 10);
        assert!(config.contacts.name_prefix.is_empty());
        assert_eq!(config.log.format, "text");
    }

    #[test]
    fn test_default_phone_rules() {
        let normalizer = PhoneConfig::default().normalizer().unwrap();
        assert_eq!(normalizer.default_country_code(), "+254");
        assert_eq!(normalizer.prefixes().len(), 6);
        assert_eq!(normalizer.normalize("0712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn test_custom_phone_rules() {
        let phone = PhoneConfig {
            default_country_code: "255".into(),
            country_prefixes: Some("255=TZ,254=KE".into()),
            local_min_len: 9,
            local_max_len: 9,
        };
        let normalizer = phone.normalizer().unwrap();
        assert_eq!(normalizer.normalize("0712345678").unwrap(), "+255712345678");
        assert_eq!(normalizer.country_of("+254712345678"), Some("KE"));
    }

    #[test]
    fn test_invalid_prefix_table() {
        let phone = PhoneConfig {
            country_prefixes: Some("abc".into()),
            ..PhoneConfig::default()
        };
        assert!(phone.normalizer().is_err());
    }

    #[test]
    fn test_deserialize_from_source() {
        let config: Config = config::Config::builder()
            .set_override("server.port", 8088)
            .unwrap()
            .set_override("storage.persist", false)
            .unwrap()
            .set_override("contacts.name_prefix", "VIP ")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert!(!config.storage.persist);
        assert_eq!(config.contacts.name_prefix, "VIP ");
        assert_eq!(config.phone.local_max_len, 9);
    }

    #[test]
    fn test_export_filename_validation() {
        let valid = |name: &str| {
            ExportConfig {
                filename: name.into(),
            }
            .validate()
            .is_ok()
        };

        assert!(valid("contacts.vcf"));
        assert!(valid("approved contacts 2024.vcf"));

        assert!(!valid(""));
        assert!(!valid("   "));
        assert!(!valid("contacts\r\n.vcf"));
        assert!(!valid("contacts\u{7f}.vcf"));
        assert!(!valid("contactés.vcf"));
        assert!(!valid("say \"hi\".vcf"));
        assert!(!valid("../contacts.vcf"));
        assert!(!valid("dir\\contacts.vcf"));
    }

    #[test]
    fn test_submit_quota_from_source() {
        let config: Config = config::Config::builder()
            .set_override("rate_limit.submit_per_minute", 3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.rate_limit.submit_per_minute, 3);
        assert_eq!(config.rate_limit.global_per_minute, 120);
    }
}
