//! Transaction configuration via `transaction.toml`
//!
//! The configuration is loaded once at startup, validated against the kind
//! registry, and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::kind::KindRegistry;
use crate::policy::Policy;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "transaction.toml";

/// Global transaction configuration
///
/// # Example
///
/// ```toml
/// # Only intercept services marked transactional-aware
/// strict_mode = false
///
/// # Policy used when a descriptor leaves it unset:
/// # "not-required", "required" (default) or "nested"
/// default_policy = "required"
///
/// # Error kinds that commit instead of rolling back
/// no_rollback_exceptions = ["NotFound"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionConfig {
    /// Intercept only classes carrying the transactional-aware marker.
    #[serde(default)]
    pub strict_mode: bool,
    /// Policy applied when a descriptor does not set one.
    #[serde(default)]
    pub default_policy: Policy,
    /// No-rollback list applied when a descriptor does not set one.
    #[serde(default)]
    pub no_rollback_exceptions: BTreeSet<String>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            default_policy: Policy::Required,
            no_rollback_exceptions: BTreeSet::new(),
        }
    }
}

impl TransactionConfig {
    /// Set strict mode
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Set the default policy
    pub fn with_default_policy(mut self, policy: Policy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Set the default no-rollback list (duplicates collapse)
    pub fn with_no_rollback_exceptions<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_rollback_exceptions = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Check every default no-rollback entry against the registry
    ///
    /// # Errors
    ///
    /// `UnknownType` or `NotAnExceptionType` for the first bad entry.
    pub fn validate(&self, kinds: &KindRegistry) -> CoreResult<()> {
        for kind in &self.no_rollback_exceptions {
            kinds.validate_error_kind(kind)?;
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// `Config` if the document does not parse (unknown key, bad policy name,
    /// wrong type), or a validation error from [`TransactionConfig::validate`].
    pub fn from_toml_str(content: &str, kinds: &KindRegistry) -> CoreResult<Self> {
        let config: TransactionConfig = toml::from_str(content)
            .map_err(|e| CoreError::config(format!("Failed to parse configuration: {}", e)))?;
        config.validate(kinds)?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path, kinds: &KindRegistry) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, kinds).map_err(|e| match e {
            CoreError::Config(msg) => {
                CoreError::config(format!("{} (in '{}')", msg, path.display()))
            }
            other => other,
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Transaction configuration
#
# Only intercept services marked transactional-aware (default: false)
strict_mode = false

# Policy used when a descriptor does not set one:
#   "not-required" = run in the caller's transaction, if any
#   "required"     = join the active transaction or begin one (default)
#   "nested"       = always begin, nesting inside an active transaction
default_policy = "required"

# Error kinds that commit the transaction instead of rolling it back,
# used when a descriptor does not set its own list.
no_rollback_exceptions = []
"#
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> CoreResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> CoreResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::config(format!("Failed to serialize configuration: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
