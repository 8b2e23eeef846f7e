//! TOML manifests for desired aliases.
//!
//! ```toml
//! functionName = "orders"
//! name = "live"
//!
//! [functionEventInvokeConfig]
//! maximumEventAgeInSeconds = 3600
//!
//! [functionEventInvokeConfig.destinationConfig.onFailure]
//! destination = "arn:aws:sqs:us-east-1:123456789012:orders-dlq"
//!
//! [provisionedConcurrencyConfig]
//! provisionedConcurrentExecutions = 5
//! ```

use crate::error::ManifestError;
use crate::types::DesiredAlias;

impl DesiredAlias {
    /// Parse a desired alias from a TOML manifest.
    pub fn from_toml_str(contents: &str) -> Result<Self, ManifestError> {
        let alias: DesiredAlias = toml::from_str(contents)?;
        if alias.function_name.trim().is_empty() {
            return Err(ManifestError::EmptyField("functionName"));
        }
        if alias.name.trim().is_empty() {
            return Err(ManifestError::EmptyField("name"));
        }
        Ok(alias)
    }

    /// Render the alias as a TOML manifest.
    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
