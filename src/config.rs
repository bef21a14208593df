//! Device properties consulted by quirks at runtime.
//!
//! Quirks read values such as the home operator name through a
//! [`PropertySource`] rather than a global, so tests and embedders can
//! supply their own.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Read-only key/value lookup. Keys use dotted names (`ro.cdma.home.operator.alpha`).
pub trait PropertySource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Value of `key`, or `default` when unset or empty.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Properties from the process environment.
///
/// `ro.cdma.home.operator.alpha` is looked up as `RO_CDMA_HOME_OPERATOR_ALPHA`.
#[derive(Debug, Clone, Default)]
pub struct EnvProperties {
    prefix: Option<String>,
}

impl EnvProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` and an underscore to every variable name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn var_name(&self, key: &str) -> String {
        let name: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name,
        }
    }
}

impl PropertySource for EnvProperties {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key)).ok()
    }
}

/// Fixed in-memory properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StaticProperties {
    values: HashMap<String, String>,
}

impl StaticProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Parse a flat JSON object of string values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl PropertySource for StaticProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RilError;

    #[test]
    fn test_env_var_name() {
        let env = EnvProperties::new();
        assert_eq!(
            env.var_name("ro.cdma.home.operator.alpha"),
            "RO_CDMA_HOME_OPERATOR_ALPHA"
        );
        assert_eq!(
            EnvProperties::with_prefix("RIL").var_name("ril.ecclist"),
            "RIL_RIL_ECCLIST"
        );
    }

    #[test]
    fn test_env_lookup() {
        std::env::set_var("RIL_CLIENT_TEST_OPERATOR_ALPHA", "Example Wireless");
        let env = EnvProperties::new();
        assert_eq!(
            env.get("ril_client.test.operator.alpha").as_deref(),
            Some("Example Wireless")
        );
        assert_eq!(env.get("ril_client.test.unset.key"), None);
    }

    #[test]
    fn test_static_from_json() {
        let props = StaticProperties::from_json(
            r#"{"ro.cdma.home.operator.alpha": "Carrier", "ril.ecclist": "999,000"}"#,
        )
        .unwrap();
        assert_eq!(
            props.get("ro.cdma.home.operator.alpha").as_deref(),
            Some("Carrier")
        );
        assert_eq!(props.get("ril.ecclist").as_deref(), Some("999,000"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_static_from_json_file() {
        let path = std::env::temp_dir().join(format!(
            "ril-client-props-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"ril.radio.access.family": "LTE|EHRPD"}"#).unwrap();
        let props = StaticProperties::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            props.get("ril.radio.access.family").as_deref(),
            Some("LTE|EHRPD")
        );

        let err = StaticProperties::from_json_file(&path).unwrap_err();
        assert!(matches!(err, RilError::Io(_)));
    }

    #[test]
    fn test_static_from_bad_json() {
        let err = StaticProperties::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, RilError::Json(_)));
    }

    #[test]
    fn test_get_or_treats_empty_as_unset() {
        let props = StaticProperties::new().with("ril.radio.access.family", "");
        assert_eq!(props.get_or("ril.radio.access.family", "LTE"), "LTE");
        assert_eq!(props.get_or("other", "x"), "x");
    }
}
