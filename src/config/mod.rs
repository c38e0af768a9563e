use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Property that turns auto module selection off when set to `false`
pub const ENABLED_OVERRIDE_PROPERTY: &str = "meshestra.boot.enableautoconfiguration";

/// Property holding a comma-separated list of module names to exclude
pub const EXCLUDE_PROPERTY: &str = "meshestra.autoconfigure.exclude";

/// Configuration service
///
/// Keys are looked up as given first, then in environment-variable form, so
/// `meshestra.autoconfigure.exclude` also finds `MESHESTRA_AUTOCONFIGURE_EXCLUDE`.
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service seeded from the process environment
    pub fn from_env() -> Self {
        Self::from_pairs(env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let service = Self::default();
        for (key, value) in pairs {
            service.config.insert(key.into(), value.into());
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config
            .get(key)
            .or_else(|| self.config.get(&env_key(key)))
            .map(|v| v.value().clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Boolean property; values other than `true`/`false` are ignored
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                tracing::warn!("Ignoring non-boolean value '{}' for {}", other, key);
                None
            }
        }
    }

    /// Comma-separated list property, blanks dropped
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn auto_configuration_enabled(&self) -> bool {
        self.get_bool(ENABLED_OVERRIDE_PROPERTY).unwrap_or(true)
    }

    /// Module names excluded through configuration
    pub fn excluded_modules(&self) -> Vec<String> {
        self.get_list(EXCLUDE_PROPERTY)
    }
}

fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}
