// Plugin settings: a JSON document addressed by dotted paths

use arc_swap::ArcSwap;
use serde_json::{Map, Value};

use crate::config::pickup::DEFAULT_SETTINGS_JSON;

/// Read-only view of the plugin configuration
pub trait Configuration {
    /// Boolean at a dotted path such as `AutoPickup.Mobs`
    /// Missing or non-boolean values read as false
    fn get_boolean(&self, path: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    root: Value,
}

impl Settings {
    /// Built-in defaults
    pub fn defaults() -> Self {
        let root = serde_json::from_str(DEFAULT_SETTINGS_JSON)
            .unwrap_or_else(|_| Value::Object(Map::new()));
        Self { root }
    }

    /// Parse a settings document and merge it over the defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        let overrides: Value = serde_json::from_str(json)
            .map_err(|e| format!("Invalid settings JSON: {}", e))?;

        if !overrides.is_object() {
            return Err("Settings root must be a JSON object".to_string());
        }

        let mut settings = Self::defaults();
        merge(&mut settings.root, overrides);
        Ok(settings)
    }

    /// Load settings from a file on disk
    pub fn load(path: &str) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file {}: {}", path, e))?;
        Self::from_json(&contents)
    }

    /// Set a boolean at a dotted path, creating intermediate objects
    pub fn set_boolean(&mut self, path: &str, value: bool) {
        let mut node = &mut self.root;
        for key in path.split('.') {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = match node {
                Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
                _ => return,
            };
        }
        *node = Value::Bool(value);
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.root, |node, key| node.get(key))
    }

    pub fn to_json(&self) -> String {
        self.root.to_string()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Configuration for Settings {
    fn get_boolean(&self, path: &str) -> bool {
        self.lookup(path).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Live settings that can be swapped on reload without blocking readers
impl Configuration for ArcSwap<Settings> {
    fn get_boolean(&self, path: &str) -> bool {
        self.load().get_boolean(path)
    }
}

impl<C: Configuration + ?Sized> Configuration for std::sync::Arc<C> {
    fn get_boolean(&self, path: &str) -> bool {
        (**self).get_boolean(path)
    }
}

/// Deep-merge `overrides` into `base`; objects merge key by key, everything else replaces
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pickup::{BLOCKS_PATH, MOBS_PATH, REQUIRE_PERMISSION_PATH};

    #[test]
    fn test_defaults() {
        let settings = Settings::defaults();
        assert!(settings.get_boolean(MOBS_PATH));
        assert!(settings.get_boolean(BLOCKS_PATH));
        assert!(!settings.get_boolean(REQUIRE_PERMISSION_PATH));
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let settings = Settings::from_json(r#"{"AutoPickup": {"Mobs": false}}"#).unwrap();
        assert!(!settings.get_boolean(MOBS_PATH));
        assert!(settings.get_boolean(BLOCKS_PATH));
    }

    #[test]
    fn test_missing_or_non_bool_reads_false() {
        let settings = Settings::from_json(r#"{"RequirePermission": "yes"}"#).unwrap();
        assert!(!settings.get_boolean(REQUIRE_PERMISSION_PATH));
        assert!(!settings.get_boolean("Nope.Missing"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
        assert!(Settings::from_json("[true]").is_err());
    }

    #[test]
    fn test_set_boolean() {
        let mut settings = Settings::defaults();
        settings.set_boolean(REQUIRE_PERMISSION_PATH, true);
        settings.set_boolean("Extra.Nested.Flag", true);

        assert!(settings.get_boolean(REQUIRE_PERMISSION_PATH));
        assert!(settings.get_boolean("Extra.Nested.Flag"));
    }

    #[test]
    fn test_swapped_settings_are_visible() {
        let live = ArcSwap::from_pointee(Settings::defaults());
        assert!(live.get_boolean(MOBS_PATH));

        let disabled = Settings::from_json(r#"{"AutoPickup": {"Mobs": false}}"#).unwrap();
        live.store(std::sync::Arc::new(disabled));
        assert!(!live.get_boolean(MOBS_PATH));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(Settings::load("/nonexistent/autopickup.json").is_err());
    }
}
