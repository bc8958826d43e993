use serde_json::{Map, Value};

use super::SettingsStore;

/// Settings store over a flat JSON object. The host decides where the text lives.
#[derive(Debug, Clone, Default)]
pub struct JsonSettings {
    values: Map<String, Value>,
}

impl JsonSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse persisted settings. Anything other than a JSON object is rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let values: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { values })
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for JsonSettings {
    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.values
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        match serde_json::Number::from_f64(value as f64) {
            Some(n) => {
                self.values.insert(key.to_owned(), Value::Number(n));
            }
            None => log::warn!("refusing to store non-finite setting {} = {}", key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_uses_default() {
        let store = JsonSettings::new();
        assert_eq!(store.get_f32("shot.max_impulse", 42.0), 42.0);
    }

    #[test]
    fn parse_and_serialize() {
        let store = JsonSettings::from_json(r#"{ "a": 1.5, "b": "text" }"#).unwrap();
        assert_eq!(store.get_f32("a", 0.0), 1.5);
        // Wrong type falls back to default.
        assert_eq!(store.get_f32("b", 3.0), 3.0);

        let again = JsonSettings::from_json(&store.to_json()).unwrap();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn non_finite_values_are_dropped() {
        let mut store = JsonSettings::new();
        store.set_f32("x", f32::NAN);
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_non_object() {
        assert!(JsonSettings::from_json("[1, 2]").is_err());
    }
}
