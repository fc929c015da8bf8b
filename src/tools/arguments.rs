//! Tool argument decoding.

use serde::de::DeserializeOwned;

use crate::error::{Result, SamvadError};

/// Decoded arguments for a tool invocation.
///
/// Providers deliver arguments either as a JSON-encoded string or as a
/// structured object. Anything that fails to decode as an object becomes an
/// empty argument set — malformed arguments never abort a round.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    values: serde_json::Map<String, serde_json::Value>,
}

impl ToolArguments {
    /// Decode from the raw value carried by a tool-call request.
    pub fn decode(raw: &serde_json::Value) -> Self {
        let values = match raw {
            serde_json::Value::Object(map) => map.clone(),
            serde_json::Value::String(s) => serde_json::from_str::<serde_json::Value>(s)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default(),
            _ => serde_json::Map::new(),
        };
        Self { values }
    }

    /// Fill in any absent parameters from the schema's declared defaults.
    pub fn apply_defaults(mut self, defaults: serde_json::Map<String, serde_json::Value>) -> Self {
        for (name, value) in defaults {
            self.values.entry(name).or_insert(value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Result<&str> {
        self.get_str_opt(name)
            .ok_or_else(|| SamvadError::InvalidArgument(format!("missing string argument '{name}'")))
    }

    pub fn get_str_opt(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.get_i64_opt(name)
            .ok_or_else(|| SamvadError::InvalidArgument(format!("missing integer argument '{name}'")))
    }

    pub fn get_i64_opt(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(|v| v.as_i64())
    }

    pub fn get_bool_opt(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(|v| v.as_bool())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserialize the whole argument set into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            self.values.clone(),
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_structured_object() {
        let args = ToolArguments::decode(&json!({"query": "rust", "results": 3}));
        assert_eq!(args.get_str("query").unwrap(), "rust");
        assert_eq!(args.get_i64("results").unwrap(), 3);
    }

    #[test]
    fn decodes_json_encoded_string() {
        let args = ToolArguments::decode(&json!("{\"query\": \"rust\"}"));
        assert_eq!(args.get_str("query").unwrap(), "rust");
    }

    #[test]
    fn malformed_arguments_decode_to_empty_set() {
        assert!(ToolArguments::decode(&json!("not json at all")).is_empty());
        assert!(ToolArguments::decode(&json!(42)).is_empty());
        assert!(ToolArguments::decode(&json!(["a", "b"])).is_empty());
    }

    #[test]
    fn defaults_fill_only_absent_parameters() {
        let mut defaults = serde_json::Map::new();
        defaults.insert("results".into(), json!(5));
        defaults.insert("query".into(), json!("fallback"));

        let args = ToolArguments::decode(&json!({"query": "rust"})).apply_defaults(defaults);
        assert_eq!(args.get_str("query").unwrap(), "rust");
        assert_eq!(args.get_i64("results").unwrap(), 5);
    }

    #[test]
    fn typed_deserialization() {
        #[derive(serde::Deserialize)]
        struct Params {
            query: String,
            results: Option<u32>,
        }
        let args = ToolArguments::decode(&json!({"query": "rust"}));
        let params: Params = args.deserialize().unwrap();
        assert_eq!(params.query, "rust");
        assert_eq!(params.results, None);
    }
}
