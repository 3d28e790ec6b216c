//! Encoder registry: defaults shallow-merged with caller overrides.

use serde::{Deserialize, Serialize};

use super::defaults::{default_params, default_pattern};
use super::{EncoderId, MatchRule, Params, RuleError};

/// Override key that replaces an encoder's match rule.
const EXTENSION_KEY: &str = "extension";

/// Match rule plus the parameter set handed to the codec engine.
///
/// Serialized flat: `{ "extension": "\\.png$", "level": 2 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSpec {
    pub extension: MatchRule,
    #[serde(flatten)]
    pub params: Params,
}

impl EncoderSpec {
    fn default_for(id: EncoderId) -> Self {
        let params = match default_params(id) {
            serde_json::Value::Object(map) => map,
            _ => Params::new(),
        };
        Self {
            extension: MatchRule::new(default_pattern(id)).expect("default patterns are valid"),
            params,
        }
    }

    /// Shallow merge: every override key replaces the default value.
    fn merged(mut self, overrides: &Params) -> Result<Self, RuleError> {
        for (key, value) in overrides {
            if key == EXTENSION_KEY {
                if let Some(pattern) = value.as_str() {
                    self.extension = MatchRule::new(pattern)?;
                }
                continue;
            }
            self.params.insert(key.clone(), value.clone());
        }
        Ok(self)
    }
}

/// Effective encoder table for one run, in registration order.
///
/// Built once per run and passed by reference; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    /// Indexed by `EncoderId as usize`.
    specs: Vec<EncoderSpec>,
}

impl Registry {
    /// Registry with every encoder at its default parameters.
    pub fn defaults() -> Self {
        Self {
            specs: EncoderId::ALL
                .into_iter()
                .map(EncoderSpec::default_for)
                .collect(),
        }
    }

    /// Defaults shallow-merged with per-encoder overrides.
    pub fn effective<'a>(
        overrides: impl IntoIterator<Item = (EncoderId, &'a Params)>,
    ) -> Result<Self, RuleError> {
        let mut registry = Self::defaults();
        for (id, params) in overrides {
            let slot = &mut registry.specs[id as usize];
            *slot = slot.clone().merged(params)?;
        }
        Ok(registry)
    }

    pub fn spec(&self, id: EncoderId) -> &EncoderSpec {
        &self.specs[id as usize]
    }

    /// First encoder (registration order) whose rule matches `name`.
    pub fn auto_match(&self, name: &str) -> Option<EncoderId> {
        self.iter()
            .find(|(_, spec)| spec.extension.is_match(name))
            .map(|(id, _)| id)
    }

    /// Whether any registered rule matches `name`.
    pub fn matches_any(&self, name: &str) -> bool {
        self.auto_match(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EncoderId, &EncoderSpec)> {
        EncoderId::ALL.into_iter().zip(self.specs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_defaults_cover_every_identity() {
        let registry = Registry::defaults();
        assert_eq!(registry.iter().count(), EncoderId::ALL.len());
        assert_eq!(registry.spec(EncoderId::Oxipng).params["level"], json!(2));
        assert_eq!(registry.spec(EncoderId::Mozjpeg).params["quality"], json!(75));
    }

    #[test]
    fn test_shallow_merge_override_wins() {
        let overrides = params(json!({ "quality": 90 }));
        let registry = Registry::effective([(EncoderId::Mozjpeg, &overrides)]).unwrap();
        let spec = registry.spec(EncoderId::Mozjpeg);

        assert_eq!(spec.params["quality"], json!(90));
        // Unspecified keys keep their defaults
        assert_eq!(spec.params["progressive"], json!(true));
        // Other encoders untouched
        assert_eq!(
            registry.spec(EncoderId::Webp),
            Registry::defaults().spec(EncoderId::Webp)
        );
    }

    #[test]
    fn test_extension_override_replaces_rule() {
        let overrides = params(json!({ "extension": r"\.(png|apng)$" }));
        let registry = Registry::effective([(EncoderId::Oxipng, &overrides)]).unwrap();

        assert_eq!(registry.auto_match("anim.apng"), Some(EncoderId::Oxipng));
        assert!(!registry.spec(EncoderId::Oxipng).params.contains_key("extension"));
    }

    #[test]
    fn test_invalid_extension_override() {
        let overrides = params(json!({ "extension": "(" }));
        assert!(Registry::effective([(EncoderId::Oxipng, &overrides)]).is_err());
    }

    #[test]
    fn test_auto_match_first_wins() {
        // webp precedes oxipng in registration order
        let overrides = params(json!({ "extension": r"\.(webp|png)$" }));
        let registry = Registry::effective([(EncoderId::Webp, &overrides)]).unwrap();

        assert_eq!(registry.auto_match("logo.png"), Some(EncoderId::Webp));
        assert_eq!(registry.auto_match("photo.JPG"), Some(EncoderId::Mozjpeg));
        assert_eq!(registry.auto_match("icon.bmp"), None);
    }

    #[test]
    fn test_spec_serializes_flat() {
        let spec = Registry::defaults().spec(EncoderId::Oxipng).clone();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, json!({ "extension": r"\.png$", "level": 2 }));

        let back: EncoderSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_spec_equality_ignores_key_order() {
        let a: EncoderSpec =
            serde_json::from_str(r#"{"extension":"\\.png$","level":2,"strip":true}"#).unwrap();
        let b: EncoderSpec =
            serde_json::from_str(r#"{"strip":true,"level":2,"extension":"\\.png$"}"#).unwrap();
        assert_eq!(a, b);
    }
}
