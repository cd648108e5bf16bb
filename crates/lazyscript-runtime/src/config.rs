use serde::{Deserialize, Serialize};

pub const ENV_STRICT_EFFECTS: &str = "LAZYSCRIPT_STRICT_EFFECTS";
pub const ENV_MAX_DEPTH: &str = "LAZYSCRIPT_MAX_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Refuse effectful builtins outside a sequencing region.
    pub strict_effects: bool,
    /// Nested force limit before evaluation gives up with a Bottom.
    pub max_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { strict_effects: false, max_depth: 100_000 }
    }
}

impl RuntimeConfig {
    pub fn strict() -> Self {
        Self { strict_effects: true, ..Self::default() }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup; unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_STRICT_EFFECTS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => cfg.strict_effects = true,
                "0" | "false" | "no" | "off" | "" => cfg.strict_effects = false,
                other => tracing::warn!(value = other, "ignoring {ENV_STRICT_EFFECTS}"),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.max_depth = n,
                _ => tracing::warn!(value = raw.as_str(), "ignoring {ENV_MAX_DEPTH}"),
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = RuntimeConfig::from_lookup(|k| match k {
            ENV_STRICT_EFFECTS => Some("on".into()),
            ENV_MAX_DEPTH => Some("64".into()),
            _ => None,
        });
        assert_eq!(cfg, RuntimeConfig { strict_effects: true, max_depth: 64 });
    }

    #[test]
    fn garbage_keeps_defaults() {
        let cfg = RuntimeConfig::from_lookup(|k| match k {
            ENV_STRICT_EFFECTS => Some("maybe".into()),
            ENV_MAX_DEPTH => Some("0".into()),
            _ => None,
        });
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str(r#"{"strict_effects": true}"#).unwrap();
        assert!(cfg.strict_effects);
        assert_eq!(cfg.max_depth, RuntimeConfig::default().max_depth);
    }
}
