use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use shard_types::Sampling;
use std::path::PathBuf;

pub const ENV_ROOT: &str = "SHARDS_ROOT";
pub const ENV_SAMPLING: &str = "SHARDS_SAMPLING";
pub const ENV_DEBUG: &str = "SHARDS_DEBUG";
pub const ENV_PREFETCH: &str = "SHARDS_PREFETCH";

/// Options fixed for the lifetime of a [`crate::ShardedDb`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardedDbConfig {
    /// Directory holding the `<kind>_<market>` trees.
    pub root: PathBuf,
    /// Storage variant for top-of-book reads. `Px` switches to monthly sampled files;
    /// any other value is accepted but does not change discovery.
    #[serde(default)]
    pub sampling: Option<Sampling>,
    /// Log discovery and candidate lists at debug level.
    #[serde(default)]
    pub debug: bool,
    /// Hint the kernel to read the next shard ahead while the current one is decoded.
    #[serde(default)]
    pub prefetch: bool,
}

impl ShardedDbConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sampling: None,
            debug: false,
            prefetch: false,
        }
    }

    pub fn with_sampling(mut self, sampling: Option<Sampling>) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Build from the process environment, loading `.env` first if present.
    ///
    /// `SHARDS_ROOT` is required; `SHARDS_SAMPLING`, `SHARDS_DEBUG` and
    /// `SHARDS_PREFETCH` are optional.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let root = non_empty(ENV_ROOT).ok_or_else(|| anyhow!("{ENV_ROOT} is not set"))?;
        let sampling = non_empty(ENV_SAMPLING)
            .map(|v| v.parse::<Sampling>())
            .transpose()
            .with_context(|| format!("invalid {ENV_SAMPLING}"))?;
        let debug = non_empty(ENV_DEBUG)
            .map(|v| parse_flag(ENV_DEBUG, &v))
            .transpose()?
            .unwrap_or(false);
        let prefetch = non_empty(ENV_PREFETCH)
            .map(|v| parse_flag(ENV_PREFETCH, &v))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            root: PathBuf::from(root.trim()),
            sampling,
            debug,
            prefetch,
        })
    }
}

fn parse_flag(key: &str, v: &str) -> anyhow::Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid {key}: expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn root_is_required() {
        let err = ShardedDbConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(ENV_ROOT));
        assert!(ShardedDbConfig::from_lookup(lookup(&[(ENV_ROOT, "  ")])).is_err());
    }

    #[test]
    fn defaults_from_root_only() {
        let cfg = ShardedDbConfig::from_lookup(lookup(&[(ENV_ROOT, "/data/shards")])).unwrap();
        assert_eq!(cfg, ShardedDbConfig::new("/data/shards"));
    }

    #[test]
    fn all_keys() {
        let cfg = ShardedDbConfig::from_lookup(lookup(&[
            (ENV_ROOT, "/data"),
            (ENV_SAMPLING, "px"),
            (ENV_DEBUG, "Yes"),
            (ENV_PREFETCH, "1"),
        ]))
        .unwrap();
        assert_eq!(
            cfg,
            ShardedDbConfig::new("/data")
                .with_sampling(Some(Sampling::Px))
                .with_debug(true)
                .with_prefetch(true)
        );
    }

    #[test]
    fn bad_values_are_rejected() {
        let bad_sampling = lookup(&[(ENV_ROOT, "/d"), (ENV_SAMPLING, "5m")]);
        let err = ShardedDbConfig::from_lookup(bad_sampling).unwrap_err();
        assert!(err.to_string().contains(ENV_SAMPLING));

        let bad_flag = lookup(&[(ENV_ROOT, "/d"), (ENV_DEBUG, "maybe")]);
        assert!(ShardedDbConfig::from_lookup(bad_flag).is_err());
    }

    #[test]
    fn optional_fields_default_when_deserialized() {
        use serde::de::value::{Error, MapDeserializer};
        let de = MapDeserializer::<_, Error>::new(std::iter::once(("root", "/x")));
        let cfg = ShardedDbConfig::deserialize(de).unwrap();
        assert_eq!(cfg, ShardedDbConfig::new("/x"));
    }
}
