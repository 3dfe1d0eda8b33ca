//! Library configuration that callers can serialize/deserialize.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqConfig {
    /// Optional seed for deterministic shuffles and random choice.
    pub seed: Option<u64>,

    /// Label printed in front of every element by `trace`.
    pub trace_label: String,

    /// Pretty-print JSON produced by `to_json_with`.
    pub json_pretty: bool,

    /// Initial bucket-table capacity for stores built by set, group and
    /// lookup operators. Must be non-zero.
    pub bucket_capacity_hint: usize,
}

impl Default for SeqConfig {
    fn default() -> Self {
        Self {
            seed: None,
            trace_label: "Trace".to_string(),
            json_pretty: false,
            bucket_capacity_hint: 16,
        }
    }
}

impl SeqConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `LAZYSEQ_SEED`: random seed
    /// - `LAZYSEQ_TRACE_LABEL`: label used by `trace`
    /// - `LAZYSEQ_JSON_PRETTY`: `true`/`false`
    /// - `LAZYSEQ_BUCKET_CAPACITY`: initial bucket capacity
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("LAZYSEQ_SEED") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.seed = Some(v);
            }
        }

        if let Ok(s) = std::env::var("LAZYSEQ_TRACE_LABEL") {
            cfg.trace_label = s;
        }

        if let Ok(s) = std::env::var("LAZYSEQ_JSON_PRETTY") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.json_pretty = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYSEQ_BUCKET_CAPACITY") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.bucket_capacity_hint = v;
            }
        }

        cfg
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_capacity_hint == 0 {
            return Err(Error::Config(
                "bucket_capacity_hint must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// RNG for shuffle/choice: seeded when `seed` is set, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_is_valid() {
        let cfg = SeqConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.trace_label, "Trace");
    }

    #[test]
    fn zero_bucket_capacity_is_rejected() {
        let cfg = SeqConfig {
            bucket_capacity_hint: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let cfg = SeqConfig::default().with_seed(7);
        let a: Vec<u32> = (0..4).map(|_| cfg.rng().gen_range(0..1000)).collect();
        let mut r1 = cfg.rng();
        let mut r2 = cfg.rng();
        assert_eq!(r1.gen::<u64>(), r2.gen::<u64>());
        assert!(a.iter().all(|&x| x == a[0]));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = SeqConfig::default().with_seed(3);
        let text = serde_json::to_string(&cfg).unwrap();
        let back: SeqConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
