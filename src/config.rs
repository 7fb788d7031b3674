//! Pool configuration, usually authored as a RON file next to the rest of the game data.
//!
//! ```text
//! (
//!     amount_to_pool: 32,
//!     object_config: (label: "bullet", speed: 12.0),
//!     seed: Some(7),
//!     random_selection: Uniform,
//! )
//! ```

use crate::{error::PoolResult, util::buf_open};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

const DEFAULT_AMOUNT_TO_POOL: usize = 20;

/// How `ObjectPool::get_random_pooled_object` picks among the pool.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum RandomSelection {
    /// Draw random indices, remembering which ones were seen, until an inactive
    /// object turns up or every index has been seen. Not uniform over the inactive
    /// objects, and it can take many draws before every index has been seen.
    Sampled,
    /// Pick uniformly among the currently inactive objects.
    Uniform,
}

impl Default for RandomSelection {
    #[inline]
    fn default() -> RandomSelection {
        RandomSelection::Sampled
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig<C> {
    /// Number of objects created up front whenever the pool is activated.
    #[serde(default = "default_amount_to_pool")]
    pub amount_to_pool: usize,
    /// Handed to the factory once, when the pool is constructed.
    pub object_config: C,
    /// Fixed RNG seed for reproducible random retrieval.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub random_selection: RandomSelection,
}

#[inline]
fn default_amount_to_pool() -> usize {
    DEFAULT_AMOUNT_TO_POOL
}

impl<C> PoolConfig<C> {
    pub fn new(object_config: C) -> PoolConfig<C> {
        PoolConfig {
            amount_to_pool: DEFAULT_AMOUNT_TO_POOL,
            object_config,
            seed: None,
            random_selection: RandomSelection::default(),
        }
    }

    #[inline]
    pub fn with_amount(mut self, amount_to_pool: usize) -> PoolConfig<C> {
        self.amount_to_pool = amount_to_pool;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> PoolConfig<C> {
        self.seed = Some(seed);
        self
    }

    #[inline]
    pub fn with_random_selection(mut self, random_selection: RandomSelection) -> PoolConfig<C> {
        self.random_selection = random_selection;
        self
    }
}

impl<C: DeserializeOwned> PoolConfig<C> {
    pub fn from_ron_str(s: &str) -> PoolResult<PoolConfig<C>> {
        Ok(ron::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> PoolResult<PoolConfig<C>> {
        let reader = buf_open(path.as_ref())?;
        let config: PoolConfig<C> = ron::de::from_reader(reader)?;
        log::info!(
            "Loaded pool config from {} ({} objects)",
            path.as_ref().display(),
            config.amount_to_pool
        );
        Ok(config)
    }
}
