use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookCategory;
use crate::config::PoolSettings;

/// Per-user weighted preference profile over book categories.
///
/// Every engagement pulls all weights into `[0, weight_limit]`, including
/// weights stored under an earlier, higher limit. `saturation` counts engagements
/// and is pulled back to `saturation_limit` every time a decay pass runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestPool {
    pub user_id: Uuid,
    pub saturation: u32,

    #[serde(default)]
    pub categories: BTreeMap<BookCategory, u32>,

    pub updated_at: DateTime<Utc>,
}

impl InterestPool {
    /// A pool as it exists before its first engagement is applied.
    ///
    /// Saturation starts at 1, so the first engagement leaves it at 2.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            saturation: 1,
            categories: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn weight(&self, category: BookCategory) -> u32 {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    pub fn total_weight(&self) -> u64 {
        self.categories.values().map(|w| u64::from(*w)).sum()
    }

    /// Pull every weight down to `limit`. Needed when a pool was stored
    /// under a higher `weight_limit` than the one now configured.
    pub fn clamp_weights(&mut self, limit: u32) {
        for weight in self.categories.values_mut() {
            *weight = (*weight).min(limit);
        }
    }

    /// Apply one engagement with `category`. Returns `true` when the
    /// engagement triggered a decay pass.
    pub fn accumulate(&mut self, category: BookCategory, settings: &PoolSettings) -> bool {
        let weight = self.categories.entry(category).or_insert(0);
        *weight = weight.saturating_add(settings.add_amount);
        self.clamp_weights(settings.weight_limit);

        self.saturation = self.saturation.saturating_add(1);
        self.updated_at = Utc::now();

        if self.saturation < settings.decay_threshold() {
            return false;
        }

        for weight in self.categories.values_mut() {
            *weight = weight.saturating_sub(settings.decay_amount);
        }
        self.saturation = settings.saturation_limit;
        true
    }
}
