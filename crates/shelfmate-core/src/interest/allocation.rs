use crate::config::PoolSettings;
use crate::models::{BookCategory, InterestPool};
use crate::storage::SampleFilter;

/// How one recommendation batch is split between category draws and the
/// random filler bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Share of the batch given to personalized draws, in `(0, max_portion]`.
    pub personalized_portion: f64,
    /// Every category of the pool with its draw size, zero-sized ones
    /// included.
    pub categories: Vec<(BookCategory, usize)>,
    /// Draw size of the category-independent bucket. Absorbs all rounding
    /// loss from the per-category floors.
    pub random_count: usize,
}

impl Allocation {
    /// Partition `settings.sample_size` for `pool`.
    ///
    /// Returns `None` when the pool carries no weight at all, which callers
    /// treat as "no personalization available".
    pub fn compute(pool: &InterestPool, settings: &PoolSettings) -> Option<Self> {
        let total_weight = pool.total_weight();
        if total_weight == 0 {
            return None;
        }

        let personalized_portion = (f64::from(pool.saturation)
            / f64::from(settings.saturation_limit))
        .min(settings.max_portion);
        let sample_size = settings.sample_size as f64;

        let categories: Vec<(BookCategory, usize)> = pool
            .categories
            .iter()
            .map(|(&category, &weight)| {
                let portion = f64::from(weight) / total_weight as f64 * personalized_portion;
                (category, (sample_size * portion).floor() as usize)
            })
            .collect();

        let personalized: usize = categories.iter().map(|(_, count)| count).sum();

        Some(Self {
            personalized_portion,
            categories,
            random_count: settings.sample_size.saturating_sub(personalized),
        })
    }

    pub fn count_for(&self, category: BookCategory) -> usize {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, count)| *count)
    }

    pub fn personalized_count(&self) -> usize {
        self.categories.iter().map(|(_, count)| count).sum()
    }

    /// The draws to issue: the random bucket first, then one per category
    /// with a non-zero count.
    pub fn facets(&self) -> Vec<(SampleFilter, usize)> {
        std::iter::once((SampleFilter::any(), self.random_count))
            .chain(
                self.categories
                    .iter()
                    .filter(|(_, count)| *count > 0)
                    .map(|(category, count)| (SampleFilter::in_category(*category), *count)),
            )
            .collect()
    }
}
