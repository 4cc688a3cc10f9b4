//! Per-user interest pools and the recommendation sampler built on them.
//!
//! The [`PoolMaintainer`] folds "user engaged with book" signals into a
//! user's [`InterestPool`](crate::models::InterestPool). The
//! [`SampleAllocator`] turns that pool into a fixed-size batch that mixes
//! per-category draws with a random filler bucket, and the [`Recommender`]
//! falls back to a flat random draw when no personalization is available.

mod allocation;
mod allocator;
mod maintainer;
mod recommender;

pub use allocation::Allocation;
pub use allocator::SampleAllocator;
pub use maintainer::PoolMaintainer;
pub use recommender::Recommender;
