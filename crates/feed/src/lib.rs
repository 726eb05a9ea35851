//! Commodity data acquisition and normalization pipeline.
//!
//! Source adapters fetch raw records from unreliable upstreams, the
//! normalizer folds them into canonical quotes, and the aggregator walks a
//! fixed precedence chain per commodity so that one cycle always yields one
//! quote per tracked commodity.

pub mod aggregate;
pub mod alerts;
pub mod history;
pub mod normalize;
pub mod sources;

pub use aggregate::Aggregator;
pub use alerts::{classify, AlertSummary};
