//! Expression correlation and network assembly for regnet.
//!
//! [`ExpressionCorrelator`] turns TF and target gene expression into
//! [`CorrelationEdge`](regnet_core::models::CorrelationEdge)s, and [`NetworkBuilder`]
//! combines those with binding scores into a weighted
//! [`RegulatoryNetwork`](regnet_core::models::RegulatoryNetwork).

pub mod builder;
pub mod correlation;

// re-exports
pub use self::builder::NetworkBuilder;
pub use self::correlation::{ExpressionCorrelator, average_ranks, pearson};
