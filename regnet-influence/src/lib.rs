//! Differential TF influence for regnet.
//!
//! Compares the regulatory networks of two cell states and ranks TFs by how much
//! their out-edges change between them.
//!
//! ```rust
//! use regnet_core::config::InfluenceConfig;
//! use regnet_core::models::{EdgeComponents, NetworkEdge, RegulatoryNetwork};
//! use regnet_influence::InfluenceScorer;
//!
//! let edge = NetworkEdge::new("TP63", "KRT5", 0.8, EdgeComponents::default()).unwrap();
//! let source = RegulatoryNetwork::default();
//! let target = RegulatoryNetwork::from_edges(vec![edge]).unwrap();
//!
//! let scorer = InfluenceScorer::new(InfluenceConfig::default()).unwrap();
//! let ranked = scorer.compare(&source, &target).unwrap();
//! assert_eq!(ranked[0].tf_id, "TP63");
//! assert_eq!(ranked[0].score, 1.0);
//! ```

pub mod report;
pub mod scorer;

// re-exports
pub use self::report::{InfluenceReport, REPORT_HEADER, TfInfluence};
pub use self::scorer::InfluenceScorer;
