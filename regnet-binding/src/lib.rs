//! Transcription factor binding scores for regnet.
//!
//! Motif hits are grouped per TF in a [`MotifHitCatalog`] and genes are described by
//! one [`RegulatoryRegion`](regnet_core::models::RegulatoryRegion) each in a
//! [`RegionCatalog`]. A [`BindingScorer`] then turns the hits near each gene's TSS into
//! a binding score in `[0, 1]`, optionally weighted by the accessibility signal of the
//! peaks the hits fall in.
//!
//! ```rust
//! use regnet_binding::{BindingScorer, MotifHitCatalog, RegionCatalog};
//! use regnet_core::config::BindingConfig;
//! use regnet_core::models::{GeneAnnotation, GenomicInterval, MotifHit};
//! use regnet_core::utils::CancelFlag;
//!
//! let hit = MotifHit::new(GenomicInterval::new("chr1", 999, 1001, 0.0).unwrap(), "TP63", 0.8).unwrap();
//! let gene = GeneAnnotation { gene_id: "KRT5".into(), chr: "chr1".into(), tss: 1000, strand: None };
//!
//! let catalog = MotifHitCatalog::new(vec![hit]);
//! let (regions, _) = RegionCatalog::from_annotation(&[gene], 5_000, 5_000);
//!
//! let scorer = BindingScorer::new(BindingConfig::default()).unwrap();
//! let out = scorer.score_all(&catalog, &regions, None, &CancelFlag::new()).unwrap();
//! assert_eq!(out.results[0].score, 0.8);
//! ```

pub mod catalog;
pub mod scorer;

// re-exports
pub use self::catalog::{MotifHitCatalog, RegionCatalog};
pub use self::scorer::{BindingScorer, RegionBinding};
