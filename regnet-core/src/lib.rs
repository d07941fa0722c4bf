//! Core data model and I/O for regnet.
//!
//! Every stage of the pipeline (binding, correlation, network construction and
//! influence scoring) exchanges the types defined here:
//!
//! - [`models::GenomicInterval`], [`models::MotifHit`] and [`models::RegulatoryRegion`]
//!   describe where things are on the genome.
//! - [`models::BindingScore`], [`models::CorrelationEdge`] and [`models::NetworkEdge`]
//!   are the per-pair scores flowing between stages.
//! - [`models::RegulatoryNetwork`] is the finished graph of one condition.
//! - [`models::StageOutput`] carries results together with every skipped item.
//!
//! Readers in [`io`] validate records at the file boundary so the stages only ever
//! see well-formed values.
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod utils;

pub use errors::RegnetError;
