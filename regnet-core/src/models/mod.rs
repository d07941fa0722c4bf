pub mod binding;
pub mod expression;
pub mod influence;
pub mod interval;
pub mod motif;
pub mod network;
pub mod region;
pub mod report;

// re-export for cleaner imports
pub use self::binding::{BindingScore, BindingTable};
pub use self::expression::{CorrelationEdge, ExpressionMatrix, ExpressionVector};
pub use self::influence::InfluenceScore;
pub use self::interval::{GenomicInterval, Located, Strand};
pub use self::motif::MotifHit;
pub use self::network::{EdgeComponents, EdgeSign, NetworkEdge, RegulatoryNetwork};
pub use self::region::{GeneAnnotation, RegulatoryRegion};
pub use self::report::{Skipped, StageOutput};
