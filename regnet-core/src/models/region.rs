use crate::errors::RegnetError;
use crate::models::interval::{GenomicInterval, Strand};

///
/// One row of a gene annotation: where a gene starts transcribing.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneAnnotation {
    pub gene_id: String,
    pub chr: String,
    pub tss: u32,
    pub strand: Option<Strand>,
}

impl GeneAnnotation {
    ///
    /// Build the regulatory window around the TSS: `[tss - upstream, tss + downstream)`
    /// on the forward strand, mirrored on the reverse strand. Saturates at coordinate 0.
    ///
    pub fn to_region(&self, upstream: u32, downstream: u32) -> Result<RegulatoryRegion, RegnetError> {
        let (up, down) = match self.strand {
            Some(Strand::Reverse) => (downstream, upstream),
            _ => (upstream, downstream),
        };
        let start = self.tss.saturating_sub(up);
        // at least one base so a zero-width window still anchors the TSS
        let end = self.tss.saturating_add(down).max(self.tss.saturating_add(1));
        let interval = GenomicInterval::new(self.chr.clone(), start, end, 0.0)?.with_strand(self.strand);
        RegulatoryRegion::new(self.gene_id.clone(), interval, self.tss)
    }
}

///
/// The regulatory window of a gene, anchored at its transcription start site.
///
#[derive(Debug, Clone, PartialEq)]
pub struct RegulatoryRegion {
    gene_id: String,
    interval: GenomicInterval,
    tss: u32,
}

impl RegulatoryRegion {
    pub fn new(
        gene_id: impl Into<String>,
        interval: GenomicInterval,
        tss: u32,
    ) -> Result<Self, RegnetError> {
        let gene_id = gene_id.into();
        if gene_id.is_empty() {
            return Err(RegnetError::Parse(format!(
                "regulatory region {} has an empty gene id",
                interval
            )));
        }
        Ok(RegulatoryRegion {
            gene_id,
            interval,
            tss,
        })
    }

    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    pub fn interval(&self) -> &GenomicInterval {
        &self.interval
    }

    pub fn tss(&self) -> u32 {
        self.tss
    }

    /// Distance in bases between `position` and the TSS.
    pub fn distance_to_tss(&self, position: u32) -> u32 {
        position.abs_diff(self.tss)
    }
}
