use std::collections::{BTreeMap, HashSet};

use regnet_core::errors::RegnetError;
use regnet_core::models::{GeneAnnotation, MotifHit, RegulatoryRegion, Skipped, StageOutput};
use regnet_overlaprs::{IntervalIndex, IntoIntervalIndex};

///
/// Motif hits grouped per TF, one read-only [`IntervalIndex`] each.
///
#[derive(Debug, Clone, Default)]
pub struct MotifHitCatalog {
    by_tf: BTreeMap<String, IntervalIndex<MotifHit>>,
}

impl MotifHitCatalog {
    pub fn new(hits: Vec<MotifHit>) -> Self {
        let mut grouped: BTreeMap<String, Vec<MotifHit>> = BTreeMap::new();
        for hit in hits {
            grouped.entry(hit.tf_id().to_string()).or_default().push(hit);
        }
        MotifHitCatalog {
            by_tf: grouped
                .into_iter()
                .map(|(tf, hits)| (tf, hits.into_interval_index()))
                .collect(),
        }
    }

    /// TF ids, sorted.
    pub fn tfs(&self) -> impl Iterator<Item = &str> {
        self.by_tf.keys().map(|k| k.as_str())
    }

    pub fn get(&self, tf_id: &str) -> Option<&IntervalIndex<MotifHit>> {
        self.by_tf.get(tf_id)
    }

    /// Keep only the TFs in `keep`.
    pub fn retain_tfs(&mut self, keep: &HashSet<String>) {
        self.by_tf.retain(|tf, _| keep.contains(tf));
    }

    pub fn len(&self) -> usize {
        self.by_tf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tf.is_empty()
    }

    /// Total number of hits over all TFs.
    pub fn n_hits(&self) -> usize {
        self.by_tf.values().map(|i| i.len()).sum()
    }
}

///
/// One regulatory region per gene.
///
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, RegulatoryRegion>,
}

impl RegionCatalog {
    ///
    /// Build a catalog from regions. A gene listed twice keeps its first region; the
    /// later ones are reported as skipped.
    ///
    pub fn new(regions: Vec<RegulatoryRegion>) -> (Self, Vec<Skipped>) {
        let mut out: StageOutput<()> = StageOutput::new();
        let mut map: BTreeMap<String, RegulatoryRegion> = BTreeMap::new();
        for region in regions {
            if map.contains_key(region.gene_id()) {
                out.skip(
                    region.gene_id(),
                    RegnetError::Parse(format!(
                        "gene {} has more than one regulatory region, keeping the first",
                        region.gene_id()
                    )),
                );
                continue;
            }
            map.insert(region.gene_id().to_string(), region);
        }
        (RegionCatalog { regions: map }, out.skipped)
    }

    /// Build regions from a gene annotation using a TSS-centred window.
    pub fn from_annotation(
        annotation: &[GeneAnnotation],
        upstream: u32,
        downstream: u32,
    ) -> (Self, Vec<Skipped>) {
        let mut out = StageOutput::new();
        for gene in annotation {
            match gene.to_region(upstream, downstream) {
                Ok(region) => out.push(region),
                Err(e) => out.skip(gene.gene_id.as_str(), e),
            }
        }
        let (catalog, mut skipped) = RegionCatalog::new(out.results);
        out.skipped.append(&mut skipped);
        (catalog, out.skipped)
    }

    pub fn get(&self, gene_id: &str) -> Result<&RegulatoryRegion, RegnetError> {
        self.regions
            .get(gene_id)
            .ok_or_else(|| RegnetError::MissingRegion(gene_id.to_string()))
    }

    /// Regions in gene id order.
    pub fn iter(&self) -> impl Iterator<Item = &RegulatoryRegion> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regnet_core::models::GenomicInterval;
    use rstest::*;

    fn hit(tf: &str, start: u32) -> MotifHit {
        let iv = GenomicInterval::new("chr1", start, start + 10, 0.5).unwrap();
        MotifHit::new(iv, tf, 0.5).unwrap()
    }

    #[rstest]
    fn test_hits_grouped_by_tf() {
        let catalog = MotifHitCatalog::new(vec![hit("TP63", 10), hit("SOX2", 20), hit("TP63", 30)]);
        assert_eq!(catalog.tfs().collect::<Vec<_>>(), vec!["SOX2", "TP63"]);
        assert_eq!(catalog.get("TP63").unwrap().len(), 2);
        assert_eq!(catalog.n_hits(), 3);
    }

    #[rstest]
    fn test_retain_tfs() {
        let mut catalog = MotifHitCatalog::new(vec![hit("TP63", 10), hit("SOX2", 20)]);
        catalog.retain_tfs(&HashSet::from(["SOX2".to_string()]));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("TP63").is_none());
    }

    #[rstest]
    fn test_missing_region() {
        let (catalog, skipped) = RegionCatalog::from_annotation(
            &[GeneAnnotation {
                gene_id: "KRT5".to_string(),
                chr: "chr12".to_string(),
                tss: 5_000,
                strand: None,
            }],
            1_000,
            1_000,
        );
        assert!(skipped.is_empty());
        assert!(catalog.get("KRT5").is_ok());
        assert!(matches!(
            catalog.get("KRT14"),
            Err(RegnetError::MissingRegion(_))
        ));
    }

    #[rstest]
    fn test_duplicate_gene_is_reported() {
        let gene = GeneAnnotation {
            gene_id: "KRT5".to_string(),
            chr: "chr12".to_string(),
            tss: 5_000,
            strand: None,
        };
        let (catalog, skipped) = RegionCatalog::from_annotation(&[gene.clone(), gene], 10, 10);
        assert_eq!(catalog.len(), 1);
        assert_eq!(skipped.len(), 1);
    }
}
