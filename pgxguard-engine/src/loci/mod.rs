//! Static star-allele definitions for the tracked genes, indexed by GRCh38
//! position and rsID.

mod tables;

use std::collections::{BTreeSet, HashMap};

use pgxguard_core::models::{Gene, Phenotype, VariantRecord};
use serde::Serialize;

///
/// One defining variant: a specific ALT allele at a specific position.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSignature {
    pub rsid: &'static str,
    /// Chromosome name without the `chr` prefix
    pub chrom: &'static str,
    pub pos: u64,
    pub reference: &'static str,
    pub alternate: &'static str,
}

impl VariantSignature {
    /// Whether a record sits on this signature's site, by coordinate or rsID.
    pub fn covers(&self, record: &VariantRecord) -> bool {
        (record.normalized_chrom() == self.chrom && record.pos == self.pos)
            || record.has_id(self.rsid)
    }

    /// Whether an observed REF/ALT pair is this signature's variant.
    pub fn matches(&self, reference: &str, alternate: &str) -> bool {
        self.reference.eq_ignore_ascii_case(reference)
            && self.alternate.eq_ignore_ascii_case(alternate)
    }

    pub fn describe(&self) -> String {
        format!(
            "{} ({}:{} {}>{})",
            self.rsid, self.chrom, self.pos, self.reference, self.alternate
        )
    }
}

///
/// VKORC1 -1639G>A (rs9923231), the promoter variant that lowers the warfarin
/// dose requirement.
///
/// VKORC1 is not one of the tracked genes. The site never enters diplotype
/// calling and is only looked at when warfarin is requested.
///
pub const VKORC1_WARFARIN_SITE: VariantSignature = VariantSignature {
    rsid: "rs9923231",
    chrom: "16",
    pos: 31096368,
    reference: "C",
    alternate: "T",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunctionClass {
    NoFunction,
    Decreased,
    Normal,
    Increased,
}

impl FunctionClass {
    ///
    /// Tie-break tier used when several allele definitions are satisfied at
    /// once. Lower wins: the call that flags the larger loss of function is
    /// preferred.
    ///
    pub fn priority(&self) -> u8 {
        match self {
            FunctionClass::NoFunction => 0,
            FunctionClass::Decreased => 1,
            FunctionClass::Normal => 2,
            FunctionClass::Increased => 3,
        }
    }
}

///
/// A named star allele and the set of signatures that define it.
///
/// `defining` holds indices into the owning [`GeneLocus::signatures`]. The
/// reference allele has an empty set.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleDefinition {
    pub label: &'static str,
    pub function: FunctionClass,
    pub activity: f64,
    pub defining: BTreeSet<usize>,
}

impl AlleleDefinition {
    pub fn is_reference(&self) -> bool {
        self.defining.is_empty()
    }
}

///
/// Everything known about one gene: defining sites, allele table, and the
/// activity-score bands used to classify a diplotype.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneLocus {
    pub gene: Gene,
    pub signatures: Vec<VariantSignature>,
    /// Allele table; index 0 is the reference allele
    pub alleles: Vec<AlleleDefinition>,
    /// Inclusive lower bounds, highest first; the first bound the score
    /// reaches gives the phenotype
    pub thresholds: Vec<(f64, Phenotype)>,
    /// Activity score of a reference/reference diplotype
    pub normal_activity: f64,
    /// Rule bucket consulted when no rule exists for the exact phenotype
    pub fallback_phenotype: Option<Phenotype>,
}

impl GeneLocus {
    pub fn reference(&self) -> &AlleleDefinition {
        &self.alleles[0]
    }

    pub fn allele(&self, label: &str) -> Option<&AlleleDefinition> {
        self.alleles.iter().find(|a| a.label == label)
    }

    /// Position of an allele in the table, used to order diplotype labels.
    pub fn allele_rank(&self, label: &str) -> usize {
        self.alleles
            .iter()
            .position(|a| a.label == label)
            .unwrap_or(self.alleles.len())
    }

    pub fn activity_of(&self, label: &str) -> f64 {
        self.allele(label).map_or(0.0, |a| a.activity)
    }

    pub fn phenotype_for(&self, activity: f64) -> Phenotype {
        self.thresholds
            .iter()
            .find(|(bound, _)| activity + 1e-9 >= *bound)
            .map_or(Phenotype::PoorMetabolizer, |(_, p)| *p)
    }

    /// Indices of the signatures whose site a record covers.
    pub fn signatures_covered_by(&self, record: &VariantRecord) -> Vec<usize> {
        self.signatures
            .iter()
            .enumerate()
            .filter(|(_, s)| s.covers(record))
            .map(|(i, _)| i)
            .collect()
    }
}

///
/// Lookup from a variant record to the gene(s) whose defining sites it covers.
///
#[derive(Debug, Clone)]
pub struct LocusIndex {
    loci: Vec<GeneLocus>,
    by_position: HashMap<(String, u64), Vec<usize>>,
    by_rsid: HashMap<&'static str, Vec<usize>>,
}

impl LocusIndex {
    pub fn new(loci: Vec<GeneLocus>) -> Self {
        let mut by_position: HashMap<(String, u64), Vec<usize>> = HashMap::new();
        let mut by_rsid: HashMap<&'static str, Vec<usize>> = HashMap::new();

        for (i, locus) in loci.iter().enumerate() {
            for sig in &locus.signatures {
                let genes = by_position.entry((sig.chrom.to_string(), sig.pos)).or_default();
                if !genes.contains(&i) {
                    genes.push(i);
                }
                let genes = by_rsid.entry(sig.rsid).or_default();
                if !genes.contains(&i) {
                    genes.push(i);
                }
            }
        }

        LocusIndex {
            loci,
            by_position,
            by_rsid,
        }
    }

    /// Built-in GRCh38 tables for the six tracked genes.
    pub fn grch38() -> Self {
        LocusIndex::new(tables::grch38_loci())
    }

    pub fn loci(&self) -> &[GeneLocus] {
        &self.loci
    }

    pub fn locus(&self, gene: Gene) -> Option<&GeneLocus> {
        self.loci.iter().find(|l| l.gene == gene)
    }

    /// Loci with a defining site at the record's position or rsID.
    pub fn lookup(&self, record: &VariantRecord) -> Vec<&GeneLocus> {
        let mut hits: Vec<usize> = self
            .by_position
            .get(&(record.normalized_chrom().to_string(), record.pos))
            .cloned()
            .unwrap_or_default();
        for id in &record.ids {
            if let Some(genes) = self.by_rsid.get(id.as_str()) {
                hits.extend(genes);
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter().map(|i| &self.loci[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use pgxguard_core::models::Genotype;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn record(chrom: &str, pos: u64, id: &str) -> VariantRecord {
        VariantRecord {
            line: 1,
            chrom: chrom.to_string(),
            pos,
            ids: if id.is_empty() { vec![] } else { vec![id.to_string()] },
            reference: "G".to_string(),
            alternates: vec!["A".to_string()],
            genotype: Genotype {
                alleles: vec![Some(0), Some(1)],
                phased: false,
            },
            quality: None,
            filter: None,
            info: BTreeMap::new(),
            depth: None,
        }
    }

    #[fixture]
    fn index() -> LocusIndex {
        LocusIndex::grch38()
    }

    #[rstest]
    fn test_every_gene_has_a_locus(index: LocusIndex) {
        for gene in Gene::ALL {
            let locus = index.locus(gene).unwrap();
            assert!(locus.reference().is_reference());
            assert!(!locus.thresholds.is_empty());
            for sig in &locus.signatures {
                assert_eq!(sig.chrom, gene.chromosome());
            }
        }
    }

    #[rstest]
    fn test_defining_indices_in_range(index: LocusIndex) {
        for locus in index.loci() {
            for allele in &locus.alleles[1..] {
                assert!(!allele.defining.is_empty(), "{} {}", locus.gene, allele.label);
                assert!(allele.defining.iter().all(|i| *i < locus.signatures.len()));
            }
        }
    }

    #[rstest]
    #[case("chr22", 42130692, "", Gene::Cyp2d6)]
    #[case("22", 42130692, "", Gene::Cyp2d6)]
    #[case("1", 5, "rs4244285", Gene::Cyp2c19)]
    #[case("chr6", 18130918, "rs1142345", Gene::Tpmt)]
    fn test_lookup_by_position_or_rsid(
        index: LocusIndex,
        #[case] chrom: &str,
        #[case] pos: u64,
        #[case] id: &str,
        #[case] expected: Gene,
    ) {
        let hits = index.lookup(&record(chrom, pos, id));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].gene, expected);
    }

    #[rstest]
    fn test_lookup_off_target(index: LocusIndex) {
        assert!(index.lookup(&record("chr3", 100, "rs0")).is_empty());
    }

    #[rstest]
    #[case(Gene::Cyp2d6, 0.0, Phenotype::PoorMetabolizer)]
    #[case(Gene::Cyp2d6, 0.25, Phenotype::IntermediateMetabolizer)]
    #[case(Gene::Cyp2d6, 1.0, Phenotype::IntermediateMetabolizer)]
    #[case(Gene::Cyp2d6, 1.25, Phenotype::NormalMetabolizer)]
    #[case(Gene::Cyp2d6, 2.25, Phenotype::NormalMetabolizer)]
    #[case(Gene::Cyp2d6, 3.0, Phenotype::UltrarapidMetabolizer)]
    #[case(Gene::Cyp2c19, 2.5, Phenotype::RapidMetabolizer)]
    #[case(Gene::Cyp2c19, 3.0, Phenotype::UltrarapidMetabolizer)]
    #[case(Gene::Cyp2c19, 1.0, Phenotype::IntermediateMetabolizer)]
    #[case(Gene::Cyp2c9, 1.5, Phenotype::IntermediateMetabolizer)]
    #[case(Gene::Cyp2c9, 0.5, Phenotype::PoorMetabolizer)]
    #[case(Gene::Slco1b1, 1.5, Phenotype::IntermediateMetabolizer)]
    #[case(Gene::Slco1b1, 1.0, Phenotype::PoorMetabolizer)]
    fn test_phenotype_bands(
        index: LocusIndex,
        #[case] gene: Gene,
        #[case] activity: f64,
        #[case] expected: Phenotype,
    ) {
        assert_eq!(index.locus(gene).unwrap().phenotype_for(activity), expected);
    }

    #[rstest]
    fn test_signature_match_ignores_case() {
        let sig = VariantSignature {
            rsid: "rs1",
            chrom: "1",
            pos: 10,
            reference: "G",
            alternate: "A",
        };
        assert!(sig.matches("g", "a"));
        assert!(!sig.matches("G", "C"));
    }
}
