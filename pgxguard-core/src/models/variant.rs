use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::Serialize;

///
/// Sample genotype call: zero-based allele indices per chromosomal copy.
///
/// `None` marks a no-call slot (`.` in the GT field). Index 0 is the
/// reference allele, `i > 0` is the `i`-th alternate allele.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genotype {
    pub alleles: Vec<Option<usize>>,
    pub phased: bool,
}

impl Genotype {
    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    /// Every slot is a no-call.
    pub fn is_no_call(&self) -> bool {
        self.alleles.iter().all(|a| a.is_none())
    }

    /// At least one slot carries a non-reference allele.
    pub fn has_alternate(&self) -> bool {
        self.alleles.iter().any(|a| matches!(a, Some(i) if *i > 0))
    }

    ///
    /// Allele index per copy, two copies.
    ///
    /// Haploid calls fill the second copy with the reference allele.
    /// Unphased calls are put in ascending order so that a heterozygous
    /// alternate always lands on the second copy.
    ///
    pub fn copies(&self) -> [Option<usize>; 2] {
        let mut copies = match self.alleles.as_slice() {
            [a] => [*a, Some(0)],
            [a, b, ..] => [*a, *b],
            [] => [None, None],
        };
        if !self.phased {
            // no-calls sort after called alleles
            copies.sort_by_key(|a| a.map_or(usize::MAX, |i| i));
        }
        copies
    }
}

impl Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.phased { "|" } else { "/" };
        let parts: Vec<String> = self
            .alleles
            .iter()
            .map(|a| a.map_or(".".to_string(), |i| i.to_string()))
            .collect();
        write!(f, "{}", parts.join(sep))
    }
}

///
/// One parsed data line of a variant-call file. Immutable once parsed.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecord {
    /// 1-based line number in the input
    pub line: usize,
    pub chrom: String,
    /// 1-based, always > 0
    pub pos: u64,
    pub ids: Vec<String>,
    pub reference: String,
    pub alternates: Vec<String>,
    pub genotype: Genotype,
    pub quality: Option<f64>,
    pub filter: Option<String>,
    pub info: BTreeMap<String, String>,
    pub depth: Option<u32>,
}

impl VariantRecord {
    /// Chromosome name with any `chr` prefix removed.
    pub fn normalized_chrom(&self) -> &str {
        strip_chr_prefix(&self.chrom)
    }

    /// Allele sequence for a zero-based allele index.
    pub fn allele(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.reference.as_str()),
            i => self.alternates.get(i - 1).map(String::as_str),
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn passed_filters(&self) -> bool {
        matches!(self.filter.as_deref(), None | Some("PASS"))
    }
}

pub fn strip_chr_prefix(chrom: &str) -> &str {
    chrom
        .strip_prefix("chr")
        .or_else(|| chrom.strip_prefix("CHR"))
        .unwrap_or(chrom)
}
