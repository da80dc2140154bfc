use std::collections::BTreeSet;

use pgxguard_core::models::Gene;

use super::{AlleleDefinition, FunctionClass, GeneLocus, VariantSignature};

use super::FunctionClass::{Decreased, Increased, NoFunction, Normal};
use pgxguard_core::models::Phenotype::{
    IntermediateMetabolizer as IM, NormalMetabolizer as NM, PoorMetabolizer as PM,
    RapidMetabolizer as RM, UltrarapidMetabolizer as UM,
};

fn sig(
    rsid: &'static str,
    chrom: &'static str,
    pos: u64,
    reference: &'static str,
    alternate: &'static str,
) -> VariantSignature {
    VariantSignature {
        rsid,
        chrom,
        pos,
        reference,
        alternate,
    }
}

fn allele(
    label: &'static str,
    function: FunctionClass,
    activity: f64,
    defining: &[usize],
) -> AlleleDefinition {
    AlleleDefinition {
        label,
        function,
        activity,
        defining: defining.iter().copied().collect::<BTreeSet<usize>>(),
    }
}

pub(super) fn grch38_loci() -> Vec<GeneLocus> {
    vec![cyp2d6(), cyp2c19(), cyp2c9(), slco1b1(), tpmt(), dpyd()]
}

fn cyp2d6() -> GeneLocus {
    GeneLocus {
        gene: Gene::Cyp2d6,
        signatures: vec![
            sig("rs1065852", "22", 42130692, "G", "A"),
            sig("rs3892097", "22", 42128945, "C", "T"),
            sig("rs16947", "22", 42127941, "G", "A"),
            sig("rs1135840", "22", 42126611, "C", "G"),
            sig("rs35742686", "22", 42128242, "CT", "C"),
            sig("rs5030655", "22", 42129084, "CA", "C"),
            sig("rs28371725", "22", 42127803, "C", "T"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*2", Normal, 1.0, &[2, 3]),
            allele("*3", NoFunction, 0.0, &[4]),
            allele("*4", NoFunction, 0.0, &[0, 1]),
            allele("*6", NoFunction, 0.0, &[5]),
            allele("*10", Decreased, 0.25, &[0]),
            allele("*41", Decreased, 0.5, &[2, 3, 6]),
        ],
        // activity sums move in steps of 0.25: >0 is IM, >2.25 is UM
        thresholds: vec![(2.5, UM), (1.25, NM), (0.25, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: None,
    }
}

fn cyp2c19() -> GeneLocus {
    GeneLocus {
        gene: Gene::Cyp2c19,
        signatures: vec![
            sig("rs4244285", "10", 94781859, "G", "A"),
            sig("rs4986893", "10", 94780653, "G", "A"),
            sig("rs12248560", "10", 94761900, "C", "T"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*2", NoFunction, 0.0, &[0]),
            allele("*3", NoFunction, 0.0, &[1]),
            allele("*17", Increased, 1.5, &[2]),
        ],
        thresholds: vec![(3.0, UM), (2.5, RM), (2.0, NM), (1.0, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: Some(NM),
    }
}

fn cyp2c9() -> GeneLocus {
    GeneLocus {
        gene: Gene::Cyp2c9,
        signatures: vec![
            sig("rs1799853", "10", 94942290, "C", "T"),
            sig("rs1057910", "10", 94981296, "A", "C"),
            sig("rs28371686", "10", 94981301, "C", "G"),
            sig("rs9332131", "10", 94949283, "GA", "G"),
            sig("rs7900194", "10", 94942309, "G", "A"),
            sig("rs28371685", "10", 94981224, "C", "T"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*2", Decreased, 0.5, &[0]),
            allele("*3", NoFunction, 0.0, &[1]),
            allele("*5", Decreased, 0.5, &[2]),
            allele("*6", NoFunction, 0.0, &[3]),
            allele("*8", Decreased, 0.5, &[4]),
            allele("*11", Decreased, 0.5, &[5]),
        ],
        thresholds: vec![(2.0, NM), (1.0, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: Some(NM),
    }
}

fn slco1b1() -> GeneLocus {
    GeneLocus {
        gene: Gene::Slco1b1,
        signatures: vec![
            sig("rs4149056", "12", 21178615, "T", "C"),
            sig("rs2306283", "12", 21176804, "A", "G"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*5", Decreased, 0.5, &[0]),
            allele("*15", Decreased, 0.5, &[0, 1]),
            allele("*37", Normal, 1.0, &[1]),
        ],
        thresholds: vec![(2.0, NM), (1.5, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: Some(NM),
    }
}

fn tpmt() -> GeneLocus {
    GeneLocus {
        gene: Gene::Tpmt,
        signatures: vec![
            sig("rs1800462", "6", 18143724, "C", "G"),
            sig("rs1800460", "6", 18138997, "C", "T"),
            sig("rs1142345", "6", 18130918, "T", "C"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*2", NoFunction, 0.0, &[0]),
            allele("*3A", NoFunction, 0.0, &[1, 2]),
            allele("*3B", NoFunction, 0.0, &[1]),
            allele("*3C", NoFunction, 0.0, &[2]),
        ],
        thresholds: vec![(2.0, NM), (1.0, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: Some(NM),
    }
}

fn dpyd() -> GeneLocus {
    GeneLocus {
        gene: Gene::Dpyd,
        signatures: vec![
            sig("rs3918290", "1", 97450058, "C", "T"),
            sig("rs55886062", "1", 97515839, "A", "C"),
            sig("rs67376798", "1", 97082391, "T", "A"),
            sig("rs75017182", "1", 97579893, "G", "C"),
        ],
        alleles: vec![
            allele("*1", Normal, 1.0, &[]),
            allele("*2A", NoFunction, 0.0, &[0]),
            allele("*13", NoFunction, 0.0, &[1]),
            allele("c.2846A>T", Decreased, 0.5, &[2]),
            allele("HapB3", Decreased, 0.5, &[3]),
        ],
        thresholds: vec![(2.0, NM), (1.0, IM), (0.0, PM)],
        normal_activity: 2.0,
        fallback_phenotype: Some(NM),
    }
}
