//! Read-only `(gene, phenotype, drug)` guideline lookup.
//!
//! A table file holds `rule` entries plus the `rationale`/`action` text
//! catalogs the rules point into, per-drug citations, and per-drug fallback
//! actions used when no rule matches a sample. Tags are closed
//! enums, so a typo in a gene, phenotype, drug, risk or evidence value fails
//! the load instead of silently never matching.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use log::info;
use pgxguard_core::models::{Drug, EvidenceLevel, Gene, Phenotype, RiskLabel, RuleRef};
use serde::{Deserialize, Serialize};

use crate::errors::{GuidelineError, GuidelineResult};

const EMBEDDED_TABLE: &str = include_str!("../data/guidelines.toml");

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GuidelineRule {
    pub gene: Gene,
    pub phenotype: Phenotype,
    pub drug: Drug,
    pub risk: RiskLabel,
    pub evidence: EvidenceLevel,
    /// Key into the rationale catalog
    pub rationale: String,
    /// Key into the action catalog
    pub action: String,
}

impl GuidelineRule {
    pub fn key(&self) -> RuleKey {
        (self.gene, self.phenotype, self.drug)
    }

    pub fn to_ref(&self, via_fallback: bool) -> RuleRef {
        RuleRef {
            gene: self.gene,
            phenotype: self.phenotype,
            drug: self.drug,
            risk: self.risk,
            evidence: self.evidence,
            rationale_key: self.rationale.clone(),
            action_key: self.action.clone(),
            via_fallback,
        }
    }
}

pub type RuleKey = (Gene, Phenotype, Drug);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GuidelineSource {
    pub title: String,
    pub url: String,
}

/// On-disk shape of a guideline table.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct GuidelineFile {
    #[serde(default)]
    pub rule: Vec<GuidelineRule>,
    #[serde(default)]
    pub rationale: BTreeMap<String, String>,
    #[serde(default)]
    pub action: BTreeMap<String, String>,
    #[serde(default)]
    pub source: BTreeMap<String, GuidelineSource>,
    /// Drug name to the action shown when no rule matched
    #[serde(default)]
    pub fallback: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidelineFormat {
    Toml,
    Json,
    Yaml,
}

impl GuidelineFormat {
    ///
    /// Determine the table format from a file extension.
    ///
    pub fn from_path(path: &Path) -> GuidelineResult<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("toml") => Ok(GuidelineFormat::Toml),
            Some("json") => Ok(GuidelineFormat::Json),
            Some("yaml") | Some("yml") => Ok(GuidelineFormat::Yaml),
            _ => Err(GuidelineError::InvalidFileType),
        }
    }
}

///
/// Validated guideline table. Built once and never mutated.
///
#[derive(Debug, Clone)]
pub struct GuidelineTable {
    rules: HashMap<RuleKey, GuidelineRule>,
    rationale: BTreeMap<String, String>,
    action: BTreeMap<String, String>,
    sources: BTreeMap<Drug, GuidelineSource>,
    fallbacks: BTreeMap<Drug, String>,
}

impl GuidelineTable {
    /// The CPIC-aligned table compiled into the crate.
    pub fn embedded() -> GuidelineResult<Self> {
        GuidelineTable::from_str_as(EMBEDDED_TABLE, GuidelineFormat::Toml)
    }

    pub fn from_str_as(content: &str, format: GuidelineFormat) -> GuidelineResult<Self> {
        let file: GuidelineFile = match format {
            GuidelineFormat::Toml => toml::from_str(content)?,
            GuidelineFormat::Json => serde_json::from_str(content)?,
            GuidelineFormat::Yaml => serde_yaml::from_str(content)?,
        };
        GuidelineTable::try_from(file)
    }

    pub fn get(&self, gene: Gene, phenotype: Phenotype, drug: Drug) -> Option<&GuidelineRule> {
        self.rules.get(&(gene, phenotype, drug))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by key.
    pub fn rules(&self) -> Vec<&GuidelineRule> {
        let mut rules: Vec<&GuidelineRule> = self.rules.values().collect();
        rules.sort_by_key(|r| r.key());
        rules
    }

    /// Genes that have at least one rule for the drug, in gene order.
    pub fn genes_for(&self, drug: Drug) -> Vec<Gene> {
        Gene::ALL
            .into_iter()
            .filter(|g| self.rules.keys().any(|(gene, _, d)| gene == g && *d == drug))
            .collect()
    }

    pub fn rationale_text(&self, key: &str) -> Option<&str> {
        self.rationale.get(key).map(String::as_str)
    }

    pub fn action_text(&self, key: &str) -> Option<&str> {
        self.action.get(key).map(String::as_str)
    }

    pub fn source(&self, drug: Drug) -> Option<&GuidelineSource> {
        self.sources.get(&drug)
    }

    /// Drug-level action for samples no rule covers.
    pub fn fallback_text(&self, drug: Drug) -> Option<&str> {
        self.fallbacks.get(&drug).map(String::as_str)
    }
}

impl TryFrom<GuidelineFile> for GuidelineTable {
    type Error = GuidelineError;

    fn try_from(file: GuidelineFile) -> Result<Self, Self::Error> {
        for (key, text) in file.rationale.iter().chain(file.action.iter()) {
            if text.trim().is_empty() {
                return Err(GuidelineError::MissingText(key.clone()));
            }
        }

        let mut rules = HashMap::with_capacity(file.rule.len());
        for rule in file.rule {
            if rule.risk == RiskLabel::Unknown {
                return Err(GuidelineError::UnknownRiskLabel {
                    gene: rule.gene,
                    phenotype: rule.phenotype,
                    drug: rule.drug,
                });
            }
            if !file.rationale.contains_key(&rule.rationale) {
                return Err(GuidelineError::MissingText(rule.rationale.clone()));
            }
            if !file.action.contains_key(&rule.action) {
                return Err(GuidelineError::MissingText(rule.action.clone()));
            }

            let key = rule.key();
            if rules.insert(key, rule).is_some() {
                return Err(GuidelineError::DuplicateRule {
                    gene: key.0,
                    phenotype: key.1,
                    drug: key.2,
                });
            }
        }

        let mut sources = BTreeMap::new();
        for (name, source) in file.source {
            let drug =
                Drug::from_str(&name).map_err(|_| GuidelineError::UnknownSourceDrug(name.clone()))?;
            sources.insert(drug, source);
        }

        let mut fallbacks = BTreeMap::new();
        for (name, text) in file.fallback {
            let drug = Drug::from_str(&name)
                .map_err(|_| GuidelineError::UnknownFallbackDrug(name.clone()))?;
            if text.trim().is_empty() {
                return Err(GuidelineError::MissingText(name));
            }
            fallbacks.insert(drug, text);
        }

        info!("Loaded guideline table with {} rules", rules.len());

        Ok(GuidelineTable {
            rules,
            rationale: file.rationale,
            action: file.action,
            sources,
            fallbacks,
        })
    }
}

impl TryFrom<&Path> for GuidelineTable {
    type Error = GuidelineError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let format = GuidelineFormat::from_path(path)?;
        let content = read_to_string(path)?;
        GuidelineTable::from_str_as(&content, format)
    }
}
