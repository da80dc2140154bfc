use log::info;

use crate::config::PipelineConfig;
use crate::errors::GuidelineResult;
use crate::guidelines::GuidelineTable;
use crate::loci::LocusIndex;

///
/// Process-wide, read-only state shared by every analysis run: the locus
/// index, the guideline table and the pipeline config.
///
/// Build it once at startup and hand out references (or an `Arc`); nothing in
/// it changes after construction, so concurrent runs need no locking.
///
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    index: LocusIndex,
    guidelines: GuidelineTable,
    config: PipelineConfig,
}

impl AnalysisContext {
    pub fn new(index: LocusIndex, guidelines: GuidelineTable, config: PipelineConfig) -> Self {
        info!(
            "Analysis context ready: {} genes, {} guideline rules",
            index.loci().len(),
            guidelines.len()
        );
        AnalysisContext {
            index,
            guidelines,
            config,
        }
    }

    /// Built-in GRCh38 loci, the embedded guideline table and default config.
    pub fn with_defaults() -> GuidelineResult<Self> {
        Ok(AnalysisContext::new(
            LocusIndex::grch38(),
            GuidelineTable::embedded()?,
            PipelineConfig::default(),
        ))
    }

    pub fn index(&self) -> &LocusIndex {
        &self.index
    }

    pub fn guidelines(&self) -> &GuidelineTable {
        &self.guidelines
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn assert_send_sync<T: Send + Sync>() {}

    #[rstest]
    fn test_context_is_shareable() {
        assert_send_sync::<AnalysisContext>();
    }

    #[rstest]
    fn test_with_defaults() {
        let ctx = AnalysisContext::with_defaults().unwrap();
        assert_eq!(ctx.index().loci().len(), 6);
        assert!(!ctx.guidelines().is_empty());
        assert_eq!(ctx.config(), &PipelineConfig::default());
    }
}
