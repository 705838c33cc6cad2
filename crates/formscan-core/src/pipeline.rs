/// Layout pipeline orchestrator
///
/// Runs Stage 1 (row grouping) and Stage 2 (structure reconstruction) on each
/// page, then merges the pages into one [`DocumentTable`].
///
/// Pages share no state, so `process_document` hands them to the rayon pool
/// when `parallel` is set. Results are collected in input page order either
/// way.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::headers::HeaderDetector;
use crate::merge::merge;
use crate::stage01_row_grouper::{RowGrouper, RowGrouperConfig};
use crate::stage02_structure::StructureReconstructor;
use crate::types::{DocumentTable, Fragment, Record};

/// Pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(flatten)]
    pub grouping: RowGrouperConfig,
    /// Process pages on the rayon thread pool (default true)
    pub parallel: bool,
}

impl Default for PipelineConfig {
    #[inline]
    fn default() -> Self {
        Self {
            grouping: RowGrouperConfig::default(),
            parallel: true,
        }
    }
}

/// Page/document pipeline: fragments in, records out
#[derive(Debug)]
pub struct LayoutPipeline {
    grouper: RowGrouper,
    reconstructor: StructureReconstructor,
    parallel: bool,
}

impl LayoutPipeline {
    /// Create a pipeline with default configuration
    #[inline]
    #[must_use = "pipeline is created but not used"]
    pub fn new() -> Self {
        Self {
            grouper: RowGrouper::new(),
            reconstructor: StructureReconstructor::new(),
            parallel: true,
        }
    }

    /// Create a pipeline from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the row grouping tolerance is unusable.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.grouping.validate()?;
        Ok(Self {
            grouper: RowGrouper::with_config(config.grouping),
            reconstructor: StructureReconstructor::new(),
            parallel: config.parallel,
        })
    }

    /// Replace the header rules used by Stage 2
    #[must_use = "returns the pipeline with the new header rules"]
    pub fn with_headers(mut self, headers: HeaderDetector) -> Self {
        self.reconstructor = StructureReconstructor::with_headers(headers);
        self
    }

    #[inline]
    #[must_use]
    pub const fn grouper(&self) -> &RowGrouper {
        &self.grouper
    }

    /// Run both stages on one page
    #[must_use = "page records are returned but not used"]
    pub fn process_page(&self, fragments: Vec<Fragment>) -> Vec<Record> {
        let num_fragments = fragments.len();

        // Stage 1: Row Grouping
        let rows = self.grouper.process(fragments);

        // Stage 2: Structure Reconstruction
        let records = self.reconstructor.process(&rows);

        log::debug!(
            "page: {num_fragments} fragments -> {} rows -> {} records",
            rows.len(),
            records.len()
        );
        records
    }

    /// Run both stages on every page and merge the results in page order
    #[must_use = "document table is returned but not used"]
    pub fn process_document(&self, pages: Vec<Vec<Fragment>>) -> DocumentTable {
        let num_pages = pages.len();
        log::debug!(
            "Processing {num_pages} pages ({})",
            if self.parallel { "parallel" } else { "sequential" }
        );

        let per_page: Vec<Vec<Record>> = if self.parallel {
            pages
                .into_par_iter()
                .map(|page| self.process_page(page))
                .collect()
        } else {
            pages
                .into_iter()
                .map(|page| self.process_page(page))
                .collect()
        };

        let table = merge(per_page);
        log::debug!("  -> {} records from {num_pages} pages", table.len());
        table
    }
}

impl Default for LayoutPipeline {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
