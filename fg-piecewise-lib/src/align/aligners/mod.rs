pub(crate) mod bio_aligner;
pub(crate) mod constants;

pub use bio_aligner::BioAligner;
pub use constants::{AlignmentMode, DEFAULT_KMER_SIZE, DEFAULT_PADDING};

use anyhow::Result;
use derive_builder::Builder;

use crate::align::{alignment::AlignmentResult, chain::ChainAligner, scoring::ScoringParameters};

/// A pairwise aligner that can bridge the pieces of an anchor chain.  Implementors only provide
/// [`PairwiseAligner::align`]; the three modes the chain assembler uses are provided on top of it.
///
/// Coordinates in the returned [`AlignmentResult`] are relative to the given slices.  Free-end
/// modes must return a score of zero (and an empty edit script) when no alignment scores better
/// than skipping every base.
pub trait PairwiseAligner {
    fn align(
        &mut self,
        mode: AlignmentMode,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult>;

    /// Aligns both slices end to end.
    fn global(
        &mut self,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult> {
        self.align(AlignmentMode::Global, query, reference, scoring)
    }

    /// Aligns with leading query and reference bases skippable at no cost.
    fn free_query_start(
        &mut self,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult> {
        self.align(AlignmentMode::FreeQueryStart, query, reference, scoring)
    }

    /// Aligns with trailing query and reference bases skippable at no cost.
    fn free_query_end(
        &mut self,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult> {
        self.align(AlignmentMode::FreeQueryEnd, query, reference, scoring)
    }
}

#[derive(Copy, Clone, Debug, Builder)]
#[builder(name = "Builder", build_fn(name = "build_options"))]
pub struct Options {
    #[builder(default = "3")]
    match_score: i32,
    #[builder(default = "-1")]
    mismatch_score: i32,
    #[builder(default = "-3")]
    gap_open: i32,
    #[builder(default = "-1")]
    gap_extend: i32,
    #[builder(default = "DEFAULT_KMER_SIZE")]
    kmer_size: usize,
    #[builder(default = "DEFAULT_PADDING")]
    padding: usize,
    #[builder(default = "1")]
    threads: usize,
}

impl Default for Options {
    fn default() -> Self {
        let scoring = ScoringParameters::default();
        Self {
            match_score: scoring.match_score,
            mismatch_score: scoring.mismatch_score,
            gap_open: scoring.gap_open,
            gap_extend: scoring.gap_extend,
            kmer_size: DEFAULT_KMER_SIZE,
            padding: DEFAULT_PADDING,
            threads: 1,
        }
    }
}

impl Options {
    pub fn scoring(&self) -> ScoringParameters {
        ScoringParameters::new(
            self.match_score,
            self.mismatch_score,
            self.gap_open,
            self.gap_extend,
        )
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    /// The number of worker threads, never more than the number of CPUs and never zero.
    pub fn threads(&self) -> usize {
        self.threads.clamp(1, num_cpus::get().max(1))
    }
}

impl Builder {
    /// Builds a chain aligner backed by [`BioAligner`].
    pub fn build_chain_aligner(&self) -> Result<ChainAligner<BioAligner>> {
        let opts = self.build_options()?;
        opts.scoring().validate()?;
        Ok(ChainAligner::new(BioAligner::default(), opts))
    }
}

#[cfg(test)]
pub mod tests {
    use super::{Builder, Options};
    use crate::align::scoring::ScoringParameters;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.scoring(), ScoringParameters::default());
        assert_eq!(opts.kmer_size(), 3);
        assert_eq!(opts.padding(), 2);
        assert_eq!(opts.threads(), 1);
    }

    #[test]
    fn test_builder_overrides() {
        let opts = Builder::default()
            .match_score(2)
            .gap_open(-5)
            .kmer_size(11)
            .padding(0)
            .threads(0)
            .build_options()
            .unwrap();
        assert_eq!(opts.scoring(), ScoringParameters::new(2, -1, -5, -1));
        assert_eq!(opts.kmer_size(), 11);
        assert_eq!(opts.padding(), 0);
        assert_eq!(opts.threads(), 1);
    }

    #[test]
    fn test_build_chain_aligner_rejects_bad_scoring() {
        assert!(Builder::default().gap_open(0).build_chain_aligner().is_err());
        assert!(Builder::default().build_chain_aligner().is_ok());
    }
}
