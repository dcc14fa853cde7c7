use clap::Args;
use piecewise::align::{Builder, ScoringParameters};

/// Scoring and threading options shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct ScoringArgs {
    /// Score for a sequence match (must not be negative)
    #[clap(long, short = 'A', default_value_t = ScoringParameters::default().match_score)]
    pub match_score: i32,

    /// Score for a sequence mismatch (must not be positive)
    #[clap(
        long,
        short = 'B',
        default_value_t = ScoringParameters::default().mismatch_score,
        allow_hyphen_values = true
    )]
    pub mismatch_score: i32,

    /// Score for opening a gap (must not be greater than the gap extend score); a gap of size k
    /// costs '{-O} + {-E}*(k-1)'
    #[clap(
        long,
        short = 'O',
        default_value_t = ScoringParameters::default().gap_open,
        allow_hyphen_values = true
    )]
    pub gap_open: i32,

    /// Score for extending a gap (must not be positive)
    #[clap(
        long,
        short = 'E',
        default_value_t = ScoringParameters::default().gap_extend,
        allow_hyphen_values = true
    )]
    pub gap_extend: i32,

    /// The number of threads used to bridge the gaps of a chain.
    #[clap(long, short = 't', default_value = "1")]
    pub threads: usize,
}

impl ScoringArgs {
    /// A chain aligner builder with these scores and threads.  The caller sets `k` and padding.
    pub fn builder(&self) -> Builder {
        let mut builder = Builder::default();
        builder
            .match_score(self.match_score)
            .mismatch_score(self.mismatch_score)
            .gap_open(self.gap_open)
            .gap_extend(self.gap_extend)
            .threads(self.threads);
        builder
    }
}
