pub mod aligners;
pub mod alignment;
pub mod chain;
pub mod edit_script;
pub mod io;
pub mod scoring;
pub mod view;

pub use aligners::{AlignmentMode, BioAligner, Builder, Options, PairwiseAligner};
pub use alignment::AlignmentResult;
pub use chain::{align_chain, align_chain_parallel, Anchor, ChainAligner, ChainError};
pub use edit_script::{merge_runs, EditScript, Operation, Run};
pub use scoring::ScoringParameters;
