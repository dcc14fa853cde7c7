use std::fmt::Display;

/// Initial capacity (in bases) of the dynamic-programming buffers of each pairwise aligner.
pub const DEFAULT_ALIGNER_CAPACITY: usize = 200;

/// The default k-mer (anchor) length.
pub const DEFAULT_KMER_SIZE: usize = 3;

/// The default number of extra reference bases searched around each flank.
pub const DEFAULT_PADDING: usize = 2;

/// The modes of pairwise alignment used when bridging an anchor chain.  Each mode fixes which
/// sequence ends are anchored.
///
/// The default alignment mode is Global.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum AlignmentMode {
    /// Aligns the full query versus the full reference.
    #[default]
    Global,
    /// Leading bases of the query and reference may be skipped at no cost; the alignment must
    /// end at the end of both.
    FreeQueryStart,
    /// Trailing bases of the query and reference may be skipped at no cost; the alignment must
    /// start at the start of both.
    FreeQueryEnd,
}

impl Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::FreeQueryStart => write!(f, "free-query-start"),
            Self::FreeQueryEnd => write!(f, "free-query-end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::AlignmentMode;

    #[rstest]
    #[case(AlignmentMode::Global, "global")]
    #[case(AlignmentMode::FreeQueryStart, "free-query-start")]
    #[case(AlignmentMode::FreeQueryEnd, "free-query-end")]
    fn test_display(#[case] mode: AlignmentMode, #[case] expected: &str) {
        assert_eq!(mode.to_string(), expected);
    }

    #[test]
    fn test_default_is_global() {
        assert_eq!(AlignmentMode::default(), AlignmentMode::Global);
    }
}
