use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, ensure, Error};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The edit operations that make up an [`EditScript`].  `Match`, `Equal` and `Mismatch` consume
/// one query and one reference base per unit of length, `Insertion` consumes only query bases,
/// and `Deletion` consumes only reference bases.  `Sentinel` is a terminal marker: it consumes
/// nothing, has no CIGAR code, and is dropped when runs are merged.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum Operation {
    Match,     // M: consumes query and reference
    Equal,     // =: consumes query and reference
    Mismatch,  // X: consumes query and reference
    Insertion, // I: consumes query only
    Deletion,  // D: consumes reference only
    Sentinel,
}

impl Operation {
    /// The CIGAR code for this operation, or `None` for the sentinel.
    pub fn code(self) -> Option<char> {
        match self {
            Operation::Match => Some('M'),
            Operation::Equal => Some('='),
            Operation::Mismatch => Some('X'),
            Operation::Insertion => Some('I'),
            Operation::Deletion => Some('D'),
            Operation::Sentinel => None,
        }
    }

    pub fn from_code(code: char) -> Result<Self, Error> {
        match code {
            'M' => Ok(Operation::Match),
            '=' => Ok(Operation::Equal),
            'X' => Ok(Operation::Mismatch),
            'I' => Ok(Operation::Insertion),
            'D' => Ok(Operation::Deletion),
            _ => Err(anyhow!("Invalid CIGAR operation: '{}'", code)),
        }
    }

    pub fn length_on_query(self, len: usize) -> usize {
        match self {
            Operation::Match | Operation::Equal | Operation::Mismatch | Operation::Insertion => len,
            Operation::Deletion | Operation::Sentinel => 0,
        }
    }

    pub fn length_on_ref(self, len: usize) -> usize {
        match self {
            Operation::Match | Operation::Equal | Operation::Mismatch | Operation::Deletion => len,
            Operation::Insertion | Operation::Sentinel => 0,
        }
    }
}

/// A run of `len` consecutive edits of the same operation.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct Run {
    pub op: Operation,
    pub len: usize,
}

impl Run {
    pub fn new(op: Operation, len: usize) -> Self {
        Self { op, len }
    }
}

/// An ordered list of [`Run`]s in which no two adjacent runs share an operation, no run is empty,
/// and no sentinel appears.  The only ways to build one are [`merge_runs`] (or collecting runs,
/// which merges) and parsing a CIGAR string, so the invariant always holds.
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash)]
pub struct EditScript {
    runs: Vec<Run>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    /// The number of runs (not the number of aligned bases).
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The number of query bases consumed when replaying this script.
    pub fn query_len(&self) -> usize {
        self.runs.iter().map(|r| r.op.length_on_query(r.len)).sum()
    }

    /// The number of reference bases consumed when replaying this script.
    pub fn ref_len(&self) -> usize {
        self.runs.iter().map(|r| r.op.length_on_ref(r.len)).sum()
    }

    /// Renders the script as a CIGAR string, e.g. `3=2I5=`.
    pub fn cigar(&self) -> String {
        self.to_string()
    }
}

/// Merges an ordered sequence of runs into the minimal equivalent [`EditScript`]: adjacent runs
/// with the same operation are coalesced, and sentinels and zero-length runs are dropped.
/// Merging an already merged script returns it unchanged.
pub fn merge_runs<I>(runs: I) -> EditScript
where
    I: IntoIterator<Item = Run>,
{
    let mut merged: Vec<Run> = Vec::new();
    for run in runs {
        if run.op == Operation::Sentinel || run.len == 0 {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.op == run.op => last.len += run.len,
            _ => merged.push(run),
        }
    }
    EditScript { runs: merged }
}

impl FromIterator<Run> for EditScript {
    fn from_iter<T: IntoIterator<Item = Run>>(iter: T) -> Self {
        merge_runs(iter)
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            if let Some(code) = run.op.code() {
                write!(f, "{}{}", run.len, code)?;
            }
        }
        Ok(())
    }
}

impl FromStr for EditScript {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut runs = Vec::new();
        let mut len: Option<usize> = None;
        for c in s.chars() {
            if let Some(digit) = c.to_digit(10) {
                let value = len
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit as usize))
                    .ok_or_else(|| anyhow!("CIGAR run length overflows in '{}'", s))?;
                len = Some(value);
            } else {
                let op = Operation::from_code(c)?;
                match len.take() {
                    Some(0) => bail!("Zero-length CIGAR run in '{}'", s),
                    Some(value) => runs.push(Run::new(op, value)),
                    None => bail!("Missing length before '{}' in '{}'", c, s),
                }
            }
        }
        ensure!(len.is_none(), "Trailing length without an operation in '{}'", s);
        Ok(merge_runs(runs))
    }
}

impl Serialize for EditScript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EditScript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
pub mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{
        merge_runs, EditScript,
        Operation::{self, Deletion, Equal, Insertion, Match, Mismatch, Sentinel},
        Run,
    };

    fn runs(ops: &[(Operation, usize)]) -> Vec<Run> {
        ops.iter().map(|&(op, len)| Run::new(op, len)).collect()
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&[(Equal, 3)], "3=")]
    #[case(&[(Equal, 3), (Equal, 3)], "6=")]
    #[case(&[(Equal, 2), (Insertion, 1), (Insertion, 2), (Equal, 3)], "2=3I3=")]
    #[case(&[(Sentinel, 0), (Equal, 2), (Sentinel, 0), (Equal, 1)], "3=")]
    #[case(&[(Equal, 2), (Deletion, 0), (Equal, 1)], "3=")]
    #[case(&[(Match, 2), (Equal, 1), (Mismatch, 1), (Mismatch, 4)], "2M1=5X")]
    fn test_merge_runs(#[case] input: &[(Operation, usize)], #[case] expected: &str) {
        let script = merge_runs(runs(input));
        assert_eq!(script.cigar(), expected);
    }

    #[test]
    fn test_empty_script() {
        let script = merge_runs(Vec::new());
        assert!(script.is_empty());
        assert_eq!(script.query_len(), 0);
        assert_eq!(script.ref_len(), 0);
        assert_eq!(script.to_string(), "");
    }

    #[rstest]
    #[case("", 0, 0)]
    #[case("5=", 5, 5)]
    #[case("2=3I1X", 6, 3)]
    #[case("4M2D1=", 5, 7)]
    fn test_consumed_lengths(#[case] cigar: &str, #[case] query_len: usize, #[case] ref_len: usize) {
        let script: EditScript = cigar.parse().unwrap();
        assert_eq!(script.query_len(), query_len);
        assert_eq!(script.ref_len(), ref_len);
    }

    #[rstest]
    #[case("3=2I", "3=2I")]
    #[case("3=2=", "5=")]
    #[case("10M1D12M", "10M1D12M")]
    fn test_parse(#[case] cigar: &str, #[case] expected: &str) {
        let script: EditScript = cigar.parse().unwrap();
        assert_eq!(script.to_string(), expected);
    }

    #[rstest]
    #[case("3")]
    #[case("=")]
    #[case("0=")]
    #[case("3S")]
    #[case("3=I")]
    fn test_parse_invalid(#[case] cigar: &str) {
        assert!(cigar.parse::<EditScript>().is_err());
    }

    #[test]
    fn test_serde_as_cigar_string() {
        let script: EditScript = "2=1X3D".parse().unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, "\"2=1X3D\"");
        let back: EditScript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }

    fn arb_run() -> impl Strategy<Value = Run> {
        let op = prop_oneof![
            Just(Match),
            Just(Equal),
            Just(Mismatch),
            Just(Insertion),
            Just(Deletion),
            Just(Sentinel),
        ];
        (op, 0usize..5).prop_map(|(op, len)| Run::new(op, len))
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(input in proptest::collection::vec(arb_run(), 0..40)) {
            let once = merge_runs(input);
            let twice = merge_runs(once.runs().iter().copied());
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn merge_has_no_adjacent_duplicates(input in proptest::collection::vec(arb_run(), 0..40)) {
            let merged = merge_runs(input);
            for pair in merged.runs().windows(2) {
                prop_assert_ne!(pair[0].op, pair[1].op);
            }
            prop_assert!(merged.runs().iter().all(|r| r.len > 0 && r.op != Sentinel));
        }

        #[test]
        fn merge_preserves_consumed_lengths(input in proptest::collection::vec(arb_run(), 0..40)) {
            let query_len: usize = input.iter().map(|r| r.op.length_on_query(r.len)).sum();
            let ref_len: usize = input.iter().map(|r| r.op.length_on_ref(r.len)).sum();
            let merged = merge_runs(input);
            prop_assert_eq!(merged.query_len(), query_len);
            prop_assert_eq!(merged.ref_len(), ref_len);
        }
    }
}
