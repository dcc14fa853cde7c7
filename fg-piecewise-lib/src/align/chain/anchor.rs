use std::{fmt, str::FromStr};

use anyhow::{anyhow, Context, Error};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{gap::Gap, ChainError, SequenceKind};

/// The start of a length-`k` exact match between the query and the reference.  `k` is shared by
/// the whole chain and not stored per anchor.
///
/// Anchors (de)serialize as a two element array: `[query_offset, ref_offset]`.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Anchor {
    pub query_offset: usize,
    pub ref_offset: usize,
}

impl Anchor {
    pub fn new(query_offset: usize, ref_offset: usize) -> Self {
        Self {
            query_offset,
            ref_offset,
        }
    }

    /// The query position just past this anchor's match.
    pub fn query_end(&self, k: usize) -> usize {
        self.query_offset + k
    }

    /// The reference position just past this anchor's match.
    pub fn ref_end(&self, k: usize) -> usize {
        self.ref_offset + k
    }
}

impl From<(usize, usize)> for Anchor {
    fn from((query_offset, ref_offset): (usize, usize)) -> Self {
        Self::new(query_offset, ref_offset)
    }
}

impl From<Anchor> for (usize, usize) {
    fn from(anchor: Anchor) -> Self {
        (anchor.query_offset, anchor.ref_offset)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.query_offset, self.ref_offset)
    }
}

/// Parses `<query_offset>:<ref_offset>`, e.g. `2:6`.
impl FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (query, reference) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Anchor must be <query>:<reference>, found: '{}'", s))?;
        let query_offset = query
            .trim()
            .parse()
            .with_context(|| format!("Invalid query offset in anchor '{}'", s))?;
        let ref_offset = reference
            .trim()
            .parse()
            .with_context(|| format!("Invalid reference offset in anchor '{}'", s))?;
        Ok(Self::new(query_offset, ref_offset))
    }
}

/// Checks that an anchor chain can be stitched: `k` is positive, the chain is non-empty, every
/// anchor's `k`-windows lie within both sequences and are identical, the offsets never decrease,
/// and no anchor overlaps its predecessor by `k` or more.
pub fn validate_anchors(
    query: &[u8],
    reference: &[u8],
    anchors: &[Anchor],
    k: usize,
) -> Result<(), ChainError> {
    if k == 0 {
        return Err(ChainError::InvalidKmerSize);
    }
    if anchors.is_empty() {
        return Err(ChainError::EmptyAnchorChain);
    }

    for (index, anchor) in anchors.iter().enumerate() {
        let query_kmer = window(query, anchor.query_offset, k).ok_or(
            ChainError::AnchorOutOfBounds {
                index,
                sequence: SequenceKind::Query,
                offset: anchor.query_offset,
                k,
                len: query.len(),
            },
        )?;
        let ref_kmer = window(reference, anchor.ref_offset, k).ok_or(
            ChainError::AnchorOutOfBounds {
                index,
                sequence: SequenceKind::Reference,
                offset: anchor.ref_offset,
                k,
                len: reference.len(),
            },
        )?;
        if query_kmer != ref_kmer {
            return Err(ChainError::AnchorMismatch {
                index,
                query_kmer: String::from_utf8_lossy(query_kmer).into_owned(),
                ref_kmer: String::from_utf8_lossy(ref_kmer).into_owned(),
            });
        }
    }

    for (index, (prev, cur)) in anchors.iter().tuple_windows().enumerate() {
        let index = index + 1;
        if cur.query_offset < prev.query_offset {
            return Err(ChainError::UnsortedAnchors {
                index,
                sequence: SequenceKind::Query,
            });
        }
        if cur.ref_offset < prev.ref_offset {
            return Err(ChainError::UnsortedAnchors {
                index,
                sequence: SequenceKind::Reference,
            });
        }
        Gap::between(prev, cur, k, index)?;
    }

    Ok(())
}

/// The `k` bases starting at `offset`, or `None` if they run past the end of `seq`.
fn window(seq: &[u8], offset: usize, k: usize) -> Option<&[u8]> {
    let end = offset.checked_add(k)?;
    seq.get(offset..end)
}
