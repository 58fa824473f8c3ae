//! Global sequence alignment. This is the classic Needleman-Wunsch dynamic programming approach,
//! we build a table of the best cumulative score for every pair of prefixes and then walk back
//! from the bottom-right corner to recover the alignment.
//!
//! The aligner knows nothing about phonemes, words or characters. The word aligner runs it over
//! phoneme tokens and the metrics run it over characters, so everything here is generic over the
//! token type. Tokens need an ordering as well as equality so that ties in the traceback are broken
//! the same way whichever side a sequence is passed on.
//!
//! The table is `(|a| + 1) * (|b| + 1)` scores allocated per call. No cap is placed on the input
//! lengths, an utterance is typically tens to a few hundred phonemes so the quadratic cost is fine
//! but callers feeding in whole documents should chunk them first.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Gap symbol used when aligning phoneme strings.
pub const GAP: &str = "-";

/// Scores used to fill the alignment table. Higher is better.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignmentScoring {
    /// Score for a position where both tokens are equal
    pub match_score: i32,
    /// Score for a position where both tokens are present but differ
    pub mismatch_score: i32,
    /// Score for aligning a token against a gap
    pub indel_score: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            indel_score: -1,
        }
    }
}

impl AlignmentScoring {
    #[inline(always)]
    fn pair_score<T: PartialEq>(&self, a: &T, b: &T) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// A single step of the traceback. Operations are named from the point of view of transforming the
/// first sequence into the second.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EditOp {
    /// Both tokens present and equal
    Match,
    /// Both tokens present but different
    Substitute,
    /// Token only present in the second sequence, the first has a gap
    Insert,
    /// Token only present in the first sequence, the second has a gap
    Delete,
}

/// Two gap padded sequences of equal length.
///
/// No position holds the gap on both sides, and removing the gaps from either side gives back the
/// sequence that was passed in (as long as the gap symbol never occurs in the inputs).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlignedPair<T> {
    pub first: Vec<T>,
    pub second: Vec<T>,
    pub gap: T,
}

impl<T: PartialEq + Clone> AlignedPair<T> {
    /// Number of aligned positions
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Iterate over the aligned positions as `(first, second)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&T, &T)> {
        self.first.iter().zip(self.second.iter())
    }

    /// Whether the token is the gap symbol for this alignment
    pub fn is_gap(&self, token: &T) -> bool {
        *token == self.gap
    }

    /// Removes the gaps from both sides recovering the original sequences.
    pub fn strip_gaps(&self) -> (Vec<T>, Vec<T>) {
        let strip = |side: &[T]| {
            side.iter()
                .filter(|x| !self.is_gap(x))
                .cloned()
                .collect::<Vec<T>>()
        };
        (strip(&self.first), strip(&self.second))
    }
}

/// Runs the alignment and returns the traceback as a list of operations in sequence order.
///
/// On ties the traceback prefers the diagonal move. When a deletion and an insertion tie it steps
/// along the longer remaining prefix, and for equal prefixes it consumes the greater of the two
/// tokens. The choice only depends on the pair of prefixes, so swapping `a` and `b` swaps the
/// alignment.
pub fn edit_script<T: Ord>(a: &[T], b: &[T], scoring: &AlignmentScoring) -> Vec<EditOp> {
    let width = b.len() + 1;
    let index = |i: usize, j: usize| i * width + j;
    let indel = scoring.indel_score;

    let mut table = vec![0i32; (a.len() + 1) * width];
    for j in 0..width {
        table[j] = j as i32 * indel;
    }
    for i in 1..=a.len() {
        table[index(i, 0)] = i as i32 * indel;
        for j in 1..width {
            let diagonal = table[index(i - 1, j - 1)] + scoring.pair_score(&a[i - 1], &b[j - 1]);
            let up = table[index(i - 1, j)] + indel;
            let left = table[index(i, j - 1)] + indel;
            table[index(i, j)] = diagonal.max(up).max(left);
        }
    }

    let mut ops = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (a.len(), b.len());
    while i > 0 || j > 0 {
        let score = table[index(i, j)];
        if i > 0
            && j > 0
            && score == table[index(i - 1, j - 1)] + scoring.pair_score(&a[i - 1], &b[j - 1])
        {
            if a[i - 1] == b[j - 1] {
                ops.push(EditOp::Match);
            } else {
                ops.push(EditOp::Substitute);
            }
            i -= 1;
            j -= 1;
        } else {
            let up = i > 0 && score == table[index(i - 1, j)] + indel;
            let left = j > 0 && score == table[index(i, j - 1)] + indel;
            let delete = match (up, left) {
                (true, true) => match i.cmp(&j) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    // Equal tokens never get here, the diagonal is at least as good
                    Ordering::Equal => a[i - 1] > b[j - 1],
                },
                (up, _) => up,
            };
            if delete {
                ops.push(EditOp::Delete);
                i -= 1;
            } else {
                ops.push(EditOp::Insert);
                j -= 1;
            }
        }
    }
    ops.reverse();
    ops
}

/// Globally aligns `a` against `b`, padding with `gap` wherever one side doesn't advance.
///
/// An empty input is fine, the result is simply the other sequence aligned against gaps.
pub fn align<T: Ord + Clone>(
    a: &[T],
    b: &[T],
    scoring: &AlignmentScoring,
    gap: T,
) -> AlignedPair<T> {
    let ops = edit_script(a, b, scoring);
    let mut first = Vec::with_capacity(ops.len());
    let mut second = Vec::with_capacity(ops.len());

    let (mut i, mut j) = (0, 0);
    for op in ops {
        match op {
            EditOp::Match | EditOp::Substitute => {
                first.push(a[i].clone());
                second.push(b[j].clone());
                i += 1;
                j += 1;
            }
            EditOp::Delete => {
                first.push(a[i].clone());
                second.push(gap.clone());
                i += 1;
            }
            EditOp::Insert => {
                first.push(gap.clone());
                second.push(b[j].clone());
                j += 1;
            }
        }
    }

    AlignedPair { first, second, gap }
}
