use std::{collections::BTreeSet, fmt::Display};

use itertools::Itertools;
use log::trace;

use crate::{
    computation::{Bit, ComputationString},
    error::{Error, Result},
};

/// Ordered collection of computation strings of the same block width whose union is a
/// set of bounded traces.
///
/// Two covers denote the same set independently of order, duplicates or minimization;
/// compare them with [`Cover::expand`].
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Cover {
    width: usize,
    strings: Vec<ComputationString>,
}

impl Cover {
    pub fn empty(width: usize) -> Self {
        Cover {
            width,
            strings: Vec::new(),
        }
    }

    /// Every trace: a single all-wildcard block. Without variables no string can be
    /// formed, so the cover is empty.
    pub fn top(width: usize) -> Self {
        if width == 0 {
            return Cover::empty(width);
        }
        Cover {
            width,
            strings: vec![ComputationString::wildcard(width, 1)],
        }
    }

    pub fn from_strings(
        width: usize,
        strings: impl IntoIterator<Item = ComputationString>,
    ) -> Result<Self> {
        let strings = strings.into_iter().collect_vec();
        if let Some(string) = strings.iter().find(|string| string.width() != width) {
            return Err(Error::LengthMismatch {
                expected: width,
                found: string.width(),
            });
        }
        Ok(Cover { width, strings })
    }

    pub fn parse<'a>(width: usize, texts: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let strings = texts
            .into_iter()
            .map(|text| text.parse::<ComputationString>())
            .collect::<Result<Vec<_>>>()?;
        Cover::from_strings(width, strings)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComputationString> {
        self.strings.iter()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.strings.iter().map(|s| s.to_string()).collect()
    }

    /// Block count of the longest member, zero for the empty cover.
    pub fn max_blocks(&self) -> usize {
        self.strings.iter().map(|s| s.blocks()).max().unwrap_or(0)
    }

    fn check_width(&self, other: &Cover) -> Result<()> {
        if self.width != other.width {
            return Err(Error::LengthMismatch {
                expected: self.width,
                found: other.width,
            });
        }
        Ok(())
    }

    /// Right-pads every member to `target` blocks, by default to the longest member.
    pub fn pad(&self, target: Option<usize>) -> Self {
        let blocks = target.unwrap_or_else(|| self.max_blocks());
        Cover {
            width: self.width,
            strings: self.strings.iter().map(|s| s.padded(blocks)).collect(),
        }
    }

    /// Delays every member by `steps` time steps.
    pub fn shifted(&self, steps: usize) -> Self {
        Cover {
            width: self.width,
            strings: self.strings.iter().map(|s| s.shifted(steps)).collect(),
        }
    }

    /// Concatenation of both covers, i.e. their union.
    pub fn join(&self, other: &Cover, simplify: bool) -> Result<Self> {
        self.check_width(other)?;
        let joined = Cover {
            width: self.width,
            strings: self
                .strings
                .iter()
                .chain(other.strings.iter())
                .cloned()
                .collect(),
        };
        if simplify {
            joined.simplify()
        } else {
            Ok(joined)
        }
    }

    /// Pairwise intersection of the members of both covers.
    pub fn set_intersect(&self, other: &Cover, simplify: bool) -> Result<Self> {
        self.check_width(other)?;
        if self.is_empty() || other.is_empty() {
            return Ok(Cover::empty(self.width));
        }

        let blocks = self.max_blocks().max(other.max_blocks());
        let (lhs, rhs) = (self.pad(Some(blocks)), other.pad(Some(blocks)));
        let mut strings = Vec::new();
        for (l, r) in lhs.strings.iter().cartesian_product(rhs.strings.iter()) {
            if let Some(string) = l.intersect(r)? {
                strings.push(string);
            }
        }

        let intersection = Cover {
            width: self.width,
            strings,
        };
        if simplify {
            intersection.simplify()
        } else {
            Ok(intersection)
        }
    }

    /// Union of both covers with pairwise disjoint members.
    pub fn set_union(&self, other: &Cover) -> Result<Self> {
        self.join(other, false)?.disjoint()
    }

    /// Rewrites the cover into pairwise disjoint members denoting the same set.
    ///
    /// The members are padded to a common length and split on their last bit into those
    /// admitting `0` and those admitting `1` (a wildcard goes to both sides); each side is
    /// solved recursively on the remaining prefix. A side containing the all-wildcard
    /// prefix collapses to it.
    pub fn disjoint(&self) -> Result<Self> {
        let padded = self.pad(None);
        let rows = padded.strings.iter().map(|s| s.bits().to_vec()).collect_vec();
        let strings = disjoint_rows(rows)
            .into_iter()
            .map(|bits| ComputationString::new(self.width, bits))
            .collect::<Result<Vec<_>>>()?;
        Ok(Cover {
            width: self.width,
            strings,
        })
    }

    /// Merges pairs of members differing in at most one position until no pair merges,
    /// then drops trailing all-wildcard blocks.
    ///
    /// The result is a fixpoint of pairwise merging; it is not necessarily a minimal cover.
    pub fn simplify(&self) -> Result<Self> {
        let mut strings = self.pad(None).strings;
        let before = strings.len();

        loop {
            let mut merged_any = false;
            let mut i = 0;
            while i < strings.len() {
                let mut j = i + 1;
                while j < strings.len() {
                    match strings[i].merge(&strings[j])? {
                        Some(merged) => {
                            strings[i] = merged;
                            strings.remove(j);
                            merged_any = true;
                        }
                        None => j += 1,
                    }
                }
                i += 1;
            }
            if !merged_any {
                break;
            }
        }

        trace!("simplified cover of {} strings to {}", before, strings.len());
        Ok(Cover {
            width: self.width,
            strings: strings.iter().map(|s| s.trimmed()).collect(),
        })
    }

    /// All concrete traces of `max(horizon, blocks)` steps the cover denotes, as flat
    /// bit vectors of `width` bits per step.
    pub fn expand(&self, horizon: usize) -> BTreeSet<Vec<bool>> {
        self.strings
            .iter()
            .flat_map(|s| s.padded(horizon).concretize())
            .collect()
    }

    pub fn is_disjoint(&self) -> bool {
        let padded = self.pad(None);
        padded
            .strings
            .iter()
            .tuple_combinations()
            .all(|(lhs, rhs)| matches!(lhs.intersect(rhs), Ok(None)))
    }
}

fn disjoint_rows(rows: Vec<Vec<Bit>>) -> Vec<Vec<Bit>> {
    if rows.len() <= 1 {
        return rows;
    }
    let len = rows[0].len();
    if len == 1 {
        let first = rows[0][0];
        let bit = if rows.iter().all(|row| row[0] == first) {
            first
        } else {
            Bit::Wild
        };
        return vec![vec![bit]];
    }
    if let Some(top) = rows.iter().find(|row| row.iter().all(|bit| bit.is_wild())) {
        return vec![top.clone()];
    }

    let mut end_zero = Vec::new();
    let mut end_one = Vec::new();
    for mut row in rows {
        match row.pop() {
            Some(Bit::Zero) => end_zero.push(row),
            Some(Bit::One) => end_one.push(row),
            _ => {
                end_zero.push(row.clone());
                end_one.push(row);
            }
        }
    }

    let with_suffix = |rows: Vec<Vec<Bit>>, bit: Bit| {
        disjoint_rows(rows).into_iter().map(move |mut row| {
            row.push(bit);
            row
        })
    };
    with_suffix(end_zero, Bit::Zero)
        .chain(with_suffix(end_one, Bit::One))
        .collect()
}

impl Display for Cover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for string in &self.strings {
            writeln!(f, "{}", string)?;
        }
        Ok(())
    }
}
