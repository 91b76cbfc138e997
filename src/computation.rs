use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use crate::{
    error::{Error, Result},
    formula::Variable,
};

/// One position of a computation string.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bit {
    Zero,
    One,
    Wild,
}

impl Bit {
    pub fn is_wild(self) -> bool {
        self == Bit::Wild
    }

    /// Intersection of the two bits; `Wild` is the identity.
    pub fn meet(self, other: Bit) -> Option<Bit> {
        match (self, other) {
            (Bit::Wild, bit) | (bit, Bit::Wild) => Some(bit),
            (lhs, rhs) if lhs == rhs => Some(lhs),
            _ => None,
        }
    }

    pub fn values(self) -> &'static [bool] {
        match self {
            Bit::Zero => &[false],
            Bit::One => &[true],
            Bit::Wild => &[false, true],
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::Wild => 's',
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl TryFrom<char> for Bit {
    type Error = char;

    fn try_from(symbol: char) -> std::result::Result<Self, char> {
        match symbol {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            's' => Ok(Bit::Wild),
            other => Err(other),
        }
    }
}

/// A string over `{0, 1, s}` made of consecutive blocks of `width` bits, one block per
/// time step. It denotes every concrete bit sequence obtained by instantiating the
/// wildcards `s`; a string of fewer blocks than another is read as padded with
/// all-wildcard blocks.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComputationString {
    width: usize,
    bits: Vec<Bit>,
}

impl ComputationString {
    pub fn new(width: usize, bits: Vec<Bit>) -> Result<Self> {
        if width == 0 || bits.is_empty() || bits.len() % width != 0 {
            return Err(Error::LengthMismatch {
                expected: width,
                found: bits.len(),
            });
        }
        Ok(ComputationString { width, bits })
    }

    /// `blocks` blocks of wildcards.
    pub fn wildcard(width: usize, blocks: usize) -> Self {
        ComputationString {
            width,
            bits: vec![Bit::Wild; width * blocks],
        }
    }

    /// Single block fixing `var` and leaving every other variable free.
    pub fn literal(width: usize, var: Variable) -> Self {
        let mut bits = vec![Bit::Wild; width];
        bits[var.index] = Bit::from(!var.negated);
        ComputationString { width, bits }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn blocks(&self) -> usize {
        self.bits.len() / self.width
    }

    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    pub fn block(&self, step: usize) -> &[Bit] {
        &self.bits[step * self.width..(step + 1) * self.width]
    }

    pub fn wildcards(&self) -> usize {
        self.bits.iter().filter(|bit| bit.is_wild()).count()
    }

    /// Delays the string by `steps` time steps.
    pub fn shifted(&self, steps: usize) -> Self {
        let mut bits = vec![Bit::Wild; steps * self.width];
        bits.extend_from_slice(&self.bits);
        ComputationString {
            width: self.width,
            bits,
        }
    }

    /// Right-pads with wildcard blocks up to `blocks`; longer strings are kept as they are.
    pub fn padded(&self, blocks: usize) -> Self {
        let mut bits = self.bits.clone();
        if blocks > self.blocks() {
            bits.resize(blocks * self.width, Bit::Wild);
        }
        ComputationString {
            width: self.width,
            bits,
        }
    }

    /// Drops trailing all-wildcard blocks, keeping at least one block.
    pub fn trimmed(&self) -> Self {
        let mut blocks = self.blocks();
        while blocks > 1 && self.block(blocks - 1).iter().all(|bit| bit.is_wild()) {
            blocks -= 1;
        }
        ComputationString {
            width: self.width,
            bits: self.bits[..blocks * self.width].to_vec(),
        }
    }

    fn check_width(&self, other: &Self) -> Result<()> {
        if self.width != other.width {
            return Err(Error::LengthMismatch {
                expected: self.width,
                found: other.width,
            });
        }
        Ok(())
    }

    /// Strings denoting the common sequences of both, `None` if they conflict.
    pub fn intersect(&self, other: &Self) -> Result<Option<Self>> {
        self.check_width(other)?;
        let blocks = self.blocks().max(other.blocks());
        let (lhs, rhs) = (self.padded(blocks), other.padded(blocks));
        let bits = lhs
            .bits
            .iter()
            .zip(rhs.bits.iter())
            .map(|(l, r)| l.meet(*r))
            .collect::<Option<Vec<_>>>();
        Ok(bits.map(|bits| ComputationString {
            width: self.width,
            bits,
        }))
    }

    /// Single string denoting the union of both if there is one differing in at most one
    /// position. Both strings must already have the same length.
    pub fn merge(&self, other: &Self) -> Result<Option<Self>> {
        self.check_width(other)?;
        if self.bits.len() != other.bits.len() {
            return Err(Error::LengthMismatch {
                expected: self.bits.len(),
                found: other.bits.len(),
            });
        }
        let differing = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .positions(|(l, r)| l != r)
            .collect_vec();
        Ok(match differing[..] {
            [] => Some(self.clone()),
            [position] => {
                let mut merged = self.clone();
                merged.bits[position] = Bit::Wild;
                Some(merged)
            }
            _ => None,
        })
    }

    /// Every concrete bit sequence the string denotes.
    pub fn concretize(&self) -> Vec<Vec<bool>> {
        self.bits
            .iter()
            .map(|bit| bit.values().iter().copied())
            .multi_cartesian_product()
            .collect()
    }
}

impl Display for ComputationString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, block) in self.bits.chunks(self.width).enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            for bit in block {
                write!(f, "{}", bit.symbol())?;
            }
        }
        Ok(())
    }
}

impl FromStr for ComputationString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedComputationString {
            text: s.to_string(),
            reason,
        };

        let blocks = s.split(',').collect_vec();
        let width = blocks[0].len();
        if width == 0 {
            return Err(malformed("empty block".to_string()));
        }
        let mut bits = Vec::with_capacity(width * blocks.len());
        for (step, block) in blocks.iter().enumerate() {
            if block.len() != width {
                return Err(malformed(format!(
                    "block {} has {} bits instead of {}",
                    step,
                    block.len(),
                    width
                )));
            }
            for symbol in block.chars() {
                let bit = Bit::try_from(symbol)
                    .map_err(|symbol| malformed(format!("unexpected symbol `{}`", symbol)))?;
                bits.push(bit);
            }
        }
        ComputationString::new(width, bits)
    }
}
