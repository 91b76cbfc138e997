use std::{fmt::Display, str::FromStr};

use num::{iter::RangeInclusive, Integer, ToPrimitive, Unsigned};

use crate::{error::Error, parser::mltl_parser};

/// Closed bounded interval `[lb, ub]` of time steps.
///
/// Unlike a set-theoretic interval, `lb > ub` is kept as written: temporal operators
/// over such an interval are vacuous (`G` holds, `F` fails).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval<T> {
    pub lb: T,
    pub ub: T,
}

impl<T: Ord + Copy> Interval<T> {
    pub fn new(lb: T, ub: T) -> Self {
        Interval { lb, ub }
    }

    pub fn singleton(v: T) -> Self {
        Interval { lb: v, ub: v }
    }

    pub fn lb(&self) -> T {
        self.lb
    }

    pub fn ub(&self) -> T {
        self.ub
    }

    pub fn is_vacuous(&self) -> bool {
        self.lb > self.ub
    }

    pub fn is_singleton(&self) -> bool {
        self.lb == self.ub
    }
}

impl<T: Integer + Unsigned + ToPrimitive + Copy> Interval<T> {
    /// Number of steps after `lb` covered by the interval (`ub - lb`), zero when vacuous.
    pub fn width(&self) -> T {
        if self.is_vacuous() {
            T::zero()
        } else {
            self.ub - self.lb
        }
    }

    /// All time steps `lb..=ub`; empty when vacuous.
    pub fn steps(&self) -> RangeInclusive<T> {
        num::range_inclusive(self.lb, self.ub)
    }

    pub fn contains(&self, t: T) -> bool {
        self.lb <= t && t <= self.ub
    }
}

impl<T: Display> Display for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.lb, self.ub)
    }
}

impl FromStr for Interval<usize> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        mltl_parser::interval(s).map_err(|err| Error::MalformedFormula {
            text: s.to_string(),
            position: err.location.offset,
            expected: err.expected.to_string(),
        })
    }
}
