use itertools::Itertools;

use crate::{
    error::{Error, Result},
    formula::{AssocOp, BinaryOp, Formula, Literal, TemporalOp, Time, UnaryOp, Variable},
};

/// Finite sequence of valuations of `width` propositional variables.
///
/// Variables read past the end of the trace are false.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Trace {
    width: usize,
    states: Vec<Vec<bool>>,
}

impl Trace {
    /// Trace from a flat bit vector holding `width` bits per time step.
    pub fn from_bits(width: usize, bits: &[bool]) -> Result<Self> {
        if width == 0 || bits.len() % width != 0 {
            return Err(Error::LengthMismatch {
                expected: width,
                found: bits.len(),
            });
        }
        Ok(Trace {
            width,
            states: bits.chunks(width).map(|state| state.to_vec()).collect(),
        })
    }

    /// Every trace of `length` steps over `width` variables.
    ///
    /// Fails with `TooManyTraces` when there are `2^64` or more of them.
    pub fn all(width: usize, length: usize) -> Result<impl Iterator<Item = Trace>> {
        let bits = width
            .checked_mul(length)
            .filter(|&bits| bits < 64)
            .ok_or(Error::TooManyTraces { width, length })?;
        Ok((0..1_u64 << bits).map(move |mask| Trace {
            width,
            states: (0..length)
                .map(|t| {
                    (0..width)
                        .map(|k| mask >> (t * width + k) & 1 == 1)
                        .collect()
                })
                .collect(),
        }))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn to_bits(&self) -> Vec<bool> {
        self.states.iter().flatten().copied().collect()
    }

    pub fn value(&self, t: Time, var: Variable) -> bool {
        let value = self
            .states
            .get(t)
            .and_then(|state| state.get(var.index))
            .copied()
            .unwrap_or(false);
        value != var.negated
    }

    pub fn satisfies(&self, formula: &Formula) -> bool {
        self.holds_at(formula, 0)
    }

    pub fn holds_at(&self, formula: &Formula, t: Time) -> bool {
        match formula {
            Formula::Literal(Literal::True) => true,
            Formula::Literal(Literal::False) => false,
            Formula::Literal(Literal::Var(var)) => self.value(t, *var),
            Formula::Not(sub) => !self.holds_at(sub, t),

            Formula::Unary(UnaryOp::Finally, int, sub) => {
                int.steps().any(|i| self.holds_at(sub, t + i))
            }
            Formula::Unary(UnaryOp::Globally, int, sub) => {
                int.steps().all(|i| self.holds_at(sub, t + i))
            }
            Formula::Temporal(lhs, TemporalOp::Until, int, rhs) => int.steps().any(|j| {
                self.holds_at(rhs, t + j) && (int.lb..j).all(|k| self.holds_at(lhs, t + k))
            }),
            Formula::Temporal(lhs, TemporalOp::Release, int, rhs) => int.steps().all(|j| {
                self.holds_at(rhs, t + j) || (int.lb..j).any(|k| self.holds_at(lhs, t + k))
            }),

            Formula::Binary(lhs, op, rhs) => {
                let (l, r) = (self.holds_at(lhs, t), self.holds_at(rhs, t));
                match op {
                    BinaryOp::Or => l || r,
                    BinaryOp::And => l && r,
                    BinaryOp::Equiv => l == r,
                    BinaryOp::Implies => !l || r,
                }
            }
            Formula::Assoc(AssocOp::Or, subs) => subs.iter().any(|f| self.holds_at(f, t)),
            Formula::Assoc(AssocOp::And, subs) => subs.iter().all(|f| self.holds_at(f, t)),
            Formula::Assoc(AssocOp::Equiv, subs) => subs
                .iter()
                .map(|f| self.holds_at(f, t))
                .reduce(|acc, value| acc == value)
                .unwrap_or(true),
        }
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let blocks = self
            .states
            .iter()
            .map(|state| state.iter().map(|&v| if v { '1' } else { '0' }).join(""))
            .join(",");
        write!(f, "{}", blocks)
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn trace(width: usize, text: &str) -> Trace {
        let bits = text
            .chars()
            .filter(|c| *c != ',')
            .map(|c| c == '1')
            .collect_vec();
        Trace::from_bits(width, &bits).unwrap()
    }

    #[rstest]
    #[case("01,10,11", "p1", true)]
    #[case("01,10,11", "p0", false)]
    #[case("01,10,11", "F[1,2](p0&p1)", true)]
    #[case("01,10,11", "F[1,1](p0&p1)", false)]
    #[case("01,10,11", "G[1,2]p0", true)]
    #[case("01,10,11", "G[0,2]p0", false)]
    #[case("01,10,11", "G[5,2]F", true)]
    #[case("01,10,11", "F[2,1]T", false)]
    #[case("10,10,01", "(p0U[0,2]p1)", true)]
    #[case("10,00,01", "(p0U[0,2]p1)", false)]
    #[case("10,10,01", "(p0U[2,1]p1)", false)]
    #[case("01,11,00", "(p0R[0,2]p1)", true)]
    #[case("01,01,00", "(p0R[0,2]p1)", false)]
    #[case("01,01,00", "(p0R[3,2]p1)", true)]
    #[case("01,10,11", "(=[p0,p1,T])", false)]
    #[case("11,10,11", "(=[p0,p1,T])", true)]
    #[case("01", "(p0>p1)", true)]
    #[case("01", "~(v[p0,~p1])", true)]
    #[case("11", "~(v[p0,~p1])", false)]
    #[case("1", "F[3,4]~p0", true)]
    fn test_satisfies(#[case] text: &str, #[case] formula: &str, #[case] expected: bool) {
        let formula: Formula = formula.parse().unwrap();
        let width = text.split(',').next().map_or(0, str::len);
        assert_eq!(trace(width, text).satisfies(&formula), expected);
    }

    #[test]
    fn test_all() {
        let traces = Trace::all(2, 2).unwrap().collect_vec();
        assert_eq!(traces.len(), 16);
        assert!(traces.iter().all(|trace| trace.len() == 2 && trace.width() == 2));
        assert_eq!(traces.iter().unique().count(), 16);
        assert_eq!(traces[6].to_string(), "01,10");
        assert_eq!(Trace::all(1, 0).unwrap().count(), 1);
        assert_eq!(Trace::all(7, 9).unwrap().next().map(|t| t.len()), Some(9));
    }

    #[rstest]
    #[case(8, 8)]
    #[case(1, 64)]
    #[case(3, usize::MAX)]
    fn test_all_rejects_huge(#[case] width: usize, #[case] length: usize) {
        assert_eq!(
            Trace::all(width, length).err(),
            Some(Error::TooManyTraces { width, length })
        );
    }

    #[test]
    fn test_bits() {
        let t = trace(2, "01,10");
        assert_eq!(t.to_bits(), vec![false, true, true, false]);
        assert!(t.value(1, Variable::new(0)));
        assert!(!t.value(7, Variable::new(0)));
        assert!(t.value(7, Variable::new(0).negated()));
        assert!(Trace::from_bits(2, &[true]).is_err());
    }
}
