use crate::{
    error::{Error, Result},
    formula::{
        AssocOp, BinaryOp, Formula, Literal, NNFFormula, TemporalOp, Time, UnaryOp, Variable,
    },
    sets::interval::Interval,
};

impl NNFFormula {
    pub fn var(index: usize) -> Self {
        NNFFormula::Literal(Literal::Var(Variable::new(index)))
    }

    pub fn true_literal() -> Self {
        NNFFormula::Literal(Literal::True)
    }

    pub fn false_literal() -> Self {
        NNFFormula::Literal(Literal::False)
    }

    pub fn unary(op: UnaryOp, int: Interval<Time>, sub: Self) -> Self {
        NNFFormula::Unary(op, int, Box::new(sub))
    }

    pub fn temporal(lhs: Self, op: TemporalOp, int: Interval<Time>, rhs: Self) -> Self {
        NNFFormula::Temporal(Box::new(lhs), op, int, Box::new(rhs))
    }

    pub fn binary(lhs: Self, op: BinaryOp, rhs: Self) -> Self {
        NNFFormula::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        NNFFormula::binary(lhs, BinaryOp::Or, rhs)
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        NNFFormula::binary(lhs, BinaryOp::And, rhs)
    }

    /// Negation pushed down to the literals by De Morgan and temporal duality.
    pub fn negated(self) -> Self {
        match self {
            NNFFormula::Literal(literal) => NNFFormula::Literal(literal.negated()),

            NNFFormula::Unary(op, int, sub) => NNFFormula::unary(op.dual(), int, sub.negated()),
            NNFFormula::Temporal(lhs, op, int, rhs) => {
                NNFFormula::temporal(lhs.negated(), op.dual(), int, rhs.negated())
            }

            NNFFormula::Binary(lhs, BinaryOp::Or, rhs) => {
                NNFFormula::and(lhs.negated(), rhs.negated())
            }
            NNFFormula::Binary(lhs, BinaryOp::And, rhs) => {
                NNFFormula::or(lhs.negated(), rhs.negated())
            }
            NNFFormula::Binary(lhs, BinaryOp::Equiv, rhs) => NNFFormula::and(
                NNFFormula::or((*lhs).clone(), (*rhs).clone()),
                NNFFormula::or(lhs.negated(), rhs.negated()),
            ),
            NNFFormula::Binary(lhs, BinaryOp::Implies, rhs) => {
                NNFFormula::and(*lhs, rhs.negated())
            }

            NNFFormula::Assoc(AssocOp::Or, subs) => {
                NNFFormula::Assoc(AssocOp::And, subs.into_iter().map(|f| f.negated()).collect())
            }
            NNFFormula::Assoc(AssocOp::And, subs) => {
                NNFFormula::Assoc(AssocOp::Or, subs.into_iter().map(|f| f.negated()).collect())
            }
            NNFFormula::Assoc(AssocOp::Equiv, subs) => {
                NNFFormula::fold(AssocOp::Equiv, subs).negated()
            }
        }
    }

    /// Left fold of an n-ary list into nested binary connectives:
    /// `(∘[e1,e2,e3])` becomes `((e1∘e2)∘e3)`. An empty list folds to the neutral element.
    pub fn fold(op: AssocOp, subs: impl IntoIterator<Item = Self>) -> Self {
        let mut subs = subs.into_iter();
        match subs.next() {
            Some(first) => {
                subs.fold(first, |acc, sub| NNFFormula::binary(acc, op.as_binary(), sub))
            }
            None => match op {
                AssocOp::Or => NNFFormula::false_literal(),
                AssocOp::And | AssocOp::Equiv => NNFFormula::true_literal(),
            },
        }
    }

    /// Accepts `formula` only if it already is in negation normal form, i.e. every `~` is
    /// directly applied to a propositional variable.
    pub fn validate(formula: Formula) -> Result<Self> {
        Ok(match formula {
            Formula::Literal(literal) => NNFFormula::Literal(literal),
            Formula::Not(sub) => match *sub {
                Formula::Literal(Literal::Var(var)) => {
                    NNFFormula::Literal(Literal::Var(var.negated()))
                }
                sub => {
                    return Err(Error::NotInNegationNormalForm {
                        formula: Formula::negated(sub).to_string(),
                    })
                }
            },
            Formula::Unary(op, int, sub) => NNFFormula::unary(op, int, Self::validate(*sub)?),
            Formula::Temporal(lhs, op, int, rhs) => {
                NNFFormula::temporal(Self::validate(*lhs)?, op, int, Self::validate(*rhs)?)
            }
            Formula::Binary(lhs, op, rhs) => {
                NNFFormula::binary(Self::validate(*lhs)?, op, Self::validate(*rhs)?)
            }
            Formula::Assoc(op, subs) => NNFFormula::Assoc(
                op,
                subs.into_iter().map(Self::validate).collect::<Result<_>>()?,
            ),
        })
    }
}

impl From<Formula> for NNFFormula {
    fn from(formula: Formula) -> NNFFormula {
        match formula {
            Formula::Literal(literal) => NNFFormula::Literal(literal),

            Formula::Unary(op, int, sub) => NNFFormula::unary(op, int, (*sub).into()),
            Formula::Temporal(lhs, op, int, rhs) => {
                NNFFormula::temporal((*lhs).into(), op, int, (*rhs).into())
            }
            Formula::Binary(lhs, op, rhs) => NNFFormula::binary((*lhs).into(), op, (*rhs).into()),
            Formula::Assoc(op, subs) => {
                NNFFormula::Assoc(op, subs.into_iter().map(|f| f.into()).collect())
            }

            Formula::Not(sub) => match *sub {
                Formula::Not(sub) => (*sub).into(),
                sub => NNFFormula::from(sub).negated(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn nnf(text: &str) -> NNFFormula {
        text.parse::<Formula>().unwrap().into()
    }

    #[rstest]
    #[case("p0", "p0")]
    #[case("~T", "F")]
    #[case("~!", "T")]
    #[case("~~p3", "p3")]
    #[case("~~~p3", "~p3")]
    #[case("~(p0vp1)", "(~p0&~p1)")]
    #[case("~(p0&p1)", "(~p0v~p1)")]
    #[case("~(p0=p1)", "((p0vp1)&(~p0v~p1))")]
    #[case("~(p0>p1)", "(p0&~p1)")]
    #[case("~F[1,2]p0", "G[1,2]~p0")]
    #[case("~G[1,2]~p0", "F[1,2]p0")]
    #[case("~(p0U[0,3]p1)", "(~p0R[0,3]~p1)")]
    #[case("~(p0R[0,3]p1)", "(~p0U[0,3]~p1)")]
    #[case("~(v[p0,~p1,G[0,1]p2])", "(&[~p0,p1,F[0,1]~p2])")]
    #[case("~(&[p0,T])", "(v[~p0,F])")]
    #[case("~(=[p0])", "~p0")]
    #[case(
        "~(=[p0,p1,p2])",
        "(((p0=p1)vp2)&(((p0vp1)&(~p0v~p1))v~p2))"
    )]
    #[case("(p0>~G[0,2](p1vT))", "(p0>F[0,2](~p1&F))")]
    #[case("G[3,1]~(p0U[2,2]~p1)", "G[3,1](~p0R[2,2]p1)")]
    fn test_to_nnf(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(nnf(text).to_string(), expected);
    }

    #[rstest]
    #[case("~(p0=~(p1>G[0,1]p2))")]
    #[case("~(=[p0,~p1,(p2U[0,1]p3)])")]
    #[case("~G[0,4]~(v[F[1,2]p0,~(p1R[0,2]~p2)])")]
    #[case("(~p0U[0,1]~~(p1&~T))")]
    fn test_idempotent(#[case] text: &str) {
        let once = nnf(text);
        let twice = NNFFormula::from(Formula::from(once.clone()));
        assert_eq!(once, twice);
        assert_eq!(NNFFormula::validate(Formula::from(once.clone())), Ok(once));
    }

    #[test]
    fn test_fold() {
        let folded = NNFFormula::fold(
            AssocOp::And,
            [NNFFormula::var(0), NNFFormula::var(1), NNFFormula::var(2)],
        );
        assert_eq!(folded.to_string(), "((p0&p1)&p2)");
        assert_eq!(NNFFormula::fold(AssocOp::Or, Vec::new()), NNFFormula::false_literal());
        assert_eq!(NNFFormula::fold(AssocOp::And, Vec::new()), NNFFormula::true_literal());
        assert_eq!(
            NNFFormula::fold(AssocOp::Equiv, [NNFFormula::var(4)]),
            NNFFormula::var(4)
        );
    }

    #[rstest]
    #[case("~T")]
    #[case("~~p0")]
    #[case("(p0v~(p1&p2))")]
    #[case("F[0,1]~G[0,1]p0")]
    fn test_validate_rejects(#[case] text: &str) {
        let formula: Formula = text.parse().unwrap();
        assert!(matches!(
            NNFFormula::validate(formula),
            Err(Error::NotInNegationNormalForm { .. })
        ));
    }

    #[test]
    fn test_validate_reports_subformula() {
        let formula: Formula = "(p0v~(p1&p2))".parse().unwrap();
        assert_eq!(
            NNFFormula::validate(formula),
            Err(Error::NotInNegationNormalForm {
                formula: "~(p1&p2)".to_string()
            })
        );
    }
}
