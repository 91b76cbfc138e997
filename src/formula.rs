use std::fmt::Display;

use termtree::Tree;

use crate::sets::interval::Interval;

pub type Time = usize;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Variable {
    pub index: usize,
    pub negated: bool,
}

impl Variable {
    pub fn new(index: usize) -> Self {
        Variable {
            index,
            negated: false,
        }
    }

    pub fn negated(self) -> Self {
        Variable {
            index: self.index,
            negated: !self.negated,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "~p{}", self.index)
        } else {
            write!(f, "p{}", self.index)
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Literal {
    True,
    False,
    Var(Variable),
}

impl Literal {
    pub fn negated(self) -> Self {
        match self {
            Literal::True => Literal::False,
            Literal::False => Literal::True,
            Literal::Var(var) => Literal::Var(var.negated()),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::True => write!(f, "T"),
            Literal::False => write!(f, "F"),
            Literal::Var(var) => write!(f, "{}", var),
        }
    }
}

/// `F` (eventually) and `G` (always).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnaryOp {
    Finally,
    Globally,
}

/// `U` (until) and `R` (release).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TemporalOp {
    Until,
    Release,
}

/// Binary propositional connectives `v`, `&`, `=`, `>`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BinaryOp {
    Or,
    And,
    Equiv,
    Implies,
}

/// Connectives allowed in front of an n-ary list: `v`, `&`, `=`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssocOp {
    Or,
    And,
    Equiv,
}

impl UnaryOp {
    pub fn symbol(self) -> char {
        match self {
            UnaryOp::Finally => 'F',
            UnaryOp::Globally => 'G',
        }
    }

    pub fn dual(self) -> Self {
        match self {
            UnaryOp::Finally => UnaryOp::Globally,
            UnaryOp::Globally => UnaryOp::Finally,
        }
    }
}

impl TemporalOp {
    pub fn symbol(self) -> char {
        match self {
            TemporalOp::Until => 'U',
            TemporalOp::Release => 'R',
        }
    }

    pub fn dual(self) -> Self {
        match self {
            TemporalOp::Until => TemporalOp::Release,
            TemporalOp::Release => TemporalOp::Until,
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Or => 'v',
            BinaryOp::And => '&',
            BinaryOp::Equiv => '=',
            BinaryOp::Implies => '>',
        }
    }
}

impl AssocOp {
    pub fn symbol(self) -> char {
        self.as_binary().symbol()
    }

    pub fn as_binary(self) -> BinaryOp {
        match self {
            AssocOp::Or => BinaryOp::Or,
            AssocOp::And => BinaryOp::And,
            AssocOp::Equiv => BinaryOp::Equiv,
        }
    }
}

macro_rules! display_symbol {
    ($($op:ty),*) => {
        $(impl Display for $op {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.symbol())
            }
        })*
    };
}

display_symbol!(UnaryOp, TemporalOp, BinaryOp, AssocOp);

/// A well-formed formula; negation may appear anywhere.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Formula {
    Literal(Literal),
    Not(Box<Formula>),

    // temporal connectives
    Unary(UnaryOp, Interval<Time>, Box<Formula>),
    Temporal(Box<Formula>, TemporalOp, Interval<Time>, Box<Formula>),

    // propositional connectives
    Binary(Box<Formula>, BinaryOp, Box<Formula>),
    Assoc(AssocOp, Vec<Formula>),
}

/// A formula in negation normal form: negation only occurs inside literals.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum NNFFormula {
    Literal(Literal),

    // temporal connectives
    Unary(UnaryOp, Interval<Time>, Box<NNFFormula>),
    Temporal(Box<NNFFormula>, TemporalOp, Interval<Time>, Box<NNFFormula>),

    // propositional connectives
    Binary(Box<NNFFormula>, BinaryOp, Box<NNFFormula>),
    Assoc(AssocOp, Vec<NNFFormula>),
}

impl Formula {
    pub fn var(index: usize) -> Self {
        Formula::Literal(Literal::Var(Variable::new(index)))
    }

    pub fn negated(sub: Self) -> Self {
        Formula::Not(Box::new(sub))
    }

    pub fn unary(op: UnaryOp, int: Interval<Time>, sub: Self) -> Self {
        Formula::Unary(op, int, Box::new(sub))
    }

    pub fn finally(int: Interval<Time>, sub: Self) -> Self {
        Formula::unary(UnaryOp::Finally, int, sub)
    }

    pub fn globally(int: Interval<Time>, sub: Self) -> Self {
        Formula::unary(UnaryOp::Globally, int, sub)
    }

    pub fn temporal(lhs: Self, op: TemporalOp, int: Interval<Time>, rhs: Self) -> Self {
        Formula::Temporal(Box::new(lhs), op, int, Box::new(rhs))
    }

    pub fn until(lhs: Self, int: Interval<Time>, rhs: Self) -> Self {
        Formula::temporal(lhs, TemporalOp::Until, int, rhs)
    }

    pub fn release(lhs: Self, int: Interval<Time>, rhs: Self) -> Self {
        Formula::temporal(lhs, TemporalOp::Release, int, rhs)
    }

    pub fn binary(lhs: Self, op: BinaryOp, rhs: Self) -> Self {
        Formula::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn assoc(op: AssocOp, subs: impl IntoIterator<Item = Self>) -> Self {
        Formula::Assoc(op, subs.into_iter().collect())
    }

    /// Number of time steps a trace needs so that every subformula can be decided.
    ///
    /// Saturates at `usize::MAX` for bounds too large to add.
    pub fn comp_len(&self) -> usize {
        match self {
            Formula::Literal(..) => 1,
            Formula::Not(sub) => sub.comp_len(),
            Formula::Unary(_, int, _) | Formula::Temporal(_, _, int, _) if int.is_vacuous() => 1,
            Formula::Unary(_, int, sub) => int.ub.saturating_add(sub.comp_len()),
            Formula::Temporal(lhs, _, int, rhs) => {
                int.ub.saturating_add((lhs.comp_len() - 1).max(rhs.comp_len()))
            }
            Formula::Binary(lhs, _, rhs) => lhs.comp_len().max(rhs.comp_len()),
            Formula::Assoc(_, subs) => subs.iter().map(Formula::comp_len).max().unwrap_or(1),
        }
    }

    pub fn to_termtree(&self) -> Tree<String> {
        match self {
            Formula::Literal(literal) => Tree::new(literal.to_string()),
            Formula::Not(sub) => Tree::new("~".to_string()).with_leaves([sub.to_termtree()]),
            Formula::Unary(op, int, sub) => {
                Tree::new(format!("{}{}", op, int)).with_leaves([sub.to_termtree()])
            }
            Formula::Temporal(lhs, op, int, rhs) => Tree::new(format!("{}{}", op, int))
                .with_leaves([lhs.to_termtree(), rhs.to_termtree()]),
            Formula::Binary(lhs, op, rhs) => {
                Tree::new(op.to_string()).with_leaves([lhs.to_termtree(), rhs.to_termtree()])
            }
            Formula::Assoc(op, subs) => {
                Tree::new(format!("{}[..]", op)).with_leaves(subs.iter().map(|f| f.to_termtree()))
            }
        }
    }
}

impl NNFFormula {
    pub fn is_literal(&self) -> bool {
        matches!(self, NNFFormula::Literal(..))
    }

    pub fn comp_len(&self) -> usize {
        Formula::from(self.clone()).comp_len()
    }

    pub fn to_termtree(&self) -> Tree<String> {
        Formula::from(self.clone()).to_termtree()
    }
}

impl From<NNFFormula> for Formula {
    fn from(nnf: NNFFormula) -> Formula {
        match nnf {
            NNFFormula::Literal(literal) => Formula::Literal(literal),
            NNFFormula::Unary(op, int, sub) => Formula::unary(op, int, (*sub).into()),
            NNFFormula::Temporal(lhs, op, int, rhs) => {
                Formula::temporal((*lhs).into(), op, int, (*rhs).into())
            }
            NNFFormula::Binary(lhs, op, rhs) => Formula::binary((*lhs).into(), op, (*rhs).into()),
            NNFFormula::Assoc(op, subs) => {
                Formula::Assoc(op, subs.into_iter().map(Formula::from).collect())
            }
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Literal(literal) => write!(f, "{}", literal),
            Formula::Not(sub) => write!(f, "~{}", sub),
            Formula::Unary(op, int, sub) => write!(f, "{}{}{}", op, int, sub),
            Formula::Temporal(lhs, op, int, rhs) => write!(f, "({}{}{}{})", lhs, op, int, rhs),
            Formula::Binary(lhs, op, rhs) => write!(f, "({}{}{})", lhs, op, rhs),
            Formula::Assoc(op, subs) => {
                write!(f, "({}[", op)?;
                for (i, sub) in subs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", sub)?;
                }
                write!(f, "])")
            }
        }
    }
}

impl Display for NNFFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Formula::from(self.clone()))
    }
}
