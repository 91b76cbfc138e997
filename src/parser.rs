use std::str::FromStr;

use peg::{error::ParseError, str::LineCol};

use crate::{
    error::{Error, Result},
    formula::{AssocOp, BinaryOp, Formula, Literal, TemporalOp, Time, UnaryOp, Variable},
    sets::interval::Interval,
};

peg::parser! {
    pub grammar mltl_parser() for str {
        pub rule formula() -> Formula = wff()

        #[cache]
        rule wff() -> Formula
            = v:prop_var() { Formula::Literal(Literal::Var(v)) }
            / c:prop_cons() { Formula::Literal(c) }
            / "~" sub:wff() { Formula::negated(sub) }
            / unary_temporal()
            / assoc_prop()
            / binary_prop()
            / binary_temporal()

        pub rule literal() -> Literal
            = v:prop_var() { Literal::Var(v) }
            / "~" v:prop_var() { Literal::Var(v.negated()) }
            / prop_cons()

        pub rule prop_var() -> Variable
            = "p" index:number() { Variable::new(index) }

        // `F` is only the constant when it does not open an interval
        pub rule prop_cons() -> Literal
            = "T" { Literal::True }
            / ("!" / "F" !"[") { Literal::False }

        pub rule unary_temporal() -> Formula
            = op:unary_temporal_op() int:interval() sub:wff() { Formula::unary(op, int, sub) }

        pub rule assoc_prop() -> Formula
            = "(" op:assoc_prop_op() "[" subs:(wff() ++ ",") "]" ")" { Formula::Assoc(op, subs) }

        pub rule binary_prop() -> Formula
            = "(" lhs:wff() op:binary_prop_op() rhs:wff() ")" { Formula::binary(lhs, op, rhs) }

        pub rule binary_temporal() -> Formula
            = "(" lhs:wff() op:binary_temporal_op() int:interval() rhs:wff() ")" {
                Formula::temporal(lhs, op, int, rhs)
            }

        pub rule interval() -> Interval<Time>
            = "[" lb:number() "," ub:number() "]" { Interval::new(lb, ub) }

        rule number() -> usize
            = n:$(['0'..='9']+) {? n.parse().or(Err("number fitting in usize")) }

        rule unary_temporal_op() -> UnaryOp
            = "F" { UnaryOp::Finally }
            / "G" { UnaryOp::Globally }

        rule binary_temporal_op() -> TemporalOp
            = "U" { TemporalOp::Until }
            / "R" { TemporalOp::Release }

        rule binary_prop_op() -> BinaryOp
            = "v" { BinaryOp::Or }
            / "&" { BinaryOp::And }
            / "=" { BinaryOp::Equiv }
            / ">" { BinaryOp::Implies }

        rule assoc_prop_op() -> AssocOp
            = "v" { AssocOp::Or }
            / "&" { AssocOp::And }
            / "=" { AssocOp::Equiv }
    }
}

/// Grammar productions that can be recognized on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    PropVar,
    PropCons,
    UnaryTemporal,
    BinaryTemporal,
    AssocProp,
    BinaryProp,
    Interval,
    Formula,
    Nnf,
}

/// Whether the whole of `text` is derived from `production`.
pub fn recognizes(text: &str, production: Production) -> bool {
    match production {
        Production::PropVar => mltl_parser::prop_var(text).is_ok(),
        Production::PropCons => mltl_parser::prop_cons(text).is_ok(),
        Production::UnaryTemporal => mltl_parser::unary_temporal(text).is_ok(),
        Production::BinaryTemporal => mltl_parser::binary_temporal(text).is_ok(),
        Production::AssocProp => mltl_parser::assoc_prop(text).is_ok(),
        Production::BinaryProp => mltl_parser::binary_prop(text).is_ok(),
        Production::Interval => mltl_parser::interval(text).is_ok(),
        Production::Formula => mltl_parser::formula(text).is_ok(),
        Production::Nnf => mltl_parser::formula(text)
            .map(|formula| crate::formula::NNFFormula::validate(formula).is_ok())
            .unwrap_or(false),
    }
}

fn malformed(text: &str, err: ParseError<LineCol>) -> Error {
    Error::MalformedFormula {
        text: text.to_string(),
        position: err.location.offset,
        expected: err.expected.to_string(),
    }
}

impl FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        mltl_parser::formula(s).map_err(|err| malformed(s, err))
    }
}

impl FromStr for Literal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        mltl_parser::literal(s).map_err(|_| {
            if s.starts_with('p') || s.starts_with('~') {
                Error::InvalidPropVar {
                    text: s.to_string(),
                    reason: "expected `p` or `~p` followed by a variable index".to_string(),
                }
            } else {
                Error::InvalidPropCons {
                    text: s.to_string(),
                }
            }
        })
    }
}
