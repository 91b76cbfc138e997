//! Grammar checking, negation normal form and bounded denotations for Mission-time LTL.
//!
//! Formulas are written in a compact textual encoding: `pN` variables, constants `T` and
//! `F` (or `!`), `~` negation, `F[a,b]`/`G[a,b]` prefixes, parenthesized binary
//! formulas `(α∘β)` with `∘` one of `v & = > U[a,b] R[a,b]`, and n-ary lists `(∘[α,β,...])`
//! with `∘` one of `v & =`.
//!
//! The denotation of a formula over `n` variables is a list of computation strings over
//! `{0, 1, s}`, one comma-separated block of `n` bits per time step, whose instances are
//! exactly the bounded traces satisfying the formula.
//!
//! ```
//! assert_eq!(mltl_reg::to_nnf("~(p0U[0,1]p1)").unwrap(), "(~p0R[0,1]~p1)");
//! assert_eq!(mltl_reg::reg("(p0U[0,1]p1)", 2).unwrap(), vec!["s1", "1s,s1"]);
//! ```

pub mod computation;
pub mod cover;
pub mod denotation;
pub mod error;
pub mod formula;
pub mod locate;
mod nnf;
pub mod parser;
pub mod sets;
pub mod trace;

pub use cover::Cover;
pub use denotation::{Reg, RegConfig, SubformulaCache};
pub use error::{Error, Result};
pub use formula::{Formula, NNFFormula};

use parser::{recognizes, Production};

pub fn parse(text: &str) -> Result<Formula> {
    text.parse()
}

/// Whether `text` is a well-formed formula.
pub fn check_wff(text: &str) -> bool {
    recognizes(text, Production::Formula)
}

/// Whether `text` is a well-formed formula in negation normal form.
pub fn check_nnf(text: &str) -> bool {
    recognizes(text, Production::Nnf)
}

/// Negation normal form of `text`, in the same encoding.
pub fn to_nnf(text: &str) -> Result<String> {
    Ok(NNFFormula::from(parse(text)?).to_string())
}

/// Computation strings denoting the formula `text`, which must already be in negation
/// normal form, over `num_vars` variables.
pub fn reg(text: &str, num_vars: usize) -> Result<Vec<String>> {
    let formula = NNFFormula::validate(parse(text)?)?;
    Ok(denotation::reg(&formula, num_vars)?.to_strings())
}

/// Number of time steps needed to decide `text`.
pub fn comp_len(text: &str) -> Result<usize> {
    Ok(parse(text)?.comp_len())
}
