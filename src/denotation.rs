//! Bounded denotations of formulas in negation normal form.
//!
//! Every formula over `n` variables denotes a [`Cover`]: each computation string fixes
//! some bits of the first time steps of a trace, and a trace satisfies the formula iff it
//! matches one of the strings. Temporal operators unroll into finite unions (`F`) and
//! intersections (`G`) of shifted copies of their operands' covers; `U` and `R` combine
//! both.

use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    computation::ComputationString,
    cover::Cover,
    error::{Error, Result},
    formula::{BinaryOp, Literal, NNFFormula, TemporalOp, Time, UnaryOp},
    sets::interval::Interval,
};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct RegConfig {
    /// Simplify the cover after every union and intersection.
    pub simplify: bool,
    /// Rewrite the final cover into pairwise disjoint strings.
    pub disjoint: bool,
}

impl Default for RegConfig {
    fn default() -> Self {
        RegConfig {
            simplify: true,
            disjoint: false,
        }
    }
}

/// Covers of already denoted subformulas.
///
/// Entries are keyed by the variable count, the configuration and the formula itself,
/// so a cache can be shared between engines; it never changes a result.
#[derive(Debug, Default)]
pub struct SubformulaCache {
    entries: HashMap<(usize, RegConfig), HashMap<NNFFormula, Cover>>,
    hits: usize,
}

impl SubformulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        num_vars: usize,
        config: RegConfig,
        formula: &NNFFormula,
    ) -> Option<Cover> {
        let cover = self
            .entries
            .get(&(num_vars, config))
            .and_then(|covers| covers.get(formula))
            .cloned();
        if cover.is_some() {
            self.hits += 1;
        }
        cover
    }

    pub fn insert(
        &mut self,
        num_vars: usize,
        config: RegConfig,
        formula: NNFFormula,
        cover: Cover,
    ) {
        self.entries
            .entry((num_vars, config))
            .or_default()
            .insert(formula, cover);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups answered from the cache since the last clear.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn clear(&mut self) {
        debug!(
            "clearing subformula cache ({} entries, {} hits)",
            self.len(),
            self.hits
        );
        self.entries.clear();
        self.hits = 0;
    }
}

/// Denotation engine over a fixed number of propositional variables.
pub struct Reg<'c> {
    num_vars: usize,
    config: RegConfig,
    cache: Option<&'c mut SubformulaCache>,
}

impl<'c> Reg<'c> {
    pub fn new(num_vars: usize) -> Self {
        Reg {
            num_vars,
            config: RegConfig::default(),
            cache: None,
        }
    }

    pub fn with_config(mut self, config: RegConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: &'c mut SubformulaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn config(&self) -> RegConfig {
        self.config
    }

    pub fn denote(&mut self, formula: &NNFFormula) -> Result<Cover> {
        trace!("denoting\n{}", formula.to_termtree());
        let mut cover = self.denote_rec(formula)?;
        if self.config.disjoint {
            cover = cover.disjoint()?;
        }
        debug!(
            "{} over {} variables: {} strings",
            formula,
            self.num_vars,
            cover.len()
        );
        Ok(cover)
    }

    fn denote_rec(&mut self, formula: &NNFFormula) -> Result<Cover> {
        let (num_vars, config) = (self.num_vars, self.config);
        if let Some(cover) = self
            .cache
            .as_deref_mut()
            .and_then(|cache| cache.get(num_vars, config, formula))
        {
            trace!("cache hit: {}", formula);
            return Ok(cover);
        }

        let cover = match formula {
            NNFFormula::Literal(Literal::True) => Cover::top(num_vars),
            NNFFormula::Literal(Literal::False) => Cover::empty(num_vars),
            NNFFormula::Literal(Literal::Var(var)) => {
                if var.index >= num_vars {
                    return Err(Error::InvalidPropVar {
                        text: var.to_string(),
                        reason: format!("index out of range for {} variables", num_vars),
                    });
                }
                Cover::from_strings(num_vars, [ComputationString::literal(num_vars, *var)])?
            }

            NNFFormula::Unary(UnaryOp::Finally, int, _) if int.is_vacuous() => {
                Cover::empty(num_vars)
            }
            NNFFormula::Unary(UnaryOp::Globally, int, _) if int.is_vacuous() => {
                Cover::top(num_vars)
            }
            NNFFormula::Unary(op, int, sub) => {
                let alpha = self.denote_rec(sub)?;
                match op {
                    UnaryOp::Finally => self.finally(&alpha, int)?,
                    UnaryOp::Globally => self.globally(&alpha, int)?,
                }
            }

            NNFFormula::Temporal(_, TemporalOp::Until, int, _) if int.is_vacuous() => {
                Cover::empty(num_vars)
            }
            NNFFormula::Temporal(_, TemporalOp::Release, int, _) if int.is_vacuous() => {
                Cover::top(num_vars)
            }
            NNFFormula::Temporal(lhs, op, int, rhs) => {
                let alpha = self.denote_rec(lhs)?;
                let beta = self.denote_rec(rhs)?;
                match op {
                    TemporalOp::Until => self.until(&alpha, &beta, int)?,
                    TemporalOp::Release => self.release(&alpha, &beta, int)?,
                }
            }

            NNFFormula::Binary(lhs, BinaryOp::Or, rhs) => {
                let alpha = self.denote_rec(lhs)?;
                alpha.join(&self.denote_rec(rhs)?, config.simplify)?
            }
            NNFFormula::Binary(lhs, BinaryOp::And, rhs) => {
                let alpha = self.denote_rec(lhs)?;
                alpha.set_intersect(&self.denote_rec(rhs)?, config.simplify)?
            }
            NNFFormula::Binary(lhs, BinaryOp::Equiv, rhs) => {
                let (lhs, rhs) = (lhs.as_ref().clone(), rhs.as_ref().clone());
                let expanded = NNFFormula::or(
                    NNFFormula::and(lhs.clone(), rhs.clone()),
                    NNFFormula::and(lhs.negated(), rhs.negated()),
                );
                self.denote_rec(&expanded)?
            }
            NNFFormula::Binary(lhs, BinaryOp::Implies, rhs) => {
                let expanded =
                    NNFFormula::or(lhs.as_ref().clone().negated(), rhs.as_ref().clone());
                self.denote_rec(&expanded)?
            }

            NNFFormula::Assoc(op, subs) => {
                self.denote_rec(&NNFFormula::fold(*op, subs.iter().cloned()))?
            }
        };

        trace!("{}: {} strings", formula, cover.len());
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.insert(num_vars, config, formula.clone(), cover.clone());
        }
        Ok(cover)
    }

    /// `F[a,b]α`: union of the copies of `α` shifted by `a..=b` steps.
    fn finally(&self, alpha: &Cover, int: &Interval<Time>) -> Result<Cover> {
        let mut body = Cover::empty(self.num_vars);
        for i in 0..=int.width() {
            body = body.join(&alpha.shifted(i), self.config.simplify)?;
        }
        Ok(body.shifted(int.lb))
    }

    /// `G[a,b]α`: intersection of the copies of `α` shifted by `a..=b` steps.
    fn globally(&self, alpha: &Cover, int: &Interval<Time>) -> Result<Cover> {
        let mut body = alpha.clone();
        for i in 1..=int.width() {
            body = body.set_intersect(&alpha.shifted(i), self.config.simplify)?;
        }
        Ok(body.shifted(int.lb))
    }

    /// `α U[a,b] β = G[a,a]β ∪ ⋃_{i=a}^{b-1} (G[a,i]α ∩ G[i+1,i+1]β)`
    fn until(&self, alpha: &Cover, beta: &Cover, int: &Interval<Time>) -> Result<Cover> {
        let simplify = self.config.simplify;
        let mut cover = beta.shifted(int.lb);
        // G[a,i]α
        let mut prefix = alpha.shifted(int.lb);
        for i in int.lb..int.ub {
            let step = prefix.set_intersect(&beta.shifted(i + 1), simplify)?;
            cover = cover.join(&step, simplify)?;
            if i + 1 < int.ub {
                prefix = prefix.set_intersect(&alpha.shifted(i + 1), simplify)?;
            }
        }
        Ok(cover)
    }

    /// `α R[a,b] β = G[a,b]β ∪ ⋃_{i=a}^{b-1} (G[a,i]β ∩ G[i,i]α)`
    fn release(&self, alpha: &Cover, beta: &Cover, int: &Interval<Time>) -> Result<Cover> {
        let simplify = self.config.simplify;
        let mut cover = self.globally(beta, int)?;
        // G[a,i]β
        let mut prefix = beta.shifted(int.lb);
        for i in int.lb..int.ub {
            let step = prefix.set_intersect(&alpha.shifted(i), simplify)?;
            cover = cover.join(&step, simplify)?;
            if i + 1 < int.ub {
                prefix = prefix.set_intersect(&beta.shifted(i + 1), simplify)?;
            }
        }
        Ok(cover)
    }
}

/// Cover of `formula` over `num_vars` variables with the default configuration.
pub fn reg(formula: &NNFFormula, num_vars: usize) -> Result<Cover> {
    Reg::new(num_vars).denote(formula)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use itertools::Itertools;
    use rstest::*;

    use super::*;
    use crate::{
        formula::{AssocOp, Formula},
        trace::Trace,
    };

    fn nnf(text: &str) -> NNFFormula {
        NNFFormula::from(text.parse::<Formula>().unwrap())
    }

    fn reg_strings(text: &str, num_vars: usize) -> Vec<String> {
        reg(&nnf(text), num_vars).unwrap().to_strings()
    }

    /// Traces of `comp_len(formula)` steps satisfying `formula`, by brute force.
    fn models(formula: &Formula, num_vars: usize) -> BTreeSet<Vec<bool>> {
        Trace::all(num_vars, formula.comp_len())
            .unwrap()
            .filter(|trace| trace.satisfies(formula))
            .map(|trace| trace.to_bits())
            .collect()
    }

    #[fixture]
    fn formulas() -> Vec<&'static str> {
        vec![
            "p0",
            "~p1",
            "T",
            "F",
            "F[0,2]p0",
            "G[1,2]~p1",
            "(p0U[1,3]p1)",
            "(p0R[0,2]p1)",
            "~(p0U[0,2]~p1)",
            "(p0=F[0,1]p1)",
            "~(p0=p1)",
            "(G[0,1]p0>F[1,2]p1)",
            "(=[p0,p1,~p0])",
            "~(&[p0,G[0,1]p1,F[1,1]~p0])",
            "(F[0,1]p0U[0,2]G[0,1]p1)",
            "(p1R[1,2]F[0,1]p0)",
            "G[2,1]p0",
            "F[0,1]G[3,1]p0",
            "(p0R[2,1]p1)",
            "~(p0U[2,1]p1)",
        ]
    }

    #[rstest]
    #[case("(&[p0])", 2, &["1s"])]
    #[case("(&[p0,p1])", 2, &["11"])]
    #[case("F[2,2]p0", 1, &["s,s,1"])]
    #[case("F[2,2]~p0", 1, &["s,s,0"])]
    #[case("G[0,1]p0", 1, &["1,1"])]
    #[case("(p0U[0,1]p1)", 2, &["s1", "1s,s1"])]
    #[case("F[2,4]p1", 2, &["ss,ss,s1", "ss,ss,ss,s1", "ss,ss,ss,ss,s1"])]
    #[case("(p0>p1)", 2, &["0s", "s1"])]
    #[case("(p0vp0)", 2, &["1s"])]
    #[case("T", 3, &["sss"])]
    #[case("F", 3, &[])]
    fn test_reg(#[case] text: &str, #[case] num_vars: usize, #[case] expected: &[&str]) {
        assert_eq!(reg_strings(text, num_vars), expected);
    }

    #[rstest]
    #[case("G[3,1]p0", 2, &["ss"])]
    #[case("F[3,1]p0", 2, &[])]
    #[case("(p0U[3,1]p1)", 2, &[])]
    #[case("(p0R[3,1]p1)", 2, &["ss"])]
    #[case("G[3,1]p0", 0, &[])]
    #[case("T", 0, &[])]
    fn test_vacuous(#[case] text: &str, #[case] num_vars: usize, #[case] expected: &[&str]) {
        assert_eq!(reg_strings(text, num_vars), expected);
    }

    #[rstest]
    #[case("p0", 0)]
    #[case("(p1&p0)", 1)]
    #[case("G[0,2]~p3", 2)]
    fn test_variable_out_of_range(#[case] text: &str, #[case] num_vars: usize) {
        assert!(matches!(
            reg(&nnf(text), num_vars),
            Err(Error::InvalidPropVar { .. })
        ));
    }

    fn assert_sound(text: &str, num_vars: usize) {
        let formula: Formula = text.parse().unwrap();
        let cover = reg(&NNFFormula::from(formula.clone()), num_vars).unwrap();
        assert_eq!(
            cover.expand(formula.comp_len()),
            models(&formula, num_vars),
            "{text} over {num_vars} variables"
        );
    }

    fn assert_dual(text: &str, num_vars: usize) {
        let horizon = nnf(text).comp_len();
        let positive = reg(&nnf(text), num_vars).unwrap().expand(horizon);
        let negative = reg(&nnf(&format!("~{}", text)), num_vars)
            .unwrap()
            .expand(horizon);
        assert!(positive.is_disjoint(&negative), "{text} over {num_vars} variables");
        assert_eq!(
            positive.len() + negative.len(),
            1 << (num_vars * horizon),
            "{text} over {num_vars} variables"
        );
    }

    #[rstest]
    fn test_soundness(formulas: Vec<&'static str>) {
        for text in formulas {
            assert_sound(text, 2);
            assert_sound(text, 3);
        }
    }

    #[rstest]
    fn test_duality(formulas: Vec<&'static str>) {
        for text in formulas {
            assert_dual(text, 2);
            assert_dual(text, 3);
        }
    }

    #[rstest]
    #[case(1, "p0")]
    #[case(1, "~p0")]
    #[case(1, "F[0,5]p0")]
    #[case(1, "G[1,2]~p0")]
    #[case(1, "G[3,1]p0")]
    #[case(1, "(p0U[1,3]~p0)")]
    #[case(1, "(p0R[0,2]F[1,1]p0)")]
    #[case(1, "~(p0=G[0,1]p0)")]
    #[case(1, "(=[p0,F[0,1]p0,~p0])")]
    #[case(1, "(T>F[1,2]~p0)")]
    #[case(3, "(p2U[0,2](p0&p1))")]
    #[case(3, "~(v[p0,G[0,1]p2,F[1,1]~p1])")]
    #[case(3, "(G[0,1]p2R[1,2]~p0)")]
    #[case(3, "(=[p0,p1,p2])")]
    #[case(3, "F[0,3](p2>~p1)")]
    #[case(3, "~(p1U[0,1]G[1,2]p2)")]
    fn test_soundness_and_duality_by_width(#[case] num_vars: usize, #[case] text: &str) {
        assert_sound(text, num_vars);
        assert_dual(text, num_vars);
    }

    #[rstest]
    #[case(AssocOp::Or)]
    #[case(AssocOp::And)]
    #[case(AssocOp::Equiv)]
    fn test_assoc_collapse(#[case] op: AssocOp) {
        let subs = ["p0", "F[0,1]p1", "~p2", "(p0U[0,1]p2)"].map(nnf);
        for len in 1..=subs.len() {
            let list = NNFFormula::Assoc(op, subs[..len].to_vec());
            let chain = NNFFormula::fold(op, subs[..len].iter().cloned());
            assert_eq!(reg(&list, 3), reg(&chain, 3));
        }
    }

    #[test]
    fn test_nested_until() {
        let nested = nnf("(p0U[0,3](p0U[0,3]p1))");
        let flat = nnf("(p0U[0,6]p1)");
        assert_eq!(nested.comp_len(), 7);
        assert_eq!(flat.comp_len(), 7);
        assert_eq!(
            reg(&nested, 2).unwrap().expand(7),
            reg(&flat, 2).unwrap().expand(7)
        );
    }

    #[test]
    fn test_oscillation() {
        let formula = nnf("G[0,1](&[(p0>G[1,1]~p0),(~p0>G[1,1]p0)])");
        assert_eq!(formula.comp_len(), 3);
        let expected: BTreeSet<_> = [vec![false, true, false], vec![true, false, true]].into();
        assert_eq!(reg(&formula, 1).unwrap().expand(3), expected);
    }

    #[rstest]
    fn test_config(formulas: Vec<&'static str>) {
        for text in formulas {
            let formula = nnf(text);
            let horizon = formula.comp_len();
            let expected = reg(&formula, 2).unwrap().expand(horizon);

            let disjoint = Reg::new(2)
                .with_config(RegConfig {
                    disjoint: true,
                    ..Default::default()
                })
                .denote(&formula)
                .unwrap();
            assert!(disjoint.is_disjoint(), "{text}");
            assert_eq!(disjoint.expand(horizon), expected, "{text}");

            let unsimplified = Reg::new(2)
                .with_config(RegConfig {
                    simplify: false,
                    disjoint: false,
                })
                .denote(&formula)
                .unwrap();
            assert_eq!(unsimplified.expand(horizon), expected, "{text}");
        }
    }

    #[test_log::test]
    fn test_cache() {
        let texts = [
            "(p0U[0,3](p0U[0,3]p1))",
            "(F[0,2]p0&G[0,2]F[0,2]p0)",
            "~(p0=p1)",
        ];
        let mut cache = SubformulaCache::new();
        for text in texts {
            let formula = nnf(text);
            let cached = Reg::new(2).with_cache(&mut cache).denote(&formula).unwrap();
            assert_eq!(cached, reg(&formula, 2).unwrap(), "{text}");
        }
        assert!(!cache.is_empty());
        assert!(cache.hits() > 0);

        let entries = cache.len();
        let formula = nnf(texts[0]);
        let again = Reg::new(2).with_cache(&mut cache).denote(&formula).unwrap();
        assert_eq!(again, reg(&formula, 2).unwrap());
        assert_eq!(cache.len(), entries);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }

    #[test_log::test]
    fn test_cache_keyed_by_variable_count() {
        let mut cache = SubformulaCache::new();
        let formula = nnf("F[0,1]p0");
        let two = Reg::new(2).with_cache(&mut cache).denote(&formula).unwrap();
        let three = Reg::new(3).with_cache(&mut cache).denote(&formula).unwrap();
        assert_eq!(two.to_strings(), vec!["1s", "ss,1s"]);
        assert_eq!(three.to_strings(), vec!["1ss", "sss,1ss"]);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_builder() {
        let reg = Reg::new(2).with_config(RegConfig {
            simplify: false,
            disjoint: true,
        });
        assert_eq!(reg.num_vars(), 2);
        assert!(!reg.config().simplify);
        assert_eq!(Reg::new(2).config(), RegConfig::default());
    }

    #[test]
    fn test_finally_unrolls_in_order() {
        let cover = reg(&nnf("F[0,3]p0"), 1).unwrap();
        let blocks = cover.iter().map(|s| s.blocks()).collect_vec();
        assert_eq!(blocks, vec![1, 2, 3, 4]);
    }
}
