//! Fourier sine/cosine expansions over `[lower, upper]`.
//!
//! With `L = upper - lower` the constant term is `(∫ f dx) / L` and the m-th
//! harmonic contributes `A_m cos(2πmx/L) + B_m sin(2πmx/L)` where
//! `A_m = 2 (∫ f cos(2πmx/L) dx) / L` and `B_m` is formed the same way with
//! `sin`. All integrals run over the interval.
//!
//! The symbolic form integrates once with a positive integer index `n`. When
//! the general coefficient only holds for `n` past some resonant harmonics
//! (`f = sin(x)` on `[-pi, pi]` meets `sin(n*x)` at `n = 1`), those harmonics
//! are written out and the sums start after the last of them.

use std::collections::BTreeSet;

use cas_ast::{
    free_symbols, Assumptions, BuiltinFn, Constant, Context, DisplayExpr, Expr, ExprId,
};
use cas_engine::{integrate_definite, integrate_definite_indexed, Simplifier};
use tracing::debug;

use crate::error::SeriesError;
use crate::interval::Interval;

/// Coefficients and basis functions of the m-th harmonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harmonic {
    pub index: u32,
    pub cos_coeff: ExprId,
    pub sin_coeff: ExprId,
    pub cos_term: ExprId,
    pub sin_term: ExprId,
}

/// A truncated expansion before its terms are summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FourierSeries {
    pub constant: ExprId,
    pub harmonics: Vec<Harmonic>,
}

impl FourierSeries {
    /// Sum the contributions in order: the constant, then each harmonic's
    /// cosine term followed by its sine term. Zero contributions are left out;
    /// if all of them vanish the result is `0`.
    pub fn to_expr(&self, simplifier: &mut Simplifier) -> ExprId {
        let mut summands = vec![self.constant];
        for h in &self.harmonics {
            summands.push(contribution(simplifier, h.cos_coeff, h.cos_term));
            summands.push(contribution(simplifier, h.sin_coeff, h.sin_term));
        }
        sum_nonzero(&mut simplifier.context, summands)
    }
}

fn contribution(simplifier: &mut Simplifier, coeff: ExprId, term: ExprId) -> ExprId {
    let product = simplifier.context.add(Expr::Mul(coeff, term));
    simplifier.simplify(product).0
}

fn sum_nonzero(ctx: &mut Context, summands: impl IntoIterator<Item = ExprId>) -> ExprId {
    let mut acc = None;
    for term in summands {
        if ctx.is_zero_literal(term) {
            continue;
        }
        acc = Some(match acc {
            None => term,
            Some(prev) => ctx.add(Expr::Add(prev, term)),
        });
    }
    acc.unwrap_or_else(|| ctx.num(0))
}

/// Summation index printed as the first of `n`, `n1`, `n2`, ... whose name
/// is not free in any of `exprs`.
///
/// The index is a dummy symbol: it is declared a positive integer without
/// touching any `n` the caller parses into the same context.
fn fresh_index(ctx: &mut Context, exprs: &[ExprId]) -> ExprId {
    let taken: BTreeSet<String> = exprs
        .iter()
        .flat_map(|&e| free_symbols(ctx, e))
        .map(|sym| ctx.sym_name(sym).to_string())
        .collect();
    let name = (0u32..)
        .map(|k| match k {
            0 => "n".to_string(),
            k => format!("n{k}"),
        })
        .find(|name| !taken.contains(name))
        .unwrap_or_else(|| "n".to_string());
    ctx.dummy_var(&name, Assumptions::positive_integer())
}

struct Expansion<'a> {
    simplifier: &'a mut Simplifier,
    f: ExprId,
    x: ExprId,
    interval: Interval,
}

impl<'a> Expansion<'a> {
    fn new(
        simplifier: &'a mut Simplifier,
        f: ExprId,
        x: ExprId,
        lower: ExprId,
        upper: ExprId,
    ) -> Result<Self, SeriesError> {
        let interval = Interval::validate(simplifier, x, lower, upper)?;
        Ok(Self {
            simplifier,
            f,
            x,
            interval,
        })
    }

    fn show(&self, id: ExprId) -> DisplayExpr<'_> {
        DisplayExpr {
            context: &self.simplifier.context,
            id,
        }
    }

    /// `simplify(scale * ∫ integrand dx / L)`
    fn average(&mut self, integrand: ExprId, scale: i64) -> Result<ExprId, SeriesError> {
        let Interval {
            lower,
            upper,
            length,
        } = self.interval;
        let integral = integrate_definite(self.simplifier, integrand, self.x, lower, upper)?;
        let ctx = &mut self.simplifier.context;
        let scale = ctx.num(scale);
        let scaled = ctx.add(Expr::Mul(scale, integral));
        let ratio = ctx.add(Expr::Div(scaled, length));
        Ok(self.simplifier.simplify(ratio).0)
    }

    fn constant(&mut self) -> Result<ExprId, SeriesError> {
        let a0 = self.average(self.f, 1)?;
        debug!(constant = %self.show(a0), "fourier constant term");
        Ok(a0)
    }

    /// `trig(2 * pi * index * x / L)`, simplified.
    fn wave(&mut self, trig: BuiltinFn, index: ExprId) -> ExprId {
        let ctx = &mut self.simplifier.context;
        let two = ctx.num(2);
        let pi = ctx.constant(Constant::Pi);
        let two_pi = ctx.add(Expr::Mul(two, pi));
        let frequency = ctx.add(Expr::Mul(two_pi, index));
        let phase = ctx.add(Expr::Mul(frequency, self.x));
        let arg = ctx.add(Expr::Div(phase, self.interval.length));
        let call = ctx.call_builtin(trig, vec![arg]);
        self.simplifier.simplify(call).0
    }

    /// `simplify(2 * ∫ f * term dx / L)`
    fn coefficient(&mut self, term: ExprId) -> Result<ExprId, SeriesError> {
        let integrand = self.simplifier.context.add(Expr::Mul(self.f, term));
        self.average(integrand, 2)
    }

    /// General coefficient for the index `n`, with the harmonics where it
    /// does not hold.
    fn general_coefficient(
        &mut self,
        term: ExprId,
        index: ExprId,
    ) -> Result<(ExprId, BTreeSet<u32>), SeriesError> {
        let Interval {
            lower,
            upper,
            length,
        } = self.interval;
        let integrand = self.simplifier.context.add(Expr::Mul(self.f, term));
        let integral =
            integrate_definite_indexed(self.simplifier, integrand, self.x, index, lower, upper)?;
        let ctx = &mut self.simplifier.context;
        let two = ctx.num(2);
        let scaled = ctx.add(Expr::Mul(two, integral.value));
        let ratio = ctx.add(Expr::Div(scaled, length));
        Ok((self.simplifier.simplify(ratio).0, integral.excluded))
    }

    fn harmonic(&mut self, m: u32) -> Result<Harmonic, SeriesError> {
        let index = self.simplifier.context.num(i64::from(m));
        let cos_term = self.wave(BuiltinFn::Cos, index);
        let sin_term = self.wave(BuiltinFn::Sin, index);
        let cos_coeff = self.coefficient(cos_term)?;
        let sin_coeff = self.coefficient(sin_term)?;
        debug!(
            harmonic = m,
            cos_coeff = %self.show(cos_coeff),
            sin_coeff = %self.show(sin_coeff),
            "fourier harmonic"
        );
        Ok(Harmonic {
            index: m,
            cos_coeff,
            sin_coeff,
            cos_term,
            sin_term,
        })
    }
}

/// Constant term and the first `n` harmonics of `f` on `[lower, upper]`.
pub fn fourier_terms(
    simplifier: &mut Simplifier,
    f: ExprId,
    x: ExprId,
    n: u32,
    lower: ExprId,
    upper: ExprId,
) -> Result<FourierSeries, SeriesError> {
    let mut expansion = Expansion::new(simplifier, f, x, lower, upper)?;
    let constant = expansion.constant()?;

    let harmonics = (1..=n)
        .map(|m| expansion.harmonic(m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FourierSeries {
        constant,
        harmonics,
    })
}

/// Truncated Fourier series of `f` with `n` cosine/sine pairs.
///
/// Fails with [`SeriesError::InvalidInterval`] when `upper < lower`, before
/// anything is integrated. Integration failures propagate as
/// [`SeriesError::Engine`].
pub fn expand_truncated(
    simplifier: &mut Simplifier,
    f: ExprId,
    x: ExprId,
    n: u32,
    lower: ExprId,
    upper: ExprId,
) -> Result<ExprId, SeriesError> {
    let series = fourier_terms(simplifier, f, x, n, lower, upper)?;
    Ok(series.to_expr(simplifier))
}

/// Fourier series of `f` as a constant plus `sum(A(n) cos(..), n, 1, infinity)`
/// and `sum(B(n) sin(..), n, 1, infinity)` over a fresh positive integer index.
///
/// A sum whose general coefficient simplifies to the literal `0` is omitted.
/// Coefficients that vanish without simplifying to `0` are kept. If the
/// general coefficients fail at some harmonics, every harmonic up to the last
/// of those is expanded explicitly and both sums start after it.
pub fn expand_symbolic(
    simplifier: &mut Simplifier,
    f: ExprId,
    x: ExprId,
    lower: ExprId,
    upper: ExprId,
) -> Result<ExprId, SeriesError> {
    let mut expansion = Expansion::new(simplifier, f, x, lower, upper)?;
    let index = fresh_index(&mut expansion.simplifier.context, &[f, x, lower, upper]);
    let mut summands = vec![expansion.constant()?];

    let mut general = Vec::with_capacity(2);
    let mut excluded = BTreeSet::new();
    for trig in [BuiltinFn::Cos, BuiltinFn::Sin] {
        let term = expansion.wave(trig, index);
        let (coeff, skipped) = expansion.general_coefficient(term, index)?;
        debug!(
            basis = trig.name(),
            coeff = %expansion.show(coeff),
            excluded = ?skipped,
            "fourier general coefficient"
        );
        excluded.extend(skipped);
        general.push((coeff, term));
    }

    let first = excluded.last().map_or(1, |&m| m + 1);
    for m in 1..first {
        let h = expansion.harmonic(m)?;
        summands.push(contribution(expansion.simplifier, h.cos_coeff, h.cos_term));
        summands.push(contribution(expansion.simplifier, h.sin_coeff, h.sin_term));
    }

    for (coeff, term) in general {
        if expansion.simplifier.context.is_zero_literal(coeff) {
            continue;
        }
        let body = contribution(expansion.simplifier, coeff, term);
        let ctx = &mut expansion.simplifier.context;
        let start = ctx.num(i64::from(first));
        let infinity = ctx.constant(Constant::Infinity);
        summands.push(ctx.call_builtin(BuiltinFn::Sum, vec![body, index, start, infinity]));
    }

    Ok(sum_nonzero(&mut expansion.simplifier.context, summands))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_index_avoids_free_symbols() {
        let mut ctx = Context::new();
        let n = ctx.var("n");
        let x = ctx.var("x");
        let f = ctx.add(Expr::Mul(n, x));
        let index = fresh_index(&mut ctx, &[f, x]);
        assert_eq!(DisplayExpr { context: &ctx, id: index }.to_string(), "n1");
    }

    #[test]
    fn test_fresh_index_is_stable() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let first = fresh_index(&mut ctx, &[x]);
        let second = fresh_index(&mut ctx, &[x]);
        assert_eq!(first, second);
        let Expr::Variable(sym) = ctx.get(first) else {
            panic!("index is not a variable");
        };
        assert_eq!(
            ctx.declared_assumptions(*sym),
            Some(Assumptions::positive_integer())
        );
        assert!(ctx.is_dummy(*sym));
    }

    #[test]
    fn test_fresh_index_leaves_parsed_n_undeclared() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let index = fresh_index(&mut ctx, &[x]);
        let n = ctx.var("n");
        assert_ne!(index, n);
        assert_eq!(ctx.symbol_id("n").and_then(|s| ctx.declared_assumptions(s)), None);
    }

    #[test]
    fn test_sum_skips_zero_summands() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sum = sum_nonzero(&mut ctx, [zero, x, zero, y]);
        assert_eq!(DisplayExpr { context: &ctx, id: sum }.to_string(), "x + y");
        assert_eq!(sum_nonzero(&mut ctx, [zero, zero]), zero);
    }
}
