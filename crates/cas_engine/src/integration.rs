//! Integration of polynomial × sin/cos/exp integrands.
//!
//! The integrand is lowered to normal form and integrated term by term. Each
//! term splits into `x^k`, factors free of `x`, and sin/cos/exp factors of
//! `x`. Products of sin and cos are first reduced with the product-to-sum
//! identities, so every piece has the shape `x^k * g(a*x + b)` and integrates
//! by repeated integration by parts:
//!
//! ```text
//! ∫ x^k g(u) dx = Σ_{j=0..k} (-1)^j k!/(k-j)! x^(k-j) G_{j+1}(u)
//! ```
//!
//! where `G_i` is the i-th antiderivative of `g(a*x + b)`. A product
//! `e^(c*x + d) * trig(a*x + b)` uses the same table, with each antiderivative
//! kept as `e^(c*x + d) * (S sin(a*x + b) + C cos(a*x + b))`.
//!
//! Integrands that depend on a positive integer index `n` can be integrated
//! for all but finitely many `n`: a frequency such as `1 - n` is accepted and
//! the value where it vanishes is reported back.

use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::debug;

use cas_ast::{contains_symbol, Constant, Context, DisplayExpr, Expr, ExprId, SymbolId};

use crate::assumptions;
use crate::engine::Simplifier;
use crate::error::IntegrationError;
use crate::lowering::lower_expr;
use crate::normal_form::{Monomial, NormalForm};
use crate::rules::trigonometry::Trig;
use crate::substitute::substitute;

enum TermFailure {
    Unsupported,
    Frequency(ExprId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    Sin,
    Cos,
    Exp,
}

/// Values of the summation index at which some frequency vanished.
#[derive(Debug, Default)]
struct Exclusions {
    index: Option<ExprId>,
    values: BTreeSet<u32>,
}

impl Exclusions {
    fn for_index(index: ExprId) -> Self {
        Exclusions {
            index: Some(index),
            values: BTreeSet::new(),
        }
    }

    /// Whether `a` may be divided by. Without an index `a` must be provably
    /// nonzero; with one, `a` may also vanish at a single positive integer
    /// value of the index, which is recorded.
    fn admit(&mut self, ctx: &Context, a: &NormalForm) -> bool {
        if assumptions::is_nonzero(ctx, a) {
            return true;
        }
        let Some(index) = self.index else {
            return false;
        };
        match vanishing_index(ctx, a, index) {
            Some(Some(m)) => {
                self.values.insert(m);
                true
            }
            Some(None) => true,
            None => false,
        }
    }
}

/// For `a = g * (slope*n + offset)` with a nonzero monomial `g` and rational
/// `slope != 0`: the positive integer `n` at which `a` vanishes, or
/// `Some(None)` if there is none. `None` for any other shape.
fn vanishing_index(ctx: &Context, a: &NormalForm, index: ExprId) -> Option<Option<u32>> {
    let Expr::Variable(sym) = ctx.get(index) else {
        return None;
    };
    let facts = ctx.assumptions(*sym);
    if !(facts.integer && facts.positive) {
        return None;
    }

    let mut cofactor: Option<Vec<(ExprId, i64)>> = None;
    let mut slope = BigRational::zero();
    let mut offset = BigRational::zero();
    for (monomial, coefficient) in a.terms() {
        let mut degree = 0;
        let mut rest: Vec<(ExprId, i64)> = Vec::with_capacity(monomial.len());
        for &(atom, exp) in monomial {
            if atom == index {
                degree = exp;
            } else {
                rest.push((atom, exp));
            }
        }
        rest.sort_unstable();
        match &cofactor {
            Some(seen) if *seen != rest => return None,
            Some(_) => {}
            None => cofactor = Some(rest),
        }
        match degree {
            0 => offset = coefficient.clone(),
            1 => slope = coefficient.clone(),
            _ => return None,
        }
    }
    let cofactor = cofactor?;
    if slope.is_zero()
        || !cofactor
            .iter()
            .all(|&(atom, _)| assumptions::atom_is_nonzero(ctx, atom))
    {
        return None;
    }

    let root = -offset / slope;
    if !root.is_integer() || !root.is_positive() {
        return Some(None);
    }
    root.to_integer().to_u32().map(Some)
}

impl From<Trig> for Kernel {
    fn from(kind: Trig) -> Self {
        match kind {
            Trig::Sin => Kernel::Sin,
            Trig::Cos => Kernel::Cos,
        }
    }
}

impl Kernel {
    /// i-th antiderivative of `g(u)` with respect to `u`.
    fn antiderivative(self, ctx: &mut Context, u: ExprId, i: i64) -> NormalForm {
        let (kind, negate) = match (self, i % 4) {
            (Kernel::Exp, _) => {
                let e = ctx.constant(Constant::E);
                return NormalForm::atom(ctx.add(Expr::Pow(e, u)));
            }
            (Kernel::Cos, 1) => (Trig::Sin, false),
            (Kernel::Cos, 2) => (Trig::Cos, true),
            (Kernel::Cos, 3) => (Trig::Sin, true),
            (Kernel::Cos, _) => (Trig::Cos, false),
            (Kernel::Sin, 1) => (Trig::Cos, true),
            (Kernel::Sin, 2) => (Trig::Sin, true),
            (Kernel::Sin, 3) => (Trig::Cos, false),
            (Kernel::Sin, _) => (Trig::Sin, false),
        };
        let call = NormalForm::atom(ctx.call_builtin(kind.builtin(), vec![u]));
        if negate {
            -&call
        } else {
            call
        }
    }
}

fn rational(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn display(ctx: &Context, id: ExprId) -> String {
    DisplayExpr { context: ctx, id }.to_string()
}

fn variable_symbol(ctx: &Context, var: ExprId) -> Result<SymbolId, IntegrationError> {
    match ctx.get(var) {
        Expr::Variable(sym) => Ok(*sym),
        _ => Err(IntegrationError::NotAVariable(display(ctx, var))),
    }
}

fn mentions_symbol(ctx: &Context, nf: &NormalForm, sym: SymbolId) -> bool {
    nf.terms()
        .flat_map(|(monomial, _)| monomial.iter())
        .any(|&(atom, _)| contains_symbol(ctx, atom, sym))
}

/// Split `nf` as `a*x + b` with `a` and `b` free of `x`.
fn linear_coefficients(
    ctx: &Context,
    nf: &NormalForm,
    var: ExprId,
    sym: SymbolId,
) -> Option<(NormalForm, NormalForm)> {
    let mut a = NormalForm::zero();
    let mut b = NormalForm::zero();
    for (monomial, coefficient) in nf.terms() {
        let mut degree = 0;
        let mut rest = Monomial::new();
        for &(atom, exp) in monomial {
            if atom == var {
                degree = exp;
            } else if contains_symbol(ctx, atom, sym) {
                return None;
            } else {
                rest.push((atom, exp));
            }
        }
        let term = nf.term_like(rest, coefficient.clone());
        match degree {
            0 => b = &b + &term,
            1 => a = &a + &term,
            _ => return None,
        }
    }
    Some((a, b))
}

/// `trig_1(u_1) * trig_2(u_2)` as a weighted sum of single sin/cos calls.
fn werner(
    (k1, u1): &(Trig, NormalForm),
    (k2, u2): &(Trig, NormalForm),
) -> [(BigRational, Trig, NormalForm); 2] {
    let half = BigRational::new(BigInt::from(1), BigInt::from(2));
    let sum = u1 + u2;
    let difference = u1 - u2;
    match (k1, k2) {
        (Trig::Sin, Trig::Cos) => [
            (half.clone(), Trig::Sin, sum),
            (half, Trig::Sin, difference),
        ],
        (Trig::Cos, Trig::Sin) => [
            (half.clone(), Trig::Sin, sum),
            (-half, Trig::Sin, difference),
        ],
        (Trig::Cos, Trig::Cos) => [
            (half.clone(), Trig::Cos, difference),
            (half, Trig::Cos, sum),
        ],
        (Trig::Sin, Trig::Sin) => [
            (half.clone(), Trig::Cos, difference),
            (-half, Trig::Cos, sum),
        ],
    }
}

/// Reduce a product of sin/cos factors to a weighted sum of at most one
/// factor per piece. `None` stands for the constant `1`.
fn product_to_sum(factors: &[(Trig, NormalForm)]) -> Vec<(BigRational, Option<(Trig, NormalForm)>)> {
    let mut pieces: Vec<(BigRational, Option<(Trig, NormalForm)>)> = vec![(BigRational::one(), None)];
    for factor in factors {
        let mut next = Vec::with_capacity(pieces.len() * 2);
        for (weight, current) in pieces {
            match current {
                None => next.push((weight, Some(factor.clone()))),
                Some(current) => {
                    for (w, kind, arg) in werner(&current, factor) {
                        next.push((&weight * &w, Some((kind, arg))));
                    }
                }
            }
        }
        pieces = next;
    }
    pieces
}

fn polynomial_antiderivative(var: ExprId, k: i64) -> NormalForm {
    NormalForm::atom(var)
        .monomial_power(k + 1)
        .unwrap_or_else(NormalForm::zero)
        .scale(&BigRational::new(BigInt::one(), BigInt::from(k + 1)))
}

/// `∫ x^k g(a*x + b) dx` by the tabular method.
fn by_parts(
    ctx: &mut Context,
    var: ExprId,
    sym: SymbolId,
    k: i64,
    kernel: Kernel,
    arg: &NormalForm,
    exclusions: &mut Exclusions,
) -> Result<NormalForm, TermFailure> {
    let (a, b) = linear_coefficients(ctx, arg, var, sym).ok_or(TermFailure::Unsupported)?;
    if !exclusions.admit(ctx, &a) {
        return Err(TermFailure::Frequency(a.build(ctx)));
    }
    let inv_a = a.invert(ctx);
    let x = NormalForm::atom(var);
    let u = (&(&a * &x) + &b).build(ctx);

    let mut total = NormalForm::zero();
    let mut falling = BigRational::one();
    for j in 0..=k {
        let g = kernel.antiderivative(ctx, u, j + 1);
        let scale = inv_a.monomial_power(j + 1).ok_or(TermFailure::Unsupported)?;
        let power = x.monomial_power(k - j).ok_or(TermFailure::Unsupported)?;
        let sign = if j % 2 == 0 { rational(1) } else { rational(-1) };
        let term = &(&power * &g) * &scale;
        total = &total + &term.scale(&(&sign * &falling));
        falling *= rational(k - j);
    }
    Ok(total)
}

/// `∫ x^k e^(c*x + d) trig(a*x + b) dx` by the tabular method.
///
/// The antiderivative of `e^p (S sin q + C cos q)` is
/// `e^p (S' sin q + C' cos q)` with `S' = (c S + a C) / D`,
/// `C' = (c C - a S) / D` and `D = a^2 + c^2`.
fn damped_by_parts(
    ctx: &mut Context,
    var: ExprId,
    sym: SymbolId,
    k: i64,
    kind: Trig,
    arg: &NormalForm,
    exp_arg: &NormalForm,
) -> Result<NormalForm, TermFailure> {
    let (a, b) = linear_coefficients(ctx, arg, var, sym).ok_or(TermFailure::Unsupported)?;
    let (c, d) = linear_coefficients(ctx, exp_arg, var, sym).ok_or(TermFailure::Unsupported)?;
    if !assumptions::is_nonzero(ctx, &c) && !assumptions::is_nonzero(ctx, &a) {
        return Err(TermFailure::Frequency(c.build(ctx)));
    }
    let inv_d = (&(&a * &a) + &(&c * &c)).invert(ctx);

    let x = NormalForm::atom(var);
    let q = (&(&a * &x) + &b).build(ctx);
    let p = (&(&c * &x) + &d).build(ctx);
    let e = ctx.constant(Constant::E);
    let growth = NormalForm::atom(ctx.add(Expr::Pow(e, p)));
    let sin = NormalForm::atom(ctx.call_builtin(Trig::Sin.builtin(), vec![q]));
    let cos = NormalForm::atom(ctx.call_builtin(Trig::Cos.builtin(), vec![q]));

    let (mut s_coeff, mut c_coeff) = match kind {
        Trig::Sin => (NormalForm::one(), NormalForm::zero()),
        Trig::Cos => (NormalForm::zero(), NormalForm::one()),
    };
    let mut total = NormalForm::zero();
    let mut falling = BigRational::one();
    for j in 0..=k {
        let next_s = &(&(&c * &s_coeff) + &(&a * &c_coeff)) * &inv_d;
        let next_c = &(&(&c * &c_coeff) - &(&a * &s_coeff)) * &inv_d;
        s_coeff = next_s;
        c_coeff = next_c;

        let wave = &(&s_coeff * &sin) + &(&c_coeff * &cos);
        let power = x.monomial_power(k - j).ok_or(TermFailure::Unsupported)?;
        let sign = if j % 2 == 0 { rational(1) } else { rational(-1) };
        let term = &(&power * &growth) * &wave;
        total = &total + &term.scale(&(&sign * &falling));
        falling *= rational(k - j);
    }
    Ok(total)
}

fn integrate_term(
    ctx: &mut Context,
    integrand: &NormalForm,
    monomial: &Monomial,
    coefficient: &BigRational,
    var: ExprId,
    sym: SymbolId,
    exclusions: &mut Exclusions,
) -> Result<NormalForm, TermFailure> {
    let mut power = 0;
    let mut constant = integrand.term_like(Monomial::new(), coefficient.clone());
    let mut waves: Vec<(Trig, NormalForm)> = Vec::new();
    let mut exp_arg = NormalForm::zero();

    for &(atom, exp) in monomial {
        if atom == var {
            power = exp;
            continue;
        }
        if !contains_symbol(ctx, atom, sym) {
            let mut factor = Monomial::new();
            factor.push((atom, exp));
            constant = &constant * &integrand.term_like(factor, BigRational::one());
            continue;
        }
        if let Some((kind, arg)) = Trig::of(ctx, atom) {
            if exp <= 0 {
                return Err(TermFailure::Unsupported);
            }
            let arg = lower_expr(ctx, arg);
            for _ in 0..exp {
                waves.push((kind, arg.clone()));
            }
            continue;
        }
        match ctx.get(atom).clone() {
            Expr::Pow(base, e) if matches!(ctx.get(base), Expr::Constant(Constant::E)) => {
                let e = lower_expr(ctx, e);
                exp_arg = &exp_arg + &e.scale(&rational(exp));
            }
            _ => return Err(TermFailure::Unsupported),
        }
    }
    if power < 0 {
        return Err(TermFailure::Unsupported);
    }

    let mut result = NormalForm::zero();
    for (weight, wave) in product_to_sum(&waves) {
        let mut scale = constant.scale(&weight);
        let wave = match wave {
            Some((kind, arg)) if !mentions_symbol(ctx, &arg, sym) => {
                let arg = arg.build(ctx);
                let call = ctx.call_builtin(kind.builtin(), vec![arg]);
                scale = &scale * &NormalForm::atom(call);
                None
            }
            wave => wave,
        };
        let piece = match wave {
            None if exp_arg.is_zero() => polynomial_antiderivative(var, power),
            None => by_parts(ctx, var, sym, power, Kernel::Exp, &exp_arg, exclusions)?,
            Some((kind, arg)) if exp_arg.is_zero() => {
                by_parts(ctx, var, sym, power, kind.into(), &arg, exclusions)?
            }
            Some((kind, arg)) => damped_by_parts(ctx, var, sym, power, kind, &arg, &exp_arg)?,
        };
        result = &result + &(&scale * &piece);
    }
    Ok(result)
}

/// Antiderivative of `expr` with respect to the variable `var`.
///
/// Supported integrands are linear combinations of `x^k * g(a*x + b)` for
/// `g` in `{1, sin, cos, exp}`, including products and powers of sin/cos
/// factors and products of one such power with an exponential. The
/// frequency `a` must be provably nonzero.
pub fn integrate(
    simplifier: &mut Simplifier,
    expr: ExprId,
    var: ExprId,
) -> Result<ExprId, IntegrationError> {
    antiderivative(simplifier, expr, var, &mut Exclusions::default())
}

fn antiderivative(
    simplifier: &mut Simplifier,
    expr: ExprId,
    var: ExprId,
    exclusions: &mut Exclusions,
) -> Result<ExprId, IntegrationError> {
    let sym = variable_symbol(&simplifier.context, var)?;
    let (integrand, _) = simplifier.normal_form(expr);

    let mut total = NormalForm::zero();
    for (monomial, coefficient) in integrand.terms() {
        let ctx = &mut simplifier.context;
        let term = integrate_term(ctx, &integrand, monomial, coefficient, var, sym, exclusions)
            .map_err(|failure| match failure {
                TermFailure::Unsupported => IntegrationError::Unsupported {
                    integrand: display(ctx, expr),
                    var: display(ctx, var),
                },
                TermFailure::Frequency(a) => IntegrationError::PossiblyZeroFrequency {
                    frequency: display(ctx, a),
                },
            })?;
        total = &total + &term;
    }

    let built = total.build(&mut simplifier.context);
    let (result, _) = simplifier.simplify(built);
    Ok(result)
}

/// `F(upper) - F(lower)` for an antiderivative `F` of `expr`, simplified.
pub fn integrate_definite(
    simplifier: &mut Simplifier,
    expr: ExprId,
    var: ExprId,
    lower: ExprId,
    upper: ExprId,
) -> Result<ExprId, IntegrationError> {
    let antiderivative = integrate(simplifier, expr, var)?;
    Ok(evaluate(simplifier, expr, antiderivative, var, lower, upper))
}

/// A definite integral of an integrand depending on a positive integer
/// index, valid for every index value outside `excluded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedIntegral {
    pub value: ExprId,
    pub excluded: BTreeSet<u32>,
}

/// Like [`integrate_definite`], for an integrand depending on the positive
/// integer `index`. A frequency that vanishes at one positive integer value
/// of the index (such as `1 - n`) does not fail the integral; that value is
/// listed in [`IndexedIntegral::excluded`] and `value` holds for all others.
pub fn integrate_definite_indexed(
    simplifier: &mut Simplifier,
    expr: ExprId,
    var: ExprId,
    index: ExprId,
    lower: ExprId,
    upper: ExprId,
) -> Result<IndexedIntegral, IntegrationError> {
    let mut exclusions = Exclusions::for_index(index);
    let primitive = antiderivative(simplifier, expr, var, &mut exclusions)?;
    let value = evaluate(simplifier, expr, primitive, var, lower, upper);
    Ok(IndexedIntegral {
        value,
        excluded: exclusions.values,
    })
}

fn evaluate(
    simplifier: &mut Simplifier,
    expr: ExprId,
    antiderivative: ExprId,
    var: ExprId,
    lower: ExprId,
    upper: ExprId,
) -> ExprId {
    let ctx = &mut simplifier.context;
    let at_upper = substitute(ctx, antiderivative, var, upper);
    let at_lower = substitute(ctx, antiderivative, var, lower);
    let difference = ctx.add(Expr::Sub(at_upper, at_lower));
    let (result, _) = simplifier.simplify(difference);
    debug!(
        integrand = %DisplayExpr { context: &simplifier.context, id: expr },
        result = %DisplayExpr { context: &simplifier.context, id: result },
        "definite integral"
    );
    result
}
