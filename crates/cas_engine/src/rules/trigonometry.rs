//! Exact values and symmetries of `sin` and `cos`.
//!
//! The argument is split as `rest + pi * (multiple + turns)`, where `turns`
//! collects integer-valued symbolic terms such as `pi * n` for an integer `n`.
//! Whole half-turns are pulled out as `(-1)^(turns + floor(multiple))`, the
//! remaining fraction of `pi` is looked up in the table of exact values, and a
//! negative leading coefficient is flipped with the odd/even symmetries.

use crate::assumptions::monomial_is_integer_valued;
use crate::define_rule;
use crate::lowering::lower_expr;
use crate::normal_form::{Monomial, NormalForm};
use crate::rule::Rewrite;
use cas_ast::{BuiltinFn, Constant, Context, DisplayExpr, Expr, ExprId};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trig {
    Sin,
    Cos,
}

impl Trig {
    pub(crate) fn of(ctx: &Context, expr: ExprId) -> Option<(Trig, ExprId)> {
        for (kind, builtin) in [(Trig::Sin, BuiltinFn::Sin), (Trig::Cos, BuiltinFn::Cos)] {
            if let Some(&[arg]) = ctx.builtin_args(expr, builtin) {
                return Some((kind, arg));
            }
        }
        None
    }

    pub(crate) fn builtin(self) -> BuiltinFn {
        match self {
            Trig::Sin => BuiltinFn::Sin,
            Trig::Cos => BuiltinFn::Cos,
        }
    }
}

/// `arg = rest + pi * (multiple + turns)`
struct PiSplit {
    rest: NormalForm,
    multiple: BigRational,
    turns: NormalForm,
}

impl PiSplit {
    fn of(ctx: &mut Context, arg: &NormalForm) -> PiSplit {
        let pi = ctx.constant(Constant::Pi);
        let mut split = PiSplit {
            rest: NormalForm::zero(),
            multiple: BigRational::zero(),
            turns: NormalForm::zero(),
        };

        for (monomial, coefficient) in arg.terms() {
            if monomial.iter().any(|&(atom, exp)| atom == pi && exp == 1) {
                let cofactor: Monomial = monomial
                    .iter()
                    .filter(|&&(atom, _)| atom != pi)
                    .copied()
                    .collect();
                if cofactor.is_empty() {
                    split.multiple += coefficient;
                    continue;
                }
                if coefficient.is_integer() && monomial_is_integer_valued(ctx, &cofactor) {
                    split.turns = &split.turns + &arg.term_like(cofactor, coefficient.clone());
                    continue;
                }
            }
            split.rest = &split.rest + &arg.term_like(monomial.clone(), coefficient.clone());
        }
        split
    }

    fn has_pi_part(&self) -> bool {
        !self.multiple.is_zero() || !self.turns.is_zero()
    }
}

/// `trig(pi * f)` for `f` in `[0, 1)`, as `(numerator, denominator, radicand)`
/// of `numerator / denominator * radicand^(1/2)`.
fn table_entry(kind: Trig, f: &BigRational) -> Option<(i64, i64, i64)> {
    let twelfths = f * BigRational::from_integer(BigInt::from(12));
    if !twelfths.is_integer() {
        return None;
    }
    let entry = match (kind, twelfths.to_integer().to_i64()?) {
        (Trig::Sin, 0) => (0, 1, 1),
        (Trig::Sin, 2) => (1, 2, 1),
        (Trig::Sin, 3) => (1, 2, 2),
        (Trig::Sin, 4) => (1, 2, 3),
        (Trig::Sin, 6) => (1, 1, 1),
        (Trig::Sin, 8) => (1, 2, 3),
        (Trig::Sin, 9) => (1, 2, 2),
        (Trig::Sin, 10) => (1, 2, 1),
        (Trig::Cos, 0) => (1, 1, 1),
        (Trig::Cos, 2) => (1, 2, 3),
        (Trig::Cos, 3) => (1, 2, 2),
        (Trig::Cos, 4) => (1, 2, 1),
        (Trig::Cos, 6) => (0, 1, 1),
        (Trig::Cos, 8) => (-1, 2, 1),
        (Trig::Cos, 9) => (-1, 2, 2),
        (Trig::Cos, 10) => (-1, 2, 3),
        _ => return None,
    };
    Some(entry)
}

fn build_table_value(ctx: &mut Context, (numer, denom, radicand): (i64, i64, i64)) -> ExprId {
    let coefficient = ctx.rational(numer, denom);
    if radicand == 1 {
        return coefficient;
    }
    let r = ctx.num(radicand);
    let half = ctx.rational(1, 2);
    let root = ctx.add(Expr::Pow(r, half));
    ctx.add(Expr::Mul(coefficient, root))
}

/// `trig(rest + pi * (k + f))` with integer-valued `k` as
/// `(-1)^k * trig(rest + pi * f)`, `0 <= f < 1`.
fn shift_by_pi(ctx: &mut Context, kind: Trig, split: &PiSplit) -> Option<Rewrite> {
    let whole = split.multiple.floor();
    let frac = &split.multiple - &whole;
    let half = BigRational::new(BigInt::from(1), BigInt::from(2));
    let entry = table_entry(kind, &frac);

    let table_hit = split.rest.is_zero() && entry.is_some();
    let quarter_shift = !split.rest.is_zero() && frac == half;
    if split.turns.is_zero() && whole.is_zero() && !table_hit && !quarter_shift {
        return None;
    }

    let pi = NormalForm::atom(ctx.constant(Constant::Pi));
    let value = match entry {
        Some(entry) if split.rest.is_zero() => build_table_value(ctx, entry),
        _ if quarter_shift => {
            let rest = split.rest.build(ctx);
            match kind {
                Trig::Sin => ctx.call_builtin(BuiltinFn::Cos, vec![rest]),
                Trig::Cos => {
                    let sin = ctx.call_builtin(BuiltinFn::Sin, vec![rest]);
                    ctx.add(Expr::Neg(sin))
                }
            }
        }
        _ => {
            let reduced = (&split.rest + &pi.scale(&frac)).build(ctx);
            ctx.call_builtin(kind.builtin(), vec![reduced])
        }
    };

    let half_turns = (&split.turns + &NormalForm::constant(whole)).build(ctx);
    let minus_one = ctx.num(-1);
    let sign = ctx.add(Expr::Pow(minus_one, half_turns));
    let new_expr = ctx.add(Expr::Mul(sign, value));

    let description = format!(
        "reduce by multiples of pi: {}",
        DisplayExpr {
            context: ctx,
            id: new_expr
        }
    );
    Some(Rewrite::simple(new_expr, description))
}

fn reflect_negative_argument(ctx: &mut Context, kind: Trig, arg: &NormalForm) -> Option<Rewrite> {
    if !arg.leading_coefficient(ctx)?.is_negative() {
        return None;
    }
    let flipped = (-arg).build(ctx);
    let call = ctx.call_builtin(kind.builtin(), vec![flipped]);
    let rewrite = match kind {
        Trig::Sin => Rewrite::simple(ctx.add(Expr::Neg(call)), "sin(-u) = -sin(u)"),
        Trig::Cos => Rewrite::simple(call, "cos(-u) = cos(u)"),
    };
    Some(rewrite)
}

define_rule!(EvaluateTrigRule, "Evaluate Trigonometric Functions", |ctx, expr| {
    let (kind, arg) = Trig::of(ctx, expr)?;
    let arg = lower_expr(ctx, arg);
    let split = PiSplit::of(ctx, &arg);
    if split.has_pi_part() || split.rest.is_zero() {
        shift_by_pi(ctx, kind, &split)
    } else {
        reflect_negative_argument(ctx, kind, &arg)
    }
});

pub fn register(simplifier: &mut crate::Simplifier) {
    simplifier.add_rule(Box::new(EvaluateTrigRule));
}
