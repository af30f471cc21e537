//! Display formatting for expressions.
//!
//! Nodes recurse through ids, so `Expr` cannot implement `Display` on its
//! own; `DisplayExpr` pairs an id with its `Context`.
//!
//! Output is plain infix text that `cas_parser::parse` reads back:
//! `2 * sin(pi * x) / pi`, `1/3 - 4 * cos(pi * x) / pi^2`, `(-1)^n`.

use crate::{Constant, Context, Expr, ExprId};
use num_traits::{One, Signed};
use std::fmt;

pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

impl<'a> DisplayExpr<'a> {
    fn at(&self, id: ExprId) -> DisplayExpr<'a> {
        DisplayExpr {
            context: self.context,
            id,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, id: ExprId, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self.at(id))
        } else {
            write!(f, "{}", self.at(id))
        }
    }
}

/// Binding strength used to decide on parentheses.
///
/// Negative and fractional numbers bind like a product so that
/// `x^(-1)` and `x^(1/2)` keep their parentheses.
fn precedence(ctx: &Context, id: ExprId) -> u8 {
    match ctx.get(id) {
        Expr::Add(_, _) | Expr::Sub(_, _) => 1,
        Expr::Mul(_, _) | Expr::Div(_, _) | Expr::Neg(_) => 2,
        Expr::Pow(_, _) => 3,
        Expr::Number(n) if n.is_negative() || !n.denom().is_one() => 2,
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) | Expr::Function(_, _) => 5,
    }
}

/// `Neg(..)` or a negative literal: prints with a leading minus sign.
fn has_leading_minus(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Neg(_) => true,
        Expr::Number(n) => n.is_negative(),
        _ => false,
    }
}

/// Whether the printed form of `id` starts with `-`, looking through the
/// left operands that print without parentheses.
fn starts_with_minus(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Add(l, _) | Expr::Sub(l, _) => starts_with_minus(ctx, *l),
        Expr::Mul(l, _) | Expr::Div(l, _) => {
            precedence(ctx, *l) >= 2 && starts_with_minus(ctx, *l)
        }
        _ => has_leading_minus(ctx, id),
    }
}

impl<'a> fmt::Display for DisplayExpr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        match ctx.get(self.id) {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(c) => match c {
                Constant::Pi => write!(f, "pi"),
                Constant::E => write!(f, "e"),
                Constant::Infinity => write!(f, "infinity"),
                Constant::Undefined => write!(f, "undefined"),
            },
            Expr::Variable(sym) => write!(f, "{}", ctx.sym_name(*sym)),
            Expr::Add(l, r) => {
                write!(f, "{}", self.at(*l))?;
                match ctx.get(*r) {
                    // a + (-b) reads as a - b
                    Expr::Neg(inner) => {
                        write!(f, " - ")?;
                        let parens =
                            precedence(ctx, *inner) < 2 || has_leading_minus(ctx, *inner);
                        self.write_operand(f, *inner, parens)
                    }
                    Expr::Number(n) if n.is_negative() => write!(f, " - {}", -n),
                    // a + (-b + c) reads as a - b + c
                    _ if starts_with_minus(ctx, *r) => {
                        let rendered = self.at(*r).to_string();
                        let rest = rendered.strip_prefix('-').unwrap_or(&rendered);
                        write!(f, " - {}", rest)
                    }
                    _ => write!(f, " + {}", self.at(*r)),
                }
            }
            Expr::Sub(l, r) => {
                write!(f, "{} - ", self.at(*l))?;
                let parens = precedence(ctx, *r) <= 1 || has_leading_minus(ctx, *r);
                self.write_operand(f, *r, parens)
            }
            Expr::Mul(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < 2)?;
                write!(f, " * ")?;
                let parens = precedence(ctx, *r) < 2 || has_leading_minus(ctx, *r);
                self.write_operand(f, *r, parens)
            }
            Expr::Div(l, r) => {
                self.write_operand(f, *l, precedence(ctx, *l) < 2)?;
                write!(f, " / ")?;
                self.write_operand(f, *r, precedence(ctx, *r) <= 2)
            }
            Expr::Pow(b, e) => {
                self.write_operand(f, *b, precedence(ctx, *b) <= 3)?;
                write!(f, "^")?;
                self.write_operand(f, *e, precedence(ctx, *e) < 5)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                let parens = precedence(ctx, *e) < 2 || has_leading_minus(ctx, *e);
                self.write_operand(f, *e, parens)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", ctx.sym_name(*name))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.at(*arg))?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuiltinFn;

    fn show(ctx: &Context, id: ExprId) -> String {
        DisplayExpr { context: ctx, id }.to_string()
    }

    #[test]
    fn test_display_sum_and_product() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let x = ctx.var("x");
        let prod = ctx.add(Expr::Mul(two, x));
        let sum = ctx.add(Expr::Add(one, prod));
        assert_eq!(show(&ctx, sum), "1 + 2 * x");
    }

    #[test]
    fn test_display_power_of_sum() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let sum = ctx.add(Expr::Add(a, b));
        let pow = ctx.add(Expr::Pow(sum, two));
        assert_eq!(show(&ctx, pow), "(a + b)^2");
    }

    #[test]
    fn test_display_negative_base_and_exponent() {
        let mut ctx = Context::new();
        let minus_one = ctx.num(-1);
        let n = ctx.var("n");
        let parity = ctx.add(Expr::Pow(minus_one, n));
        assert_eq!(show(&ctx, parity), "(-1)^n");

        let x = ctx.var("x");
        let half = ctx.rational(1, 2);
        let root = ctx.add(Expr::Pow(x, half));
        assert_eq!(show(&ctx, root), "x^(1/2)");
    }

    #[test]
    fn test_display_add_of_negation_reads_as_subtraction() {
        let mut ctx = Context::new();
        let third = ctx.rational(1, 3);
        let four = ctx.num(4);
        let x = ctx.var("x");
        let pi = ctx.constant(Constant::Pi);
        let two = ctx.num(2);
        let px = ctx.add(Expr::Mul(pi, x));
        let cos = ctx.call_builtin(BuiltinFn::Cos, vec![px]);
        let num = ctx.add(Expr::Mul(four, cos));
        let den = ctx.add(Expr::Pow(pi, two));
        let frac = ctx.add(Expr::Div(num, den));
        let neg = ctx.add(Expr::Neg(frac));
        let sum = ctx.add(Expr::Add(third, neg));
        assert_eq!(show(&ctx, sum), "1/3 - 4 * cos(pi * x) / pi^2");
    }

    #[test]
    fn test_display_nested_sum_with_negative_lead() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let pi = ctx.constant(Constant::Pi);
        let two = ctx.num(2);
        let pi_sq = ctx.add(Expr::Pow(pi, two));
        let two_x = ctx.add(Expr::Mul(two, x));
        let sin = ctx.call_builtin(BuiltinFn::Sin, vec![two_x]);
        let term = ctx.add(Expr::Mul(pi_sq, sin));
        let neg = ctx.add(Expr::Neg(term));
        let cos = ctx.call_builtin(BuiltinFn::Cos, vec![x]);
        let inner = ctx.add(Expr::Add(neg, cos));
        let sum = ctx.add(Expr::Add(x, inner));
        assert_eq!(show(&ctx, sum), "x - pi^2 * sin(2 * x) + cos(x)");

        let minus_three = ctx.num(-3);
        let scaled = ctx.add(Expr::Mul(minus_three, x));
        let sum = ctx.add(Expr::Add(cos, scaled));
        assert_eq!(show(&ctx, sum), "cos(x) - 3 * x");
    }

    #[test]
    fn test_display_division_parenthesizes_product_denominator() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let pi = ctx.constant(Constant::Pi);
        let n = ctx.var("n");
        let den = ctx.add(Expr::Mul(pi, n));
        let frac = ctx.add(Expr::Div(two, den));
        assert_eq!(show(&ctx, frac), "2 / (pi * n)");
    }

    #[test]
    fn test_display_infinite_sum() {
        let mut ctx = Context::new();
        let n = ctx.var("n");
        let one = ctx.num(1);
        let oo = ctx.constant(Constant::Infinity);
        let sum = ctx.call_builtin(BuiltinFn::Sum, vec![n, n, one, oo]);
        assert_eq!(show(&ctx, sum), "sum(n, n, 1, infinity)");
    }
}
