//! Structural total order on expressions.
//!
//! Independent of allocation order (variables compare by name), so printed
//! output does not depend on which node happened to be created first.

use crate::{Constant, Context, Expr, ExprId};
use std::cmp::Ordering;

pub fn compare_expr(context: &Context, a: ExprId, b: ExprId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let expr_a = context.get(a);
    let expr_b = context.get(b);

    use Expr::*;

    // 1. Hierarchy Check
    let rank_a = get_rank(expr_a);
    let rank_b = get_rank(expr_b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    // 2. Same Type Comparison
    match (expr_a, expr_b) {
        (Number(n1), Number(n2)) => n1.cmp(n2),
        (Constant(c1), Constant(c2)) => constant_rank(*c1).cmp(&constant_rank(*c2)),
        (Variable(v1), Variable(v2)) => context
            .sym_name(*v1)
            .cmp(context.sym_name(*v2))
            .then(v1.cmp(v2)),
        (Function(n1, args1), Function(n2, args2)) => {
            match context.sym_name(*n1).cmp(context.sym_name(*n2)) {
                Ordering::Equal => compare_args(context, args1, args2),
                ord => ord,
            }
        }
        (Pow(b1, e1), Pow(b2, e2)) => compare_binary(context, *b1, *e1, *b2, *e2),
        (Neg(e1), Neg(e2)) => compare_expr(context, *e1, *e2),
        (Add(l1, r1), Add(l2, r2))
        | (Sub(l1, r1), Sub(l2, r2))
        | (Mul(l1, r1), Mul(l2, r2))
        | (Div(l1, r1), Div(l2, r2)) => compare_binary(context, *l1, *r1, *l2, *r2),
        _ => Ordering::Equal, // unreachable when ranks agree
    }
}

fn get_rank(expr: &Expr) -> u8 {
    use Expr::*;
    match expr {
        Number(_) => 0,
        Constant(_) => 1,
        Variable(_) => 2,
        Function(_, _) => 3,
        Neg(_) => 4,
        Pow(_, _) => 5,
        Mul(_, _) => 6,
        Div(_, _) => 7,
        Add(_, _) => 8,
        Sub(_, _) => 9,
    }
}

fn constant_rank(c: Constant) -> u8 {
    match c {
        Constant::Pi => 0,
        Constant::E => 1,
        Constant::Infinity => 2,
        Constant::Undefined => 3,
    }
}

fn compare_args(context: &Context, args1: &[ExprId], args2: &[ExprId]) -> Ordering {
    for (a1, a2) in args1.iter().zip(args2.iter()) {
        match compare_expr(context, *a1, *a2) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    args1.len().cmp(&args2.len())
}

fn compare_binary(context: &Context, l1: ExprId, r1: ExprId, l2: ExprId, r2: ExprId) -> Ordering {
    match compare_expr(context, l1, l2) {
        Ordering::Equal => compare_expr(context, r1, r2),
        ord => ord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let pi = ctx.constant(Constant::Pi);
        let x = ctx.var("x");
        let sin_x = ctx.call("sin", vec![x]);
        assert_eq!(compare_expr(&ctx, two, pi), Ordering::Less);
        assert_eq!(compare_expr(&ctx, pi, x), Ordering::Less);
        assert_eq!(compare_expr(&ctx, x, sin_x), Ordering::Less);
    }

    #[test]
    fn test_variables_compare_by_name_not_creation_order() {
        let mut ctx = Context::new();
        let y = ctx.var("y");
        let x = ctx.var("x");
        assert_eq!(compare_expr(&ctx, x, y), Ordering::Less);
    }

    #[test]
    fn test_functions_compare_name_then_args() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let cos_y = ctx.call("cos", vec![y]);
        let sin_x = ctx.call("sin", vec![x]);
        let sin_y = ctx.call("sin", vec![y]);
        assert_eq!(compare_expr(&ctx, cos_y, sin_x), Ordering::Less);
        assert_eq!(compare_expr(&ctx, sin_x, sin_y), Ordering::Less);
    }
}
