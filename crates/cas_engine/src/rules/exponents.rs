use crate::define_rule;
use crate::rule::Rewrite;
use cas_ast::{BuiltinFn, Constant, Expr};

define_rule!(ExpToPowerRule, "Exponential As Power", |ctx, expr| {
    let &[arg] = ctx.builtin_args(expr, BuiltinFn::Exp)? else {
        return None;
    };
    let e = ctx.constant(Constant::E);
    let new_expr = ctx.add(Expr::Pow(e, arg));
    Some(Rewrite::simple(new_expr, "exp(u) = e^u"))
});

define_rule!(SqrtToPowerRule, "Square Root As Power", |ctx, expr| {
    let &[arg] = ctx.builtin_args(expr, BuiltinFn::Sqrt)? else {
        return None;
    };
    let half = ctx.rational(1, 2);
    let new_expr = ctx.add(Expr::Pow(arg, half));
    Some(Rewrite::simple(new_expr, "sqrt(u) = u^(1/2)"))
});

define_rule!(
    ExpOfLogRule,
    "Exponential Of Logarithm",
    Some(vec!["Pow"]),
    |ctx, expr| {
        let Expr::Pow(base, exp) = *ctx.get(expr) else {
            return None;
        };
        if !matches!(ctx.get(base), Expr::Constant(Constant::E)) {
            return None;
        }
        let &[inner] = ctx.builtin_args(exp, BuiltinFn::Ln)? else {
            return None;
        };
        Some(Rewrite::simple(inner, "e^(ln(u)) = u"))
    }
);

pub fn register(simplifier: &mut crate::Simplifier) {
    simplifier.add_rule(Box::new(ExpToPowerRule));
    simplifier.add_rule(Box::new(SqrtToPowerRule));
    simplifier.add_rule(Box::new(ExpOfLogRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use cas_ast::{Context, DisplayExpr};

    #[test]
    fn test_exp_becomes_power_of_e() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let exp = ctx.call_builtin(BuiltinFn::Exp, vec![x]);
        let rw = ExpToPowerRule.apply(&mut ctx, exp).unwrap();
        assert_eq!(
            format!("{}", DisplayExpr { context: &ctx, id: rw.new_expr }),
            "e^x"
        );
    }

    #[test]
    fn test_exp_of_log_cancels() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let ln = ctx.call_builtin(BuiltinFn::Ln, vec![x]);
        let e = ctx.constant(Constant::E);
        let pow = ctx.add(Expr::Pow(e, ln));
        let rw = ExpOfLogRule.apply(&mut ctx, pow).unwrap();
        assert_eq!(rw.new_expr, x);

        let two = ctx.num(2);
        let other = ctx.add(Expr::Pow(two, ln));
        assert!(ExpOfLogRule.apply(&mut ctx, other).is_none());
    }
}
