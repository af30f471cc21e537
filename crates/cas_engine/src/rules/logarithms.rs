use crate::define_rule;
use crate::rule::Rewrite;
use cas_ast::{BuiltinFn, Constant, Expr};
use num_traits::One;

define_rule!(EvaluateLogRule, "Evaluate Logarithms", |ctx, expr| {
    let &[arg] = ctx.builtin_args(expr, BuiltinFn::Ln)? else {
        return None;
    };
    match ctx.get(arg).clone() {
        Expr::Number(n) if n.is_one() => Some(Rewrite::simple(ctx.num(0), "ln(1) = 0")),
        Expr::Constant(Constant::E) => Some(Rewrite::simple(ctx.num(1), "ln(e) = 1")),
        Expr::Pow(base, exp) if matches!(ctx.get(base), Expr::Constant(Constant::E)) => {
            Some(Rewrite::simple(exp, "ln(e^u) = u"))
        }
        _ => None,
    }
});

pub fn register(simplifier: &mut crate::Simplifier) {
    simplifier.add_rule(Box::new(EvaluateLogRule));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use cas_ast::Context;

    #[test]
    fn test_log_values() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let ln1 = ctx.call_builtin(BuiltinFn::Ln, vec![one]);
        let zero = ctx.num(0);
        assert_eq!(EvaluateLogRule.apply(&mut ctx, ln1).unwrap().new_expr, zero);

        let e = ctx.constant(Constant::E);
        let x = ctx.var("x");
        let ex = ctx.add(Expr::Pow(e, x));
        let ln_ex = ctx.call_builtin(BuiltinFn::Ln, vec![ex]);
        assert_eq!(EvaluateLogRule.apply(&mut ctx, ln_ex).unwrap().new_expr, x);

        let ln_x = ctx.call_builtin(BuiltinFn::Ln, vec![x]);
        assert!(EvaluateLogRule.apply(&mut ctx, ln_x).is_none());
    }
}
