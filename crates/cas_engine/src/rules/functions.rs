use crate::assumptions::{sign, Sign};
use crate::define_rule;
use crate::lowering::lower_expr;
use crate::rule::Rewrite;
use cas_ast::{BuiltinFn, Expr};

define_rule!(EvaluateAbsRule, "Evaluate Absolute Value", |ctx, expr| {
    let &[arg] = ctx.builtin_args(expr, BuiltinFn::Abs)? else {
        return None;
    };
    let nf = lower_expr(ctx, arg);
    match sign(ctx, &nf)? {
        Sign::Positive => Some(Rewrite::simple(arg, "|u| = u for u > 0")),
        Sign::Zero => Some(Rewrite::simple(ctx.num(0), "|0| = 0")),
        Sign::Negative => {
            let new_expr = ctx.add(Expr::Neg(arg));
            Some(Rewrite::simple(new_expr, "|u| = -u for u < 0"))
        }
    }
});

pub fn register(simplifier: &mut crate::Simplifier) {
    simplifier.add_rule(Box::new(EvaluateAbsRule));
}
