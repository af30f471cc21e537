use cas_ast::{Context, DisplayExpr, Expr, ExprId};
use cas_engine::Simplifier;
use proptest::prelude::*;

mod strategies;

fn simplifier_for(ctx: Context) -> Simplifier {
    Simplifier::with_context(ctx)
}

fn show(s: &Simplifier, id: ExprId) -> String {
    DisplayExpr {
        context: &s.context,
        id,
    }
    .to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_idempotency(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let mut s = simplifier_for(ctx);

        let (s1, _) = s.simplify(expr);
        let (s2, _) = s.simplify(s1);
        prop_assert_eq!(show(&s, s1), show(&s, s2));
    }

    #[test]
    fn test_identity_add_zero(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let mut s = simplifier_for(ctx);

        let zero = s.context.num(0);
        let input = s.context.add(Expr::Add(expr, zero));
        let (s1, _) = s.simplify(input);
        let (s2, _) = s.simplify(expr);
        prop_assert_eq!(s1, s2);
    }

    #[test]
    fn test_commutativity(
        a in strategies::arb_recursive_expr(),
        b in strategies::arb_recursive_expr(),
    ) {
        let mut s = Simplifier::with_default_rules();
        let a = strategies::build(&mut s.context, &a);
        let b = strategies::build(&mut s.context, &b);

        let ab = s.context.add(Expr::Add(a, b));
        let ba = s.context.add(Expr::Add(b, a));
        prop_assert!(s.are_equivalent(ab, ba));

        let ab = s.context.add(Expr::Mul(a, b));
        let ba = s.context.add(Expr::Mul(b, a));
        let (l, _) = s.simplify(ab);
        let (r, _) = s.simplify(ba);
        prop_assert_eq!(l, r);
    }

    #[test]
    fn test_self_difference_is_zero(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let mut s = simplifier_for(ctx);

        let diff = s.context.add(Expr::Sub(expr, expr));
        prop_assert!(s.is_zero(diff));
    }

    #[test]
    fn test_no_number_op_number(re in strategies::arb_recursive_expr()) {
        let (ctx, expr) = strategies::to_context(re);
        let mut s = simplifier_for(ctx);
        let (simplified, _) = s.simplify(expr);

        fn check_no_constant_ops(ctx: &Context, expr: ExprId) -> bool {
            match ctx.get(expr) {
                Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                    if let (Expr::Number(_), Expr::Number(_)) = (ctx.get(*l), ctx.get(*r)) {
                        return false;
                    }
                    check_no_constant_ops(ctx, *l) && check_no_constant_ops(ctx, *r)
                }
                Expr::Neg(e) => {
                    if let Expr::Number(_) = ctx.get(*e) {
                        return false;
                    }
                    check_no_constant_ops(ctx, *e)
                }
                Expr::Function(_, args) => args.iter().all(|a| check_no_constant_ops(ctx, *a)),
                _ => true,
            }
        }

        prop_assert!(
            check_no_constant_ops(&s.context, simplified),
            "constant folding failed: {}",
            show(&s, simplified)
        );
    }
}
