//! Structural substitution.
//!
//! Nodes are hash-consed, so replacing a variable is replacing every
//! occurrence of its `ExprId`. The index of `sum(body, index, lo, hi)` is
//! bound: substituting it leaves the body alone.

use cas_ast::{BuiltinFn, Context, Expr, ExprId};

/// Substitute occurrences of `target` with `replacement` anywhere in the expression tree.
/// Returns new ExprId if substitution occurred, otherwise returns original root.
pub fn substitute(
    context: &mut Context,
    root: ExprId,
    target: ExprId,
    replacement: ExprId,
) -> ExprId {
    if root == target {
        return replacement;
    }

    let expr = context.get(root).clone();
    match expr {
        Expr::Add(l, r) => rebuild_binary(context, root, l, r, target, replacement, Expr::Add),
        Expr::Sub(l, r) => rebuild_binary(context, root, l, r, target, replacement, Expr::Sub),
        Expr::Mul(l, r) => rebuild_binary(context, root, l, r, target, replacement, Expr::Mul),
        Expr::Div(l, r) => rebuild_binary(context, root, l, r, target, replacement, Expr::Div),
        Expr::Pow(b, e) => rebuild_binary(context, root, b, e, target, replacement, Expr::Pow),
        Expr::Neg(inner) => {
            let new_inner = substitute(context, inner, target, replacement);
            if new_inner != inner {
                context.add(Expr::Neg(new_inner))
            } else {
                root
            }
        }
        Expr::Function(name, args) => {
            let binds_target = context.is_builtin(name, BuiltinFn::Sum)
                && args.len() == 4
                && args[1] == target;
            let mut new_args = Vec::with_capacity(args.len());
            let mut changed = false;
            for (i, arg) in args.iter().enumerate() {
                let new_arg = if binds_target && i < 2 {
                    *arg
                } else {
                    substitute(context, *arg, target, replacement)
                };
                if new_arg != *arg {
                    changed = true;
                }
                new_args.push(new_arg);
            }
            if changed {
                context.add(Expr::Function(name, new_args))
            } else {
                root
            }
        }
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => root,
    }
}

fn rebuild_binary(
    context: &mut Context,
    root: ExprId,
    l: ExprId,
    r: ExprId,
    target: ExprId,
    replacement: ExprId,
    make: fn(ExprId, ExprId) -> Expr,
) -> ExprId {
    let new_l = substitute(context, l, target, replacement);
    let new_r = substitute(context, r, target, replacement);
    if new_l != l || new_r != r {
        context.add(make(new_l, new_r))
    } else {
        root
    }
}
