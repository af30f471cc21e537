use cas_ast::{BuiltinFn, Constant, Context, Expr, ExprId};
use proptest::prelude::*;

/// Context-free expression shape, materialized with [`to_context`].
#[derive(Debug, Clone)]
pub enum Tree {
    Num(i64),
    Var(&'static str),
    Pi,
    Add(Box<Tree>, Box<Tree>),
    Sub(Box<Tree>, Box<Tree>),
    Mul(Box<Tree>, Box<Tree>),
    Neg(Box<Tree>),
    Pow(Box<Tree>, u8),
    Sin(Box<Tree>),
    Cos(Box<Tree>),
}

pub fn arb_recursive_expr() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        (-5i64..6).prop_map(Tree::Num),
        prop_oneof![Just("x"), Just("y")].prop_map(Tree::Var),
        Just(Tree::Pi),
    ];

    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Add(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Sub(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Mul(Box::new(l), Box::new(r))),
            inner.clone().prop_map(|e| Tree::Neg(Box::new(e))),
            (inner.clone(), 0u8..4).prop_map(|(b, k)| Tree::Pow(Box::new(b), k)),
            inner.clone().prop_map(|e| Tree::Sin(Box::new(e))),
            inner.prop_map(|e| Tree::Cos(Box::new(e))),
        ]
    })
}

pub fn build(ctx: &mut Context, tree: &Tree) -> ExprId {
    match tree {
        Tree::Num(n) => ctx.num(*n),
        Tree::Var(name) => ctx.var(name),
        Tree::Pi => ctx.constant(Constant::Pi),
        Tree::Add(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Add(l, r))
        }
        Tree::Sub(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Sub(l, r))
        }
        Tree::Mul(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Mul(l, r))
        }
        Tree::Neg(e) => {
            let e = build(ctx, e);
            ctx.add(Expr::Neg(e))
        }
        Tree::Pow(b, k) => {
            let b = build(ctx, b);
            let k = ctx.num(i64::from(*k));
            ctx.add(Expr::Pow(b, k))
        }
        Tree::Sin(e) => {
            let e = build(ctx, e);
            ctx.call_builtin(BuiltinFn::Sin, vec![e])
        }
        Tree::Cos(e) => {
            let e = build(ctx, e);
            ctx.call_builtin(BuiltinFn::Cos, vec![e])
        }
    }
}

pub fn to_context(tree: Tree) -> (Context, ExprId) {
    let mut ctx = Context::new();
    let expr = build(&mut ctx, &tree);
    (ctx, expr)
}
