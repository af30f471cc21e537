use crate::builtin::BuiltinFn;
use crate::expression::{Constant, Context, Expr, ExprId};
use crate::symbol::SymbolId;
use num_rational::BigRational;
use std::collections::BTreeSet;

pub trait Visitor {
    fn visit_expr(&mut self, context: &Context, id: ExprId) {
        match context.get(id) {
            Expr::Number(n) => self.visit_number(n),
            Expr::Constant(c) => self.visit_constant(c),
            Expr::Variable(sym) => self.visit_variable(*sym),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                self.visit_binary(context, *l, *r)
            }
            Expr::Pow(b, e) => self.visit_pow(context, *b, *e),
            Expr::Neg(e) => self.visit_expr(context, *e),
            Expr::Function(name, args) => self.visit_function(context, *name, args),
        }
    }

    fn visit_number(&mut self, _n: &BigRational) {}
    fn visit_constant(&mut self, _c: &Constant) {}
    fn visit_variable(&mut self, _sym: SymbolId) {}

    fn visit_binary(&mut self, context: &Context, left: ExprId, right: ExprId) {
        self.visit_expr(context, left);
        self.visit_expr(context, right);
    }

    fn visit_pow(&mut self, context: &Context, base: ExprId, exp: ExprId) {
        self.visit_expr(context, base);
        self.visit_expr(context, exp);
    }

    fn visit_function(&mut self, context: &Context, _name: SymbolId, args: &[ExprId]) {
        for arg in args {
            self.visit_expr(context, *arg);
        }
    }
}

/// Collects the free variables of an expression.
///
/// The index of `sum(body, index, lower, upper)` is bound inside `body`.
#[derive(Debug, Default)]
pub struct FreeSymbolCollector {
    pub symbols: BTreeSet<SymbolId>,
}

impl FreeSymbolCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for FreeSymbolCollector {
    fn visit_variable(&mut self, sym: SymbolId) {
        self.symbols.insert(sym);
    }

    fn visit_function(&mut self, context: &Context, name: SymbolId, args: &[ExprId]) {
        if context.is_builtin(name, BuiltinFn::Sum) && args.len() == 4 {
            let mut inner = FreeSymbolCollector::new();
            inner.visit_expr(context, args[0]);
            if let Expr::Variable(index) = context.get(args[1]) {
                inner.symbols.remove(index);
            }
            self.symbols.extend(inner.symbols);
            self.visit_expr(context, args[2]);
            self.visit_expr(context, args[3]);
            return;
        }
        for arg in args {
            self.visit_expr(context, *arg);
        }
    }
}

/// Free variables of `id`.
pub fn free_symbols(context: &Context, id: ExprId) -> BTreeSet<SymbolId> {
    let mut collector = FreeSymbolCollector::new();
    collector.visit_expr(context, id);
    collector.symbols
}

/// `true` if the variable `sym` occurs free in `id`.
pub fn contains_symbol(context: &Context, id: ExprId, sym: SymbolId) -> bool {
    free_symbols(context, id).contains(&sym)
}

struct ConstantFinder {
    target: Constant,
    found: bool,
}

impl Visitor for ConstantFinder {
    fn visit_constant(&mut self, c: &Constant) {
        if *c == self.target {
            self.found = true;
        }
    }
}

/// `true` if the constant `target` occurs anywhere in `id`.
pub fn contains_constant(context: &Context, id: ExprId, target: Constant) -> bool {
    let mut finder = ConstantFinder {
        target,
        found: false,
    };
    finder.visit_expr(context, id);
    finder.found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_symbols_of_product() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let a = ctx.var("a");
        let prod = ctx.add(Expr::Mul(a, x));
        let syms = free_symbols(&ctx, prod);
        assert_eq!(syms.len(), 2);
        assert!(syms.contains(&ctx.symbol_id("x").unwrap()));
        assert!(syms.contains(&ctx.symbol_id("a").unwrap()));
    }

    #[test]
    fn test_sum_index_is_bound() {
        let mut ctx = Context::new();
        let n = ctx.var("n");
        let x = ctx.var("x");
        let one = ctx.num(1);
        let oo = ctx.constant(Constant::Infinity);
        let body = ctx.add(Expr::Mul(n, x));
        let sum = ctx.call_builtin(BuiltinFn::Sum, vec![body, n, one, oo]);
        let syms = free_symbols(&ctx, sum);
        let n_sym = ctx.symbol_id("n").unwrap();
        let x_sym = ctx.symbol_id("x").unwrap();
        assert!(!syms.contains(&n_sym));
        assert!(syms.contains(&x_sym));
    }

    #[test]
    fn test_contains_constant() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let oo = ctx.constant(Constant::Infinity);
        let e = ctx.add(Expr::Add(x, oo));
        assert!(contains_constant(&ctx, e, Constant::Infinity));
        assert!(!contains_constant(&ctx, x, Constant::Infinity));
    }
}
