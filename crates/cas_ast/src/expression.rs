use crate::builtin::{BuiltinFn, BuiltinIds};
use crate::error::AstError;
use crate::symbol::{Assumptions, SymbolId, SymbolTable};
use num_bigint::BigInt;
use num_rational::BigRational;
use rustc_hash::FxHashMap;

/// Handle to a node stored in a [`Context`].
///
/// Nodes are hash-consed: adding a structurally identical node twice returns
/// the same id, so `a == b` is structural equality within one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        ExprId(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    Infinity,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(SymbolId),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Function(SymbolId, Vec<ExprId>), // e.g., sin(x), sum(f, n, 1, infinity)
}

impl Expr {
    /// Variant name, used by rules to declare their targets.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "Number",
            Expr::Constant(_) => "Constant",
            Expr::Variable(_) => "Variable",
            Expr::Add(_, _) => "Add",
            Expr::Sub(_, _) => "Sub",
            Expr::Mul(_, _) => "Mul",
            Expr::Div(_, _) => "Div",
            Expr::Pow(_, _) => "Pow",
            Expr::Neg(_) => "Neg",
            Expr::Function(_, _) => "Function",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Nodes actually allocated (dedup hits excluded).
    pub nodes_created: usize,
    /// `add` calls answered by an existing node.
    pub dedup_hits: usize,
}

/// Arena owning every expression node and the symbol table.
#[derive(Debug, Clone)]
pub struct Context {
    nodes: Vec<Expr>,
    interned: FxHashMap<Expr, ExprId>,
    symbols: SymbolTable,
    builtins: BuiltinIds,
    stats: ContextStats,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let ids = BuiltinFn::ALL.map(|b| symbols.intern(b.name()));
        Self {
            nodes: Vec::new(),
            interned: FxHashMap::default(),
            symbols,
            builtins: BuiltinIds::new(ids),
            stats: ContextStats::default(),
        }
    }

    /// Add a node, returning the existing id if an identical node is present.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        if let Some(&id) = self.interned.get(&expr) {
            self.stats.dedup_hits += 1;
            return id;
        }
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr.clone());
        self.interned.insert(expr, id);
        self.stats.nodes_created += 1;
        id
    }

    /// # Panics
    /// Panics if `id` was not produced by this context.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn stats(&self) -> ContextStats {
        self.stats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ----- leaf constructors -------------------------------------------------

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(&mut self, numer: i64, denom: i64) -> ExprId {
        self.add(Expr::Number(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn number(&mut self, value: BigRational) -> ExprId {
        self.add(Expr::Number(value))
    }

    pub fn constant(&mut self, c: Constant) -> ExprId {
        self.add(Expr::Constant(c))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        let sym = self.symbols.intern(name);
        self.add(Expr::Variable(sym))
    }

    /// Create (or reuse) a variable carrying `assumptions`.
    ///
    /// Fails if the name was already declared with different assumptions.
    pub fn declare_var(&mut self, name: &str, assumptions: Assumptions) -> Result<ExprId, AstError> {
        let sym = self.symbols.intern(name);
        self.symbols
            .declare(sym, assumptions)
            .map_err(|existing| AstError::AssumptionConflict {
                name: name.to_string(),
                existing,
                requested: assumptions,
            })?;
        Ok(self.add(Expr::Variable(sym)))
    }

    /// A bound variable printed as `name` that no parsed `name` refers to.
    ///
    /// Its assumptions stay on the dummy, so declaring a summation index does
    /// not change what the caller's own `name` means.
    pub fn dummy_var(&mut self, name: &str, assumptions: Assumptions) -> ExprId {
        let sym = self.symbols.dummy(name, assumptions);
        self.add(Expr::Variable(sym))
    }

    // ----- function calls ----------------------------------------------------

    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        let sym = self.symbols.intern(name);
        self.add(Expr::Function(sym, args))
    }

    pub fn call_builtin(&mut self, builtin: BuiltinFn, args: Vec<ExprId>) -> ExprId {
        let sym = self.builtins.id(builtin);
        self.add(Expr::Function(sym, args))
    }

    #[inline]
    pub fn builtin_id(&self, builtin: BuiltinFn) -> SymbolId {
        self.builtins.id(builtin)
    }

    #[inline]
    pub fn builtin_of(&self, fn_id: SymbolId) -> Option<BuiltinFn> {
        self.builtins.lookup(fn_id)
    }

    #[inline]
    pub fn is_builtin(&self, fn_id: SymbolId, builtin: BuiltinFn) -> bool {
        fn_id == self.builtins.id(builtin)
    }

    /// Check whether `id` is a call to `builtin`, returning its arguments.
    pub fn builtin_args(&self, id: ExprId, builtin: BuiltinFn) -> Option<&[ExprId]> {
        match self.get(id) {
            Expr::Function(fn_id, args) if self.is_builtin(*fn_id, builtin) => Some(args),
            _ => None,
        }
    }

    // ----- symbols -----------------------------------------------------------

    #[inline]
    pub fn sym_name(&self, id: SymbolId) -> &str {
        self.symbols.resolve(id)
    }

    #[inline]
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    #[inline]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get_id(name)
    }

    #[inline]
    pub fn assumptions(&self, sym: SymbolId) -> Assumptions {
        self.symbols.assumptions(sym)
    }

    #[inline]
    pub fn is_dummy(&self, sym: SymbolId) -> bool {
        self.symbols.is_dummy(sym)
    }

    #[inline]
    pub fn declared_assumptions(&self, sym: SymbolId) -> Option<Assumptions> {
        self.symbols.declared(sym)
    }

    // ----- small queries used everywhere ---------------------------------------

    /// The numeric value of `id` if it is a `Number` node.
    pub fn as_number(&self, id: ExprId) -> Option<&BigRational> {
        match self.get(id) {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    /// `true` if `id` is the literal additive identity.
    pub fn is_zero_literal(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::Number(n) if num_traits::Zero::is_zero(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_hash_consing() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let a = ctx.add(Expr::Mul(two, x));
        let b = ctx.add(Expr::Mul(two, x));
        assert_eq!(a, b);
        let c = ctx.add(Expr::Mul(x, two));
        assert_ne!(a, c);
    }

    #[test]
    fn test_rational_is_normalized() {
        let mut ctx = Context::new();
        let half = ctx.rational(2, 4);
        let also_half = ctx.rational(1, 2);
        assert_eq!(half, also_half);
    }

    #[test]
    fn test_builtin_lookup() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let s = ctx.call("sin", vec![x]);
        let t = ctx.call_builtin(BuiltinFn::Sin, vec![x]);
        assert_eq!(s, t);
        if let Expr::Function(fn_id, _) = ctx.get(s) {
            assert_eq!(ctx.builtin_of(*fn_id), Some(BuiltinFn::Sin));
        } else {
            panic!("expected function");
        }
        assert!(ctx.builtin_args(s, BuiltinFn::Sin).is_some());
        assert!(ctx.builtin_args(s, BuiltinFn::Cos).is_none());
    }

    #[test]
    fn test_declare_var_conflict() {
        let mut ctx = Context::new();
        ctx.declare_var("n", Assumptions::positive_integer()).unwrap();
        let err = ctx.declare_var("n", Assumptions::positive()).unwrap_err();
        assert!(matches!(err, AstError::AssumptionConflict { .. }));
    }

    #[test]
    fn test_dummy_var_keeps_user_symbol_plain() {
        let mut ctx = Context::new();
        let index = ctx.dummy_var("n", Assumptions::positive_integer());
        let n = ctx.var("n");
        assert_ne!(index, n);
        let Expr::Variable(sym) = *ctx.get(n) else {
            panic!("expected variable");
        };
        assert_eq!(ctx.declared_assumptions(sym), None);
        assert_eq!(ctx.dummy_var("n", Assumptions::positive_integer()), index);
    }

    #[test]
    fn test_zero_literal() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let one = ctx.num(1);
        assert!(ctx.is_zero_literal(zero));
        assert!(!ctx.is_zero_literal(one));
        assert!(ctx.as_number(zero).unwrap().is_zero());
    }
}
