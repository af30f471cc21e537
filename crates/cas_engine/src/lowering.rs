//! Lowering of expression trees into [`NormalForm`].
//!
//! Arithmetic nodes are folded into the normal form. Function calls and
//! powers that cannot be multiplied out become atoms, after their operands
//! have been lowered and rebuilt, and after a [`RewriteHook`] has had a
//! chance to replace them.

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use tracing::warn;

use cas_ast::{Context, Expr, ExprId};

use crate::assumptions::is_integer_valued;
use crate::normal_form::NormalForm;
use crate::options::SimplifyOptions;

/// Offered each function call and opaque power before it becomes an atom.
pub trait RewriteHook {
    fn rewrite(&mut self, ctx: &mut Context, node: ExprId) -> Option<ExprId>;
}

/// Structural lowering only.
pub struct NoRewrite;

impl RewriteHook for NoRewrite {
    fn rewrite(&mut self, _ctx: &mut Context, _node: ExprId) -> Option<ExprId> {
        None
    }
}

pub struct Lowerer<'a, H> {
    context: &'a mut Context,
    hook: H,
    options: SimplifyOptions,
    cache: FxHashMap<ExprId, NormalForm>,
    depth: usize,
}

impl<'a, H: RewriteHook> Lowerer<'a, H> {
    pub fn new(context: &'a mut Context, hook: H, options: SimplifyOptions) -> Self {
        Self {
            context,
            hook,
            options,
            cache: FxHashMap::default(),
            depth: 0,
        }
    }

    pub fn into_hook(self) -> H {
        self.hook
    }

    pub fn lower(&mut self, id: ExprId) -> NormalForm {
        if let Some(nf) = self.cache.get(&id) {
            return nf.clone();
        }

        let nf = match self.context.get(id).clone() {
            Expr::Number(n) => NormalForm::constant(n),
            Expr::Constant(_) | Expr::Variable(_) => NormalForm::atom(id),
            Expr::Add(l, r) => &self.lower(l) + &self.lower(r),
            Expr::Sub(l, r) => &self.lower(l) - &self.lower(r),
            Expr::Mul(l, r) => &self.lower(l) * &self.lower(r),
            Expr::Div(l, r) => {
                let numer = self.lower(l);
                let denom = self.lower(r).invert(self.context);
                &numer * &denom
            }
            Expr::Neg(e) => -&self.lower(e),
            Expr::Pow(b, e) => {
                let base = self.lower(b);
                let exp = self.lower(e);
                self.lower_power(base, exp)
            }
            Expr::Function(name, args) => {
                let args = args
                    .iter()
                    .map(|a| self.lower(*a).build(self.context))
                    .collect();
                let node = self.context.add(Expr::Function(name, args));
                self.atom_or_rewrite(node)
            }
        };

        self.cache.insert(id, nf.clone());
        nf
    }

    fn atom_or_rewrite(&mut self, node: ExprId) -> NormalForm {
        if self.depth >= self.options.max_rewrite_depth {
            warn!(depth = self.depth, "rewrite depth limit reached");
            return NormalForm::atom(node);
        }
        match self.hook.rewrite(self.context, node) {
            Some(rewritten) if rewritten != node => {
                self.depth += 1;
                let nf = self.lower(rewritten);
                self.depth -= 1;
                nf
            }
            _ => NormalForm::atom(node),
        }
    }

    fn lower_power(&mut self, base: NormalForm, exp: NormalForm) -> NormalForm {
        if let Some(k) = exp.as_constant() {
            if k.is_integer() {
                if let Some(nf) = self.integer_power(&base, k.to_integer()) {
                    return nf;
                }
            } else if let Some(value) = base.as_constant().and_then(|b| rational_power(&b, &k)) {
                return NormalForm::constant(value);
            }
        }

        let minus_one = -BigRational::one();
        if base.as_constant() == Some(minus_one) && is_integer_valued(self.context, &exp) {
            return self.parity(&exp);
        }

        let b = base.build(self.context);
        let e = exp.build(self.context);
        let node = self.context.add(Expr::Pow(b, e));
        self.atom_or_rewrite(node)
    }

    fn integer_power(&mut self, base: &NormalForm, k: BigInt) -> Option<NormalForm> {
        let k = k.to_i64()?;
        if base.is_zero() && k < 0 {
            return Some(NormalForm::zero().invert(self.context));
        }
        if let Some(nf) = base.monomial_power(k) {
            return Some(nf);
        }
        if k.unsigned_abs() > u64::from(self.options.max_expand_exponent) {
            warn!(exponent = k, "power of a sum left unexpanded");
            return None;
        }
        let mut acc = NormalForm::one();
        for _ in 0..k.unsigned_abs() {
            acc = &acc * base;
        }
        if k < 0 {
            acc = acc.invert(self.context);
        }
        Some(acc)
    }

    /// `(-1)^exp` for integer-valued `exp`: each odd term contributes a
    /// factor, even terms vanish.
    fn parity(&mut self, exp: &NormalForm) -> NormalForm {
        let minus_one = self.context.num(-1);
        let mut result = NormalForm::one();
        for (monomial, coefficient) in exp.terms() {
            if coefficient.to_integer().is_even() {
                continue;
            }
            if monomial.is_empty() {
                result = -&result;
            } else {
                let power = exp
                    .term_like(monomial.clone(), BigRational::one())
                    .build(self.context);
                let node = self.context.add(Expr::Pow(minus_one, power));
                result = &result * &NormalForm::involution(node);
            }
        }
        result
    }
}

/// Exact `base^exp` for rational `exp = p/q`, when `base` is a perfect q-th
/// power.
fn rational_power(base: &BigRational, exp: &BigRational) -> Option<BigRational> {
    let q = exp.denom().to_u32()?;
    let p = exp.numer().to_i64()?;
    if base.is_zero() {
        return (p > 0).then(BigRational::zero);
    }
    if base.is_negative() && q % 2 == 0 {
        return None;
    }

    let exact_root = |n: &BigInt| -> Option<BigInt> {
        let root = n.abs().nth_root(q);
        (root.pow(q) == n.abs()).then_some(root)
    };
    let mut root = BigRational::new(exact_root(base.numer())?, exact_root(base.denom())?);
    if base.is_negative() {
        root = -root;
    }

    let magnitude = u32::try_from(p.unsigned_abs()).ok()?;
    let raised = BigRational::new(root.numer().pow(magnitude), root.denom().pow(magnitude));
    Some(if p < 0 { raised.recip() } else { raised })
}

/// Structural lowering without rewrite rules.
pub fn lower_expr(ctx: &mut Context, id: ExprId) -> NormalForm {
    Lowerer::new(ctx, NoRewrite, SimplifyOptions::default()).lower(id)
}
