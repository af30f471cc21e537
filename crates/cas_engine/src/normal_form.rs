//! Canonical sum-of-monomials form over Q.
//!
//! Representation: `coefficient * Π atom^exponent` terms keyed by monomial.
//! Atoms are opaque nodes of the [`Context`] (variables, constants, calls,
//! powers with non-integer exponent). Like terms combine on insertion and
//! zero coefficients are never stored, so two equal forms build to the same
//! `ExprId`.
//!
//! Atoms registered as involutions (`(-1)^n`) square to one: their exponents
//! are kept modulo 2.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, Mul, Neg, Sub};

use cas_ast::{compare_expr, Constant, Context, Expr, ExprId};

// =============================================================================
// Types
// =============================================================================

/// Sorted by atom id, no zero exponents.
pub type Monomial = SmallVec<[(ExprId, i64); 4]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalForm {
    /// Coefficient per monomial, never zero
    terms: BTreeMap<Monomial, BigRational>,
    /// Atoms whose exponents reduce modulo 2
    involutions: BTreeSet<ExprId>,
}

// =============================================================================
// Construction and queries
// =============================================================================

impl NormalForm {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        let mut nf = Self::zero();
        nf.insert(Monomial::new(), value);
        nf
    }

    pub fn integer(value: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn atom(id: ExprId) -> Self {
        let mut nf = Self::zero();
        nf.insert(smallvec![(id, 1)], BigRational::one());
        nf
    }

    /// An atom `t` with `t * t = 1`, such as `(-1)^n` for integer `n`.
    pub fn involution(id: ExprId) -> Self {
        let mut nf = Self::atom(id);
        nf.involutions.insert(id);
        nf
    }

    /// A single term sharing this form's involution set.
    pub fn term_like(&self, monomial: Monomial, coefficient: BigRational) -> Self {
        let mut nf = NormalForm {
            terms: BTreeMap::new(),
            involutions: self.involutions.clone(),
        };
        nf.insert(monomial, coefficient);
        nf
    }

    fn insert(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coefficient);
            }
            Entry::Occupied(mut slot) => {
                let sum = slot.get() + coefficient;
                if sum.is_zero() {
                    slot.remove();
                } else {
                    *slot.get_mut() = sum;
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn is_involution(&self, atom: ExprId) -> bool {
        self.involutions.contains(&atom)
    }

    /// The rational value, if the form has no atoms.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_empty())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    pub fn as_single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// `true` if any monomial mentions `atom`.
    pub fn mentions(&self, atom: ExprId) -> bool {
        self.terms
            .keys()
            .any(|m| m.iter().any(|&(a, _)| a == atom))
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

fn multiply_monomials(a: &Monomial, b: &Monomial, involutions: &BTreeSet<ExprId>) -> Monomial {
    let mut out = Monomial::new();
    let (mut i, mut j) = (0, 0);
    loop {
        let (atom, exp) = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) => match x.0.cmp(&y.0) {
                Ordering::Less => {
                    i += 1;
                    x
                }
                Ordering::Greater => {
                    j += 1;
                    y
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                    (x.0, x.1 + y.1)
                }
            },
            (Some(&x), None) => {
                i += 1;
                x
            }
            (None, Some(&y)) => {
                j += 1;
                y
            }
            (None, None) => break,
        };
        let exp = if involutions.contains(&atom) {
            exp.rem_euclid(2)
        } else {
            exp
        };
        if exp != 0 {
            out.push((atom, exp));
        }
    }
    out
}

fn rational_pow(base: &BigRational, exp: i64) -> Option<BigRational> {
    let magnitude = u32::try_from(exp.unsigned_abs()).ok()?;
    let raised = BigRational::new(base.numer().pow(magnitude), base.denom().pow(magnitude));
    if exp >= 0 {
        Some(raised)
    } else if raised.is_zero() {
        None
    } else {
        Some(raised.recip())
    }
}

impl NormalForm {
    pub fn scale(&self, factor: &BigRational) -> NormalForm {
        if factor.is_zero() {
            return NormalForm::zero();
        }
        let mut out = self.clone();
        for c in out.terms.values_mut() {
            *c = &*c * factor;
        }
        out
    }

    /// Integer power of a single term. `None` for sums, overflow, or `0^k`
    /// with `k < 0`.
    pub fn monomial_power(&self, exp: i64) -> Option<NormalForm> {
        if exp == 0 {
            return Some(NormalForm::one());
        }
        if self.is_zero() {
            return (exp > 0).then(NormalForm::zero);
        }
        let (monomial, coefficient) = self.as_single_term()?;
        let coefficient = rational_pow(coefficient, exp)?;
        let mut raised = Monomial::new();
        for &(atom, e) in monomial {
            let e = e.checked_mul(exp)?;
            let e = if self.involutions.contains(&atom) {
                e.rem_euclid(2)
            } else {
                e
            };
            if e != 0 {
                raised.push((atom, e));
            }
        }
        Some(self.term_like(raised, coefficient))
    }

    /// Multiplicative inverse.
    ///
    /// Zero maps to `undefined`; a sum becomes an opaque atom with exponent -1.
    pub fn invert(&self, ctx: &mut Context) -> NormalForm {
        if self.is_zero() {
            return NormalForm::atom(ctx.constant(Constant::Undefined));
        }
        if let Some(inverse) = self.monomial_power(-1) {
            return inverse;
        }
        let sum = self.build(ctx);
        let mut inverse = NormalForm::zero();
        inverse.insert(smallvec![(sum, -1)], BigRational::one());
        inverse
    }
}

impl Add for &NormalForm {
    type Output = NormalForm;

    fn add(self, other: Self) -> NormalForm {
        let mut out = self.clone();
        out.involutions.extend(other.involutions.iter().copied());
        for (m, c) in &other.terms {
            out.insert(m.clone(), c.clone());
        }
        out
    }
}

impl Neg for &NormalForm {
    type Output = NormalForm;

    fn neg(self) -> NormalForm {
        self.scale(&-BigRational::one())
    }
}

impl Sub for &NormalForm {
    type Output = NormalForm;

    fn sub(self, other: Self) -> NormalForm {
        self + &(-other)
    }
}

impl Mul for &NormalForm {
    type Output = NormalForm;

    fn mul(self, other: Self) -> NormalForm {
        let mut out = NormalForm {
            terms: BTreeMap::new(),
            involutions: self.involutions.union(&other.involutions).copied().collect(),
        };
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                let m = multiply_monomials(ma, mb, &out.involutions);
                out.insert(m, ca * cb);
            }
        }
        out
    }
}

// =============================================================================
// Ordering and rebuilding
// =============================================================================

/// Factors in print order: involutions first, then by structural order.
fn print_order(ctx: &Context, monomial: &Monomial, involutions: &BTreeSet<ExprId>) -> Monomial {
    let mut factors = monomial.clone();
    factors.sort_by(|a, b| {
        let inv_a = involutions.contains(&a.0);
        let inv_b = involutions.contains(&b.0);
        inv_b
            .cmp(&inv_a)
            .then_with(|| compare_expr(ctx, a.0, b.0))
            .then_with(|| a.1.cmp(&b.1))
    });
    factors
}

fn compare_monomials(ctx: &Context, a: &Monomial, b: &Monomial) -> Ordering {
    let mut fa = a.clone();
    let mut fb = b.clone();
    fa.sort_by(|x, y| compare_expr(ctx, x.0, y.0));
    fb.sort_by(|x, y| compare_expr(ctx, x.0, y.0));
    for (x, y) in fa.iter().zip(fb.iter()) {
        let ord = compare_expr(ctx, x.0, y.0).then_with(|| x.1.cmp(&y.1));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    fa.len().cmp(&fb.len())
}

fn power_node(ctx: &mut Context, atom: ExprId, exp: i64) -> ExprId {
    if exp == 1 {
        atom
    } else {
        let e = ctx.number(BigRational::from_integer(BigInt::from(exp)));
        ctx.add(Expr::Pow(atom, e))
    }
}

fn product(ctx: &mut Context, factors: &[ExprId]) -> Option<ExprId> {
    let (&first, rest) = factors.split_first()?;
    Some(
        rest.iter()
            .fold(first, |acc, &f| ctx.add(Expr::Mul(acc, f))),
    )
}

impl NormalForm {
    /// Terms in print order: the constant first, then by structural order of
    /// their factors.
    pub fn ordered_terms(&self, ctx: &Context) -> Vec<(&Monomial, &BigRational)> {
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|a, b| match (a.0.is_empty(), b.0.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_monomials(ctx, a.0, b.0),
        });
        terms
    }

    /// Coefficient of the first term in print order.
    pub fn leading_coefficient(&self, ctx: &Context) -> Option<BigRational> {
        self.ordered_terms(ctx).first().map(|(_, c)| (*c).clone())
    }

    /// `|coefficient| * monomial` as `numerator / denominator`.
    fn build_term_magnitude(
        &self,
        ctx: &mut Context,
        monomial: &Monomial,
        coefficient: &BigRational,
    ) -> ExprId {
        let magnitude = coefficient.abs();
        let mut numer = Vec::new();
        let mut denom = Vec::new();
        if !magnitude.numer().is_one() {
            numer.push(ctx.number(BigRational::from_integer(magnitude.numer().clone())));
        }
        if !magnitude.denom().is_one() {
            denom.push(ctx.number(BigRational::from_integer(magnitude.denom().clone())));
        }
        for (atom, exp) in print_order(ctx, monomial, &self.involutions) {
            if exp > 0 {
                numer.push(power_node(ctx, atom, exp));
            } else {
                denom.push(power_node(ctx, atom, -exp));
            }
        }
        let top = match product(ctx, &numer) {
            Some(top) => top,
            None => ctx.num(1),
        };
        match product(ctx, &denom) {
            Some(bottom) => ctx.add(Expr::Div(top, bottom)),
            None => top,
        }
    }

    /// Rebuild a canonical expression tree.
    ///
    /// Negative terms after the first become `Add(acc, Neg(term))`, which
    /// displays as a subtraction. The empty form builds to `0`.
    pub fn build(&self, ctx: &mut Context) -> ExprId {
        let ordered: Vec<(Monomial, BigRational)> = self
            .ordered_terms(ctx)
            .into_iter()
            .map(|(m, c)| (m.clone(), c.clone()))
            .collect();

        let mut acc: Option<ExprId> = None;
        for (monomial, coefficient) in ordered {
            let node = if monomial.is_empty() {
                ctx.number(coefficient.clone())
            } else {
                let magnitude = self.build_term_magnitude(ctx, &monomial, &coefficient);
                if coefficient.is_negative() {
                    ctx.add(Expr::Neg(magnitude))
                } else {
                    magnitude
                }
            };
            acc = Some(match acc {
                None => node,
                Some(prev) => ctx.add(Expr::Add(prev, node)),
            });
        }
        match acc {
            Some(id) => id,
            None => ctx.num(0),
        }
    }
}
