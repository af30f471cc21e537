//! Sign, integrality and nonzero queries on normal forms.
//!
//! Facts come from symbol declarations (`Context::declare_var`) and from the
//! shape of atoms: `pi` and `e` are positive, `(-1)^k` is a nonzero integer,
//! and a power of a positive base is positive. Anything else is unknown and
//! the queries answer conservatively.
//!
//! When the terms of a form disagree in sign but every atom is built from
//! numbers and constants (`pi`, `e`, roots, sums such as `pi - 1`), the sign
//! is decided from a rational enclosure of the value instead.

use cas_ast::{Constant, Context, Expr, ExprId};
use num_bigint::BigInt;
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::normal_form::{Monomial, NormalForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    fn of_rational(value: &BigRational) -> Sign {
        if value.is_zero() {
            Sign::Zero
        } else if value.is_positive() {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// `true` for `(-1)^k` nodes.
pub fn is_parity_atom(ctx: &Context, atom: ExprId) -> bool {
    match ctx.get(atom) {
        Expr::Pow(base, _) => ctx
            .as_number(*base)
            .is_some_and(|b| b.is_integer() && (-b).is_one()),
        _ => false,
    }
}

pub fn atom_is_integer(ctx: &Context, atom: ExprId) -> bool {
    match ctx.get(atom) {
        Expr::Variable(sym) => ctx.assumptions(*sym).integer,
        _ => is_parity_atom(ctx, atom),
    }
}

/// Known sign of an atom: from its shape, or from an enclosure when it is
/// built from numbers and constants only (such as the sum `pi - 1`).
pub fn atom_sign(ctx: &Context, atom: ExprId) -> Option<Sign> {
    let by_shape = match ctx.get(atom) {
        Expr::Constant(Constant::Pi | Constant::E) => Some(Sign::Positive),
        Expr::Variable(sym) if ctx.assumptions(*sym).positive => Some(Sign::Positive),
        Expr::Pow(base, _) => match ctx.get(*base) {
            Expr::Number(b) if b.is_positive() => Some(Sign::Positive),
            Expr::Constant(Constant::Pi | Constant::E) => Some(Sign::Positive),
            Expr::Variable(sym) if ctx.assumptions(*sym).positive => Some(Sign::Positive),
            _ => None,
        },
        _ => None,
    };
    by_shape.or_else(|| expr_enclosure(ctx, atom)?.sign())
}

pub fn atom_is_nonzero(ctx: &Context, atom: ExprId) -> bool {
    if matches!(atom_sign(ctx, atom), Some(Sign::Positive | Sign::Negative))
        || is_parity_atom(ctx, atom)
    {
        return true;
    }
    match ctx.get(atom) {
        Expr::Variable(sym) => ctx.assumptions(*sym).is_nonzero(),
        _ => false,
    }
}

/// Sign of `Π atom^exp`, or `None` if some factor is undecided.
pub fn monomial_sign(ctx: &Context, monomial: &Monomial) -> Option<Sign> {
    let mut negative = false;
    for &(atom, exp) in monomial {
        match atom_sign(ctx, atom) {
            Some(Sign::Positive) => {}
            Some(Sign::Negative) => negative ^= exp % 2 != 0,
            _ if exp % 2 == 0 && atom_is_nonzero(ctx, atom) => {}
            _ => return None,
        }
    }
    Some(if negative { Sign::Negative } else { Sign::Positive })
}

/// `true` if the monomial takes integer values: nonnegative powers of
/// integer atoms.
pub fn monomial_is_integer_valued(ctx: &Context, monomial: &Monomial) -> bool {
    monomial
        .iter()
        .all(|&(atom, exp)| exp > 0 && atom_is_integer(ctx, atom))
}

/// Sign of the whole form: every term agrees, or the form is built from
/// numbers and constants and its enclosure excludes zero.
pub fn sign(ctx: &Context, nf: &NormalForm) -> Option<Sign> {
    if nf.is_zero() {
        return Some(Sign::Zero);
    }
    agreeing_sign(ctx, nf).or_else(|| enclosure(ctx, nf)?.sign())
}

fn agreeing_sign(ctx: &Context, nf: &NormalForm) -> Option<Sign> {
    let mut result = None;
    for (monomial, coefficient) in nf.terms() {
        let term_sign = match (monomial_sign(ctx, monomial)?, Sign::of_rational(coefficient)) {
            (_, Sign::Zero) => Sign::Zero,
            (Sign::Negative, Sign::Negative) => Sign::Positive,
            (Sign::Negative, _) | (_, Sign::Negative) => Sign::Negative,
            _ => Sign::Positive,
        };
        match result {
            None => result = Some(term_sign),
            Some(s) if s == term_sign => {}
            Some(_) => return None,
        }
    }
    result
}

/// Closed rational interval `[lo, hi]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub lo: BigRational,
    pub hi: BigRational,
}

impl Enclosure {
    fn point(value: BigRational) -> Self {
        Enclosure {
            lo: value.clone(),
            hi: value,
        }
    }

    fn decimal(lo: i64, hi: i64, digits: u32) -> Self {
        let scale = BigInt::from(10).pow(digits);
        Enclosure {
            lo: BigRational::new(BigInt::from(lo), scale.clone()),
            hi: BigRational::new(BigInt::from(hi), scale),
        }
    }

    /// Sign of every value in the interval, if they share one.
    pub fn sign(&self) -> Option<Sign> {
        if self.lo.is_positive() {
            Some(Sign::Positive)
        } else if self.hi.is_negative() {
            Some(Sign::Negative)
        } else if self.lo.is_zero() && self.hi.is_zero() {
            Some(Sign::Zero)
        } else {
            None
        }
    }

    fn add(&self, other: &Enclosure) -> Enclosure {
        Enclosure {
            lo: &self.lo + &other.lo,
            hi: &self.hi + &other.hi,
        }
    }

    fn neg(&self) -> Enclosure {
        Enclosure {
            lo: -&self.hi,
            hi: -&self.lo,
        }
    }

    fn mul(&self, other: &Enclosure) -> Enclosure {
        let products = [
            &self.lo * &other.lo,
            &self.lo * &other.hi,
            &self.hi * &other.lo,
            &self.hi * &other.hi,
        ];
        let mut lo = products[0].clone();
        let mut hi = products[0].clone();
        for p in &products[1..] {
            if *p < lo {
                lo = p.clone();
            }
            if *p > hi {
                hi = p.clone();
            }
        }
        Enclosure { lo, hi }
    }

    /// `None` when the interval contains zero.
    fn recip(&self) -> Option<Enclosure> {
        if self.lo.is_positive() || self.hi.is_negative() {
            Some(Enclosure {
                lo: self.hi.recip(),
                hi: self.lo.recip(),
            })
        } else {
            None
        }
    }

    fn powi(&self, exp: i64) -> Option<Enclosure> {
        let mut acc = Enclosure::point(BigRational::one());
        for _ in 0..exp.unsigned_abs() {
            acc = acc.mul(self);
        }
        if exp < 0 {
            acc.recip()
        } else {
            Some(acc)
        }
    }

    fn scale(&self, factor: &BigRational) -> Enclosure {
        self.mul(&Enclosure::point(factor.clone()))
    }
}

/// Digits kept when enclosing irrational roots.
const ROOT_DIGITS: u32 = 15;

/// Largest integer exponent expanded when enclosing a power.
const MAX_ENCLOSED_EXPONENT: i64 = 64;

/// Enclosure of an expression built from numbers, `pi`, `e`, arithmetic and
/// rational powers of positive values. `None` if anything else occurs.
pub fn expr_enclosure(ctx: &Context, id: ExprId) -> Option<Enclosure> {
    match ctx.get(id) {
        Expr::Number(n) => Some(Enclosure::point(n.clone())),
        Expr::Constant(Constant::Pi) => Some(Enclosure::decimal(
            314_159_265_358_979,
            314_159_265_358_980,
            14,
        )),
        Expr::Constant(Constant::E) => Some(Enclosure::decimal(
            271_828_182_845_904,
            271_828_182_845_905,
            14,
        )),
        Expr::Add(l, r) => Some(expr_enclosure(ctx, *l)?.add(&expr_enclosure(ctx, *r)?)),
        Expr::Sub(l, r) => Some(expr_enclosure(ctx, *l)?.add(&expr_enclosure(ctx, *r)?.neg())),
        Expr::Mul(l, r) => Some(expr_enclosure(ctx, *l)?.mul(&expr_enclosure(ctx, *r)?)),
        Expr::Div(l, r) => Some(expr_enclosure(ctx, *l)?.mul(&expr_enclosure(ctx, *r)?.recip()?)),
        Expr::Neg(e) => Some(expr_enclosure(ctx, *e)?.neg()),
        Expr::Pow(base, exp) => {
            let exp = ctx.as_number(*exp)?;
            let base = expr_enclosure(ctx, *base)?;
            let p = exp.numer().to_i64()?;
            if p.abs() > MAX_ENCLOSED_EXPONENT {
                return None;
            }
            if exp.is_integer() {
                return base.powi(p);
            }
            if !base.lo.is_positive() {
                return None;
            }
            let q = exp.denom().to_u32()?;
            let root = Enclosure {
                lo: root_enclosure(&base.lo, q)?.lo,
                hi: root_enclosure(&base.hi, q)?.hi,
            };
            root.powi(p)
        }
        _ => None,
    }
}

/// `[floor(r^(1/q) * 10^d), that + 1] / 10^d` for positive `r`.
fn root_enclosure(r: &BigRational, q: u32) -> Option<Enclosure> {
    if q == 0 {
        return None;
    }
    if q == 1 {
        return Some(Enclosure::point(r.clone()));
    }
    let scale = BigInt::from(10).pow(ROOT_DIGITS);
    let scaled = r.numer() * scale.pow(q) / r.denom();
    let floor = scaled.nth_root(q);
    if floor.is_zero() {
        return None;
    }
    let lo = BigRational::new(floor.clone(), scale.clone());
    let hi = BigRational::new(floor + 1, scale);
    Some(Enclosure { lo, hi })
}

/// Enclosure of a form whose atoms all have one.
pub fn enclosure(ctx: &Context, nf: &NormalForm) -> Option<Enclosure> {
    let mut total = Enclosure::point(BigRational::zero());
    for (monomial, coefficient) in nf.terms() {
        let mut product = Enclosure::point(BigRational::one());
        for &(atom, exp) in monomial {
            if exp.abs() > MAX_ENCLOSED_EXPONENT {
                return None;
            }
            product = product.mul(&expr_enclosure(ctx, atom)?.powi(exp)?);
        }
        total = total.add(&product.scale(coefficient));
    }
    Some(total)
}

pub fn is_positive(ctx: &Context, nf: &NormalForm) -> bool {
    sign(ctx, nf) == Some(Sign::Positive)
}

pub fn is_nonzero(ctx: &Context, nf: &NormalForm) -> bool {
    if let Some((monomial, _)) = nf.as_single_term() {
        return monomial.iter().all(|&(atom, _)| atom_is_nonzero(ctx, atom));
    }
    matches!(sign(ctx, nf), Some(Sign::Positive | Sign::Negative))
}

/// `true` if every term is an integer multiple of an integer-valued monomial.
pub fn is_integer_valued(ctx: &Context, nf: &NormalForm) -> bool {
    nf.terms()
        .all(|(m, c)| c.is_integer() && monomial_is_integer_valued(ctx, m))
}
