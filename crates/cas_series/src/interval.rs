//! Validation of the expansion interval `[lower, upper]`.
//!
//! Checked before any integration: the variable is a symbol, neither bound
//! is infinite, and `upper - lower` is provably positive. Bounds built from
//! numbers and constants such as `pi` are compared numerically.

use cas_ast::{contains_constant, Constant, Context, DisplayExpr, Expr, ExprId};
use cas_engine::{Sign, Simplifier};

use crate::error::SeriesError;

/// A validated interval together with its simplified length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lower: ExprId,
    pub upper: ExprId,
    pub length: ExprId,
}

fn show(ctx: &Context, id: ExprId) -> String {
    DisplayExpr { context: ctx, id }.to_string()
}

impl Interval {
    pub fn validate(
        simplifier: &mut Simplifier,
        var: ExprId,
        lower: ExprId,
        upper: ExprId,
    ) -> Result<Interval, SeriesError> {
        let ctx = &mut simplifier.context;
        if !matches!(ctx.get(var), Expr::Variable(_)) {
            return Err(SeriesError::NotAVariable(show(ctx, var)));
        }

        let bounds = || (show(ctx, lower), show(ctx, upper));
        if contains_constant(ctx, lower, Constant::Infinity)
            || contains_constant(ctx, upper, Constant::Infinity)
        {
            let (lower, upper) = bounds();
            return Err(SeriesError::UnboundedInterval { lower, upper });
        }

        let difference = ctx.add(Expr::Sub(upper, lower));
        let (length, _) = simplifier.simplify(difference);
        let sign = simplifier.sign(length);
        let ctx = &simplifier.context;
        let bounds = || (show(ctx, lower), show(ctx, upper));
        match sign {
            Some(Sign::Positive) => Ok(Interval {
                lower,
                upper,
                length,
            }),
            Some(Sign::Negative) => Err(SeriesError::InvalidInterval),
            Some(Sign::Zero) => {
                let (lower, upper) = bounds();
                Err(SeriesError::EmptyInterval { lower, upper })
            }
            None => {
                let (lower, upper) = bounds();
                Err(SeriesError::IndeterminateInterval { lower, upper })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(lower: &str, upper: &str) -> Result<String, SeriesError> {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let lo = cas_parser::parse(lower, &mut s.context).unwrap();
        let hi = cas_parser::parse(upper, &mut s.context).unwrap();
        let interval = Interval::validate(&mut s, x, lo, hi)?;
        Ok(show(&s.context, interval.length))
    }

    #[test]
    fn test_length_is_simplified() {
        assert_eq!(check("-1", "1").unwrap(), "2");
        assert_eq!(check("0", "2*pi").unwrap(), "2 * pi");
        assert_eq!(check("-pi", "pi").unwrap(), "2 * pi");
    }

    #[test]
    fn test_reversed_bounds() {
        assert_eq!(check("1", "0"), Err(SeriesError::InvalidInterval));
        assert_eq!(check("2*pi", "pi"), Err(SeriesError::InvalidInterval));
    }

    #[test]
    fn test_degenerate_bounds() {
        assert!(matches!(
            check("2", "2"),
            Err(SeriesError::EmptyInterval { .. })
        ));
        assert!(matches!(
            check("0", "oo"),
            Err(SeriesError::UnboundedInterval { .. })
        ));
        assert!(matches!(
            check("a", "b"),
            Err(SeriesError::IndeterminateInterval { .. })
        ));
        assert!(matches!(
            check("pi", "a"),
            Err(SeriesError::IndeterminateInterval { .. })
        ));
    }

    #[test]
    fn test_constant_bounds_are_ordered_numerically() {
        assert_eq!(check("1", "pi").unwrap(), "-1 + pi");
        assert_eq!(check("pi", "4").unwrap(), "4 - pi");
        assert_eq!(check("3", "pi").unwrap(), "-3 + pi");
        assert_eq!(check("0", "pi - 1").unwrap(), "-1 + pi");
        assert_eq!(check("1", "e").unwrap(), "-1 + e");
        assert_eq!(check("e", "pi").unwrap(), "pi - e");
        assert_eq!(check("4", "pi"), Err(SeriesError::InvalidInterval));
        assert_eq!(check("pi", "e"), Err(SeriesError::InvalidInterval));
    }

    #[test]
    fn test_variable_must_be_a_symbol() {
        let mut s = Simplifier::with_default_rules();
        let two = s.context.num(2);
        let zero = s.context.num(0);
        let one = s.context.num(1);
        assert_eq!(
            Interval::validate(&mut s, two, zero, one),
            Err(SeriesError::NotAVariable("2".to_string()))
        );
    }
}
