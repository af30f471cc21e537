//! Definite and indefinite integrals over the supported table.

use cas_ast::{Assumptions, DisplayExpr};
use cas_engine::{integrate, integrate_definite, IntegrationError, Simplifier};

fn definite(integrand: &str, lower: &str, upper: &str) -> String {
    let mut s = Simplifier::with_default_rules();
    let f = cas_parser::parse(integrand, &mut s.context).expect("parse failed");
    let lo = cas_parser::parse(lower, &mut s.context).expect("parse failed");
    let hi = cas_parser::parse(upper, &mut s.context).expect("parse failed");
    let x = s.context.var("x");
    let result = integrate_definite(&mut s, f, x, lo, hi).expect("integral failed");
    DisplayExpr {
        context: &s.context,
        id: result,
    }
    .to_string()
}

fn indefinite(integrand: &str) -> Result<String, IntegrationError> {
    let mut s = Simplifier::with_default_rules();
    s.context
        .declare_var("n", Assumptions::positive_integer())
        .expect("fresh context");
    let f = cas_parser::parse(integrand, &mut s.context).expect("parse failed");
    let x = s.context.var("x");
    let result = integrate(&mut s, f, x)?;
    Ok(DisplayExpr {
        context: &s.context,
        id: result,
    }
    .to_string())
}

#[test]
fn test_polynomials() {
    assert_eq!(definite("x^2", "0", "3"), "9");
    assert_eq!(definite("3*x^2 + 2*x + 1", "0", "1"), "3");
    assert_eq!(definite("x", "-1", "1"), "0");
}

#[test]
fn test_polynomial_times_trig() {
    assert_eq!(definite("x*cos(x)", "0", "pi"), "-2");
    assert_eq!(definite("x*sin(x)", "0", "pi"), "pi");
}

#[test]
fn test_products_of_trig_factors() {
    assert_eq!(definite("sin(x)*cos(x)", "0", "pi"), "0");
    assert_eq!(definite("cos(x)^2", "0", "2*pi"), "pi");
    assert_eq!(definite("sin(2*x)*sin(3*x)", "0", "2*pi"), "0");
}

#[test]
fn test_exponential() {
    assert_eq!(definite("exp(2*x)", "0", "1"), "-1/2 + e^2 / 2");
}

#[test]
fn test_exponential_times_trig() {
    let mut s = Simplifier::with_default_rules();
    let f = cas_parser::parse("exp(x)*sin(x)", &mut s.context).expect("parse failed");
    let lo = cas_parser::parse("0", &mut s.context).expect("parse failed");
    let hi = cas_parser::parse("pi", &mut s.context).expect("parse failed");
    let x = s.context.var("x");
    let result = integrate_definite(&mut s, f, x, lo, hi).expect("integral failed");
    let expected = cas_parser::parse("(e^pi + 1)/2", &mut s.context).expect("parse failed");
    assert!(s.are_equivalent(result, expected));

    assert!(indefinite("exp(2*x)*cos(n*x)").is_ok());
}

#[test]
fn test_symbolic_harmonic() {
    assert_eq!(indefinite("cos(n*x)").unwrap(), "sin(n * x) / n");
    assert!(indefinite("x^2*sin(pi*n*x)").is_ok());
}

#[test]
fn test_unsupported_integrands() {
    assert!(matches!(
        indefinite("tan(x)"),
        Err(IntegrationError::Unsupported { .. })
    ));
    assert!(matches!(
        indefinite("1/x"),
        Err(IntegrationError::Unsupported { .. })
    ));
    assert!(matches!(
        indefinite("exp(x^2)*sin(x)"),
        Err(IntegrationError::Unsupported { .. })
    ));
}

#[test]
fn test_frequency_must_be_provably_nonzero() {
    assert_eq!(
        indefinite("sin(a*x)"),
        Err(IntegrationError::PossiblyZeroFrequency {
            frequency: "a".to_string()
        })
    );
}
