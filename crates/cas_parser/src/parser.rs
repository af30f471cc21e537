use cas_ast::{Constant, Context, Expr, ExprId};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::multispace0,
    combinator::{map, opt},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::ParseError;

// Intermediate AST for parsing
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
    Function(String, Vec<ParseNode>),
}

impl ParseNode {
    fn lower(self, ctx: &mut Context) -> ExprId {
        match self {
            ParseNode::Number(n) => ctx.add(Expr::Number(n)),
            ParseNode::Constant(c) => ctx.add(Expr::Constant(c)),
            ParseNode::Variable(s) => ctx.var(&s),
            ParseNode::Add(l, r) => {
                let lid = l.lower(ctx);
                let rid = r.lower(ctx);
                ctx.add(Expr::Add(lid, rid))
            }
            ParseNode::Sub(l, r) => {
                let lid = l.lower(ctx);
                let rid = r.lower(ctx);
                ctx.add(Expr::Sub(lid, rid))
            }
            ParseNode::Mul(l, r) => {
                let lid = l.lower(ctx);
                let rid = r.lower(ctx);
                ctx.add(Expr::Mul(lid, rid))
            }
            ParseNode::Div(l, r) => {
                let lid = l.lower(ctx);
                let rid = r.lower(ctx);
                ctx.add(Expr::Div(lid, rid))
            }
            ParseNode::Pow(b, e) => {
                let bid = b.lower(ctx);
                let eid = e.lower(ctx);
                ctx.add(Expr::Pow(bid, eid))
            }
            ParseNode::Neg(e) => {
                let eid = e.lower(ctx);
                ctx.add(Expr::Neg(eid))
            }
            ParseNode::Function(name, args) => {
                let arg_ids = args.into_iter().map(|a| a.lower(ctx)).collect();
                ctx.call(&name, arg_ids)
            }
        }
    }
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "8." → 8, "123" → 123
/// For "A.B": num = A*10^k + B, den = 10^k (where k = len(B))
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let int_val: BigInt = if integer_part.is_empty() {
        BigInt::from(0)
    } else {
        integer_part.parse().unwrap_or_else(|_| BigInt::from(0))
    };

    let k = fractional_part.len();
    if k == 0 {
        return BigRational::from_integer(int_val);
    }

    let denominator = num_traits::pow(BigInt::from(10), k);
    let frac_val: BigInt = fractional_part.parse().unwrap_or_else(|_| BigInt::from(0));

    // BigRational::new reduces the fraction (gcd)
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

// Numeric literals: 123, 8.2, .5, 8.
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }

    let (remaining, (int_part, maybe_frac)) = pair(
        take_while(is_digit),
        opt(pair(tag("."), take_while(is_digit))),
    )(input)?;

    let frac_str = maybe_frac.map(|(_, frac)| frac).unwrap_or("");

    // Must have at least some digits somewhere ("." alone is not a number)
    if int_part.is_empty() && frac_str.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }

    Ok((remaining, ParseNode::Number(decimal_to_rational(int_part, frac_str))))
}

fn is_word_boundary(remaining: &str) -> bool {
    remaining
        .chars()
        .next()
        .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
}

// Constants with word boundary check:
// 'e' and 'pi' must not match prefixes of longer identifiers (e.g., 'exact', 'pivot')
fn parse_constant(input: &str) -> IResult<&str, ParseNode> {
    const NAMES: [(&str, Constant); 4] = [
        ("infinity", Constant::Infinity),
        ("pi", Constant::Pi),
        ("oo", Constant::Infinity),
        ("e", Constant::E),
    ];

    for (name, constant) in NAMES {
        if let Some(rest) = input.strip_prefix(name) {
            if is_word_boundary(rest) {
                return Ok((rest, ParseNode::Constant(constant)));
            }
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}

// Identifiers start with letter or underscore, then allow letters, digits, underscores
// Examples: x, x1, theta3, _tmp, x_1
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let starts_ok = matches!(input.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )));
    }

    let len = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());

    Ok((&input[len..], &input[..len]))
}

fn parse_variable(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Variable(s.to_string()))(input)
}

fn parse_parens(input: &str) -> IResult<&str, ParseNode> {
    delimited(
        preceded(multispace0, tag("(")),
        parse_expr,
        preceded(multispace0, tag(")")),
    )(input)
}

fn parse_function(input: &str) -> IResult<&str, ParseNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = preceded(multispace0, tag("("))(input)?;
    let (input, args) = separated_list0(preceded(multispace0, tag(",")), parse_expr)(input)?;
    let (input, _) = preceded(multispace0, tag(")"))(input)?;

    Ok((input, ParseNode::Function(name.to_string(), args)))
}

fn parse_abs(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(
            preceded(multispace0, tag("|")),
            parse_expr,
            preceded(multispace0, tag("|")),
        ),
        |expr| ParseNode::Function("abs".to_string(), vec![expr]),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            parse_number,
            parse_function,
            parse_constant,
            parse_variable,
            parse_parens,
            parse_abs,
        )),
    )(input)
}

// Power - right associative: 2^3^4 = 2^(3^4), not (2^3)^4
// Also allows signed exponents: x^-2, x^-(a+b)
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (input, base) = parse_atom(input)?;

    let caret: IResult<&str, &str> = preceded(multispace0, tag("^"))(input);
    match caret {
        Ok((input, _)) => {
            let (input, exp) = parse_power_exponent(input)?;
            Ok((input, ParseNode::Pow(Box::new(base), Box::new(exp))))
        }
        Err(_) => Ok((input, base)),
    }
}

fn parse_power_exponent(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            map(pair(tag("-"), parse_power_exponent), |(_, expr)| {
                ParseNode::Neg(Box::new(expr))
            }),
            map(pair(tag("+"), parse_power_exponent), |(_, expr)| expr),
            parse_power,
        )),
    )(input)
}

fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(
            pair(preceded(multispace0, tag("-")), parse_unary),
            |(_, expr)| ParseNode::Neg(Box::new(expr)),
        ),
        parse_power,
    ))(input)
}

// Term - explicit * and / plus implicit multiplication: 2x → 2*x, 3(x+y) → 3*(x+y)
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_unary(input)?;

    let (input, result) = fold_many0(
        pair(
            preceded(multispace0, alt((tag("*"), tag("/")))),
            parse_unary,
        ),
        move || init.clone(),
        |acc, (op, val)| match op {
            "*" => ParseNode::Mul(Box::new(acc), Box::new(val)),
            _ => ParseNode::Div(Box::new(acc), Box::new(val)),
        },
    )(input)?;

    parse_implicit_mul_chain(input, result)
}

// Implicit multiplication only applies with no whitespace between the factors
fn parse_implicit_mul_chain(input: &str, acc: ParseNode) -> IResult<&str, ParseNode> {
    let starts_factor = matches!(
        input.chars().next(),
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '('
    );

    if starts_factor && can_implicit_mul(&acc) {
        if let Ok((remaining, next_factor)) = parse_power(input) {
            let new_acc = ParseNode::Mul(Box::new(acc), Box::new(next_factor));
            return parse_implicit_mul_chain(remaining, new_acc);
        }
    }
    Ok((input, acc))
}

// Only numbers (possibly at the end of a product chain) take an implicit factor: 2x, 3*2pi
fn can_implicit_mul(node: &ParseNode) -> bool {
    match node {
        ParseNode::Number(_) => true,
        ParseNode::Mul(_, right) | ParseNode::Div(_, right) => can_implicit_mul(right),
        _ => false,
    }
}

fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((tag("+"), tag("-")))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            "+" => ParseNode::Add(Box::new(acc), Box::new(val)),
            _ => ParseNode::Sub(Box::new(acc), Box::new(val)),
        },
    )(input)
}

/// Parse `input` into `ctx`, requiring the whole string to be consumed.
pub fn parse(input: &str, ctx: &mut Context) -> Result<ExprId, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let (remaining, expr_node) =
        parse_expr(input).map_err(|e| ParseError::NomError(format!("{}", e)))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }

    Ok(expr_node.lower(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cas_ast::DisplayExpr;

    fn roundtrip(input: &str) -> String {
        let mut ctx = Context::new();
        let e = parse(input, &mut ctx).unwrap();
        DisplayExpr {
            context: &ctx,
            id: e,
        }
        .to_string()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(roundtrip("123"), "123");
    }

    #[test]
    fn test_parse_decimal_literals() {
        let cases = [("8.2", "41/5"), ("0.5", "1/2"), (".5", "1/2"), ("8.", "8")];
        for (input, expected) in cases {
            assert_eq!(roundtrip(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(roundtrip("1 + 2 * x"), "1 + 2 * x");
        assert_eq!(roundtrip("(1 + 2) * x"), "(1 + 2) * x");
        assert_eq!(roundtrip("2^3^4"), "2^(3^4)");
    }

    #[test]
    fn test_constants_respect_word_boundary() {
        let mut ctx = Context::new();
        let pi = parse("pi", &mut ctx).unwrap();
        assert!(matches!(ctx.get(pi), Expr::Constant(Constant::Pi)));
        let pivot = parse("pivot", &mut ctx).unwrap();
        assert!(matches!(ctx.get(pivot), Expr::Variable(_)));
        let oo = parse("oo", &mut ctx).unwrap();
        assert!(matches!(ctx.get(oo), Expr::Constant(Constant::Infinity)));
        let exact = parse("exact", &mut ctx).unwrap();
        assert!(matches!(ctx.get(exact), Expr::Variable(_)));
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(roundtrip("2x"), "2 * x");
        assert_eq!(roundtrip("2pi"), "2 * pi");
        assert_eq!(roundtrip("3(x + 1)"), "3 * (x + 1)");
        assert_eq!(roundtrip("2sin(x)"), "2 * sin(x)");
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(roundtrip("sin(2*pi*x)"), "sin(2 * pi * x)");
        assert_eq!(roundtrip("sum(n, n, 1, oo)"), "sum(n, n, 1, infinity)");
        assert_eq!(roundtrip("|x|"), "abs(x)");
    }

    #[test]
    fn test_negative_exponent_and_unary_minus() {
        assert_eq!(roundtrip("x^-1"), "x^(-1)");
        assert_eq!(roundtrip("-x + 1"), "-x + 1");
    }

    #[test]
    fn test_errors() {
        let mut ctx = Context::new();
        assert!(matches!(parse("", &mut ctx), Err(ParseError::EmptyInput)));
        assert!(matches!(
            parse("x )", &mut ctx),
            Err(ParseError::UnconsumedInput(_))
        ));
        assert!(parse("*", &mut ctx).is_err());
    }
}
