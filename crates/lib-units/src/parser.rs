//! Unit expression parser.
//!
//! Grammar (whitespace allowed around operators):
//!
//! ```text
//! expr   := term (('*' | '·' | '/') term)*
//! term   := factor ('^' integer)?
//! factor := '(' expr ')' | '1' | symbol
//! ```
//!
//! Symbols are resolved through [`crate::registry::resolve`]. The result is
//! flattened into a product of powers of atomic units, which also gives the
//! canonical symbol used for identity comparison and serialization.

use crate::dimension::Dimension;
use crate::error::{UnitError, UnitResult};
use crate::registry;
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, one_of, space0},
    combinator::{map, map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

/// Parsed unit expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitExpr {
    /// The literal `1` (or an empty expression).
    One,
    /// A registered symbol, possibly prefixed.
    Symbol(String),
    Pow(Box<UnitExpr>, i32),
    Mul(Box<UnitExpr>, Box<UnitExpr>),
    Div(Box<UnitExpr>, Box<UnitExpr>),
}

/// A unit expression reduced to dimension, scale and canonical symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedUnit {
    pub symbol: String,
    pub dimension: Dimension,
    pub scale: f64,
}

/// Parse and resolve a unit expression.
pub fn parse_unit(input: &str) -> UnitResult<ParsedUnit> {
    let trimmed = input.trim();
    let expr = if trimmed.is_empty() {
        UnitExpr::One
    } else {
        let (rest, expr) = parse_expr(trimmed)
            .map_err(|e| UnitError::parse(input, format!("{:?}", e)))?;
        if !rest.trim().is_empty() {
            return Err(UnitError::parse(input, format!("unexpected trailing input '{}'", rest)));
        }
        expr
    };

    let mut terms: Vec<(String, i32)> = Vec::new();
    let mut dimension = Dimension::DIMENSIONLESS;
    let mut scale = 1.0;
    flatten(&expr, 1, &mut terms, &mut dimension, &mut scale)?;

    Ok(ParsedUnit {
        symbol: render(&terms),
        dimension,
        scale,
    })
}

/// Accumulate `expr^exponent` into the running product.
fn flatten(
    expr: &UnitExpr,
    exponent: i32,
    terms: &mut Vec<(String, i32)>,
    dimension: &mut Dimension,
    scale: &mut f64,
) -> UnitResult<()> {
    match expr {
        UnitExpr::One => Ok(()),
        UnitExpr::Symbol(symbol) => {
            let resolved = registry::resolve(symbol)?;
            // Pure numbers carry no symbol in a product.
            if resolved.dimension.is_dimensionless() && resolved.scale == 1.0 {
                return Ok(());
            }
            *dimension = *dimension * resolved.dimension.powi(exponent);
            *scale *= resolved.scale.powi(exponent);
            match terms.iter_mut().find(|(s, _)| *s == resolved.symbol) {
                Some((_, e)) => *e += exponent,
                None => terms.push((resolved.symbol, exponent)),
            }
            Ok(())
        }
        UnitExpr::Pow(base, n) => flatten(base, exponent * n, terms, dimension, scale),
        UnitExpr::Mul(lhs, rhs) => {
            flatten(lhs, exponent, terms, dimension, scale)?;
            flatten(rhs, exponent, terms, dimension, scale)
        }
        UnitExpr::Div(lhs, rhs) => {
            flatten(lhs, exponent, terms, dimension, scale)?;
            flatten(rhs, -exponent, terms, dimension, scale)
        }
    }
}

/// Render flattened terms as `num*num/den/den`.
pub(crate) fn render(terms: &[(String, i32)]) -> String {
    let power = |s: &str, e: i32| if e == 1 { s.to_string() } else { format!("{}^{}", s, e) };

    let numerator: Vec<String> = terms
        .iter()
        .filter(|(_, e)| *e > 0)
        .map(|(s, e)| power(s, *e))
        .collect();
    let denominator: Vec<String> = terms
        .iter()
        .filter(|(_, e)| *e < 0)
        .map(|(s, e)| power(s, -e))
        .collect();

    match (numerator.is_empty(), denominator.is_empty()) {
        (true, true) => "dimensionless".to_string(),
        (false, true) => numerator.join("*"),
        (true, false) => format!("1/{}", denominator.join("/")),
        (false, false) => format!("{}/{}", numerator.join("*"), denominator.join("/")),
    }
}

// ============================================================================
// nom grammar
// ============================================================================

fn parse_expr(input: &str) -> IResult<&str, UnitExpr> {
    let (input, first) = parse_term(input)?;
    let (input, rest) = many0(pair(delimited(space0, one_of("*·/"), space0), parse_term)).parse(input)?;

    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '/' => UnitExpr::Div(Box::new(acc), Box::new(rhs)),
        _ => UnitExpr::Mul(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, expr))
}

fn parse_term(input: &str) -> IResult<&str, UnitExpr> {
    let (input, base) = parse_factor(input)?;
    let (input, exponent) = opt(preceded(delimited(space0, char('^'), space0), parse_integer)).parse(input)?;

    Ok(match exponent {
        Some(n) => (input, UnitExpr::Pow(Box::new(base), n)),
        None => (input, base),
    })
}

fn parse_factor(input: &str) -> IResult<&str, UnitExpr> {
    alt((
        delimited(pair(char('('), space0), parse_expr, pair(space0, char(')'))),
        map(char('1'), |_| UnitExpr::One),
        map(parse_symbol, |s: &str| UnitExpr::Symbol(s.to_string())),
    ))
    .parse(input)
}

fn parse_symbol(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphabetic() || c == '%' || c == '_')(input)
}

fn parse_integer(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| s.parse::<i32>())(input)
}
