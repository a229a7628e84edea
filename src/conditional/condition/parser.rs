//! Guard expression parser
//!
//! Parses expressions like:
//! - `active == true`
//! - `status == Status.ACTIVE and total > 100`
//! - `!(kind == 'internal') || #override`
//!
//! `or` binds looser than `and`; parentheses group.

use super::ast::{CompareOp, Expression, Literal, Operand};
use thiserror::Error;

/// Why a guard expression could not be parsed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,

    #[error("unbalanced parentheses or quotes in: {0}")]
    Unbalanced(String),

    #[error("operator '{0}' is missing an operand")]
    MissingOperand(String),

    #[error("could not parse operand: {0}")]
    InvalidOperand(String),
}

/// Parse a guard expression string into an AST
pub fn parse(input: &str) -> Result<Expression, ParseError> {
    check_balanced(input)?;
    parse_expression(input)
}

fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(inner) = strip_enclosing_parens(input) {
        return parse_expression(inner);
    }

    if let Some((left, right)) = split_top_level(input, &[" or ", "||"]) {
        let (left, right) = binary_sides(left, right, "or")?;
        return Ok(Expression::Or(Box::new(left), Box::new(right)));
    }

    if let Some((left, right)) = split_top_level(input, &[" and ", "&&"]) {
        let (left, right) = binary_sides(left, right, "and")?;
        return Ok(Expression::And(Box::new(left), Box::new(right)));
    }

    if let Some(rest) = strip_not(input) {
        if rest.trim().is_empty() {
            return Err(ParseError::MissingOperand("not".to_string()));
        }
        return Ok(Expression::Not(Box::new(parse_expression(rest)?)));
    }

    if let Some(expr) = parse_comparison(input)? {
        return Ok(expr);
    }

    Ok(Expression::Operand(parse_operand(input)?))
}

fn binary_sides(
    left: &str,
    right: &str,
    op: &str,
) -> Result<(Expression, Expression), ParseError> {
    if left.trim().is_empty() || right.trim().is_empty() {
        return Err(ParseError::MissingOperand(op.to_string()));
    }
    Ok((parse_expression(left)?, parse_expression(right)?))
}

fn check_balanced(input: &str) -> Result<(), ParseError> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ParseError::Unbalanced(input.to_string()));
                    }
                }
                _ => {}
            },
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(ParseError::Unbalanced(input.to_string()));
    }
    Ok(())
}

/// Walk `input` and call `visit` with the byte offset of every character
/// that is outside quotes, together with the paren depth at that point.
/// Stops early when `visit` returns `Some`.
fn scan_top_level<T>(input: &str, mut visit: impl FnMut(usize, char, i32) -> Option<T>) -> Option<T> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    continue;
                }
                if c == ')' {
                    depth -= 1;
                }
                if let Some(found) = visit(i, c, depth) {
                    return Some(found);
                }
                if c == '(' {
                    depth += 1;
                }
            }
        }
    }
    None
}

/// `(a and b)` -> `a and b`, but `(a) and (b)` is left alone
fn strip_enclosing_parens(input: &str) -> Option<&str> {
    if !input.starts_with('(') || !input.ends_with(')') {
        return None;
    }
    let last = input.len() - 1;
    let closes_early = scan_top_level(input, |i, c, depth| {
        (c == ')' && depth == 0 && i != last).then_some(())
    });
    match closes_early {
        Some(()) => None,
        None => Some(&input[1..last]),
    }
}

fn split_top_level<'a>(input: &'a str, separators: &[&str]) -> Option<(&'a str, &'a str)> {
    scan_top_level(input, move |i, _, depth| {
        if depth != 0 {
            return None;
        }
        separators
            .iter()
            .find(|sep| input[i..].starts_with(**sep))
            .map(|sep| (&input[..i], &input[i + sep.len()..]))
    })
}

fn strip_not(input: &str) -> Option<&str> {
    if let Some(rest) = input.strip_prefix('!') {
        if !rest.starts_with('=') {
            return Some(rest);
        }
    }
    if let Some(rest) = input.strip_prefix("not") {
        if rest.starts_with(' ') || rest.starts_with('(') {
            return Some(rest);
        }
    }
    None
}

fn parse_comparison(input: &str) -> Result<Option<Expression>, ParseError> {
    // Try operators in order of length (longest first)
    let operators = [
        ("!=", CompareOp::NotEq),
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        ("==", CompareOp::Eq),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
        (" contains ", CompareOp::Contains),
    ];

    for (op_str, op) in operators {
        if let Some(pos) = find_operator(input, op_str) {
            let left_str = input[..pos].trim();
            let right_str = input[pos + op_str.len()..].trim();
            if left_str.is_empty() || right_str.is_empty() {
                return Err(ParseError::MissingOperand(op.to_string()));
            }
            let left = parse_operand(left_str)?;
            let right = parse_operand(right_str)?;
            return Ok(Some(Expression::Compare { left, op, right }));
        }
    }

    Ok(None)
}

fn find_operator(input: &str, op: &str) -> Option<usize> {
    scan_top_level(input, |i, _, _| input[i..].starts_with(op).then_some(i))
}

fn parse_operand(input: &str) -> Result<Operand, ParseError> {
    let input = input.trim();

    if let Some(literal) = parse_literal(input) {
        return Ok(Operand::Literal(literal));
    }

    // `#name` is accepted as a plain name
    let name = input.strip_prefix('#').unwrap_or(input);
    if is_name(name) {
        return Ok(Operand::Name(name.to_string()));
    }

    Err(ParseError::InvalidOperand(input.to_string()))
}

fn parse_literal(input: &str) -> Option<Literal> {
    // Null
    if input == "null" {
        return Some(Literal::Null);
    }

    // Boolean
    if input == "true" {
        return Some(Literal::Boolean(true));
    }
    if input == "false" {
        return Some(Literal::Boolean(false));
    }

    // String (single or double quotes)
    if input.len() >= 2
        && ((input.starts_with('\'') && input.ends_with('\''))
            || (input.starts_with('"') && input.ends_with('"')))
    {
        let s = &input[1..input.len() - 1];
        return Some(Literal::String(s.to_string()));
    }

    // Number
    let starts_numeric = input
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
        .unwrap_or(false);
    if starts_numeric {
        if let Ok(i) = input.parse::<i64>() {
            return Some(Literal::Integer(i));
        }
        if let Ok(n) = input.parse::<f64>() {
            if n.is_finite() {
                return Some(Literal::Number(n));
            }
        }
    }

    None
}

fn is_name(input: &str) -> bool {
    let mut chars = input.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false);
    first_ok
        && !input.ends_with('.')
        && !input.contains("..")
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Operand {
        Operand::Name(s.to_string())
    }

    fn lit(l: Literal) -> Operand {
        Operand::Literal(l)
    }

    #[test]
    fn test_parse_simple_equality() {
        let expr = parse("active == true").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("active"),
                op: CompareOp::Eq,
                right: lit(Literal::Boolean(true)),
            }
        );
    }

    #[test]
    fn test_parse_not_equal_string() {
        let expr = parse("status != 'done'").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("status"),
                op: CompareOp::NotEq,
                right: lit(Literal::String("done".to_string())),
            }
        );
    }

    #[test]
    fn test_parse_numeric_comparisons() {
        for (text, op) in [
            ("total > 0.8", CompareOp::Gt),
            ("total >= 0.8", CompareOp::Gte),
            ("total < 0.8", CompareOp::Lt),
            ("total <= 0.8", CompareOp::Lte),
        ] {
            assert_eq!(
                parse(text).unwrap(),
                Expression::Compare {
                    left: name("total"),
                    op,
                    right: lit(Literal::Number(0.8)),
                },
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_parse_constant_reference() {
        let expr = parse("status == Status.ACTIVE").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("status"),
                op: CompareOp::Eq,
                right: name("Status.ACTIVE"),
            }
        );
    }

    #[test]
    fn test_parse_hash_variable() {
        let expr = parse("#active == false").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("active"),
                op: CompareOp::Eq,
                right: lit(Literal::Boolean(false)),
            }
        );
    }

    #[test]
    fn test_parse_contains() {
        let expr = parse("tags contains 'vip'").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("tags"),
                op: CompareOp::Contains,
                right: lit(Literal::String("vip".to_string())),
            }
        );
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let expr = parse("a == 1 and b == 2 or c == 3").unwrap();
        match expr {
            Expression::Or(left, right) => {
                assert!(matches!(*left, Expression::And(_, _)));
                assert!(matches!(*right, Expression::Compare { .. }));
            }
            other => panic!("Expected Or expression, got {:?}", other),
        }
    }

    #[test]
    fn test_symbolic_logical_operators() {
        let expr = parse("a == 1 && b == 2 || c").unwrap();
        match expr {
            Expression::Or(left, right) => {
                assert!(matches!(*left, Expression::And(_, _)));
                assert_eq!(*right, Expression::Operand(name("c")));
            }
            other => panic!("Expected Or expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_group() {
        let expr = parse("a == 1 and (b == 2 or c == 3)").unwrap();
        match expr {
            Expression::And(_, right) => assert!(matches!(*right, Expression::Or(_, _))),
            other => panic!("Expected And expression, got {:?}", other),
        }
    }

    #[test]
    fn test_separate_groups_are_not_stripped() {
        let expr = parse("(a) and (b)").unwrap();
        assert_eq!(
            expr,
            Expression::And(
                Box::new(Expression::Operand(name("a"))),
                Box::new(Expression::Operand(name("b")))
            )
        );
    }

    #[test]
    fn test_parse_not() {
        assert_eq!(
            parse("!active").unwrap(),
            Expression::Not(Box::new(Expression::Operand(name("active"))))
        );
        assert_eq!(
            parse("not (active)").unwrap(),
            Expression::Not(Box::new(Expression::Operand(name("active"))))
        );
        // `nothing` is a name, not `not hing`
        assert_eq!(parse("nothing").unwrap(), Expression::Operand(name("nothing")));
    }

    #[test]
    fn test_operator_inside_string_is_ignored() {
        let expr = parse("note == 'a and b'").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                left: name("note"),
                op: CompareOp::Eq,
                right: lit(Literal::String("a and b".to_string())),
            }
        );
    }

    #[test]
    fn test_bare_literals() {
        assert_eq!(
            parse("true").unwrap(),
            Expression::Operand(lit(Literal::Boolean(true)))
        );
        assert_eq!(
            parse("42").unwrap(),
            Expression::Operand(lit(Literal::Integer(42)))
        );
        assert_eq!(parse("null").unwrap(), Expression::Operand(lit(Literal::Null)));
        assert_eq!(
            parse(r#""text""#).unwrap(),
            Expression::Operand(lit(Literal::String("text".to_string())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("(a == 1"), Err(ParseError::Unbalanced(_))));
        assert!(matches!(parse("a == 'x"), Err(ParseError::Unbalanced(_))));
        assert!(matches!(parse("a =="), Err(ParseError::MissingOperand(_))));
        assert!(matches!(parse("a &&"), Err(ParseError::MissingOperand(_))));
        assert!(matches!(
            parse("this is not valid"),
            Err(ParseError::InvalidOperand(_))
        ));
    }
}
