//! Small nom recognisers for the lexical shapes the statement parser and the
//! expression compiler need to tell apart: identifiers and literals.

use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::{Value, Variable},
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, opt, recognize},
    sequence::{pair, tuple},
    IResult, Parser as NomParser,
};

pub const TRUE_LITERAL: &str = "true";
pub const FALSE_LITERAL: &str = "false";
pub const NIL_LITERAL: &str = "nil";

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

pub fn integer_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1)).parse(input)
}

/// `1.5`, `1.` and `.5`, optionally negated.
pub fn float_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(char('-')),
        alt((
            recognize(tuple((digit1, char('.'), opt(digit1)))),
            recognize(pair(char('.'), digit1)),
        )),
    ))
    .parse(input)
}

pub fn boolean_literal(input: &str) -> IResult<&str, &str> {
    alt((tag(TRUE_LITERAL), tag(FALSE_LITERAL))).parse(input)
}

pub fn nil_literal(input: &str) -> IResult<&str, &str> {
    tag(NIL_LITERAL)(input)
}

/// A double-quoted string whose body may contain backslash escapes. Returns
/// the raw body without the surrounding quotes.
pub fn string_literal(input: &str) -> IResult<&str, &str> {
    let (rest, _) = char('"')(input)?;
    let mut escaped = false;
    for (idx, ch) in rest.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Ok((&rest[idx + 1..], &rest[..idx])),
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn matches_fully<'a>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, &'a str>,
    text: &'a str,
) -> bool {
    all_consuming(parser)(text).is_ok()
}

pub fn is_identifier(text: &str) -> bool {
    matches_fully(identifier, text)
}

pub fn is_literal(text: &str) -> bool {
    let text = text.trim();
    matches_fully(integer_literal, text)
        || matches_fully(float_literal, text)
        || matches_fully(boolean_literal, text)
        || matches_fully(nil_literal, text)
        || matches_fully(string_literal, text)
}

/// Parses a literal according to its lexical shape.
pub fn parse_literal(text: &str) -> RuntimeResult<Variable> {
    let text = text.trim();
    let invalid = || RuntimeError::InvalidLiteral {
        text: text.to_string(),
    };

    if matches_fully(integer_literal, text) {
        // Integers beyond i64 degrade to floats.
        return match text.parse::<i64>() {
            Ok(value) => Ok(Variable::new(Value::Integer(value))),
            Err(_) => text
                .parse::<f64>()
                .map(|value| Variable::new(Value::Float(value)))
                .map_err(|_| invalid()),
        };
    }
    if matches_fully(float_literal, text) {
        return text
            .parse::<f64>()
            .map(|value| Variable::new(Value::Float(value)))
            .map_err(|_| invalid());
    }
    if matches_fully(boolean_literal, text) {
        return Ok(Variable::new(Value::Boolean(text == TRUE_LITERAL)));
    }
    if matches_fully(nil_literal, text) {
        return Ok(Variable::new(Value::Nil));
    }
    if let Ok((_, body)) = all_consuming(string_literal)(text) {
        return Ok(Variable::new(Value::String(unescape(body))));
    }
    Err(invalid())
}

pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                out.push(next);
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn recognises_literal_shapes() {
        assert!(is_literal("42"));
        assert!(is_literal("-7"));
        assert!(is_literal("3.25"));
        assert!(is_literal("true"));
        assert!(is_literal("nil"));
        assert!(is_literal(r#""a \"quoted\" word""#));
        assert!(is_literal("5."));
        assert!(is_literal("-.5"));
        assert!(!is_literal("1.2.3"));
        assert!(!is_literal("."));
        assert!(!is_literal("trueish"));
        assert!(!is_literal("\"open"));
    }

    #[test]
    fn identifiers_start_with_letter_or_underscore() {
        assert!(is_identifier("someVar"));
        assert!(is_identifier("_hidden2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn parses_literals_into_typed_values() {
        assert_eq!(parse_literal("12").unwrap().value, Value::Integer(12));
        assert_eq!(parse_literal("-0.5").unwrap().value, Value::Float(-0.5));
        assert_eq!(parse_literal(".25").unwrap().value, Value::Float(0.25));
        assert_eq!(parse_literal("5.").unwrap().value, Value::Float(5.0));
        assert_eq!(parse_literal("false").unwrap().value, Value::Boolean(false));
        assert_eq!(parse_literal("nil").unwrap().value, Value::Nil);
        assert_eq!(
            parse_literal(r#""say \"hi\"""#).unwrap().value,
            Value::String("say \"hi\"".into())
        );
    }

    #[test]
    fn oversized_integers_degrade_to_float() {
        let parsed = parse_literal("123456789012345678901234").unwrap();
        assert!(matches!(parsed.value, Value::Float(_)));
    }

    #[test]
    fn rejects_non_literals() {
        assert!(matches!(
            parse_literal("abc"),
            Err(RuntimeError::InvalidLiteral { .. })
        ));
    }

    fn literal_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Integer),
            (-1.0e12f64..1.0e12f64).prop_map(Value::Float),
            any::<bool>().prop_map(Value::Boolean),
            ".*".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn printed_literals_parse_back(value in literal_value()) {
            let variable = Variable::new(value);
            let reparsed = parse_literal(&variable.to_literal()).unwrap();
            prop_assert_eq!(reparsed, variable);
        }
    }
}
