//! The expression sub-language.
//!
//! An argument or right-hand side is compiled once at parse time: segmented,
//! classified, reordered into RPN and stored with its nested calls already
//! resolved. Evaluation runs the RPN on a value stack against an
//! [`EvalContext`].

pub mod ops;
pub mod rpn;
pub mod segment;

use crate::language::{
    ast::Call,
    errors::SyntaxErrorKind,
    patterns::{is_identifier, parse_literal},
};
use crate::runtime::{
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    value::Variable,
};
use rpn::{classify_operator, to_rpn, Element, OpToken, RpnToken};
use segment::Segment;

/// Access an expression needs while evaluating.
pub trait EvalContext {
    fn variable(&self, name: &str) -> RuntimeResult<Variable>;
    fn invoke(&mut self, call: &Call, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>>;
}

#[derive(Clone, Debug)]
pub enum Operand {
    Literal(Variable),
    Variable(String),
    Call(Call),
}

#[derive(Clone, Debug)]
enum ExpressionKind {
    Single(Operand),
    Rpn(Vec<RpnToken<Operand>>),
}

#[derive(Clone, Debug)]
pub struct Expression {
    pub source: String,
    kind: ExpressionKind,
}

impl Expression {
    pub fn compile(source: &str, env: &Environment) -> Result<Self, SyntaxErrorKind> {
        let source = source.trim();
        let segments = segment::segment(source)?;
        if segments.is_empty() {
            return Err(SyntaxErrorKind::InvalidExpression("empty expression".into()));
        }

        let mut elements: Vec<Element<Operand>> = Vec::with_capacity(segments.len());
        for segment in segments {
            let element = match segment {
                Segment::Number(text) | Segment::Str(text) => {
                    Element::Operand(Operand::Literal(literal(text)?))
                }
                Segment::Word(word) => match parse_literal(word) {
                    Ok(value) => Element::Operand(Operand::Literal(value)),
                    Err(_) => Element::Operand(Operand::Variable(word.to_string())),
                },
                Segment::Call { name, args } => {
                    Element::Operand(Operand::Call(compile_call(name, args, env)?))
                }
                Segment::Operator(op) => Element::Op(classify_operator(op, elements.last())),
                Segment::OpenParen => Element::OpenParen,
                Segment::CloseParen => Element::CloseParen,
                Segment::OpenBracket | Segment::CloseBracket => {
                    return Err(SyntaxErrorKind::InvalidExpression(
                        "indexing with `[]` is not supported".into(),
                    ))
                }
            };
            elements.push(element);
        }

        let kind = if elements.len() == 1 {
            match elements.pop() {
                Some(Element::Operand(operand)) => ExpressionKind::Single(operand),
                _ => {
                    return Err(SyntaxErrorKind::InvalidExpression(format!(
                        "`{source}` has no operand"
                    )))
                }
            }
        } else {
            ExpressionKind::Rpn(to_rpn(elements)?)
        };

        Ok(Self {
            source: source.to_string(),
            kind,
        })
    }

    /// Evaluates to the produced values. Only a lone call can yield other than
    /// exactly one value.
    pub fn evaluate<C: EvalContext + ?Sized>(&self, ctx: &mut C) -> RuntimeResult<Vec<Variable>> {
        tracing::trace!(expression = %self.source, "evaluate");
        match &self.kind {
            ExpressionKind::Single(Operand::Call(call)) => invoke_call(ctx, call),
            ExpressionKind::Single(operand) => Ok(vec![resolve_operand(ctx, operand)?]),
            ExpressionKind::Rpn(tokens) => Ok(vec![self.run_rpn(ctx, tokens)?]),
        }
    }

    /// Evaluates to a single value, failing on anything else.
    pub fn evaluate_single<C: EvalContext + ?Sized>(&self, ctx: &mut C) -> RuntimeResult<Variable> {
        let mut values = self.evaluate(ctx)?;
        match values.len() {
            1 => Ok(values.remove(0)),
            count => Err(RuntimeError::MalformedExpression {
                message: format!("`{}` produced {count} values, expected 1", self.source),
            }),
        }
    }

    fn run_rpn<C: EvalContext + ?Sized>(
        &self,
        ctx: &mut C,
        tokens: &[RpnToken<Operand>],
    ) -> RuntimeResult<Variable> {
        let mut stack: Vec<Variable> = Vec::new();
        for token in tokens {
            let value = match token {
                RpnToken::Operand(operand) => resolve_operand(ctx, operand)?,
                RpnToken::Op(OpToken::Negate) => ops::negate(&self.pop(&mut stack)?)?,
                RpnToken::Op(OpToken::Not) => ops::not(&self.pop(&mut stack)?)?,
                RpnToken::Op(OpToken::Binary(op)) => {
                    let rhs = self.pop(&mut stack)?;
                    let lhs = self.pop(&mut stack)?;
                    ops::apply_binary(*op, &lhs, &rhs)?
                }
            };
            stack.push(value);
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(result), true) => Ok(result),
            _ => Err(RuntimeError::MalformedExpression {
                message: format!("`{}` does not reduce to one value", self.source),
            }),
        }
    }

    fn pop(&self, stack: &mut Vec<Variable>) -> RuntimeResult<Variable> {
        stack.pop().ok_or_else(|| RuntimeError::MalformedExpression {
            message: format!("`{}` is missing an operand", self.source),
        })
    }
}

fn literal(text: &str) -> Result<Variable, SyntaxErrorKind> {
    parse_literal(text).map_err(|err| SyntaxErrorKind::InvalidExpression(err.to_string()))
}

/// Resolves `name` against the environment and compiles its arguments.
pub fn compile_call(name: &str, args: &str, env: &Environment) -> Result<Call, SyntaxErrorKind> {
    if !is_identifier(name) {
        return Err(SyntaxErrorKind::InvalidCall(name.to_string()));
    }
    let template = env
        .lookup_action(name)
        .ok_or_else(|| SyntaxErrorKind::UndefinedAction(name.to_string()))?;
    let arguments = split_top_level_args(args)
        .into_iter()
        .map(|arg| Expression::compile(arg, env))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Call {
        name: name.to_string(),
        template,
        arguments,
    })
}

fn resolve_operand<C: EvalContext + ?Sized>(ctx: &mut C, operand: &Operand) -> RuntimeResult<Variable> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Variable(name) => ctx.variable(name),
        Operand::Call(call) => {
            let mut values = invoke_call(ctx, call)?;
            if values.len() != 1 {
                return Err(RuntimeError::MalformedExpression {
                    message: format!(
                        "`{}` returned {} values inside an expression",
                        call.name,
                        values.len()
                    ),
                });
            }
            Ok(values.remove(0))
        }
    }
}

fn invoke_call<C: EvalContext + ?Sized>(ctx: &mut C, call: &Call) -> RuntimeResult<Vec<Variable>> {
    let args = evaluate_arguments(ctx, &call.arguments)?;
    ctx.invoke(call, args)
}

/// Evaluates arguments left to right. An argument that does not produce
/// exactly one value is passed on as an array of what it produced.
pub fn evaluate_arguments<C: EvalContext + ?Sized>(
    ctx: &mut C,
    arguments: &[Expression],
) -> RuntimeResult<Vec<Variable>> {
    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        let mut produced = argument.evaluate(ctx)?;
        if produced.len() == 1 {
            values.append(&mut produced);
        } else {
            values.push(Variable::from(produced));
        }
    }
    Ok(values)
}

/// Splits an argument list at commas that are outside parentheses and
/// quotes. Pieces are trimmed and empty pieces dropped.
pub fn split_top_level_args(args: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in args.char_indices() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quote = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&args[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&args[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{action::NativeAction, value::Value};
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Scratch {
        variables: HashMap<String, Variable>,
    }

    impl EvalContext for Scratch {
        fn variable(&self, name: &str) -> RuntimeResult<Variable> {
            self.variables
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.to_string(),
                })
        }

        fn invoke(&mut self, call: &Call, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
            match call.name.as_str() {
                "pair" => Ok(vec![Variable::from(1i64), Variable::from(2i64)]),
                "sum" => {
                    let total = args.iter().map(|a| a.to_float()).sum::<RuntimeResult<f64>>()?;
                    Ok(vec![Variable::from(total)])
                }
                _ => Ok(args),
            }
        }
    }

    fn env() -> Environment {
        let mut env = Environment::new();
        for name in ["pair", "sum", "echo"] {
            env.register_action(name, NativeAction::new(|_, args| Ok(args)));
        }
        env
    }

    fn eval_with(source: &str, scratch: &mut Scratch) -> RuntimeResult<Variable> {
        Expression::compile(source, &env())
            .expect("compile")
            .evaluate_single(scratch)
    }

    fn eval(source: &str) -> RuntimeResult<Variable> {
        eval_with(source, &mut Scratch::default())
    }

    fn number(source: &str) -> f64 {
        eval(source).expect("eval").to_float().expect("number")
    }

    #[test]
    fn precedence() {
        assert_eq!(number("2 + 3 * 4"), 14.0);
        assert_eq!(number("(2 + 3) * 4"), 20.0);
        assert_eq!(number("2 ^ 3 + 1"), 9.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(number("-5 + 3"), -2.0);
        assert_eq!(number("3 - -5"), 8.0);
        assert_eq!(number("3--5"), 8.0);
        assert_eq!(number("-(2 + 3)"), -5.0);
        assert_eq!(number("2 * -(1)"), -2.0);
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval(r#""a" + "b""#).unwrap().value, Value::String("ab".into()));
        assert!(matches!(
            eval(r#""a" - "b""#),
            Err(RuntimeError::StringOperator { .. })
        ));
    }

    #[test]
    fn division_and_modulo() {
        assert_eq!(eval("10 / 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(eval("10 % 3").unwrap().value, Value::Float(1.0));
    }

    #[test]
    fn variables_resolve_through_the_context() {
        let mut scratch = Scratch::default();
        scratch.variables.insert("x".into(), Variable::from(4i64));
        let result = eval_with("x * x > 10 && !false", &mut scratch).unwrap();
        assert_eq!(result.value, Value::Boolean(true));
        assert!(matches!(
            eval("missing + 1"),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn nested_calls_inside_expressions() {
        assert_eq!(number("sum(1, 2 * 3) + 1"), 8.0);
        assert!(matches!(
            eval("pair() + 1"),
            Err(RuntimeError::MalformedExpression { .. })
        ));
    }

    #[test]
    fn lone_call_keeps_every_value() {
        let expression = Expression::compile("pair()", &env()).unwrap();
        let values = expression.evaluate(&mut Scratch::default()).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn multi_value_arguments_become_arrays() {
        let expression = Expression::compile("echo(pair(), 3)", &env()).unwrap();
        let values = expression.evaluate(&mut Scratch::default()).unwrap();
        assert_eq!(
            values,
            vec![
                Variable::from(vec![Variable::from(1i64), Variable::from(2i64)]),
                Variable::from(3i64),
            ]
        );
    }

    #[test]
    fn compile_errors() {
        let env = env();
        assert_eq!(
            Expression::compile("nope(1)", &env).unwrap_err(),
            SyntaxErrorKind::UndefinedAction("nope".into())
        );
        assert_eq!(
            Expression::compile("1 $ 2", &env).unwrap_err(),
            SyntaxErrorKind::UnknownCharacter('$')
        );
        assert!(matches!(
            Expression::compile("a[0]", &env),
            Err(SyntaxErrorKind::InvalidExpression(_))
        ));
        assert!(Expression::compile("   ", &env).is_err());
        assert!(Expression::compile("-", &env).is_err());
    }

    #[test]
    fn dangling_operator_is_malformed() {
        assert!(matches!(
            eval("1 +"),
            Err(RuntimeError::MalformedExpression { .. })
        ));
        assert!(matches!(
            eval("1 2"),
            Err(RuntimeError::MalformedExpression { .. })
        ));
    }

    #[test]
    fn splits_only_top_level_commas() {
        assert_eq!(
            split_top_level_args(r#" 1, f(2, 3) , "a,\"b", , x "#),
            vec!["1", "f(2, 3)", r#""a,\"b""#, "x"]
        );
        assert!(split_top_level_args("").is_empty());
    }

    proptest! {
        #[test]
        fn products_bind_tighter_than_sums(a in -50i64..50, b in -50i64..50, c in -50i64..50) {
            let source = format!("{a} + {b} * {c}");
            prop_assert_eq!(number(&source), (a + b * c) as f64);
        }
    }
}
