//! Builds the block tree from normalized lines.

use crate::language::{
    ast::{ActionCall, Block, Call},
    errors::{SyntaxError, SyntaxErrorKind},
    expression::{compile_call, ops::apply_binary, Expression},
    lexer::lex,
    normalizer::{Normalized, NormalizedLine},
    span::Position,
    token::{Operator, Token, TokenKind},
};
use crate::runtime::{
    action::{Action, ExecContext},
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    value::Variable,
};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignMode {
    /// `x = e`: rebinds wherever `x` is visible.
    Assign,
    /// `x := e`: binds in the current scope.
    Declare,
    /// `x OP= e`
    Augmented(Operator),
}

/// The action behind an assignment line.
#[derive(Debug)]
pub struct AssignAction {
    pub target: String,
    pub mode: AssignMode,
    pub expression: Expression,
}

impl Action for AssignAction {
    fn execute(
        &self,
        ctx: &mut ExecContext<'_>,
        _args: Vec<Variable>,
    ) -> RuntimeResult<Vec<Variable>> {
        let values = ctx.evaluate(&self.expression)?;
        let [value] = <[Variable; 1]>::try_from(values).map_err(|values| {
            RuntimeError::arity(&self.target, "1 value for assignment", values.len())
        })?;

        let bound = match self.mode {
            AssignMode::Assign => ctx.env.set_variable(&self.target, value.value),
            AssignMode::Declare => ctx.env.make_variable(&self.target, value.value),
            AssignMode::Augmented(op) => {
                let current = ctx.env.get(&self.target)?;
                let updated = apply_binary(op, &current, &value)?;
                ctx.env.set_variable(&self.target, updated.value)
            }
        };
        Ok(vec![bound])
    }
}

enum Statement {
    Call(Call),
    Assign(AssignAction),
}

/// Parses normalized source into the root block, resolving every action by
/// name against `env`.
pub fn parse(source: &Normalized, env: &Environment) -> Result<Block, SyntaxError> {
    let mut stack: Vec<Block> = vec![Block::new()];

    for line in source.iter() {
        match line.text.as_str() {
            "{" => stack.push(Block::new()),
            "}" => {
                let closed = match (stack.pop(), stack.is_empty()) {
                    (Some(block), false) => block,
                    _ => {
                        return Err(SyntaxError::at(
                            SyntaxErrorKind::UnmatchedClosingBrace,
                            line.origin,
                        ))
                    }
                };
                attach(&mut stack, closed, line.origin)?;
            }
            _ => {
                let statement = parse_line(line, env)?;
                let call = match statement {
                    Statement::Call(call) => call,
                    Statement::Assign(assign) => Call {
                        name: assign.target.clone(),
                        template: Rc::new(assign),
                        arguments: Vec::new(),
                    },
                };
                if let Some(current) = stack.last_mut() {
                    current.actions.push(ActionCall {
                        call,
                        block: None,
                        position: line.origin,
                    });
                }
            }
        }
    }

    let root = match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => root,
        _ => {
            let position = source
                .lines
                .last()
                .map(|line| line.origin)
                .unwrap_or_default();
            return Err(SyntaxError::at(SyntaxErrorKind::UnmatchedOpeningBrace, position));
        }
    };
    tracing::debug!(
        statements = root.len(),
        blocks = root.count_blocks(),
        "parsed script"
    );
    Ok(root)
}

fn attach(stack: &mut [Block], closed: Block, at: Position) -> Result<(), SyntaxError> {
    let owner = stack
        .last_mut()
        .and_then(|parent| parent.actions.last_mut())
        .filter(|call| call.block.is_none());
    match owner {
        Some(call) => {
            call.block = Some(closed);
            Ok(())
        }
        None => Err(SyntaxError::at(SyntaxErrorKind::BlockWithoutAction, at)
            .with_help("a block must follow an action call such as `if(cond)`")),
    }
}

fn parse_line(line: &NormalizedLine, env: &Environment) -> Result<Statement, SyntaxError> {
    let text = line.text.as_str();
    let tokens = lex(text).map_err(|err| SyntaxError::from_lex(err, line))?;
    let span_of = |token: &Token| line.span_at(token.position.offset, token.value.len().max(1));
    let whole_line = line.span();
    let invalid = || SyntaxError::new(SyntaxErrorKind::InvalidLine(text.to_string()), whole_line);

    let Some(first) = tokens.first() else {
        return Err(invalid());
    };
    let TokenKind::Identifier(name) = &first.kind else {
        return Err(invalid());
    };
    let Some(second) = tokens.get(1) else {
        return compile_call(name, "", env)
            .map(Statement::Call)
            .map_err(|kind| SyntaxError::new(kind, span_of(first)));
    };

    let mode = match second.kind {
        TokenKind::Operator(Operator::Assign) => Some(AssignMode::Assign),
        TokenKind::Operator(Operator::Declare) => Some(AssignMode::Declare),
        TokenKind::Operator(op) => op.augmented_base().map(AssignMode::Augmented),
        _ => None,
    };
    if let Some(mode) = mode {
        let rhs = &text[second.end()..];
        if rhs.trim().is_empty() {
            return Err(invalid().with_help("an assignment needs a value after the operator"));
        }
        let expression = Expression::compile(rhs, env)
            .map_err(|kind| SyntaxError::new(kind, whole_line))?;
        return Ok(Statement::Assign(AssignAction {
            target: name.clone(),
            mode,
            expression,
        }));
    }

    if second.kind != TokenKind::ParenOpen {
        return Err(invalid());
    }
    let close = matching_close(&tokens, 1)
        .ok_or_else(|| SyntaxError::new(SyntaxErrorKind::UnbalancedParens, span_of(second)))?;
    if let Some(trailing) = tokens.get(close + 1) {
        return Err(SyntaxError::new(
            SyntaxErrorKind::InvalidCall(text.to_string()),
            span_of(trailing),
        )
        .with_help("nothing may follow the closing parenthesis of a call"));
    }
    let args = &text[second.end()..tokens[close].position.offset];
    compile_call(name, args, env)
        .map(Statement::Call)
        .map_err(|kind| SyntaxError::new(kind, span_of(first)))
}

/// Index of the `)` matching the `(` at `open`.
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::ParenOpen => depth += 1,
            TokenKind::ParenClose => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
