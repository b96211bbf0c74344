//! Operator classification and the shunting-yard pass that reorders an
//! expression into reverse Polish notation.

use crate::language::{errors::SyntaxErrorKind, token::Operator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpToken {
    Binary(Operator),
    Negate,
    Not,
}

impl OpToken {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            OpToken::Binary(Operator::Or | Operator::Xor) => 0,
            OpToken::Binary(Operator::Multiply | Operator::Divide | Operator::Modulo) => 2,
            OpToken::Negate => 3,
            OpToken::Binary(Operator::Exponent) => 4,
            OpToken::Not => 5,
            OpToken::Binary(_) => 1,
        }
    }

    pub fn is_prefix(self) -> bool {
        matches!(self, OpToken::Negate | OpToken::Not)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element<T> {
    Operand(T),
    Op(OpToken),
    OpenParen,
    CloseParen,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RpnToken<T> {
    Operand(T),
    Op(OpToken),
}

/// Decides what an operator means from the element before it: `-` at the
/// start, after `(` or after another operator negates.
pub fn classify_operator<T>(op: Operator, previous: Option<&Element<T>>) -> OpToken {
    match op {
        Operator::Not => OpToken::Not,
        Operator::Subtract
            if matches!(previous, None | Some(Element::OpenParen) | Some(Element::Op(_))) =>
        {
            OpToken::Negate
        }
        other => OpToken::Binary(other),
    }
}

pub fn to_rpn<T>(elements: Vec<Element<T>>) -> Result<Vec<RpnToken<T>>, SyntaxErrorKind> {
    let mut output = Vec::with_capacity(elements.len());
    let mut stack: Vec<Element<T>> = Vec::new();

    for element in elements {
        match element {
            Element::Operand(operand) => output.push(RpnToken::Operand(operand)),
            Element::OpenParen => stack.push(Element::OpenParen),
            Element::CloseParen => loop {
                match stack.pop() {
                    Some(Element::OpenParen) => break,
                    Some(Element::Op(op)) => output.push(RpnToken::Op(op)),
                    _ => return Err(SyntaxErrorKind::UnbalancedParens),
                }
            },
            Element::Op(op) if op.is_prefix() => stack.push(Element::Op(op)),
            Element::Op(op) => {
                while let Some(Element::Op(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(RpnToken::Op(*top));
                    stack.pop();
                }
                stack.push(Element::Op(op));
            }
        }
    }

    while let Some(element) = stack.pop() {
        match element {
            Element::Op(op) => output.push(RpnToken::Op(op)),
            _ => return Err(SyntaxErrorKind::UnbalancedParens),
        }
    }
    Ok(output)
}
