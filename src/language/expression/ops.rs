use crate::language::token::Operator;
use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::{Value, Variable},
};

enum Operands {
    Strings(String, String),
    Numbers(f64, f64),
}

/// Brings two operands to a common representation: both strings when either
/// one is a string, both floats otherwise.
fn unify(op: Operator, lhs: &Variable, rhs: &Variable) -> RuntimeResult<Operands> {
    for side in [lhs, rhs] {
        match side.value {
            Value::Nil | Value::Invalid | Value::Array(_) => {
                return Err(RuntimeError::type_mismatch(format!(
                    "operator `{op}` cannot take {} operands",
                    side.variable_type()
                )))
            }
            _ => {}
        }
    }
    let stringly = matches!(lhs.value, Value::String(_)) || matches!(rhs.value, Value::String(_));
    if stringly {
        Ok(Operands::Strings(lhs.to_string_value()?, rhs.to_string_value()?))
    } else {
        Ok(Operands::Numbers(lhs.to_float()?, rhs.to_float()?))
    }
}

pub fn apply_binary(op: Operator, lhs: &Variable, rhs: &Variable) -> RuntimeResult<Variable> {
    let value = match op {
        Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
            match unify(op, lhs, rhs)? {
                Operands::Strings(a, b) if op == Operator::Add => Value::String(a + &b),
                Operands::Strings(..) => return Err(RuntimeError::StringOperator { operator: op }),
                Operands::Numbers(_, b) if op == Operator::Divide && b == 0.0 => {
                    return Err(RuntimeError::DivisionByZero)
                }
                Operands::Numbers(a, b) => Value::Float(match op {
                    Operator::Add => a + b,
                    Operator::Subtract => a - b,
                    Operator::Multiply => a * b,
                    _ => a / b,
                }),
            }
        }
        // Always floating point; `x % 0` is NaN.
        Operator::Modulo => Value::Float(lhs.to_float()? % rhs.to_float()?),
        Operator::Exponent => Value::Float(lhs.to_float()?.powf(rhs.to_float()?)),
        Operator::And => Value::Boolean(lhs.to_bool()? && rhs.to_bool()?),
        Operator::Or => Value::Boolean(lhs.to_bool()? || rhs.to_bool()?),
        Operator::Xor => Value::Boolean(lhs.to_bool()? ^ rhs.to_bool()?),
        op if op.is_comparison() => Value::Boolean(compare(op, lhs, rhs)?),
        other => {
            return Err(RuntimeError::MalformedExpression {
                message: format!("`{other}` is not a binary operator"),
            })
        }
    };
    Ok(Variable::new(value))
}

fn compare(op: Operator, lhs: &Variable, rhs: &Variable) -> RuntimeResult<bool> {
    match unify(op, lhs, rhs)? {
        Operands::Strings(a, b) => match op {
            Operator::Equal => Ok(a == b),
            Operator::NotEqual => Ok(a != b),
            _ => Err(RuntimeError::StringOperator { operator: op }),
        },
        Operands::Numbers(a, b) => Ok(match op {
            Operator::Equal => a == b,
            Operator::NotEqual => a != b,
            Operator::Less => a < b,
            Operator::LessEqual => a <= b,
            Operator::Greater => a > b,
            _ => a >= b,
        }),
    }
}

pub fn negate(operand: &Variable) -> RuntimeResult<Variable> {
    match operand.value {
        Value::Integer(_) | Value::Float(_) => Ok(Variable::new(Value::Float(-operand.to_float()?))),
        _ => Err(RuntimeError::type_mismatch(format!(
            "cannot negate {}",
            operand.variable_type()
        ))),
    }
}

pub fn not(operand: &Variable) -> RuntimeResult<Variable> {
    Ok(Variable::new(Value::Boolean(!operand.to_bool()?)))
}
