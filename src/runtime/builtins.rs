//! The default action table: control flow, output, timing, boolean
//! combinators and type casts.

use crate::language::ast::ActionCall;
use crate::runtime::{
    action::{ExecContext, NativeAction},
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    value::{Value, Variable, VariableType},
};
use std::thread;
use std::time::Duration;

/// A root environment holding every built-in action.
pub fn builtin_environment() -> Environment {
    let mut env = Environment::new();
    register_builtins(&mut env);
    env
}

pub fn register_builtins(env: &mut Environment) {
    env.register_action(
        "if",
        NativeAction::new(|_, args| condition("if", &args)).with_validator(requires_block),
    );
    env.register_action(
        "for",
        NativeAction::new(|_, args| condition("for", &args)).with_validator(requires_block),
    );
    env.register_action("elseIf", NativeAction::new(else_if).with_validator(requires_block));
    env.register_action("else", NativeAction::new(otherwise).with_validator(requires_block));

    env.register_action("print", NativeAction::new(print));
    env.register_action("wait", NativeAction::new(wait));
    env.register_action(
        "pass",
        NativeAction::new(|_, args| {
            at_least("pass", &args, 1)?;
            Ok(args)
        }),
    );

    env.register_action(
        "and",
        NativeAction::new(|_, args| combine("and", &args, 1, |bools| bools.iter().all(|b| *b))),
    );
    env.register_action(
        "or",
        NativeAction::new(|_, args| combine("or", &args, 1, |bools| bools.iter().any(|b| *b))),
    );
    env.register_action(
        "nand",
        NativeAction::new(|_, args| combine("nand", &args, 1, |bools| !bools.iter().all(|b| *b))),
    );
    env.register_action(
        "xor",
        NativeAction::new(|_, args| {
            combine("xor", &args, 2, |bools| bools.iter().filter(|b| **b).count() % 2 == 1)
        }),
    );
    env.register_action(
        "not",
        NativeAction::new(|_, args| {
            exactly("not", &args, 1)?;
            let value = boolean_arg("not", &args[0])?;
            Ok(vec![Variable::from(!value)])
        }),
    );

    for (name, target) in [
        ("toString", VariableType::String),
        ("toInt", VariableType::Integer),
        ("toFloat", VariableType::Float),
        ("toBool", VariableType::Boolean),
    ] {
        env.register_action(
            name,
            NativeAction::new(move |_, args| {
                exactly(name, &args, 1)?;
                Ok(vec![args[0].cast_to(target)?])
            }),
        );
    }
    env.register_action(
        "typeOf",
        NativeAction::new(|_, args| {
            exactly("typeOf", &args, 1)?;
            Ok(vec![Variable::from(args[0].variable_type().to_string())])
        }),
    );
}

fn exactly(name: &str, args: &[Variable], count: usize) -> RuntimeResult<()> {
    if args.len() == count {
        Ok(())
    } else {
        Err(RuntimeError::arity(name, count.to_string(), args.len()))
    }
}

fn at_least(name: &str, args: &[Variable], count: usize) -> RuntimeResult<()> {
    if args.len() >= count {
        Ok(())
    } else {
        Err(RuntimeError::arity(name, format!("at least {count}"), args.len()))
    }
}

fn requires_block(_env: &Environment, call: &ActionCall) -> RuntimeResult<()> {
    if call.has_block() {
        Ok(())
    } else {
        Err(RuntimeError::Validation {
            message: format!("`{}` must be followed by a block", call.name()),
        })
    }
}

/// Truthiness for conditions: booleans as they are, non-empty strings and
/// non-zero numbers are true.
fn truthy(name: &str, value: &Variable) -> RuntimeResult<bool> {
    match &value.value {
        Value::Boolean(b) => Ok(*b),
        Value::String(s) => Ok(!s.is_empty()),
        Value::Integer(n) => Ok(*n != 0),
        Value::Float(x) => Ok(*x != 0.0),
        other => Err(RuntimeError::type_mismatch(format!(
            "`{name}` cannot use {} as a condition",
            other.variable_type()
        ))),
    }
}

fn condition(name: &str, args: &[Variable]) -> RuntimeResult<Vec<Variable>> {
    exactly(name, args, 1)?;
    Ok(vec![Variable::from(truthy(name, &args[0])?)])
}

fn previous_branch_failed(ctx: &ExecContext<'_>) -> bool {
    matches!(
        ctx.last_result().map(|result| &result.value),
        Some(Value::Boolean(false))
    )
}

/// Takes over only while the chain is still open. Once a branch has run, or
/// when there is no preceding branch, it returns nothing so its block is
/// skipped and the chain stays settled.
fn else_if(ctx: &mut ExecContext<'_>, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
    exactly("elseIf", &args, 1)?;
    if !previous_branch_failed(ctx) {
        return Ok(Vec::new());
    }
    condition("elseIf", &args)
}

fn otherwise(ctx: &mut ExecContext<'_>, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
    exactly("else", &args, 0)?;
    Ok(vec![Variable::from(previous_branch_failed(ctx))])
}

fn print(ctx: &mut ExecContext<'_>, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    ctx.emit(line);
    Ok(args)
}

fn wait(ctx: &mut ExecContext<'_>, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
    exactly("wait", &args, 1)?;
    let millis = args[0].to_float()?;
    let delay = Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| RuntimeError::Action {
        name: "wait".into(),
        message: format!("cannot wait {millis} milliseconds"),
    })?;
    if ctx.config.honor_wait {
        thread::sleep(delay);
    }
    Ok(Vec::new())
}

fn boolean_arg(name: &str, value: &Variable) -> RuntimeResult<bool> {
    match value.value {
        Value::Boolean(b) => Ok(b),
        _ => Err(RuntimeError::type_mismatch(format!(
            "`{name}` expects boolean arguments, got {}",
            value.variable_type()
        ))),
    }
}

fn combine(
    name: &str,
    args: &[Variable],
    minimum: usize,
    fold: impl Fn(&[bool]) -> bool,
) -> RuntimeResult<Vec<Variable>> {
    at_least(name, args, minimum)?;
    let bools = args
        .iter()
        .map(|arg| boolean_arg(name, arg))
        .collect::<RuntimeResult<Vec<_>>>()?;
    Ok(vec![Variable::from(fold(&bools))])
}
