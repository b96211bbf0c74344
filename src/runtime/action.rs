use crate::config::ScriptConfig;
use crate::language::{
    ast::{ActionCall, Call},
    expression::{EvalContext, Expression},
};
use crate::runtime::{
    environment::Environment,
    error::RuntimeResult,
    value::Variable,
};
use std::fmt;

/// A named operation scripts can call. Built-ins and host extensions both
/// implement it; the parser resolves a call site to its template once and
/// keeps the call's own arguments and block beside it.
pub trait Action {
    fn execute(&self, ctx: &mut ExecContext<'_>, args: Vec<Variable>)
        -> RuntimeResult<Vec<Variable>>;

    /// Checked once over the parsed tree before the first statement runs.
    fn validate(&self, _env: &Environment, _call: &ActionCall) -> RuntimeResult<()> {
        Ok(())
    }
}

type ExecuteFn = dyn Fn(&mut ExecContext<'_>, Vec<Variable>) -> RuntimeResult<Vec<Variable>>;
type ValidateFn = dyn Fn(&Environment, &ActionCall) -> RuntimeResult<()>;

/// An [`Action`] assembled from closures, for host registration.
pub struct NativeAction {
    execute: Box<ExecuteFn>,
    validate: Option<Box<ValidateFn>>,
}

impl NativeAction {
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(&mut ExecContext<'_>, Vec<Variable>) -> RuntimeResult<Vec<Variable>> + 'static,
    {
        Self {
            execute: Box::new(execute),
            validate: None,
        }
    }

    pub fn with_validator<V>(mut self, validate: V) -> Self
    where
        V: Fn(&Environment, &ActionCall) -> RuntimeResult<()> + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }
}

impl Action for NativeAction {
    fn execute(
        &self,
        ctx: &mut ExecContext<'_>,
        args: Vec<Variable>,
    ) -> RuntimeResult<Vec<Variable>> {
        (self.execute)(ctx, args)
    }

    fn validate(&self, env: &Environment, call: &ActionCall) -> RuntimeResult<()> {
        match &self.validate {
            Some(validate) => validate(env, call),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for NativeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAction")
            .field("validated", &self.validate.is_some())
            .finish()
    }
}

/// What an executing action can see: the scope chain, the result of the
/// previous statement in the enclosing block, the run configuration and the
/// output buffer.
pub struct ExecContext<'a> {
    pub env: &'a mut Environment,
    pub config: &'a ScriptConfig,
    output: &'a mut Vec<String>,
    last_result: Option<Variable>,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        env: &'a mut Environment,
        config: &'a ScriptConfig,
        output: &'a mut Vec<String>,
        last_result: Option<Variable>,
    ) -> Self {
        Self {
            env,
            config,
            output,
            last_result,
        }
    }

    pub fn last_result(&self) -> Option<&Variable> {
        self.last_result.as_ref()
    }

    /// Records a line of script output, echoing it when configured to.
    pub fn emit(&mut self, line: String) {
        if self.config.echo_output {
            println!("{line}");
        }
        self.output.push(line);
    }

    pub fn evaluate(&mut self, expression: &Expression) -> RuntimeResult<Vec<Variable>> {
        expression.evaluate(self)
    }
}

impl EvalContext for ExecContext<'_> {
    fn variable(&self, name: &str) -> RuntimeResult<Variable> {
        self.env.get(name)
    }

    fn invoke(&mut self, call: &Call, args: Vec<Variable>) -> RuntimeResult<Vec<Variable>> {
        tracing::trace!(action = %call.name, args = args.len(), "invoke");
        call.template.execute(self, args)
    }
}
