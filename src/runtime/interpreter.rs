use crate::config::ScriptConfig;
use crate::language::{
    ast::{ActionCall, Block},
    expression::evaluate_arguments,
};
use crate::runtime::{
    action::ExecContext,
    environment::Environment,
    error::RuntimeResult,
    value::{Value, Variable},
};

/// Walks block trees. Control flow is not special-cased: a statement whose
/// call returns exactly one boolean runs its trailing block when that boolean
/// is true.
pub struct Interpreter {
    env: Environment,
    config: ScriptConfig,
    output: Vec<String>,
}

impl Interpreter {
    pub fn new(env: Environment, config: ScriptConfig) -> Self {
        Self {
            env,
            config,
            output: Vec::new(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Lines produced by `print` so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Runs every validator in the tree, outermost statements first.
    pub fn validate(&self, block: &Block) -> RuntimeResult<()> {
        for call in &block.actions {
            call.call
                .template
                .validate(&self.env, call)
                .map_err(|err| err.at(call.line()))?;
            if let Some(child) = &call.block {
                self.validate(child)?;
            }
        }
        Ok(())
    }

    /// Validates, then executes `root` in the root scope.
    pub fn run(&mut self, root: &mut Block) -> RuntimeResult<()> {
        self.validate(root)?;
        self.execute_block(root)
    }

    pub fn execute_block(&mut self, block: &mut Block) -> RuntimeResult<()> {
        tracing::debug!(statements = block.len(), depth = self.env.depth(), "enter block");
        block.executed = false;
        block.last_result = None;

        for call in block.actions.iter_mut() {
            let values = self
                .execute_call(call, block.last_result.clone())
                .map_err(|err| err.at(call.line()))?;
            block.last_result = values.first().cloned();

            if let Some(child) = call.block.as_mut() {
                if let [Variable {
                    value: Value::Boolean(true),
                    ..
                }] = values.as_slice()
                {
                    self.execute_child(child)?;
                }
            }
        }

        block.executed = true;
        tracing::debug!(depth = self.env.depth(), "leave block");
        Ok(())
    }

    fn execute_child(&mut self, child: &mut Block) -> RuntimeResult<()> {
        self.env.push_scope();
        let result = self.execute_block(child);
        self.env.pop_scope();
        result
    }

    fn execute_call(
        &mut self,
        call: &ActionCall,
        last_result: Option<Variable>,
    ) -> RuntimeResult<Vec<Variable>> {
        tracing::trace!(action = call.name(), line = call.line(), "execute");
        let mut ctx = ExecContext::new(&mut self.env, &self.config, &mut self.output, last_result);
        let args = evaluate_arguments(&mut ctx, &call.call.arguments)?;
        call.call.template.execute(&mut ctx, args)
    }
}
