use crate::runtime::{
    action::Action,
    error::{RuntimeError, RuntimeResult},
    value::{Value, Variable},
};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Scope {
    actions: HashMap<String, Rc<dyn Action>>,
    variables: HashMap<String, Variable>,
}

/// The scope chain. The first scope is the root and lives as long as the
/// environment; each executing block pushes one scope on top of it.
#[derive(Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for scope in &self.scopes {
            let mut actions: Vec<&String> = scope.actions.keys().collect();
            actions.sort();
            list.entry(&(actions, &scope.variables));
        }
        list.finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Drops the innermost scope. The root scope is never removed.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn current(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }

    pub fn lookup_variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.variables.get_mut(name))
    }

    pub fn lookup_action(&self, name: &str) -> Option<Rc<dyn Action>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.actions.get(name))
            .cloned()
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Variable> {
        self.lookup_variable(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Rebinds `name` wherever it is visible, or creates it in the innermost
    /// scope when no scope knows it.
    pub fn set_variable(&mut self, name: &str, value: Value) -> Variable {
        if let Some(existing) = self.lookup_variable_mut(name) {
            existing.value = value;
            existing.selectors.clear();
            return existing.clone();
        }
        self.make_variable(name, value)
    }

    /// Always binds in the innermost scope, shadowing outer bindings.
    pub fn make_variable(&mut self, name: &str, value: Value) -> Variable {
        let variable = Variable::named(name, value);
        self.current()
            .variables
            .insert(name.to_string(), variable.clone());
        variable
    }

    pub fn register_action(&mut self, name: &str, action: impl Action + 'static) {
        self.register_shared_action(name, Rc::new(action));
    }

    pub fn register_shared_action(&mut self, name: &str, action: Rc<dyn Action>) {
        self.current().actions.insert(name.to_string(), action);
    }

    /// Removes the nearest binding of `name`, returning it.
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.variables.remove(name))
    }

    pub fn remove_action(&mut self, name: &str) -> Option<Rc<dyn Action>> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.actions.remove(name))
    }

    /// Forgets every binding and nested scope, leaving an empty root.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::default());
    }

    /// Drops variables only, keeping registered actions.
    pub fn clear_variables(&mut self) {
        self.scopes.truncate(1);
        for scope in &mut self.scopes {
            scope.variables.clear();
        }
    }
}
