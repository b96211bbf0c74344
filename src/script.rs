use crate::config::ScriptConfig;
use crate::error::ScriptError;
use crate::language::{
    ast::Block,
    normalizer::{normalize, Normalized},
    statement::parse,
};
use crate::runtime::{environment::Environment, interpreter::Interpreter};
use std::fs;
use std::path::{Path, PathBuf};

enum Source {
    File(PathBuf),
    Text { name: String, text: String },
}

/// A script bound to the environment it runs against.
pub struct Script {
    source: Source,
    interpreter: Interpreter,
    text: Option<String>,
}

impl Script {
    /// A script read from `path` when it runs.
    pub fn new(path: impl Into<PathBuf>, env: Environment) -> Self {
        Self {
            source: Source::File(path.into()),
            interpreter: Interpreter::new(env, ScriptConfig::default()),
            text: None,
        }
    }

    pub fn from_source(name: impl Into<String>, text: impl Into<String>, env: Environment) -> Self {
        Self {
            source: Source::Text {
                name: name.into(),
                text: text.into(),
            },
            interpreter: Interpreter::new(env, ScriptConfig::default()),
            text: None,
        }
    }

    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        let env = std::mem::take(self.interpreter.env_mut());
        self.interpreter = Interpreter::new(env, config);
        self
    }

    pub fn name(&self) -> String {
        if let Some(name) = &self.interpreter.config().source_name {
            return name.clone();
        }
        match &self.source {
            Source::File(path) => path.display().to_string(),
            Source::Text { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Text { .. } => None,
        }
    }

    /// The source text, once it has been loaded.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn load(&mut self) -> Result<Normalized, ScriptError> {
        let text = match &self.source {
            Source::File(path) => fs::read_to_string(path).map_err(|source| ScriptError::Io {
                path: path.clone(),
                source,
            })?,
            Source::Text { text, .. } => text.clone(),
        };
        let normalized = normalize(&text);
        self.text = Some(text);
        Ok(normalized?)
    }

    fn compile(&mut self) -> Result<Block, ScriptError> {
        let normalized = self.load()?;
        Ok(parse(&normalized, self.interpreter.env())?)
    }

    /// Loads, parses and validates without executing anything.
    pub fn check(&mut self) -> Result<Block, ScriptError> {
        let block = self.compile()?;
        self.interpreter.validate(&block)?;
        Ok(block)
    }

    /// Loads, parses and executes the script. Returns `true` when the root
    /// block ran to completion.
    #[tracing::instrument(level = "debug", skip_all, fields(script = %self.name()))]
    pub fn run(&mut self) -> Result<bool, ScriptError> {
        let mut root = self.compile()?;
        self.interpreter.run(&mut root)?;
        Ok(root.executed)
    }

    pub fn environment(&self) -> &Environment {
        self.interpreter.env()
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        self.interpreter.env_mut()
    }

    /// Lines printed by the script.
    pub fn output(&self) -> &[String] {
        self.interpreter.output()
    }
}
