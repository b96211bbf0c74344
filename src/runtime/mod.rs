pub mod action;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod value;

pub use action::{Action, ExecContext, NativeAction};
pub use builtins::builtin_environment;
pub use environment::Environment;
pub use interpreter::Interpreter;
