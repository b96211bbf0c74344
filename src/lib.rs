#![allow(clippy::collapsible_if)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod language;
pub mod runtime;
pub mod script;

pub use config::ScriptConfig;
pub use error::ScriptError;
pub use runtime::{builtin_environment, Action, Environment, ExecContext, NativeAction};
pub use script::Script;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, e.g.
/// `RUST_LOG=blockscript=trace`. Does nothing when the variable is unset, and
/// only the first call has an effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
