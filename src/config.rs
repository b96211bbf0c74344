use std::env;

pub const ECHO_ENV: &str = "BLOCKSCRIPT_ECHO";
pub const NO_WAIT_ENV: &str = "BLOCKSCRIPT_NO_WAIT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Print `print(...)` output to stdout as well as capturing it.
    pub echo_output: bool,
    /// When false, `wait(ms)` returns immediately.
    pub honor_wait: bool,
    /// Name used for the source in diagnostics.
    pub source_name: Option<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            echo_output: false,
            honor_wait: true,
            source_name: None,
        }
    }
}

impl ScriptConfig {
    /// Configuration for command-line runs: echo on unless `BLOCKSCRIPT_ECHO`
    /// says otherwise, waits skipped when `BLOCKSCRIPT_NO_WAIT` is set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let echo_output = lookup(ECHO_ENV).map_or(true, |value| flag(&value));
        let honor_wait = !lookup(NO_WAIT_ENV).is_some_and(|value| flag(&value));
        Self {
            echo_output,
            honor_wait,
            source_name: None,
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_echo(mut self, echo_output: bool) -> Self {
        self.echo_output = echo_output;
        self
    }

    pub fn with_wait(mut self, honor_wait: bool) -> Self {
        self.honor_wait = honor_wait;
        self
    }
}

fn flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ScriptConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScriptConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn cli_defaults_echo_and_wait() {
        let config = config_from(&[]);
        assert!(config.echo_output);
        assert!(config.honor_wait);
    }

    #[test]
    fn env_flags_override_defaults() {
        let config = config_from(&[(ECHO_ENV, "0"), (NO_WAIT_ENV, "1")]);
        assert!(!config.echo_output);
        assert!(!config.honor_wait);

        let config = config_from(&[(NO_WAIT_ENV, "off")]);
        assert!(config.honor_wait);
    }

    #[test]
    fn library_default_is_quiet() {
        let config = ScriptConfig::default();
        assert!(!config.echo_output);
        assert!(config.honor_wait);
    }
}
