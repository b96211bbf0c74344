use crate::{error::ScriptError, language::errors::SyntaxError, runtime::error::RuntimeError};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource, err: &SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help.clone(),
            message: format!(
                "{} (line {}, column {})",
                err.message(),
                err.span.line(),
                err.span.column()
            ),
            label: err.message(),
        }
    }
}

pub fn emit_syntax_error(name: &str, source: &str, err: &SyntaxError) {
    let src = NamedSource::new(name, source.to_string());
    let diagnostic = SyntaxDiagnostic::from_error(src, err);
    eprintln!("{:?}", Report::new(diagnostic));
}

pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("Runtime error: {}", error);
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}

/// Prints any script failure in the form that suits it.
pub fn report(name: &str, text: Option<&str>, error: &ScriptError) {
    match error {
        ScriptError::Io { path, source } => report_io_error(path, source),
        ScriptError::Syntax(err) => match text {
            Some(source) => emit_syntax_error(name, source, err),
            None => eprintln!("Syntax error: {err}"),
        },
        ScriptError::Runtime(err) => report_runtime_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builtin_environment, Script};
    use miette::{GraphicalReportHandler, GraphicalTheme};

    fn syntax_error(source: &str) -> SyntaxError {
        match Script::from_source("input.bks", source, builtin_environment()).check() {
            Err(ScriptError::Syntax(err)) => err,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    fn render(source: &str, err: &SyntaxError) -> String {
        let diagnostic =
            SyntaxDiagnostic::from_error(NamedSource::new("input.bks", source.to_string()), err);
        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .render_report(&mut out, &diagnostic)
            .expect("render");
        out
    }

    #[test]
    fn labels_land_on_character_boundaries() {
        let source = "x = é@";
        let err = syntax_error(source);
        assert_eq!((err.span.line(), err.span.column()), (1, 6));
        assert_eq!(&source[err.span.start.offset..][..err.span.len()], "@");

        let rendered = render(source, &err);
        assert!(rendered.contains("unrecognized character '@'"), "{rendered}");
        assert!(rendered.contains("x = é@"), "{rendered}");

        let report = Report::new(SyntaxDiagnostic::from_error(
            NamedSource::new("input.bks", source.to_string()),
            &err,
        ));
        assert!(format!("{report:?}").contains("line 1, column 6"));
    }

    #[test]
    fn continuation_errors_render_on_their_own_line() {
        let source = "print(\"ééééé\", 1,\n  2 @ 3)";
        let err = syntax_error(source);
        assert_eq!((err.span.line(), err.span.column()), (2, 5));

        let rendered = render(source, &err);
        assert!(rendered.contains("(line 2, column 5)"), "{rendered}");
        assert!(rendered.contains("2 @ 3)"), "{rendered}");
    }
}
