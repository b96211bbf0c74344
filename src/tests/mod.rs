//! Whole-script scenarios driven through [`Script`].

use crate::{
    builtin_environment,
    language::errors::SyntaxErrorKind,
    runtime::{
        error::RuntimeError,
        value::{Value, Variable},
    },
    Environment, NativeAction, Script, ScriptConfig, ScriptError,
};
use pretty_assertions::assert_eq;

fn script(source: &str) -> Script {
    Script::from_source("scenario.bks", source, builtin_environment())
        .with_config(ScriptConfig::default().with_wait(false))
}

fn run(source: &str) -> Script {
    let mut script = script(source);
    let finished = script.run().expect("script should run");
    assert!(finished);
    script
}

fn value_of(script: &Script, name: &str) -> Value {
    script
        .environment()
        .get(name)
        .unwrap_or_else(|err| panic!("{name}: {err}"))
        .value
}

fn number_of(script: &Script, name: &str) -> f64 {
    script
        .environment()
        .get(name)
        .and_then(|variable| variable.to_float())
        .unwrap_or_else(|err| panic!("{name}: {err}"))
}

fn runtime_error(source: &str) -> RuntimeError {
    match script(source).run() {
        Err(ScriptError::Runtime(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

fn syntax_error(source: &str) -> SyntaxErrorKind {
    match script(source).run() {
        Err(ScriptError::Syntax(err)) => err.kind,
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn arithmetic_precedence() {
    let script = run("a = 2 + 3 * 4\nb = (2 + 3) * 4\nc = 2 ^ 3 + 1");
    assert_eq!(number_of(&script, "a"), 14.0);
    assert_eq!(number_of(&script, "b"), 20.0);
    assert_eq!(number_of(&script, "c"), 9.0);
}

#[test]
fn unary_minus() {
    let script = run("a = -5 + 3\nb = 3 - -5\nc = 3--5");
    assert_eq!(number_of(&script, "a"), -2.0);
    assert_eq!(number_of(&script, "b"), 8.0);
    assert_eq!(number_of(&script, "c"), 8.0);
}

#[test]
fn strings_concatenate_but_do_not_subtract() {
    let script = run(r#"s = "a" + "b""#);
    assert_eq!(value_of(&script, "s"), Value::String("ab".into()));

    let err = runtime_error(r#"s = "a" - "b""#);
    assert!(matches!(err.root(), RuntimeError::StringOperator { .. }));
}

#[test]
fn division_and_modulo() {
    let err = runtime_error("x = 10 / 0");
    assert_eq!(err.root(), &RuntimeError::DivisionByZero);
    assert_eq!(err.line(), Some(1));

    let script = run("m = 10 % 3");
    assert_eq!(value_of(&script, "m"), Value::Float(1.0));
}

#[test]
fn bare_decimal_points_are_floats() {
    let script = run("x = 5.\ny = .5 + x\nz = -.25");
    assert_eq!(value_of(&script, "x"), Value::Float(5.0));
    assert_eq!(value_of(&script, "y"), Value::Float(5.5));
    assert_eq!(number_of(&script, "z"), -0.25);
}

#[test]
fn oversized_wait_is_a_runtime_error() {
    let err = runtime_error("print(1)\nwait(10 ^ 23)");
    assert!(matches!(err.root(), RuntimeError::Action { name, .. } if name == "wait"));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn nested_blocks_mutate_outer_bindings() {
    let script = run("x = 1\nif(true) {\n  if(true) {\n    x = x + 1\n  }\n  x *= 10\n}");
    assert_eq!(number_of(&script, "x"), 20.0);
}

#[test]
fn declaration_shadows_inside_a_block() {
    let script = run("x = 1\nif(true) {\n  x := 5\n  x = x + 1\n}");
    assert_eq!(value_of(&script, "x"), Value::Integer(1));
}

#[test]
fn if_else_takes_one_branch() {
    let taken = run("y = -1\nif(true){ y = 1 } else { y = 0 }");
    assert_eq!(value_of(&taken, "y"), Value::Integer(1));

    let skipped = run("y = -1\nif(false){ y = 1 } else { y = 0 }");
    assert_eq!(value_of(&skipped, "y"), Value::Integer(0));
}

#[test]
fn else_if_chains_settle_on_the_first_true_branch() {
    let source = |n: i64| {
        format!(
            "n = {n}\nlabel = \"\"\n\
             if(n < 0) {{ label = \"negative\" }}\n\
             elseIf(n == 0) {{ label = \"zero\" }}\n\
             elseIf(n < 10) {{ label = \"small\" }}\n\
             else {{ label = \"large\" }}"
        )
    };
    for (n, expected) in [(-3, "negative"), (0, "zero"), (4, "small"), (40, "large")] {
        let script = run(&source(n));
        assert_eq!(value_of(&script, "label"), Value::String(expected.into()), "n = {n}");
    }
}

#[test]
fn for_is_a_single_shot_condition() {
    let script = run("count = 0\nfor(count < 3) {\n  count += 1\n}");
    assert_eq!(number_of(&script, "count"), 1.0);
}

#[test]
fn control_flow_without_block_fails_validation() {
    let err = runtime_error("print(1)\nif(true)");
    assert!(matches!(err.root(), RuntimeError::Validation { .. }));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn print_output_is_captured() {
    let script = run("name = \"world\"\nprint(\"hello\", name)\nprint(1 + 1, toInt(2.9), nil)");
    assert_eq!(
        script.output(),
        &["hello world".to_string(), "2.0 2 nil".to_string()]
    );
}

#[test]
fn comments_semicolons_and_continuations() {
    let script = run("# setup\nx = 1; y = 2 # inline\nprint(x,\n      y)\n\n");
    assert_eq!(script.output(), &["1 2".to_string()]);
}

#[test]
fn augmented_assignment_needs_a_binding() {
    let err = runtime_error("total += 1");
    assert_eq!(
        err.root(),
        &RuntimeError::UndefinedVariable {
            name: "total".into()
        }
    );
}

#[test]
fn structural_errors() {
    assert_eq!(
        syntax_error("if(true) {\n}\n}"),
        SyntaxErrorKind::UnmatchedClosingBrace
    );
    assert_eq!(
        syntax_error("if(true) {\n print(1)"),
        SyntaxErrorKind::UnmatchedOpeningBrace
    );
    assert_eq!(syntax_error("x = \"open"), SyntaxErrorKind::UnclosedString);
    assert_eq!(syntax_error("print((1)"), SyntaxErrorKind::UnbalancedParens);
    assert_eq!(
        syntax_error("{\n}"),
        SyntaxErrorKind::BlockWithoutAction
    );
}

#[test]
fn errors_abort_but_keep_earlier_effects() {
    let mut script = script("a = 1\nb = missing + 1\nc = 3");
    let err = script.run().expect_err("should fail");
    assert!(matches!(
        err,
        ScriptError::Runtime(ref runtime) if runtime.line() == Some(2)
    ));
    assert_eq!(value_of(&script, "a"), Value::Integer(1));
    assert!(script.environment().lookup_variable("c").is_none());
}

#[test]
fn host_actions_and_globals() {
    let mut env = builtin_environment();
    env.make_variable("limit", Value::Integer(3));
    env.register_action(
        "double",
        NativeAction::new(|_, args| {
            args.iter()
                .map(|arg| Ok(Variable::from(arg.to_float()? * 2.0)))
                .collect()
        }),
    );
    let mut script = Script::from_source("host.bks", "x = double(limit) + 1", env);
    assert!(script.run().expect("run"));
    assert_eq!(number_of(&script, "x"), 7.0);
}

#[test]
fn check_parses_without_running() {
    let mut script = script("x = 1\nprint(x)");
    let block = script.check().expect("check");
    assert_eq!(block.len(), 2);
    assert!(script.output().is_empty());
    assert!(script.environment().lookup_variable("x").is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let mut script = Script::new("does/not/exist.bks", Environment::new());
    assert!(matches!(script.run(), Err(ScriptError::Io { .. })));
}
