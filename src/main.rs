use blockscript::{
    builtin_environment, diagnostics, init_tracing, Script, ScriptConfig, ScriptError,
};
use std::env;
use std::process::ExitCode;

const USAGE: &str = "Usage: blockscript [run|check] <filename.bks>";

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let command = &args[1];
    let filename = &args[2];

    if !filename.ends_with(".bks") {
        eprintln!("Invalid file extension. Only .bks files are allowed.");
        return ExitCode::FAILURE;
    }

    let config = ScriptConfig::from_env().with_source_name(filename.clone());
    let mut script = Script::new(filename, builtin_environment()).with_config(config);

    let result: Result<(), ScriptError> = match command.as_str() {
        "run" => script.run().map(|_| ()),
        "check" => script.check().map(|block| {
            println!("{filename}: ok ({} statements)", block.len());
        }),
        _ => {
            eprintln!("Invalid command. {USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            diagnostics::report(&script.name(), script.text(), &err);
            ExitCode::FAILURE
        }
    }
}
