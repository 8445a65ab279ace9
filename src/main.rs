use std::{env, fs::read_to_string, process::ExitCode};

use tracing::{error, info, Level};
use wabbit::{
    driver::{check_source, execute, Options, Output, USAGE},
    format_error,
};

fn main() -> ExitCode {
    let options = match Options::from_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("{}\n{}", error, USAGE);
            return ExitCode::from(2);
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if options.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let source = match read_to_string(&options.input) {
        Ok(source) => source,
        Err(err) => {
            error!(input = %options.input.display(), %err, "failed to read input");
            return ExitCode::FAILURE;
        }
    };

    let file_name = options
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| options.input.display().to_string());

    let program = match check_source(&source, &file_name) {
        Ok(program) => program,
        Err(errors) => {
            for error in errors.iter() {
                eprint!("{}", format_error(error, &source));
            }
            return ExitCode::FAILURE;
        }
    };

    match execute(&program, &options.backend, &file_name) {
        Ok(Output::Printed(lines)) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(Output::Ir(text)) => print!("{}", text),
        #[cfg(feature = "llvm")]
        Ok(Output::Written(path)) => info!(output = %path.display(), "wrote llvm module"),
        Err(failure) => {
            for line in failure.output {
                println!("{}", line);
            }
            eprint!("{}", format_error(&failure.error, &source));
            return ExitCode::FAILURE;
        }
    }

    info!("done");

    ExitCode::SUCCESS
}
