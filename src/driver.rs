//! Command line options and the pass pipeline used by the `wabbit` binary.

use std::{path::PathBuf, rc::Rc, time::Instant};

use thiserror::Error;
use tracing::info;

use crate::{
    compiler::compiler::generate,
    errors::errors::Error,
    interpreter::interpreter::{run, RunError},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, CheckedProgram},
};

pub const USAGE: &str = if cfg!(feature = "llvm") {
    "usage: wabbit [--run | --emit-ir | --emit-llvm <out.ll>] [--verbose] <file>"
} else {
    "usage: wabbit [--run | --emit-ir] [--verbose] <file>"
};

/// What to do with a program once it checks cleanly.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// Evaluate the program and print its output
    Run,
    /// Print the generated IR module
    EmitIr,
    /// Lower to LLVM and write the `.ll` file to the given path
    #[cfg(feature = "llvm")]
    EmitLlvm(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub backend: Backend,
    pub verbose: bool,
    pub input: PathBuf,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("no input file given")]
    MissingInput,
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("option `{0}` expects a value")]
    MissingValue(String),
    #[error("more than one input file given (`{0}`)")]
    ExtraInput(String),
}

impl Options {
    /// Parses the arguments following the program name.
    pub fn from_args<I>(args: I) -> Result<Options, UsageError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut backend = Backend::Run;
        let mut verbose = false;
        let mut input = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--run" => backend = Backend::Run,
                "--emit-ir" => backend = Backend::EmitIr,
                #[cfg(feature = "llvm")]
                "--emit-llvm" => {
                    let output = args
                        .next()
                        .ok_or_else(|| UsageError::MissingValue(String::from("--emit-llvm")))?;
                    backend = Backend::EmitLlvm(PathBuf::from(output));
                }
                "-v" | "--verbose" => verbose = true,
                flag if flag.starts_with('-') => {
                    return Err(UsageError::UnknownOption(flag.to_string()))
                }
                _ => {
                    if input.is_some() {
                        return Err(UsageError::ExtraInput(arg));
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        Ok(Options {
            backend,
            verbose,
            input: input.ok_or(UsageError::MissingInput)?,
        })
    }
}

/// Result of running a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Lines printed by the evaluated program
    Printed(Vec<String>),
    /// Textual IR module
    Ir(String),
    /// Path of the written LLVM file
    #[cfg(feature = "llvm")]
    Written(PathBuf),
}

/// Runs the front end and the type checker over `source`.
///
/// Lexing and parsing stop at their first error; type checking reports every
/// error it finds.
pub fn check_source(source: &str, file_name: &str) -> Result<CheckedProgram, Vec<Error>> {
    let start = Instant::now();
    let tokens = tokenize(source.to_string(), Some(file_name.to_string())).map_err(|e| vec![e])?;
    info!(elapsed = ?start.elapsed(), tokens = tokens.len(), "tokenized");

    let start = Instant::now();
    let program = parse(tokens, Rc::new(file_name.to_string())).map_err(|e| vec![e])?;
    info!(elapsed = ?start.elapsed(), "parsed");

    let start = Instant::now();
    let result = type_check(&program);
    info!(elapsed = ?start.elapsed(), errors = result.errors.len(), "type checked");

    result.into_checked(program)
}

/// Hands a checked program to the selected backend.
///
/// A failed run still carries the lines printed before the failure; the
/// other backends fail with no output.
pub fn execute(
    program: &CheckedProgram,
    backend: &Backend,
    module_name: &str,
) -> Result<Output, RunError> {
    let start = Instant::now();

    let output = match backend {
        Backend::Run => Output::Printed(run(program)?),
        Backend::EmitIr => Output::Ir(generate(program, module_name)?.to_string()),
        #[cfg(feature = "llvm")]
        Backend::EmitLlvm(path) => {
            let module = generate(program, module_name)?;
            crate::compiler::llvm::write_llvm_ir(&module, path)?;
            Output::Written(path.clone())
        }
    };

    info!(elapsed = ?start.elapsed(), ?backend, "backend finished");

    Ok(output)
}
