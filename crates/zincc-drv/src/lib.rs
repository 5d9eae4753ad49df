//! Compiler driver (spec.md §6): CLI flag parsing, pipeline orchestration
//! (lex → parse → resolve → lower[C xor bytecode] → (codegen) → invoke the
//! system C compiler/linker → optionally run), diagnostic rendering, and
//! exit-code mapping.
//!
//! Everything upstream of this crate is pure library code with no process
//! I/O; this is the spec's "External collaborators" boundary (§1).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;
use clap::Parser as ClapParser;
use thiserror::Error;
use tracing::{debug, info};

use inkwell::context::Context;
use inkwell::OptimizationLevel;

use zincc_par::ParseError;
use zincc_sem::{resolve, ResolveError, ResolvedProgram};
use zincc_util::FileId;

/// `zincc`'s command-line surface (spec.md §6).
#[derive(ClapParser, Debug, Clone)]
#[command(name = "zincc", version, about = "Compiler for the Zinc language")]
pub struct Cli {
    /// Zinc source file to compile.
    pub input: PathBuf,

    /// Output executable name (default: source basename).
    #[arg(short = 'o', value_name = "NAME")]
    pub output: Option<PathBuf>,

    /// Write the generated C translation unit to stdout or NAME.c; do not
    /// invoke the native C compiler.
    #[arg(long)]
    pub emit_c: bool,

    /// (IR path) write the native IR text.
    #[arg(long)]
    pub emit_llvm: bool,

    /// (IR path) write an object file without linking.
    #[arg(long)]
    pub emit_object: bool,

    /// Retain the intermediate C file after linking.
    #[arg(long)]
    pub keep_c: bool,

    /// Execute the produced binary, inheriting stdio, and exit with its
    /// status.
    #[arg(short = 'r', long = "run")]
    pub run: bool,

    /// (IR path) optimization level, 0-3.
    #[arg(short = 'O', default_value_t = 2)]
    pub opt_level: u8,

    /// (IR path) dump bytecode IR.
    #[arg(short = 'd', long = "disassemble")]
    pub disassemble: bool,

    /// Print per-stage tracing on stderr (set `ZINCC_LOG` for finer
    /// control).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Which of the two lowering strategies (spec.md §4.4/§4.5) a compilation
/// uses. Nothing on the CLI names this directly — the driver infers it
/// from whichever flags only make sense on one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Transpile to C and invoke the system C compiler.
    C,
    /// Lower to bytecode, then translate to native code via `zincc-gen`.
    Bytecode,
}

/// Resolved compiler configuration, derived from [`Cli`].
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    /// `None` means the user didn't pass `-o`; `output_path` supplies the
    /// default (source basename, spec.md §6).
    pub output: Option<PathBuf>,
    pub emit_c: bool,
    pub emit_llvm: bool,
    pub emit_object: bool,
    pub keep_c: bool,
    pub run: bool,
    pub opt_level: u8,
    pub disassemble: bool,
    pub verbose: bool,
    pub backend: Backend,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let backend = if cli.emit_llvm || cli.emit_object || cli.disassemble {
            Backend::Bytecode
        } else {
            Backend::C
        };
        Config {
            input: cli.input,
            output: cli.output,
            emit_c: cli.emit_c,
            emit_llvm: cli.emit_llvm,
            emit_object: cli.emit_object,
            keep_c: cli.keep_c,
            run: cli.run,
            opt_level: cli.opt_level.min(3),
            disassemble: cli.disassemble,
            verbose: cli.verbose,
            backend,
        }
    }

    /// The executable/object/IR path to write to: the user's `-o` choice,
    /// or the source file's basename (spec.md §6).
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| match self.input.file_stem() {
            Some(stem) if !stem.is_empty() => PathBuf::from(stem),
            _ => PathBuf::from("a.out"),
        })
    }
}

/// The closed error taxonomy from spec.md §7, aggregated at the driver
/// boundary. Every variant but `Io` and `Tool` wraps a stage crate's own
/// `thiserror` enum unchanged; `Tool` carries an `anyhow::Error` built with
/// `.with_context(..)` at each process-spawn site, since subprocess
/// failures don't have their own per-stage error type to wrap.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] zincc_lex::LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{} error(s) while resolving names", .0.len())]
    Resolve(Vec<ResolveError>),
    #[error(transparent)]
    LowerC(#[from] zincc_lowerc::LowerError),
    #[error(transparent)]
    LowerBc(#[from] zincc_bc::LowerError),
    #[error(transparent)]
    CodeGen(#[from] zincc_gen::CodeGenError),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Tool(#[from] anyhow::Error),
}

impl From<Vec<ResolveError>> for CompileError {
    fn from(errors: Vec<ResolveError>) -> Self {
        CompileError::Resolve(errors)
    }
}

/// What happened after a successful compile — the driver needs this to
/// decide the final process exit code (spec.md §6: `--run`'s exit code
/// overrides the compiler's own 0).
pub enum Outcome {
    /// Compilation (and, if requested, linking) finished; nothing was run.
    Compiled,
    /// `--run` executed the produced binary; carries its exit status.
    Ran(i32),
    /// The downstream C compiler or linker exited non-zero; its own exit
    /// status is surfaced unchanged (spec.md §6).
    ToolFailed(i32),
}

/// Initializes `tracing-subscriber` from `ZINCC_LOG`, matching the
/// teacher's ambient logging convention (SPEC_FULL.md §1). `ZINCC_LOG`
/// always wins when set; `--verbose` only changes the fallback default
/// (`debug` instead of `warn`) when it isn't. Safe to call more than once
/// per process; later calls are no-ops.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ZINCC_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs the whole pipeline for `config`, returning the process exit code
/// (spec.md §6: 0 on success; 1 on any compile error; the native
/// compiler's exit code on downstream failure; the executed program's
/// exit code when `--run` is used and compilation succeeded).
pub fn run(config: &Config) -> i32 {
    match compile(config) {
        Ok(Outcome::Compiled) => 0,
        Ok(Outcome::Ran(status)) => status,
        Ok(Outcome::ToolFailed(status)) => status,
        Err(err) => {
            report(&err);
            1
        }
    }
}

fn report(err: &CompileError) {
    match err {
        CompileError::Resolve(errors) => {
            for e in errors {
                eprintln!("error: {e}");
            }
        }
        other => eprintln!("error: {other}"),
    }
}

fn compile(config: &Config) -> Result<Outcome, CompileError> {
    info!(file = %config.input.display(), "compiling");

    let source = fs::read_to_string(&config.input).map_err(|source| CompileError::Io {
        path: config.input.clone(),
        source,
    })?;

    let file_id = FileId::DUMMY;

    let tokens = {
        let _span = tracing::debug_span!("lex").entered();
        zincc_lex::tokenize(&source, file_id)?
    };
    debug!(tokens = tokens.len(), "lexed");

    let program = {
        let _span = tracing::debug_span!("parse").entered();
        let mut parser = zincc_par::Parser::with_source(tokens, source.clone());
        parser.parse_program()?
    };
    debug!(
        functions = program.functions.len(),
        structs = program.structs.len(),
        "parsed"
    );

    let resolved = {
        let _span = tracing::debug_span!("resolve").entered();
        resolve(program)?
    };
    debug!("resolved");

    match config.backend {
        Backend::C => compile_c_path(config, &resolved),
        Backend::Bytecode => compile_bytecode_path(config, &resolved),
    }
}

fn compile_c_path(config: &Config, resolved: &ResolvedProgram) -> Result<Outcome, CompileError> {
    let c_source = {
        let _span = tracing::debug_span!("lower_c").entered();
        zincc_lowerc::lower_program(resolved)?
    };

    if config.emit_c {
        match &config.output {
            None => print!("{c_source}"),
            Some(out) => {
                let c_path = out.with_extension("c");
                fs::write(&c_path, &c_source).map_err(|source| CompileError::Io {
                    path: c_path,
                    source,
                })?;
            }
        }
        return Ok(Outcome::Compiled);
    }

    let output = config.output_path();
    let c_path = output.with_extension("c");
    fs::write(&c_path, &c_source).map_err(|source| CompileError::Io {
        path: c_path.clone(),
        source,
    })?;

    let status = {
        let _span = tracing::debug_span!("invoke_cc").entered();
        Command::new(std::env::var("CC").unwrap_or_else(|_| "cc".to_string()))
            .arg(&c_path)
            .arg("-o")
            .arg(&output)
            .arg("-lm")
            .status()
    };

    if !config.keep_c {
        let _ = fs::remove_file(&c_path);
    }

    let status = status.with_context(|| format!("failed to invoke the C compiler on `{}`", c_path.display()))?;
    if !status.success() {
        return Ok(Outcome::ToolFailed(status.code().unwrap_or(1)));
    }

    if config.run {
        return run_binary(&output);
    }
    Ok(Outcome::Compiled)
}

fn compile_bytecode_path(
    config: &Config,
    resolved: &ResolvedProgram,
) -> Result<Outcome, CompileError> {
    let mut bc = {
        let _span = tracing::debug_span!("build_bytecode").entered();
        zincc_bc::lower_program(resolved)?
    };

    if config.opt_level >= 1 {
        zincc_bc::fold_constants(&mut bc);
    }

    if config.disassemble {
        print!("{}", zincc_bc::disassemble(&bc));
        if !(config.emit_llvm || config.emit_object) {
            return Ok(Outcome::Compiled);
        }
    }

    let _span = tracing::debug_span!("codegen").entered();
    zincc_gen::init_native_target();
    let target_triple = zincc_gen::host_target_triple();
    let opt_level = match config.opt_level {
        0 => OptimizationLevel::None,
        1 => OptimizationLevel::Less,
        2 => OptimizationLevel::Default,
        _ => OptimizationLevel::Aggressive,
    };

    let context = Context::create();
    let module_name = config
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("zinc_module");
    let mut backend = zincc_gen::LlvmBackend::new(
        &context,
        module_name,
        target_triple.clone(),
        opt_level,
        resolved.structs.clone(),
    );
    backend.compile_program(&bc)?;

    if config.emit_llvm {
        match &config.output {
            None => print!("{}", backend.emit_llvm_ir()),
            Some(out) => {
                let ir_path = out.with_extension("ll");
                backend
                    .write_ir_to_file(&ir_path)
                    .map_err(|source| CompileError::Io { path: ir_path, source })?;
            }
        }
        return Ok(Outcome::Compiled);
    }

    let output = config.output_path();
    let obj_path = output.with_extension("o");
    backend.write_object_file(&obj_path)?;

    if config.emit_object {
        return Ok(Outcome::Compiled);
    }

    let linker = zincc_gen::Linker::new(target_triple);
    linker.link(&[obj_path.as_path()], &output, &[])?;
    let _ = fs::remove_file(&obj_path);

    if config.run {
        return run_binary(&output);
    }
    Ok(Outcome::Compiled)
}

fn run_binary(path: &Path) -> Result<Outcome, CompileError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(".").join(path)
    };
    let status = Command::new(&absolute)
        .status()
        .with_context(|| format!("failed to execute `{}`", absolute.display()))?;
    Ok(Outcome::Ran(status.code().unwrap_or(1)))
}
