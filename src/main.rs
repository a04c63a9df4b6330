//=====================================================
// File: main.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: SolvraExpr CLI entry point
// Objective: Command-line interface for evaluating expressions, running
//            source or .sxc bytecode files, compiling sources and an
//            interactive read-eval-print loop
//=====================================================

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use tracing::{Level, debug, warn};

use solvra_expr::ast::Expr;
use solvra_expr::parser::Parser as StatementParser;
use solvra_expr::vm::{Program, compile};
use solvra_expr::{Fixed, ReaderChars, ResultSink, RuntimeConfig, ScriptError, Session};

#[derive(Parser, Debug)]
#[command(name = "solvra_expr", about = "Fixed-point expression evaluator")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the statements given on the command line.
    Eval(EvalArgs),
    /// Execute a source file or .sxc bytecode.
    Run(RunArgs),
    /// Compile a source file into .sxc bytecode.
    Compile(CompileArgs),
    /// Read `;`-terminated statements from stdin (default).
    Repl,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EvalArgs {
    /// Source text, e.g. "2 + 3 * 4".
    pub expr: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Path to the source or bytecode to execute.
    pub script: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompileArgs {
    /// Input source file.
    pub input: PathBuf,
    /// Output .sxc bytecode file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GlobalOptions {
    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print each statement's tree before execution.
    #[arg(long = "print-ast", global = true)]
    pub print_ast: bool,

    /// Print each statement's bytecode listing before execution.
    #[arg(long = "emit-bytecode", global = true)]
    pub emit_bytecode: bool,

    /// Emit trees, listings and diagnostics as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Trace every executed instruction.
    #[arg(long, global = true)]
    pub trace: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.options);
    let config = load_config(&args.options)?;
    let json = args.options.json;

    match args.command.unwrap_or(Command::Repl) {
        Command::Eval(cmd) => eval_entry(&cmd.expr, config, json),
        Command::Run(cmd) => run_entry(&cmd.script, config, json),
        Command::Compile(cmd) => compile_entry(&cmd.input, &cmd.output, &config),
        Command::Repl => repl_entry(config, json),
    }
}

fn init_tracing(options: &GlobalOptions) {
    let level = match (options.verbose, options.trace) {
        (_, true) | (2.., _) => Level::TRACE,
        (1, _) => Level::DEBUG,
        _ => Level::WARN,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(options: &GlobalOptions) -> Result<RuntimeConfig> {
    let mut config = match options.config.as_deref() {
        Some(path) => RuntimeConfig::load(Some(path))?,
        None => RuntimeConfig::load(None).unwrap_or_else(|err| {
            warn!("ignoring default configuration: {err:#}");
            RuntimeConfig::default()
        }),
    };
    config.print_ast |= options.print_ast;
    config.emit_bytecode |= options.emit_bytecode;
    config.trace |= options.trace;
    debug!(?config, "configuration loaded");
    Ok(config)
}

//=====================================================
//            Console Sink
//=====================================================

struct ConsoleSink {
    precision: usize,
    print_ast: bool,
    emit_bytecode: bool,
    json: bool,
    /// Prefix results with `result:` as the interactive loop does.
    labelled: bool,
}

impl ConsoleSink {
    fn new(config: &RuntimeConfig, json: bool, labelled: bool) -> Self {
        Self {
            precision: config.precision,
            print_ast: config.print_ast,
            emit_bytecode: config.emit_bytecode,
            json,
            labelled,
        }
    }

    fn render(&self, value: Fixed) -> String {
        format!("{value:.prec$}", prec = self.precision)
    }
}

impl ResultSink for ConsoleSink {
    fn result(&mut self, line: usize, value: Fixed) {
        if self.json {
            println!("{}", json!({ "line": line, "result": self.render(value) }));
        } else if self.labelled {
            println!("result: {}", self.render(value));
        } else {
            println!("{}", self.render(value));
        }
    }

    fn print(&mut self, value: Fixed) {
        if self.json {
            println!("{}", json!({ "print": self.render(value) }));
        } else {
            println!("{}", self.render(value));
        }
    }

    fn diagnostic(&mut self, error: &ScriptError) {
        if self.json {
            println!("{}", json!({ "error": error }));
        } else {
            eprintln!("{error}");
        }
    }

    fn parsed(&mut self, expr: &Expr) {
        if !self.print_ast {
            return;
        }
        if self.json {
            println!("{}", json!({ "ast": expr }));
        } else {
            println!("ast: {expr}");
        }
    }

    fn compiled(&mut self, program: &Program) {
        if !self.emit_bytecode {
            return;
        }
        if self.json {
            println!("{}", json!({ "bytecode": program }));
        } else {
            print!("{}", program.listing());
        }
    }
}

//=====================================================
//            Commands
//=====================================================

fn eval_entry(source: &str, config: RuntimeConfig, json: bool) -> Result<()> {
    let mut sink = ConsoleSink::new(&config, json, false);
    let mut session = Session::new(config);
    let summary = session.run(source, &mut sink);
    if summary.failed > 0 {
        return Err(anyhow!("{} of {} statements failed", summary.failed, summary.statements));
    }
    Ok(())
}

fn run_entry(path: &Path, config: RuntimeConfig, json: bool) -> Result<()> {
    if path.extension().is_some_and(|ext| ext == "sxc") {
        return run_sxc_file(path, config, json);
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading source file {}", path.display()))?;
    eval_entry(&source, config, json)
}

fn run_sxc_file(path: &Path, config: RuntimeConfig, json: bool) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("opening bytecode file {}", path.display()))?;
    let program = Program::decode(BufReader::new(file))
        .with_context(|| format!("decoding bytecode file {}", path.display()))?;

    let mut sink = ConsoleSink::new(&config, json, false);
    sink.compiled(&program);
    let mut session = Session::new(config);
    let result = session.execute(&program);
    for value in session.take_output() {
        sink.print(value);
    }
    match result {
        Ok(value) => {
            let line = program.instructions().last().map_or(1, |inst| inst.line);
            sink.result(line, value);
            Ok(())
        }
        Err(err) => {
            sink.diagnostic(&err);
            Err(anyhow!("execution of {} failed", path.display()))
        }
    }
}

fn compile_entry(input: &Path, output: &Path, config: &RuntimeConfig) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("reading source file {}", input.display()))?;
    let tree = StatementParser::from_source(&source)
        .with_max_depth(config.max_depth)
        .parse_program()
        .map_err(ScriptError::from)
        .with_context(|| format!("parsing {}", input.display()))?;
    let program = compile(&tree);

    let file = File::create(output)
        .with_context(|| format!("creating bytecode file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    program
        .encode(&mut writer)
        .with_context(|| format!("writing bytecode to {}", output.display()))?;
    writer.flush()?;
    debug!(instructions = program.len(), output = %output.display(), "compiled");
    Ok(())
}

fn repl_entry(config: RuntimeConfig, json: bool) -> Result<()> {
    let mut sink = ConsoleSink::new(&config, json, true);
    let mut session = Session::new(config);
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut chars = ReaderChars::new(stdin.lock());
    if interactive {
        chars = chars.with_prompt(|| {
            print!("> ");
            if let Err(err) = io::stdout().flush() {
                warn!(%err, "flushing prompt");
            }
        });
    }
    session.run_chars(chars, &mut sink);
    Ok(())
}

//=====================================================
// End of file
//=====================================================
