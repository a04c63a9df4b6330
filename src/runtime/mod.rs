//=====================================================
// File: runtime/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Statement-at-a-time evaluation driver
// Objective: Run each statement through parse, compile and execute,
//            reporting values and diagnostics through an injectable sink
//            and recovering locally from every failure
//=====================================================

use std::io::BufRead;
use std::str::Chars;

use tracing::{debug, warn};

use crate::ast::Expr;
use crate::config::RuntimeConfig;
use crate::interpreter::ScriptError;
use crate::number::Fixed;
use crate::parser::{ParseError, Parser};
use crate::tokenizer::Tokenizer;
use crate::vm::{Program, StackVm, compile};

/// Receives everything a run produces.
pub trait ResultSink {
    /// Value of a statement that evaluated successfully.
    fn result(&mut self, line: usize, value: Fixed);
    /// Value captured by a `print` statement.
    fn print(&mut self, value: Fixed);
    fn diagnostic(&mut self, error: &ScriptError);

    fn parsed(&mut self, _expr: &Expr) {}
    fn compiled(&mut self, _program: &Program) {}
}

/// Sink that keeps everything in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectingSink {
    pub results: Vec<(usize, Fixed)>,
    pub printed: Vec<Fixed>,
    pub diagnostics: Vec<ScriptError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<Fixed> {
        self.results.iter().map(|(_, value)| *value).collect()
    }
}

impl ResultSink for CollectingSink {
    fn result(&mut self, line: usize, value: Fixed) {
        self.results.push((line, value));
    }

    fn print(&mut self, value: Fixed) {
        self.printed.push(value);
    }

    fn diagnostic(&mut self, error: &ScriptError) {
        self.diagnostics.push(error.clone());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub statements: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Owns one machine; statements run strictly one after another.
#[derive(Debug)]
pub struct Session {
    config: RuntimeConfig,
    vm: StackVm,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Session {
    pub fn new(config: RuntimeConfig) -> Self {
        let vm = StackVm::with_capacity(config.stack_capacity).with_trace(config.trace);
        Self { config, vm }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Evaluate every statement and return the last value, stopping at the
    /// first failure. Printed values stay available through `take_output`.
    pub fn evaluate(&mut self, source: &str) -> Result<Fixed, ScriptError> {
        let mut last = None;
        for statement in self.parser(source) {
            let program = compile(&statement?);
            last = Some(self.execute(&program)?);
        }
        last.ok_or_else(|| ParseError::EmptyExpression { line: 1 }.into())
    }

    /// Read-eval-print over a whole source. A failing statement produces one
    /// diagnostic and the loop moves on to the next statement.
    pub fn run(&mut self, source: &str, sink: &mut dyn ResultSink) -> RunSummary {
        self.run_chars(source.chars(), sink)
    }

    /// Same as [`Session::run`] over a character stream. Each statement is
    /// reported as soon as its `;` arrives, and line numbers keep counting
    /// across the whole stream.
    pub fn run_chars<C>(&mut self, chars: C, sink: &mut dyn ResultSink) -> RunSummary
    where
        C: Iterator<Item = char>,
    {
        let mut summary = RunSummary::default();
        let mut parser = Parser::from_chars(chars).with_max_depth(self.config.max_depth);
        while let Some(statement) = parser.next_statement() {
            summary.statements += 1;
            match self.run_statement(statement, sink) {
                Ok((line, value)) => {
                    summary.succeeded += 1;
                    sink.result(line, value);
                }
                Err(err) => {
                    summary.failed += 1;
                    debug!(%err, "statement failed");
                    sink.diagnostic(&err);
                }
            }
        }
        debug!(
            statements = summary.statements,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "run finished"
        );
        summary
    }

    /// Run precompiled bytecode.
    pub fn execute(&mut self, program: &Program) -> Result<Fixed, ScriptError> {
        Ok(self.vm.execute(program)?)
    }

    /// Values printed by `evaluate` or `execute` since the last call.
    pub fn take_output(&mut self) -> Vec<Fixed> {
        self.vm.take_output()
    }

    fn parser<'a>(&self, source: &'a str) -> Parser<Tokenizer<Chars<'a>>> {
        Parser::from_source(source).with_max_depth(self.config.max_depth)
    }

    fn run_statement(
        &mut self,
        statement: Result<Expr, ParseError>,
        sink: &mut dyn ResultSink,
    ) -> Result<(usize, Fixed), ScriptError> {
        let expr = statement?;
        sink.parsed(&expr);
        let program = compile(&expr);
        sink.compiled(&program);
        let result = self.vm.execute(&program);
        for value in self.vm.take_output() {
            sink.print(value);
        }
        Ok((expr.line(), result?))
    }
}

/// Characters of a line-oriented reader, pulled one line at a time.
pub struct ReaderChars<R> {
    reader: R,
    line: Vec<char>,
    cursor: usize,
    before_read: Option<Box<dyn FnMut()>>,
    finished: bool,
}

impl<R: BufRead> ReaderChars<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            cursor: 0,
            before_read: None,
            finished: false,
        }
    }

    /// Run `hook` before every line is requested, e.g. to show a prompt.
    pub fn with_prompt(mut self, hook: impl FnMut() + 'static) -> Self {
        self.before_read = Some(Box::new(hook));
        self
    }
}

impl<R: BufRead> Iterator for ReaderChars<R> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.line.get(self.cursor) {
                self.cursor += 1;
                return Some(*ch);
            }
            if self.finished {
                return None;
            }
            if let Some(hook) = self.before_read.as_mut() {
                hook();
            }
            let mut buffer = String::new();
            match self.reader.read_line(&mut buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line = buffer.chars().collect();
                    self.cursor = 0;
                }
                Err(err) => {
                    warn!(%err, "reading input failed");
                    self.finished = true;
                }
            }
        }
    }
}

//=====================================================
// End of file
//=====================================================
