//=====================================================
// File: lib.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: SolvraExpr library root
// Objective: Expose the fixed-point library, token stream, parser, bytecode
//            backend, tree interpreter and session driver
//=====================================================

pub mod ast;
pub mod config;
pub mod interpreter;
pub mod number;
pub mod parser;
pub mod runtime;
pub mod tokenizer;
pub mod vm;

pub use config::RuntimeConfig;
pub use interpreter::{ErrorCode, ScriptError};
pub use number::Fixed;
pub use runtime::{CollectingSink, ReaderChars, ResultSink, RunSummary, Session};

//=====================================================
// End of file
//=====================================================
