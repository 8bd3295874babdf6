//! The Assembler module is in charge of taking a
//! pasm file and producing a Vec<Instruction> from the
//! AST submodule.
//!
//! It does this by implementing a single-lookahead tokenizer
//! and a binding-power (Pratt) parser for operand expressions.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
