//! Front end for the pasm assembly language: source text in, a list of
//! instructions with operand expression trees out.
#[macro_use] extern crate log;
extern crate thiserror;

pub mod assembler;
