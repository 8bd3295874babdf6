//! This AST describes a parsed pasm file.
//!
//! A file is a list of [`Instruction`]s. Each instruction is an opcode
//! followed by zero or more operand [`Expression`]s, and an operand is
//! either a bare [`Atom`] or an arithmetic [`Operation`] over other
//! expressions. Square brackets only group: they never show up as nodes.
//!
//! ```nasm
//! start:  mov [base + index*4], value   ; two operands
//!         add r1, 1 + 2 * 3
//!         nop                           ; zero operands
//!         jmp start                     ; `start` is a label reference
//! ```
//!
//! Opcodes and operand counts are not validated here.
use std::collections::HashSet;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AtomKind {
    Regular,
    LabelReference,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OperationKind {
    Instruction,
    Arithmetic,
}

/// A leaf: a number, a bare identifier or a label name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Atom {
    pub value: String,
    pub kind: AtomKind,
}

/// An interior node. `binding_power` is the operator's left binding power at
/// the time the node was built; it is kept for display only.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Operation {
    pub op: String,
    pub kind: OperationKind,
    pub operands: Vec<Expression>,
    pub binding_power: u8,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expression {
    Atom(Atom),
    Operation(Operation),
}

impl Expression {
    pub fn atom(value: impl Into<String>) -> Self {
        Expression::Atom(Atom { value: value.into(), kind: AtomKind::Regular })
    }

    pub fn label_reference(value: impl Into<String>) -> Self {
        Expression::Atom(Atom { value: value.into(), kind: AtomKind::LabelReference })
    }

    /// Builds a binary arithmetic node from its two sides.
    pub fn arithmetic(op: impl Into<String>, lhs: Expression, rhs: Expression, binding_power: u8) -> Self {
        Expression::Operation(Operation {
            op: op.into(),
            kind: OperationKind::Arithmetic,
            operands: vec![lhs, rhs],
            binding_power,
        })
    }

    /// Tags every regular atom naming one of `labels` as a label reference.
    pub(crate) fn tag_label_references(&mut self, labels: &HashSet<String>) {
        match self {
            Expression::Atom(atom) => {
                if atom.kind == AtomKind::Regular && labels.contains(&atom.value) {
                    atom.kind = AtomKind::LabelReference;
                }
            }
            Expression::Operation(op) => {
                for operand in op.operands.iter_mut() {
                    operand.tag_label_references(labels);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Atom(atom) => write!(f, "{}", atom.value),
            Expression::Operation(op) => write!(f, "{}", op),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|e| e.to_string()).collect();
        match self.kind {
            OperationKind::Arithmetic => {
                write!(f, "({})", operands.join(format!(" {} ", self.op).as_str()))
            }
            OperationKind::Instruction => write!(f, "{} {}", self.op, operands.join(", ")),
        }
    }
}

/// One source instruction, with any labels defined right before it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub labels: Vec<String>,
    pub opcode: String,
    pub operands: Vec<Expression>,
    pub line: usize,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>, operands: Vec<Expression>, line: usize) -> Self {
        Instruction { labels: Vec::new(), opcode: opcode.into(), operands, line }
    }

    /// The instruction as a single expression tree. An instruction without
    /// operands is just its opcode atom, so no `Operation` is ever childless.
    pub fn to_expression(&self) -> Expression {
        if self.operands.is_empty() {
            Expression::atom(self.opcode.clone())
        } else {
            Expression::Operation(Operation {
                op: self.opcode.clone(),
                kind: OperationKind::Instruction,
                operands: self.operands.clone(),
                binding_power: 0,
            })
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{}", self.to_expression())
    }
}
