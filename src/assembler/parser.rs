//! The Parser module takes a token stream (Vec<Token>) from the Tokenizer
//! and converts it into a list of instructions.
//!
//! Operands are parsed with binding powers (Pratt parsing). Each infix
//! operator has a `(left, right)` pair; the higher pair binds tighter and
//! the asymmetry between the two halves picks the associativity.
use std::collections::HashSet;

use super::ast::*;
use super::error::{Error, SyntaxError};
use super::lexer::{Token, TokenKind};

/// How operators of equal precedence group.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Associativity {
    /// `1 - 2 - 3` is `(1 - 2) - 3`, and `2 * 3 + 1` is `(2 * 3) + 1`.
    Left,
    /// Every right-hand side swallows the rest of the operand, ignoring
    /// precedence: `1 - 2 - 3` is `1 - (2 - 3)` and `2 * 3 + 1` is
    /// `2 * (3 + 1)`. Kept for sources written against that behaviour.
    Right,
}

impl Default for Associativity {
    fn default() -> Self {
        Associativity::Left
    }
}

/// Infix binding powers as `(left, right)`. `(0, 0)` means the token is not
/// an infix operator. There are no prefix operators.
pub fn infix_binding_power(kind: TokenKind) -> (u8, u8) {
    match kind {
        TokenKind::Add | TokenKind::Subtract => (10, 11),
        TokenKind::Multiply => (20, 21),
        _ => (0, 0),
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    associativity: Associativity,
}

impl Parser {
    /// Appends an `EndOfInput` sentinel if the sequence does not already
    /// end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().map_or(false, Token::is_eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line(), t.column() + 1));
            tokens.push(Token::new(TokenKind::EndOfInput, "", line, column));
        }
        Parser { tokens, cursor: 0, associativity: Associativity::default() }
    }

    pub fn with_associativity(mut self, associativity: Associativity) -> Self {
        self.associativity = associativity;
        self
    }

    /// Run the parser, consuming itself and returning a list of instructions.
    /// The first error aborts the whole parse.
    pub fn run(mut self) -> Result<Vec<Instruction>, Error> {
        let mut ast: Vec<Instruction> = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut defined: HashSet<String> = HashSet::new();

        'mainloop: loop {
            match self.current().kind() {
                TokenKind::EndOfInput => break 'mainloop,
                TokenKind::Identifier => {
                    if self.peek()?.kind() == TokenKind::Label {
                        let name = self.next()?.text().to_owned();
                        self.next()?;
                        defined.insert(name.clone());
                        pending.push(name);
                    } else {
                        let mut ins = self.instruction()?;
                        ins.labels = std::mem::take(&mut pending);
                        ast.push(ins);
                    }
                }
                TokenKind::Comment => self.skip_comment()?,
                TokenKind::Label => {
                    if let Some(prev) = self.peek_back() {
                        warn!("line {}: `:` after {} does not define a label", prev.line(), prev);
                    }
                    self.next()?;
                }
                _ => {
                    self.next()?;
                }
            }
        }

        if !pending.is_empty() {
            warn!("dropping label(s) {} not followed by an instruction", pending.join(", "));
        }

        if !defined.is_empty() {
            for operand in ast.iter_mut().flat_map(|ins| ins.operands.iter_mut()) {
                operand.tag_label_references(&defined);
            }
        }

        Ok(ast)
    }

    /// The token at the cursor. Past the end this keeps returning the
    /// `EndOfInput` sentinel.
    pub fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.cursor.min(last)]
    }

    /// The token one past the cursor.
    pub fn peek(&self) -> Result<&Token, Error> {
        let index = self.cursor + 1;
        self.tokens.get(index).ok_or(Error::OutOfRange { index, len: self.tokens.len() })
    }

    /// The token before the cursor, if any. Does not move the cursor.
    pub fn peek_back(&self) -> Option<&Token> {
        self.cursor.checked_sub(1).and_then(|index| self.tokens.get(index))
    }

    /// Returns the token at the cursor and advances past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&Token, Error> {
        let index = self.cursor;
        if index >= self.tokens.len() {
            return Err(Error::OutOfRange { index, len: self.tokens.len() });
        }
        self.cursor += 1;
        Ok(&self.tokens[index])
    }

    /// Parses an opcode and its operands up to the end of the line.
    /// The cursor must be on the opcode identifier.
    fn instruction(&mut self) -> Result<Instruction, Error> {
        let (opcode, line) = {
            let tok = self.next()?;
            (tok.text().to_owned(), tok.line())
        };
        let mut operands = Vec::new();

        loop {
            match self.current().kind() {
                TokenKind::Newline => {
                    self.next()?;
                    break;
                }
                TokenKind::EndOfInput => break,
                TokenKind::Comment => {
                    self.skip_comment()?;
                    break;
                }
                TokenKind::Separator => {
                    self.next()?;
                }
                _ => operands.push(self.parse_operand()?),
            }
        }

        debug!("line {}: parsed `{}` with {} operand(s)", line, opcode, operands.len());
        Ok(Instruction::new(opcode, operands, line))
    }

    /// Advances past the next newline, or up to the end of input.
    fn skip_comment(&mut self) -> Result<(), Error> {
        loop {
            match self.current().kind() {
                TokenKind::EndOfInput => return Ok(()),
                TokenKind::Newline => {
                    self.next()?;
                    return Ok(());
                }
                _ => {
                    self.next()?;
                }
            }
        }
    }

    /// Parses one full operand expression.
    fn parse_operand(&mut self) -> Result<Expression, Error> {
        self.parse_operand_bp(0)
    }

    fn parse_operand_bp(&mut self, min_bp: u8) -> Result<Expression, Error> {
        let mut lhs = self.parse_expr()?;

        loop {
            let kind = self.current().kind();
            if is_operand_end(kind) {
                break;
            }

            let (l_bp, r_bp) = infix_binding_power(kind);
            if l_bp == 0 {
                break;
            }

            let rhs_min_bp = match self.associativity {
                Associativity::Left => {
                    if l_bp < min_bp {
                        break;
                    }
                    r_bp
                }
                Associativity::Right => 0,
            };

            let op = self.next()?.text().to_owned();
            let rhs = self.parse_operand_bp(rhs_min_bp)?;
            lhs = Expression::arithmetic(op, lhs, rhs, l_bp);
        }

        Ok(lhs)
    }

    /// Parses a single term: an atom, or a bracketed operand.
    fn parse_expr(&mut self) -> Result<Expression, Error> {
        let index = self.cursor;
        let tok = self.next()?.clone();

        match tok.kind() {
            TokenKind::Number | TokenKind::Identifier => Ok(Expression::atom(tok.text())),
            TokenKind::LeftBracket => {
                let inner = self.parse_operand()?;
                let close = self.current().kind();
                if close != TokenKind::RightBracket {
                    return Err(SyntaxError::UnmatchedBracket { index, line: tok.line(), found: close }.into());
                }
                self.next()?;
                Ok(inner)
            }
            // An operand was required but the input ran out.
            TokenKind::EndOfInput => Err(Error::OutOfRange { index: index + 1, len: self.tokens.len() }),
            found => Err(SyntaxError::UnexpectedToken { index, line: tok.line(), found }.into()),
        }
    }
}

fn is_operand_end(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(kind, Separator | Newline | EndOfInput | RightBracket | Comment)
}
