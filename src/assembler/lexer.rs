//! This lexer tokenizes pasm source.
//!
//! It makes a single pass over the characters with one character of
//! lookahead. Punctuation is emitted the moment it is seen; every other
//! character is accumulated into a word which is closed out as soon as the
//! next character would bound it.
use std::fmt;
use std::io::Read;
use std::iter::Peekable;
use std::str::Chars;

use super::error::Error;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TokenKind {
    Number,
    Identifier,
    Add,
    Subtract,
    Multiply,
    Separator,
    LeftBracket,
    RightBracket,
    Label,
    Comment,
    Newline,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TokenKind {
    /// Maps a single-character punctuation symbol to its kind.
    fn from_symbol(c: char) -> Option<TokenKind> {
        use TokenKind::*;
        match c {
            ',' => Some(Separator),
            '+' => Some(Add),
            '-' => Some(Subtract),
            '*' => Some(Multiply),
            '[' => Some(LeftBracket),
            ']' => Some(RightBracket),
            ':' => Some(Label),
            ';' => Some(Comment),
            _ => None,
        }
    }
}

/// A lexeme and where it starts in the source. Lines and columns are 1-based.
/// Synthetic tokens (newline, end of input) carry an empty lexeme.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    kind: TokenKind,
    text: String,
    line: usize,
    column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token { kind, text: text.into(), line, column }
    }

    fn synthetic(kind: TokenKind, line: usize, column: usize) -> Self {
        Token::new(kind, String::new(), line, column)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Token<{}>('{}')", self.kind, self.text.escape_default())
    }
}

/// Reads the whole stream and tokenizes it.
/// Invalid UTF-8 is replaced rather than rejected: no byte is an error.
pub fn tokenize<R: Read>(mut reader: R) -> Result<Vec<Token>, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(tokenize_str(&String::from_utf8_lossy(&bytes)))
}

/// Tokenizes an in-memory source. The returned sequence always ends with
/// exactly one `EndOfInput` token.
pub fn tokenize_str(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(source.len() / 2 + 1);
    let mut chars = SourceChars::new(source);

    let mut sb = String::new();
    let mut start = (1, 1);

    while let Some(c) = chars.next() {
        let here = (chars.line, chars.column);

        if let Some(kind) = TokenKind::from_symbol(c) {
            tokens.push(Token::new(kind, c.to_string(), here.0, here.1));
            continue;
        }

        match c {
            '\n' => {
                tokens.push(Token::synthetic(TokenKind::Newline, here.0, here.1));
                continue;
            }
            c if is_blank(c) => continue,
            _ => {}
        }

        if sb.is_empty() {
            start = here;
        }
        sb.push(c);

        // Close the word out if the next character bounds it, or if there
        // is no next character at all.
        if chars.peek().map_or(true, is_boundary) {
            let word = std::mem::take(&mut sb);
            let kind = if is_numerical(&word) { TokenKind::Number } else { TokenKind::Identifier };
            tokens.push(Token::new(kind, word, start.0, start.1));
        }
    }

    tokens.push(Token::synthetic(TokenKind::EndOfInput, chars.line, chars.column + 1));

    debug!("tokenized {} characters into {} tokens", source.chars().count(), tokens.len());
    tokens
}

/// True for a non-empty string made only of decimal digits.
pub fn is_numerical(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

// Spaces, tabs and carriage returns are dropped without producing a token.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_boundary(c: &char) -> bool {
    is_blank(*c) || matches!(*c, '\n' | ',' | '[' | ']' | '+' | '-' | '*' | ';' | ':')
}

/// Character iterator that tracks the line and column of the character
/// it last returned.
struct SourceChars<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    after_newline: bool,
}

impl<'a> SourceChars<'a> {
    fn new(source: &'a str) -> Self {
        SourceChars { chars: source.chars().peekable(), line: 1, column: 0, after_newline: false }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }
}

impl<'a> Iterator for SourceChars<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if self.after_newline {
            self.line += 1;
            self.column = 0;
        }
        self.column += 1;
        self.after_newline = c == '\n';
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::TokenKind::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(Token::kind).collect()
    }

    fn lexemes(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn test_is_numerical() {
        assert!(is_numerical("0"));
        assert!(is_numerical("123"));
        assert!(is_numerical("007"));

        assert!(!is_numerical(""));
        assert!(!is_numerical("12a"));
        assert!(!is_numerical("a12"));
        assert!(!is_numerical("-1"));
        assert!(!is_numerical("0x10"));
        assert!(!is_numerical("١٢"));
    }

    #[test]
    fn test_punctuation() {
        let tokens = tokenize_str(",+-*[]:;");
        assert_eq!(
            kinds(&tokens),
            vec![Separator, Add, Subtract, Multiply, LeftBracket, RightBracket, Label, Comment, EndOfInput]
        );
        assert_eq!(lexemes(&tokens), vec![",", "+", "-", "*", "[", "]", ":", ";", ""]);
    }

    #[test]
    fn test_addressing_expression() {
        let tokens = tokenize_str("mov [base + index*4], value");
        assert_eq!(
            kinds(&tokens),
            vec![
                Identifier, LeftBracket, Identifier, Add, Identifier, Multiply, Number,
                RightBracket, Separator, Identifier, EndOfInput,
            ]
        );
        assert_eq!(
            lexemes(&tokens),
            vec!["mov", "[", "base", "+", "index", "*", "4", "]", ",", "value", ""]
        );
    }

    #[test]
    fn test_numeric_classification() {
        let tokens = tokenize_str("123 12a a12 -1");
        assert_eq!(kinds(&tokens), vec![Number, Identifier, Identifier, Subtract, Number, EndOfInput]);
        assert_eq!(lexemes(&tokens), vec!["123", "12a", "a12", "-", "1", ""]);
    }

    #[test]
    fn test_label() {
        let tokens = tokenize_str("foo:\nbar: nop");
        assert_eq!(kinds(&tokens), vec![Identifier, Label, Newline, Identifier, Label, Identifier, EndOfInput]);
        assert_eq!(lexemes(&tokens), vec!["foo", ":", "", "bar", ":", "nop", ""]);
    }

    #[test]
    fn test_word_at_end_of_input() {
        let tokens = tokenize_str("nop");
        assert_eq!(kinds(&tokens), vec![Identifier, EndOfInput]);
        assert_eq!(tokens[0].text(), "nop");

        let tokens = tokenize_str("x");
        assert_eq!(kinds(&tokens), vec![Identifier, EndOfInput]);
    }

    #[test]
    fn test_end_of_input_appears_once() {
        for source in &["", " ", "\n", "nop", "mov a, b\n", "a:;", "[[[", "1 + 2 * 3"] {
            let tokens = tokenize_str(source);
            assert_eq!(tokens.last().map(Token::kind), Some(EndOfInput), "source {:?}", source);
            assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1, "source {:?}", source);
        }
    }

    #[test]
    fn test_lexemes_cover_source() {
        let source = "start: mov [ebx + ecx*4], 12a ; copy it\n\tsub  r1,-1\r\n";
        let tokens = tokenize_str(source);

        let joined: String = tokens.iter().map(Token::text).collect();
        let expected: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_comment_is_tokenized() {
        // The comment body is still tokenized; the parser is in charge of skipping it.
        let tokens = tokenize_str("mov a, b ; two words\nadd");
        assert_eq!(
            kinds(&tokens),
            vec![
                Identifier, Identifier, Separator, Identifier, Comment, Identifier, Identifier,
                Newline, Identifier, EndOfInput,
            ]
        );
    }

    #[test]
    fn test_blanks_bound_words() {
        let tokens = tokenize_str("mov\ta,\tb\r\nnop\r\n");
        assert_eq!(lexemes(&tokens), vec!["mov", "a", ",", "b", "", "nop", "", ""]);
        assert_eq!(kinds(&tokens), vec![Identifier, Identifier, Separator, Identifier, Newline, Identifier, Newline, EndOfInput]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize_str("mov a, 10\n  add [b]");
        let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line(), t.column())).collect();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 5), (1, 6), (1, 8), (1, 10), (2, 3), (2, 7), (2, 8), (2, 9), (2, 10)]
        );
    }

    #[test]
    fn test_deterministic() {
        let source = "loop: add [a + b * 2], c\n; done\njmp loop";
        assert_eq!(tokenize_str(source), tokenize_str(source));
    }

    #[test]
    fn test_tokenize_reader() {
        let tokens = tokenize("add a, 1\n".as_bytes()).unwrap();
        assert_eq!(kinds(&tokens), vec![Identifier, Identifier, Separator, Number, Newline, EndOfInput]);

        // Invalid UTF-8 is not an error.
        let tokens = tokenize(&[b'a', 0xFF, b'b'][..]).unwrap();
        assert_eq!(kinds(&tokens), vec![Identifier, EndOfInput]);
        assert_eq!(tokens[0].text(), "a\u{FFFD}b");
    }

    #[test]
    fn test_token_display() {
        let tokens = tokenize_str("mov\n");
        assert_eq!(tokens[0].to_string(), "Token<Identifier>('mov')");
        assert_eq!(tokens[1].to_string(), "Token<Newline>('')");
        assert_eq!(tokens[2].to_string(), "Token<EndOfInput>('')");
    }
}
