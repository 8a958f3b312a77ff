//! Lexer for the Skillet language
//!
//! Converts source text into a token sequence terminated by an end-of-input
//! token. Operators match by maximal munch; word lexemes are classified in
//! priority order: reserved word, integer, decimal, identifier.

use crate::error::Reporter;
use crate::token::{lookup_keyword, Token, TokenKind};

/// The lexer state
pub struct Lexer<'src, 'rep> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    current_pos: usize,
    line: usize,
    reporter: &'rep mut Reporter,
}

impl<'src, 'rep> Lexer<'src, 'rep> {
    /// Create a new lexer over complete source text
    pub fn new(source: &'src str, reporter: &'rep mut Reporter) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            reporter,
        }
    }

    /// Tokenize the entire source. Unrecognized lexemes are reported to the
    /// shared sink and skipped so one pass surfaces every lexical error;
    /// the caller must not execute a run that reported any.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token() {
            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, String::new(), self.line));
        tokens
    }

    /// Get the next token, skipping past reported lexical errors.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace_and_comments();

            let &(start_pos, ch) = self.chars.peek()?;
            let line = self.line;

            if let Some(kind) = self.scan_operator(ch) {
                let lexeme = self.source[start_pos..self.current_pos].to_string();
                return Some(Token::new(kind, lexeme, line));
            }

            match ch {
                '"' => match self.scan_string() {
                    Some(token) => return Some(token),
                    None => continue,
                },
                '\'' => match self.scan_char() {
                    Some(token) => return Some(token),
                    None => continue,
                },
                c if c.is_alphanumeric() || c == '_' => match self.scan_word() {
                    Some(token) => return Some(token),
                    None => continue,
                },
                _ => {
                    self.advance();
                    self.reporter
                        .lexical_error(line, format!("Unexpected character '{}'.", ch));
                    continue;
                }
            }
        }
    }

    /// Scan punctuation and operators, two-character forms first.
    fn scan_operator(&mut self, ch: char) -> Option<TokenKind> {
        let kind = match ch {
            '(' => { self.advance(); TokenKind::LeftParen }
            ')' => { self.advance(); TokenKind::RightParen }
            '{' => { self.advance(); TokenKind::LeftBrace }
            '}' => { self.advance(); TokenKind::RightBrace }
            '[' => { self.advance(); TokenKind::LeftBracket }
            ']' => { self.advance(); TokenKind::RightBracket }
            ',' => { self.advance(); TokenKind::Comma }
            '.' => { self.advance(); TokenKind::Dot }
            ';' => { self.advance(); TokenKind::Semicolon }
            ':' => { self.advance(); TokenKind::Colon }
            '?' => { self.advance(); TokenKind::Question }
            '^' => { self.advance(); TokenKind::Caret }
            '~' => { self.advance(); TokenKind::Tilde }
            '=' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                }
            }
            '+' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::StarEqual
                } else if self.peek_char() == Some('*') {
                    self.advance();
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                // Comments were consumed with the whitespace.
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::SlashEqual
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::PercentEqual
                } else {
                    TokenKind::Percent
                }
            }
            '<' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::LessEqual
                } else if self.peek_char() == Some('<') {
                    self.advance();
                    TokenKind::LessLess
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::GreaterEqual
                } else if self.peek_char() == Some('>') {
                    self.advance();
                    TokenKind::GreaterGreater
                } else {
                    TokenKind::Greater
                }
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                }
            }
            '&' => {
                self.advance();
                if self.peek_char() == Some('&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                self.advance();
                if self.peek_char() == Some('|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    TokenKind::Pipe
                }
            }
            _ => return None,
        };

        Some(kind)
    }

    /// Scan a string literal, stored with the quotes stripped.
    /// No escape sequences.
    fn scan_string(&mut self) -> Option<Token> {
        let line = self.line;
        self.advance(); // opening quote
        let start = self.current_pos;

        loop {
            match self.peek_char() {
                Some('"') => {
                    let lexeme = self.source[start..self.current_pos].to_string();
                    self.advance();
                    return Some(Token::new(TokenKind::StringLiteral, lexeme, line));
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    self.reporter
                        .lexical_error(line, "Unterminated string.".to_string());
                    return None;
                }
            }
        }
    }

    /// Scan a character literal: `'` plus zero or one interior character
    /// plus `'`. Stored with the quotes stripped; no escape sequences.
    fn scan_char(&mut self) -> Option<Token> {
        let line = self.line;
        self.advance(); // opening quote

        match self.peek_char() {
            Some('\'') => {
                self.advance();
                Some(Token::new(TokenKind::CharLiteral, String::new(), line))
            }
            Some(c) => {
                self.advance();
                if self.peek_char() == Some('\'') {
                    self.advance();
                    Some(Token::new(TokenKind::CharLiteral, c.to_string(), line))
                } else {
                    self.reporter
                        .lexical_error(line, "Unterminated character literal.".to_string());
                    None
                }
            }
            None => {
                self.reporter
                    .lexical_error(line, "Unterminated character literal.".to_string());
                None
            }
        }
    }

    /// Scan a word lexeme (keyword, number, or identifier) and classify it.
    fn scan_word(&mut self) -> Option<Token> {
        let &(start, _) = self.chars.peek()?;
        let line = self.line;

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let lexeme = &self.source[start..self.current_pos];

        if let Some(kind) = lookup_keyword(lexeme) {
            return Some(Token::new(kind, lexeme.to_string(), line));
        }

        if is_integer(lexeme) {
            if lexeme.parse::<i64>().is_ok() {
                return Some(Token::new(TokenKind::IntLiteral, lexeme.to_string(), line));
            }
            self.reporter
                .lexical_error(line, format!("Integer literal '{}' out of range.", lexeme));
            return None;
        }

        if is_decimal(lexeme) {
            if lexeme.parse::<f64>().is_ok() {
                return Some(Token::new(TokenKind::DecimalLiteral, lexeme.to_string(), line));
            }
            self.reporter
                .lexical_error(line, format!("Invalid decimal literal '{}'.", lexeme));
            return None;
        }

        if is_identifier(lexeme) {
            return Some(Token::new(TokenKind::Identifier, lexeme.to_string(), line));
        }

        self.reporter
            .lexical_error(line, format!("Unexpected character sequence '{}'.", lexeme));
        None
    }

    /// Advance and return the consumed character
    fn advance(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    /// Peek at the next character without advancing
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    /// Skip whitespace and `//` comments, counting lines
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                }
                '/' if self.source[self.current_pos..].starts_with("//") => {
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }
}

/// All digits; a multi-digit integer must not start with `0`.
fn is_integer(lexeme: &str) -> bool {
    if lexeme.len() > 1 && lexeme.starts_with('0') {
        return false;
    }

    !lexeme.is_empty() && lexeme.chars().all(|c| c.is_ascii_digit())
}

/// Digits and dots, starting with a digit. Each `.` toggles the decimal
/// flag, so "1.2.3" cancels back out while "243." stays accepted.
fn is_decimal(lexeme: &str) -> bool {
    if lexeme.starts_with('.') {
        return false;
    }

    let mut single_point = false;
    for c in lexeme.chars() {
        if !c.is_ascii_digit() && c != '.' {
            return false;
        }
        if c == '.' {
            single_point = !single_point;
        }
    }

    single_point
}

/// Letters, digits, hyphen, or underscore in any position.
fn is_identifier(lexeme: &str) -> bool {
    lexeme
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
