use std::iter::FusedIterator;

use log::{debug, info};
use phf::phf_map;

use crate::error::LoxError;
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::AND,
    "class" => TokenType::CLASS,
    "else" => TokenType::ELSE,
    "false" => TokenType::FALSE,
    "fun" => TokenType::FUN,
    "for" => TokenType::FOR,
    "if" => TokenType::IF,
    "nil" => TokenType::NIL,
    "or" => TokenType::OR,
    "print" => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super" => TokenType::SUPER,
    "this" => TokenType::THIS,
    "true" => TokenType::TRUE,
    "var" => TokenType::VAR,
    "while" => TokenType::WHILE,
};

/// Single-pass lexer over raw source bytes.
///
/// Tokens are produced on demand through the `Iterator` impl.  Trivia
/// (whitespace, newlines, `//` comments) is consumed before each token, so
/// every call to `scan_token` starts on a token byte and assembles one
/// complete `Token`.  Lexical errors are yielded in stream order as `Err`
/// items and scanning resumes at the following byte, letting a single pass
/// surface every bad character.  A synthetic `EOF` token closes the stream.
#[derive(Debug)]
pub struct Scanner {
    source: Vec<u8>,
    offset: usize,
    line: usize,
    eof_emitted: bool,
}

impl Scanner {
    pub fn new(source: &[u8]) -> Self {
        info!("Initializing Scanner with buffer of {} bytes", source.len());
        Self {
            source: source.to_vec(),
            offset: 0,
            line: 1,
            eof_emitted: false,
        }
    }

    /// Consumes whitespace, newlines, and line comments up to the start of
    /// the next token.
    fn skip_trivia(&mut self) {
        while let Some(&byte) = self.source.get(self.offset) {
            match byte {
                b' ' | b'\r' | b'\t' => self.offset += 1,

                b'\n' => {
                    self.offset += 1;
                    self.line += 1;
                }

                b'/' if self.source.get(self.offset + 1) == Some(&b'/') => {
                    debug!("Skipping comment on line {}", self.line);

                    while let Some(&c) = self.source.get(self.offset) {
                        if c == b'\n' {
                            break;
                        }
                        self.offset += 1;
                    }
                }

                _ => break,
            }
        }
    }

    /// Scans exactly one token.  The caller guarantees at least one byte
    /// remains and that it is not trivia.
    fn scan_token(&mut self) -> Result<Token, LoxError> {
        let start: usize = self.offset;
        let byte: u8 = self.bump();

        let token_type: TokenType = match byte {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            // `//` never reaches here; `skip_trivia` already ate it.
            b'/' => TokenType::SLASH,

            b'!' => self.pick(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.pick(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.pick(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.pick(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(start),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(start),

            _ => {
                debug!("Unexpected byte 0x{:02x} on line {}", byte, self.line);

                return Err(LoxError::lex(self.line, "Unexpected character."));
            }
        };

        Ok(self.token(token_type, start))
    }

    /// Consumes and returns the byte at the current offset.
    fn bump(&mut self) -> u8 {
        let byte: u8 = self.source[self.offset];
        self.offset += 1;
        byte
    }

    /// Two-character operator lookahead: consumes `expected` and yields
    /// `double` when it follows, `single` otherwise.
    fn pick(&mut self, expected: u8, double: TokenType, single: TokenType) -> TokenType {
        if self.source.get(self.offset) == Some(&expected) {
            self.offset += 1;
            double
        } else {
            single
        }
    }

    fn string(&mut self) -> Result<TokenType, LoxError> {
        let content_start: usize = self.offset;

        loop {
            match self.source.get(self.offset) {
                None => return Err(LoxError::lex(self.line, "Unterminated string.")),

                Some(b'"') => break,

                Some(&byte) => {
                    if byte == b'\n' {
                        self.line += 1;
                    }
                    self.offset += 1;
                }
            }
        }

        let literal: String = self.text(content_start, self.offset);

        // Closing quote.
        self.offset += 1;

        info!("Parsed string literal: {}", literal);

        Ok(TokenType::STRING(literal))
    }

    fn number(&mut self, start: usize) -> TokenType {
        self.take_digits();

        // A '.' only belongs to the number when digits follow it.
        if self.source.get(self.offset) == Some(&b'.')
            && self
                .source
                .get(self.offset + 1)
                .is_some_and(|c| c.is_ascii_digit())
        {
            self.offset += 1;
            self.take_digits();
        }

        let number: f64 = self.text(start, self.offset).parse().unwrap_or(0.0);

        info!("Parsed number: {}", number);

        TokenType::NUMBER(number)
    }

    fn take_digits(&mut self) {
        while self
            .source
            .get(self.offset)
            .is_some_and(|c| c.is_ascii_digit())
        {
            self.offset += 1;
        }
    }

    fn identifier(&mut self, start: usize) -> TokenType {
        while self
            .source
            .get(self.offset)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
        {
            self.offset += 1;
        }

        let text: String = self.text(start, self.offset);

        match KEYWORDS.get(text.as_str()) {
            Some(keyword) => {
                info!("Parsed keyword: {}", text);

                keyword.clone()
            }

            None => {
                info!("Parsed identifier: {}", text);

                TokenType::IDENTIFIER
            }
        }
    }

    fn text(&self, from: usize, to: usize) -> String {
        String::from_utf8_lossy(&self.source[from..to]).into_owned()
    }

    fn token(&self, token_type: TokenType, start: usize) -> Token {
        Token::new(token_type, self.text(start, self.offset), self.line)
    }

    fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }
}

impl Iterator for Scanner {
    type Item = Result<Token, LoxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();

        if self.at_end() {
            if self.eof_emitted {
                return None;
            }

            self.eof_emitted = true;

            info!("Reached EOF at line {}", self.line);

            return Some(Ok(Token::new(TokenType::EOF, String::new(), self.line)));
        }

        Some(self.scan_token())
    }
}

impl FusedIterator for Scanner {}
