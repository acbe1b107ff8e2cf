//! Small hand-written lexer for the words on one VTF line.
//!
//! Used for header arguments (`FIELD "Von Mises" 10 20`), property values
//! (`%PER_NODE #1`) and id lists in payload rows (`1, 2, 3`).
//
//  Lexical items:
//
//      Number   ::= [0-9]+          (fits in u32)
//      Ref      ::= '#' [0-9]+
//      Quoted   ::= '"' .*? '"'     (an unterminated quote runs to end of line)
//      Word     ::= anything else up to whitespace or ','
//
//  Whitespace and ',' separate tokens and are discarded.

use std::iter::Peekable;
use std::str::Chars;

use crate::model::BlockId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(u32),
    Ref(u32),
    Quoted(String),
    Word(String),
}

impl Token {
    /// `12` and `#12` both name block 12.
    pub fn as_id(&self) -> Option<BlockId> {
        match self {
            Token::Number(n) | Token::Ref(n) => Some(*n),
            _ => None,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ref(n) => format!("#{n}"),
            Token::Quoted(text) | Token::Word(text) => text,
        }
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if pred(c) {
                buf.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        self.consume_while(|c| !is_separator(c), &mut word);
        word
    }

    fn read_quoted(&mut self) -> String {
        let mut text = String::new();
        for c in self.chars.by_ref() {
            if c == '"' {
                break;
            }
            text.push(c);
        }
        text
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Digits only, and small enough to be an id.
fn as_number(word: &str) -> Option<u32> {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse().ok()
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.next_if(|&c| is_separator(c)).is_some() {}

        let ch = self.chars.next()?;
        let token = match ch {
            '"' => Token::Quoted(self.read_quoted()),
            '#' => {
                let word = self.read_word(ch);
                match as_number(&word[1..]) {
                    Some(n) => Token::Ref(n),
                    None => Token::Word(word),
                }
            }
            c => {
                let word = self.read_word(c);
                match as_number(&word) {
                    Some(n) => Token::Number(n),
                    None => Token::Word(word),
                }
            }
        };

        Some(token)
    }
}

/// Every id mentioned in `src`; other tokens are skipped.
pub fn ids(src: &str) -> impl Iterator<Item = BlockId> + '_ {
    Lexer::new(src).filter_map(|token| token.as_id())
}

/// Parse a whole string as one id, `#` prefix allowed.
pub fn parse_id(src: &str) -> Option<BlockId> {
    let mut tokens = Lexer::new(src);
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => token.as_id(),
        _ => None,
    }
}

/// Strip one pair of surrounding double quotes.
pub fn unquote(src: &str) -> &str {
    let src = src.trim();
    src.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(src)
}
