//! Splits VTF text into top-level blocks.
//!
//! A block starts at a keyword line (`*NODES 1`, `STEP 2`, `FIELD p 1 2`)
//! and runs until an `END` line or the next keyword line. The reader is a
//! plain iterator over the text: it yields blocks in file order, interleaved
//! with warnings about lines it could not place, and it cannot be rewound.

use std::collections::{HashMap, VecDeque};
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use log::{debug, trace};

use super::keyword;
use super::lexer::Lexer;
use crate::model::{BlockId, BlockKind, Property, RawBlock, Warning, is_payload_row};

pub struct BlockReader<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    /// Items already produced but not yet handed out.
    pending: VecDeque<Result<RawBlock, Warning>>,
    /// Last id seen per kind, for blocks that don't declare one.
    last_ids: HashMap<BlockKind, BlockId>,
}

impl<'a> BlockReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
            pending: VecDeque::new(),
            last_ids: HashMap::new(),
        }
    }

    /// Read until at least one item is queued. Returns `false` at end of input.
    fn scan(&mut self) -> bool {
        let mut orphans: Option<(usize, usize)> = None;

        while let Some((index, line)) = self.lines.next() {
            let number = index + 1;
            let text = line.trim();
            if is_skipped(text) {
                continue;
            }

            match header_kind(text) {
                Some(kind) => {
                    flush_orphans(&mut orphans, &mut self.pending);
                    self.read_block(number, text, kind);
                    return true;
                }
                None => {
                    trace!(line = number; "Orphan line");
                    match orphans.as_mut() {
                        Some((_, count)) => *count += 1,
                        None => orphans = Some((number, 1)),
                    }
                }
            }
        }

        flush_orphans(&mut orphans, &mut self.pending);
        !self.pending.is_empty()
    }

    fn read_block(&mut self, line: usize, header: &str, kind: BlockKind) {
        let (word, rest) = split_first_word(header);
        let mut tokens = Lexer::new(rest).peekable();

        let explicit = tokens.next_if(|token| token.as_id().is_some());
        let id = match explicit.and_then(|token| token.as_id()) {
            Some(id) => id,
            None if kind.requires_id() => {
                let reason = match tokens.peek() {
                    Some(token) => format!("`{}` is not an index", token.clone().into_text()),
                    None => "missing index".to_string(),
                };
                debug!(line = line; "Skipping malformed block header");
                self.pending.push_back(Err(Warning::MalformedHeader {
                    line,
                    keyword: word.trim_start_matches('*').to_ascii_uppercase(),
                    reason,
                }));
                self.skip_body();
                return;
            }
            None => self.last_ids.get(&kind).map_or(1, |last| last + 1),
        };
        self.last_ids.insert(kind.clone(), id);

        let mut args: Vec<String> = tokens.map(|token| token.into_text()).collect();
        if kind == BlockKind::Header {
            // `*VTF-1.00`: the version is glued to the keyword.
            let version = word.trim_start_matches('*')[4..].to_string();
            args.insert(0, version);
        }

        let mut block = RawBlock {
            kind,
            id,
            line,
            args,
            properties: Vec::new(),
            raw_lines: Vec::new(),
        };
        if matches!(block.kind, BlockKind::Unknown(_)) {
            self.skip_body();
        } else if block.kind.has_body() {
            self.read_body(&mut block);
        }

        debug!(
            kind = block.kind.to_string(),
            id = block.id,
            line = block.line,
            lines = block.raw_lines.len();
            "Read block"
        );
        self.pending.push_back(Ok(block));
    }

    /// Collect body lines until `END` or the next header, which is left unread.
    fn read_body(&mut self, block: &mut RawBlock) {
        while let Some(&(index, line)) = self.lines.peek() {
            let text = line.trim();
            if header_kind(text).is_some() {
                break;
            }
            self.lines.next();
            if is_skipped(text) {
                continue;
            }
            if is_end_marker(text) {
                break;
            }

            match parse_property(text) {
                Some(property) => block.properties.push(property),
                None if is_payload_row(text) => {}
                None => self.pending.push_back(Err(Warning::UnparsableLine {
                    line: index + 1,
                    text: text.to_string(),
                })),
            }
            block.raw_lines.push(line.to_string());
        }
    }

    /// Drop the body of a block that was rejected at its header or that
    /// nobody reads.
    fn skip_body(&mut self) {
        while let Some(&(_, line)) = self.lines.peek() {
            let text = line.trim();
            if header_kind(text).is_some() {
                break;
            }
            self.lines.next();
            if is_end_marker(text) {
                break;
            }
        }
    }
}

impl Iterator for BlockReader<'_> {
    type Item = Result<RawBlock, Warning>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if !self.scan() {
                return None;
            }
        }
    }
}

fn flush_orphans(
    orphans: &mut Option<(usize, usize)>,
    pending: &mut VecDeque<Result<RawBlock, Warning>>,
) {
    if let Some((line, count)) = orphans.take() {
        pending.push_back(Err(Warning::OrphanLines { line, count }));
    }
}

/// Blank lines and `#` / `//` comments.
fn is_skipped(text: &str) -> bool {
    text.is_empty() || text.starts_with('#') || text.starts_with("//")
}

fn is_end_marker(text: &str) -> bool {
    let (word, _) = split_first_word(text);
    word.trim_start_matches('*').eq_ignore_ascii_case("end")
}

/// Kind of the block this line opens, if it opens one.
///
/// Known keywords open blocks with or without a leading `*`; an unknown
/// `*TAG` still opens a block, of kind `Unknown`.
fn header_kind(text: &str) -> Option<BlockKind> {
    if is_end_marker(text) {
        return None;
    }
    let (word, _) = split_first_word(text);
    let tag = word.trim_start_matches('*');
    if let Some(kind) = keyword(tag) {
        return Some(kind);
    }
    if word.starts_with('*') && !tag.is_empty() {
        return Some(BlockKind::Unknown(tag.to_ascii_lowercase()));
    }
    None
}

fn split_first_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

/// `%KEY value...` or `key value...`; the key must start with a letter.
fn parse_property(text: &str) -> Option<Property> {
    let (word, rest) = split_first_word(text);
    let key = word.strip_prefix('%').unwrap_or(word);
    if !key.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    Some(Property {
        key: key.to_ascii_lowercase(),
        value: rest.trim_end().to_string(),
    })
}
