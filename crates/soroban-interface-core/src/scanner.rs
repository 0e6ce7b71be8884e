//! Line scanner that groups interface text into method, struct and enum blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of declaration a block holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Method,
    Struct,
    Enum,
}

impl BlockKind {
    const ALL: [BlockKind; 3] = [BlockKind::Method, BlockKind::Struct, BlockKind::Enum];

    /// Keyword a trimmed line must begin with to open a block of this kind
    pub fn start_keyword(self) -> &'static str {
        match self {
            BlockKind::Method => "fn",
            BlockKind::Struct => "pub struct",
            BlockKind::Enum => "pub enum",
        }
    }

    /// Trimmed line content that closes a block of this kind
    pub fn terminator(self) -> &'static str {
        match self {
            BlockKind::Method => ";",
            BlockKind::Struct | BlockKind::Enum => "}",
        }
    }

    fn classify(line: &str) -> Option<BlockKind> {
        Self::ALL
            .into_iter()
            .find(|kind| starts_with_keyword(line, kind.start_keyword()))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Method => write!(f, "method"),
            BlockKind::Struct => write!(f, "struct"),
            BlockKind::Enum => write!(f, "enum"),
        }
    }
}

/// `fn` must be followed by whitespace so identifiers like `fnord` don't open a block
fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.chars().next().map_or(true, char::is_whitespace),
        None => false,
    }
}

/// A run of lines belonging to one declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    /// 1-based line number of the opening line
    pub start_line: usize,
    /// Attribute lines (`#[...]`) directly above the opening line
    pub attributes: Vec<&'a str>,
    pub lines: Vec<&'a str>,
}

impl Block<'_> {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn attribute_text(&self) -> String {
        self.attributes.join("\n")
    }
}

enum State<'a> {
    Scanning,
    Collecting(Block<'a>),
}

/// State machine over trimmed lines.
///
/// A line opening a block flushes whatever block is open and starts a new
/// one. A line equal to the open block's terminator closes it. End of input
/// flushes the open block.
pub struct BlockScanner<'a> {
    state: State<'a>,
    pending_attributes: Vec<&'a str>,
    blocks: Vec<Block<'a>>,
}

impl<'a> BlockScanner<'a> {
    pub fn new() -> Self {
        Self {
            state: State::Scanning,
            pending_attributes: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Scan already-trimmed lines into blocks, in source order
    pub fn scan(lines: &[&'a str]) -> Vec<Block<'a>> {
        let mut scanner = Self::new();
        for (idx, line) in lines.iter().enumerate() {
            scanner.feed(idx + 1, line);
        }
        scanner.finish()
    }

    pub fn feed(&mut self, line_number: usize, line: &'a str) {
        if let Some(kind) = BlockKind::classify(line) {
            self.flush();
            self.state = State::Collecting(Block {
                kind,
                start_line: line_number,
                attributes: std::mem::take(&mut self.pending_attributes),
                lines: vec![line],
            });
            return;
        }

        self.track_attribute(line);

        let closes = match &mut self.state {
            State::Scanning => false,
            State::Collecting(block) => {
                block.lines.push(line);
                line == block.kind.terminator()
            }
        };
        if closes {
            self.flush();
        }
    }

    pub fn finish(mut self) -> Vec<Block<'a>> {
        self.flush();
        self.blocks
    }

    fn track_attribute(&mut self, line: &'a str) {
        if line.starts_with("#[") {
            self.pending_attributes.push(line);
        } else if !(line.is_empty() || line.starts_with("//")) {
            self.pending_attributes.clear();
        }
    }

    fn flush(&mut self) {
        if let State::Collecting(block) = std::mem::replace(&mut self.state, State::Scanning) {
            self.blocks.push(block);
        }
    }
}

impl Default for BlockScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<&str> {
        source.lines().map(str::trim).collect()
    }

    #[test]
    fn test_struct_block_closes_on_brace() {
        let src = lines("pub struct User {\npub name: String,\n}\nunrelated\n");
        let blocks = BlockScanner::scan(&src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Struct);
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].lines, vec!["pub struct User {", "pub name: String,", "}"]);
    }

    #[test]
    fn test_new_block_flushes_open_one() {
        let src = lines("fn a() -> u32;\nfn b();\n}");
        let blocks = BlockScanner::scan(&src);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["fn a() -> u32;"]);
        assert_eq!(blocks[1].lines, vec!["fn b();", "}"]);
    }

    #[test]
    fn test_method_closes_on_lone_terminator() {
        let src = lines("fn long(\na: u32\n)\n;\nafter");
        let blocks = BlockScanner::scan(&src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.last(), Some(&";"));
    }

    #[test]
    fn test_attributes_are_attached() {
        let src = lines(
            "#[soroban_sdk::contracterror(export = false)]\n/// Errors\n#[derive(Debug)]\n\npub enum E {\nA = 1,\n}",
        );
        let blocks = BlockScanner::scan(&src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].attributes.len(), 2);
        assert!(blocks[0].attribute_text().contains("contracterror"));
    }

    #[test]
    fn test_attributes_reset_by_other_lines() {
        let src = lines("#[contracterror]\npub const X: u32 = 1;\npub enum E {\nA,\n}");
        let blocks = BlockScanner::scan(&src);
        assert!(blocks[0].attributes.is_empty());
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        let src = lines("fnord(x);\npub structure {\n}");
        assert!(BlockScanner::scan(&src).is_empty());
    }

    #[test]
    fn test_unterminated_block_flushed_at_end() {
        let src = lines("pub enum Open {\nA,");
        let blocks = BlockScanner::scan(&src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Enum);
    }
}
