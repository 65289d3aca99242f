//! This module is responsible for splitting caption text into blocks and
//! writing them back out. Timing lines are carried verbatim and never parsed.

use serde::{Deserialize, Serialize};

/// A chunk needs an index line, a timing line and at least one text line.
pub const MIN_BLOCK_LINES: usize = 3;

/// Represents a single caption block (index, timing line, text lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleBlock {
    /// 1-based position in the document. Output always renumbers.
    pub index: usize,
    /// The raw second line of the chunk, e.g. `00:00:01,000 --> 00:00:02,000`.
    pub timing: String,
    pub text: Vec<String>,
}

impl SubtitleBlock {
    /// Build a block from the raw lines of one chunk.
    /// Returns `None` when the chunk is too short to be a block.
    pub fn from_chunk(index: usize, lines: &[&str]) -> Option<Self> {
        if lines.len() < MIN_BLOCK_LINES {
            return None;
        }
        Some(Self {
            index,
            timing: lines[1].to_string(),
            text: lines[2..].iter().map(|l| l.to_string()).collect(),
        })
    }

    /// Text lines joined with newlines, the form sent to the backend.
    pub fn joined_text(&self) -> String {
        self.text.join("\n")
    }

    /// Replace the text with `text`, split back into lines.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.lines().map(|s| s.to_string()).collect();
    }
}

/// Split raw caption text into chunks of consecutive non-blank lines.
/// Any run of blank (or whitespace-only) lines ends a chunk.
pub fn split_chunks(input: &str) -> Vec<Vec<&str>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    for line in input.trim().lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Parse caption text into a list of blocks, keeping arrival order.
/// Chunks with fewer than three lines are dropped without error.
pub fn parse(input: &str) -> Vec<SubtitleBlock> {
    split_chunks(input)
        .iter()
        .filter_map(|chunk| SubtitleBlock::from_chunk(0, chunk))
        .enumerate()
        .map(|(i, mut block)| {
            block.index = i + 1;
            block
        })
        .collect()
}

/// Format blocks back to caption text.
/// Indices are reassigned 1..N and blocks are separated by one blank line,
/// with no trailing blank line.
pub fn format(blocks: &[SubtitleBlock]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| format!("{}\n{}\n{}", i + 1, block.timing, block.joined_text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,000\nBonjour le monde\n\n\
                          2\n00:00:03,000 --> 00:00:04,000\nAu revoir\nà bientôt\n";

    #[test]
    fn parses_blocks_in_order() {
        let blocks = parse(SAMPLE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 1);
        assert_eq!(blocks[0].timing, "00:00:01,000 --> 00:00:02,000");
        assert_eq!(blocks[0].text, vec!["Bonjour le monde".to_string()]);
        assert_eq!(blocks[1].joined_text(), "Au revoir\nà bientôt");
    }

    #[test]
    fn roundtrip_srt() {
        let first = parse(SAMPLE);
        let out = format(&first);
        let second = parse(&out);
        assert_eq!(first, second);
        assert_eq!(out, format(&second));
    }

    #[test]
    fn drops_chunks_shorter_than_three_lines() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\n\n\
                     2\n00:00:03,000 --> 00:00:04,000\nkept\n\n\
                     3\n";
        let blocks = parse(input);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, 1);
        assert_eq!(blocks[0].text, vec!["kept".to_string()]);
    }

    #[test]
    fn renumbers_on_output() {
        let input = "7\nA\nx\n\n\n\n42\nB\ny";
        let out = format(&parse(input));
        assert_eq!(out, "1\nA\nx\n\n2\nB\ny");
    }

    #[test]
    fn accepts_crlf_and_whitespace_separators() {
        let input = "1\r\nT1\r\nhello\r\n   \r\n2\r\nT2\r\nworld\r\n";
        let blocks = parse(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].timing, "T1");
        assert_eq!(blocks[1].text, vec!["world".to_string()]);
    }

    #[test]
    fn split_chunks_keeps_short_chunks() {
        let chunks = split_chunks("1\nT\ntext\n\n2\n\n3\nT\na\nb");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], vec!["2"]);
        assert_eq!(chunks[2].len(), 4);
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(parse("  \n\n ").is_empty());
        assert_eq!(format(&[]), "");
    }
}
