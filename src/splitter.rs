//! Separates subtitle block metadata (index and timing lines) from the
//! spoken text lines of a subtitle file.
//!
//! The splitter tracks a running block counter. A line whose trimmed form
//! equals the counter, or the counter plus one, opens a block and is paired
//! with the line after it. Everything else that is not blank is text.

use log::{debug, warn};

use crate::error::Result;

/// Classification of a single line against the running block counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Empty after trimming; dropped from both streams
    Blank,
    /// Equals the expected block index
    Index,
    /// Equals the expected block index plus one; the counter catches up
    IndexAhead,
    /// Anything else
    Text,
}

/// Classify a line against the block index the splitter currently expects
pub fn classify(line: &str, expected_index: u64) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineClass::Blank
    } else if trimmed == expected_index.to_string() {
        LineClass::Index
    } else if trimmed == (expected_index + 1).to_string() {
        LineClass::IndexAhead
    } else {
        LineClass::Text
    }
}

/// Receiver for the two streams produced by the splitter
pub trait SplitSink {
    /// Called once per block with its index line and timing line
    fn metadata(&mut self, index_line: &str, timing_line: &str) -> Result<()>;

    /// Called once per spoken-content line
    fn text(&mut self, line: &str) -> Result<()>;
}

/// Counters describing one splitter pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitStats {
    pub blocks: usize,
    pub text_lines: usize,
    pub blank_lines: usize,
    pub resyncs: usize,
    pub orphan_indices: usize,
}

/// In-memory result of a splitter pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    /// Index and timing lines, interleaved in original order
    pub metadata: Vec<String>,
    /// Spoken-content lines in original order
    pub text: Vec<String>,
    pub stats: SplitStats,
}

impl SplitSink for SplitOutput {
    fn metadata(&mut self, index_line: &str, timing_line: &str) -> Result<()> {
        self.metadata.push(index_line.to_string());
        self.metadata.push(timing_line.to_string());
        Ok(())
    }

    fn text(&mut self, line: &str) -> Result<()> {
        self.text.push(line.to_string());
        Ok(())
    }
}

/// Single-pass subtitle block state machine
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    expected_index: u64,
    stats: SplitStats,
}

impl BlockSplitter {
    pub fn new() -> Self {
        Self {
            expected_index: 1,
            stats: SplitStats::default(),
        }
    }

    /// The block index the next index line is expected to carry
    pub fn expected_index(&self) -> u64 {
        self.expected_index
    }

    /// Run the state machine over `lines`, feeding both streams into `sink`.
    ///
    /// Lines are passed through verbatim. The only lookahead is the line
    /// following an index line, which becomes its timing line.
    pub fn split_into<I, S, K>(mut self, lines: I, sink: &mut K) -> Result<SplitStats>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        K: SplitSink,
    {
        let mut lines = lines.into_iter().peekable();

        while let Some(line) = lines.next() {
            let line = line.as_ref();
            match classify(line, self.expected_index) {
                LineClass::Blank => {
                    self.stats.blank_lines += 1;
                }
                LineClass::IndexAhead => {
                    self.expected_index += 1;
                    self.stats.resyncs += 1;
                    debug!("Block counter re-synchronized to {}", self.expected_index);
                    self.open_block(line, &mut lines, sink)?;
                }
                LineClass::Index => {
                    self.open_block(line, &mut lines, sink)?;
                }
                LineClass::Text => {
                    self.stats.text_lines += 1;
                    sink.text(line)?;
                }
            }
        }

        debug!(
            "Split {} blocks, {} text lines ({} re-syncs, {} orphan indices)",
            self.stats.blocks, self.stats.text_lines, self.stats.resyncs, self.stats.orphan_indices
        );
        Ok(self.stats)
    }

    /// Convenience wrapper collecting both streams in memory
    pub fn split<I, S>(self, lines: I) -> Result<SplitOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output = SplitOutput::default();
        let stats = self.split_into(lines, &mut output)?;
        output.stats = stats;
        Ok(output)
    }

    fn open_block<I, S, K>(
        &mut self,
        index_line: &str,
        lines: &mut std::iter::Peekable<I>,
        sink: &mut K,
    ) -> Result<()>
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
        K: SplitSink,
    {
        match lines.next_if(|next| !next.as_ref().trim().is_empty()) {
            Some(timing_line) => {
                self.stats.blocks += 1;
                sink.metadata(index_line, timing_line.as_ref())
            }
            None => {
                // No timing line to pair with: keep the line as content
                warn!(
                    "Index line '{}' has no timing line, keeping it as text",
                    index_line.trim()
                );
                self.stats.orphan_indices += 1;
                self.stats.text_lines += 1;
                sink.text(index_line)
            }
        }
    }
}

impl Default for BlockSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(lines: &[&str]) -> SplitOutput {
        BlockSplitter::new().split(lines.iter().copied()).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("   ", 1), LineClass::Blank);
        assert_eq!(classify("3", 3), LineClass::Index);
        assert_eq!(classify(" 3 ", 3), LineClass::Index);
        assert_eq!(classify("4", 3), LineClass::IndexAhead);
        assert_eq!(classify("5", 3), LineClass::Text);
        assert_eq!(classify("03", 3), LineClass::Text);
        assert_eq!(classify("hello", 3), LineClass::Text);
    }

    #[test]
    fn test_split_basic_blocks() {
        let output = split(&["1", "timing-1", "hello", "", "2", "timing-2", "world", ""]);

        assert_eq!(output.metadata, vec!["1", "timing-1", "2", "timing-2"]);
        assert_eq!(output.text, vec!["hello", "world"]);
        assert_eq!(output.stats.blocks, 2);
        assert_eq!(output.stats.resyncs, 1);
        assert_eq!(output.stats.blank_lines, 2);
    }

    #[test]
    fn test_split_multi_line_text_keeps_order() {
        let output = split(&[
            "1",
            "00:00:01,000 --> 00:00:02,000",
            "first line",
            "second line",
            "",
            "2",
            "00:00:03,000 --> 00:00:04,000",
            "third line",
        ]);

        assert_eq!(output.text, vec!["first line", "second line", "third line"]);
        assert_eq!(output.metadata.len(), 4);
    }

    #[test]
    fn test_split_index_two_ahead_falls_back_to_text() {
        // Block 2 is missing; 3 is neither the expected index nor its successor
        let output = split(&["1", "t1", "a", "", "3", "t3", "b"]);

        assert_eq!(output.text, vec!["a", "3", "t3", "b"]);
        assert_eq!(output.metadata, vec!["1", "t1"]);
    }

    #[test]
    fn test_split_counter_catches_up_one_step_at_a_time() {
        // The counter only moves when it sees its successor
        let output = split(&["2", "t2", "a", "", "3", "t3", "b"]);

        assert_eq!(output.metadata, vec!["2", "t2", "3", "t3"]);
        assert_eq!(output.text, vec!["a", "b"]);
        assert_eq!(output.stats.resyncs, 2);
    }

    #[test]
    fn test_split_repeated_index_is_metadata_again() {
        let output = split(&["1", "t1", "a", "", "1", "t1b", "b"]);

        assert_eq!(output.metadata, vec!["1", "t1", "1", "t1b"]);
        assert_eq!(output.text, vec!["a", "b"]);
    }

    #[test]
    fn test_split_numeric_text_matching_counter_is_taken_as_index() {
        // Known limitation: a spoken "2" right where the next block is expected
        let output = split(&["1", "t1", "count with me", "2", "and three", ""]);

        assert_eq!(output.metadata, vec!["1", "t1", "2", "and three"]);
        assert_eq!(output.text, vec!["count with me"]);
    }

    #[test]
    fn test_split_orphan_index_at_end_becomes_text() {
        let output = split(&["1", "t1", "hello", "", "2"]);

        assert_eq!(output.metadata, vec!["1", "t1"]);
        assert_eq!(output.text, vec!["hello", "2"]);
        assert_eq!(output.stats.orphan_indices, 1);
    }

    #[test]
    fn test_split_orphan_index_before_blank_becomes_text() {
        let output = split(&["1", "", "hello"]);

        assert!(output.metadata.is_empty());
        assert_eq!(output.text, vec!["1", "hello"]);
    }

    #[test]
    fn test_split_preserves_original_line_content() {
        let output = split(&[" 1 ", "t1  ", "  spaced text  "]);

        assert_eq!(output.metadata, vec![" 1 ", "t1  "]);
        assert_eq!(output.text, vec!["  spaced text  "]);
    }

    #[test]
    fn test_split_is_lossless_partition_of_non_blank_lines() {
        let input = [
            "", "1", "t1", "one", "", "", "2", "t2", "two", "2", "", "7", "x", "", "3",
        ];
        let output = split(&input);

        let mut expected: Vec<&str> = input.iter().copied().filter(|l| !l.trim().is_empty()).collect();
        let mut produced: Vec<&str> = output
            .metadata
            .iter()
            .chain(output.text.iter())
            .map(String::as_str)
            .collect();
        expected.sort_unstable();
        produced.sort_unstable();
        assert_eq!(produced, expected);
    }

    #[test]
    fn test_split_empty_input() {
        let output = split(&[]);
        assert!(output.metadata.is_empty());
        assert!(output.text.is_empty());
        assert_eq!(output.stats, SplitStats::default());
    }

    struct RejectingSink;

    impl SplitSink for RejectingSink {
        fn metadata(&mut self, _index_line: &str, _timing_line: &str) -> Result<()> {
            Err(crate::error::config_error("sink", "closed"))
        }

        fn text(&mut self, _line: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_errors_are_propagated() {
        let result = BlockSplitter::new().split_into(["1", "t1", "hello"], &mut RejectingSink);
        assert!(result.is_err());
    }
}
