//! Re-segments a flat character stream into sentence-length lines.
//!
//! Words are separated by gap characters. Each finished word is either a
//! disfluency (sent to the disfluency log) or content (appended to the
//! current line followed by one space). A line is emitted once it is longer
//! than the configured minimum and its last word ends a sentence.

use log::debug;

use crate::error::Result;
use crate::filler::FillerSet;

/// Default minimum rendered length a line must exceed before it is emitted
pub const DEFAULT_MIN_LINE_LENGTH: usize = 46;

/// Default characters that end a sentence
pub const DEFAULT_TERMINATORS: &[char] = &['.', '?'];

/// Default marker left in transcripts where a word was bleeped
pub const DEFAULT_CENSOR_PLACEHOLDER: &str = "[ __ ]";

/// Word separators. A carriage return counts as part of a newline.
pub fn is_gap(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r')
}

/// Settings for one reflow pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowConfig {
    pub fillers: FillerSet,
    pub min_line_length: usize,
    pub terminators: Vec<char>,
    pub censor_placeholder: String,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            fillers: FillerSet::default(),
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            terminators: DEFAULT_TERMINATORS.to_vec(),
            censor_placeholder: DEFAULT_CENSOR_PLACEHOLDER.to_string(),
        }
    }
}

/// Receiver for reflow results
pub trait ReflowSink {
    /// Called once per finished sentence line, without a line terminator
    fn sentence(&mut self, line: &str) -> Result<()>;

    /// Called once per removed filler word, in its original form
    fn disfluency(&mut self, word: &str) -> Result<()>;
}

/// Collects reflow results in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflowOutput {
    pub sentences: Vec<String>,
    pub disfluencies: Vec<String>,
}

impl ReflowSink for ReflowOutput {
    fn sentence(&mut self, line: &str) -> Result<()> {
        self.sentences.push(line.to_string());
        Ok(())
    }

    fn disfluency(&mut self, word: &str) -> Result<()> {
        self.disfluencies.push(word.to_string());
        Ok(())
    }
}

/// Counters describing one reflow pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflowStats {
    pub words: usize,
    pub fillers_removed: usize,
    pub placeholders_removed: usize,
    pub lines: usize,
    pub forced_flush: bool,
}

/// Remove every placeholder occurrence together with one adjacent space.
///
/// Returns the cleaned line and how many placeholders were removed.
pub fn strip_placeholder(line: &str, placeholder: &str) -> (String, usize) {
    if placeholder.is_empty() || !line.contains(placeholder) {
        return (line.to_string(), 0);
    }

    let leading = format!(" {}", placeholder);
    let trailing = format!("{} ", placeholder);

    let removed_leading = line.matches(leading.as_str()).count();
    let cleaned = line.replace(leading.as_str(), "");
    let removed_trailing = cleaned.matches(trailing.as_str()).count();
    let cleaned = cleaned.replace(trailing.as_str(), "");

    // A line holding nothing but the placeholder has no space to take with it
    if cleaned.trim() == placeholder {
        return (String::new(), removed_leading + removed_trailing + 1);
    }

    (cleaned, removed_leading + removed_trailing)
}

/// Streaming sentence reflow engine
pub struct SentenceReflower<'a, K: ReflowSink> {
    config: &'a ReflowConfig,
    sink: K,
    word: String,
    line: String,
    line_len: usize,
    stats: ReflowStats,
}

impl<'a, K: ReflowSink> SentenceReflower<'a, K> {
    pub fn new(config: &'a ReflowConfig, sink: K) -> Self {
        Self {
            config,
            sink,
            word: String::new(),
            line: String::new(),
            line_len: 0,
            stats: ReflowStats::default(),
        }
    }

    pub fn push_char(&mut self, c: char) -> Result<()> {
        if is_gap(c) {
            self.end_word()
        } else {
            self.word.push(c);
            Ok(())
        }
    }

    pub fn push_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.push_char(c)?;
        }
        Ok(())
    }

    /// Rendered length of the line currently being accumulated
    pub fn pending_len(&self) -> usize {
        self.line_len
    }

    /// Flush whatever is left and hand back the sink.
    ///
    /// A trailing word with no gap after it is still classified; if it is
    /// content it is appended without a following space.
    pub fn finish(mut self) -> Result<(K, ReflowStats)> {
        if !self.word.is_empty() {
            let word = std::mem::take(&mut self.word);
            self.stats.words += 1;
            if self.config.fillers.is_filler(&word) {
                self.stats.fillers_removed += 1;
                self.sink.disfluency(&word)?;
            } else {
                self.line_len += word.chars().count();
                self.line.push_str(&word);
            }
        }

        if !self.line.is_empty() {
            self.stats.forced_flush = true;
            self.flush_line()?;
        }

        debug!(
            "Reflowed {} words into {} lines, removed {} fillers",
            self.stats.words, self.stats.lines, self.stats.fillers_removed
        );
        Ok((self.sink, self.stats))
    }

    fn end_word(&mut self) -> Result<()> {
        if self.word.is_empty() {
            return Ok(());
        }

        let word = std::mem::take(&mut self.word);
        self.stats.words += 1;

        if self.config.fillers.is_filler(&word) {
            self.stats.fillers_removed += 1;
            return self.sink.disfluency(&word);
        }

        let ends_sentence = word
            .chars()
            .last()
            .is_some_and(|c| self.config.terminators.contains(&c));

        self.line_len += word.chars().count() + 1;
        self.line.push_str(&word);
        self.line.push(' ');

        if ends_sentence && self.line_len > self.config.min_line_length {
            self.flush_line()?;
        }
        Ok(())
    }

    fn flush_line(&mut self) -> Result<()> {
        let line = std::mem::take(&mut self.line);
        self.line_len = 0;

        let (cleaned, removed) = strip_placeholder(&line, &self.config.censor_placeholder);
        self.stats.placeholders_removed += removed;

        if cleaned.trim().is_empty() {
            debug!("Dropping line left empty after placeholder removal");
            return Ok(());
        }

        self.stats.lines += 1;
        self.sink.sentence(&cleaned)
    }
}

/// Reflow a complete text in memory
pub fn reflow(text: &str, config: &ReflowConfig) -> Result<ReflowOutput> {
    let mut reflower = SentenceReflower::new(config, ReflowOutput::default());
    reflower.push_str(text)?;
    let (output, _) = reflower.finish()?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReflowConfig {
        ReflowConfig::default()
    }

    #[test]
    fn test_short_text_is_one_forced_line() {
        let output = reflow("um, hello there. how are you today? ", &config()).unwrap();

        assert_eq!(output.disfluencies, vec!["um,"]);
        assert_eq!(output.sentences, vec!["hello there. how are you today? "]);
    }

    #[test]
    fn test_line_breaks_after_threshold_on_terminator() {
        let text = "this first sentence is long enough to pass the limit. and a second one? tail";
        let output = reflow(text, &config()).unwrap();

        assert_eq!(
            output.sentences,
            vec![
                "this first sentence is long enough to pass the limit. ",
                "and a second one? tail",
            ]
        );
    }

    #[test]
    fn test_no_break_before_threshold() {
        // A line exactly at the limit does not exceed it
        let text = "aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd eeeee. more words here. ";
        assert_eq!("aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd eeeee. ".len(), 47);

        let strict = ReflowConfig {
            min_line_length: 47,
            ..config()
        };
        let output = reflow(text, &strict).unwrap();
        assert_eq!(output.sentences, vec![text]);

        let output = reflow(text, &config()).unwrap();
        assert_eq!(
            output.sentences,
            vec!["aaaaaaaaa bbbbbbbbb ccccccccc ddddddddd eeeee. ", "more words here. "]
        );
    }

    #[test]
    fn test_only_configured_terminators_end_lines() {
        let text = "this line is long enough but ends with a bang! then continues. ";
        let output = reflow(text, &config()).unwrap();
        assert_eq!(output.sentences, vec![text]);
    }

    #[test]
    fn test_fillers_are_logged_in_original_case() {
        let output = reflow("Um so UH. I think, uh, umbrella ", &config()).unwrap();

        assert_eq!(output.disfluencies, vec!["Um", "UH.", "uh,"]);
        assert_eq!(output.sentences, vec!["so I think, umbrella "]);
    }

    #[test]
    fn test_fillers_do_not_count_toward_line_length() {
        let cfg = ReflowConfig {
            min_line_length: 10,
            ..config()
        };
        let output = reflow("um um um um um um go. next one. ", &cfg).unwrap();

        assert_eq!(output.disfluencies.len(), 6);
        assert_eq!(output.sentences, vec!["go. next one. "]);
    }

    #[test]
    fn test_placeholder_removed_mid_sentence() {
        let output = reflow("he said [ __ ] loudly. ", &config()).unwrap();
        assert_eq!(output.sentences, vec!["he said loudly. "]);
    }

    #[test]
    fn test_placeholder_removed_at_line_start_on_threshold_flush() {
        let text = "[ __ ] that was a really long sentence to get past it. ";
        let output = reflow(text, &config()).unwrap();
        assert_eq!(
            output.sentences,
            vec!["that was a really long sentence to get past it. "]
        );
    }

    #[test]
    fn test_strip_placeholder_counts_removals() {
        let (cleaned, removed) = strip_placeholder("[ __ ] a [ __ ] b [ __ ] ", "[ __ ]");
        assert_eq!(cleaned, "a b ");
        assert_eq!(removed, 3);

        let (cleaned, removed) = strip_placeholder("nothing here ", "[ __ ]");
        assert_eq!(cleaned, "nothing here ");
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_lone_placeholder_never_reaches_output() {
        let (cleaned, removed) = strip_placeholder("[ __ ]", "[ __ ]");
        assert_eq!(cleaned, "");
        assert_eq!(removed, 1);

        let output = reflow("[ __ ]", &config()).unwrap();
        assert!(output.sentences.is_empty());

        let output = reflow("hello\n[ __ ]", &config()).unwrap();
        assert_eq!(output.sentences, vec!["hello"]);
    }

    #[test]
    fn test_newlines_are_gaps() {
        let output = reflow("hello\nthere\nfriend.\n", &config()).unwrap();
        assert_eq!(output.sentences, vec!["hello there friend. "]);
    }

    #[test]
    fn test_consecutive_gaps_do_not_create_words() {
        let output = reflow("hello   there \n\n friend. ", &config()).unwrap();
        assert_eq!(output.sentences, vec!["hello there friend. "]);
    }

    #[test]
    fn test_trailing_word_without_gap_is_kept() {
        let output = reflow("hello there", &config()).unwrap();
        assert_eq!(output.sentences, vec!["hello there"]);
    }

    #[test]
    fn test_trailing_filler_without_gap_is_logged() {
        let output = reflow("hello there uh", &config()).unwrap();
        assert_eq!(output.sentences, vec!["hello there "]);
        assert_eq!(output.disfluencies, vec!["uh"]);
    }

    #[test]
    fn test_empty_and_filler_only_input_emit_nothing() {
        assert_eq!(reflow("", &config()).unwrap(), ReflowOutput::default());

        let output = reflow("um uh. ", &config()).unwrap();
        assert!(output.sentences.is_empty());
        assert_eq!(output.disfluencies, vec!["um", "uh."]);
    }

    #[test]
    fn test_rerun_on_own_output_is_stable() {
        let text = "so um this is the first sentence and it runs long enough. \
                    uh then another sentence that also runs long enough? ";
        let first = reflow(text, &config()).unwrap();
        let rendered: String = first.sentences.iter().map(|l| format!("{}\n", l)).collect();
        let second = reflow(&rendered, &config()).unwrap();

        assert_eq!(first.sentences.len(), 2);
        assert!(second.disfluencies.is_empty());
        assert_eq!(second.sentences, first.sentences);
    }

    #[test]
    fn test_word_order_is_preserved() {
        let text = "one um two uh three four. ";
        let output = reflow(text, &config()).unwrap();
        let words: Vec<&str> = output.sentences[0].split_whitespace().collect();
        assert_eq!(words, vec!["one", "two", "three", "four."]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let cfg = ReflowConfig {
            min_line_length: 5,
            ..config()
        };
        // "éé. " is 4 characters but 6 bytes
        let output = reflow("éé. x. ", &cfg).unwrap();
        assert_eq!(output.sentences, vec!["éé. x. "]);
    }

    #[test]
    fn test_stats_track_the_pass() {
        let cfg = config();
        let mut reflower = SentenceReflower::new(&cfg, ReflowOutput::default());
        reflower.push_str("uh hi [ __ ] there").unwrap();
        assert_eq!(reflower.pending_len(), "hi [ __ ] ".len());

        let (output, stats) = reflower.finish().unwrap();
        assert_eq!(output.sentences, vec!["hi there"]);
        assert_eq!(stats.words, 6);
        assert_eq!(stats.fillers_removed, 1);
        assert_eq!(stats.placeholders_removed, 1);
        assert_eq!(stats.lines, 1);
        assert!(stats.forced_flush);
    }
}
