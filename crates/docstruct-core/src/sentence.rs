//! Sentence segmentation boundary
//!
//! Segmentation itself is pluggable: anything implementing
//! [`SentenceSegmenter`] can feed [`Document::sentence_lines`]. A simple
//! punctuation-based segmenter ships for command-line use.
//!
//! [`Document::sentence_lines`]: crate::model::Document::sentence_lines

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

/// Splits paragraph text into sentence spans
///
/// Implementations return byte ranges into `text`, in reading order. The
/// sequence is lazy and finite; calling `segment` again restarts it.
pub trait SentenceSegmenter {
    /// Sentence spans of `text`
    fn segment<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a>;
}

/// Splits after `.`, `!` or `?` followed by whitespace, and at line breaks
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSegmenter;

impl SentenceSegmenter for PunctuationSegmenter {
    fn segment<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Range<usize>> + 'a> {
        Box::new(SentenceSpans { text, pos: 0 })
    }
}

/// Iterator behind [`PunctuationSegmenter`]
#[derive(Debug, Clone)]
pub struct SentenceSpans<'a> {
    text: &'a str,
    pos: usize,
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    is_terminal(c) || matches!(c, '"' | '\'' | ')' | ']')
}

/// Consume closers after a terminal mark; returns the end of the sentence if
/// the mark really ends one.
fn close_sentence(chars: &mut Peekable<CharIndices<'_>>, base: usize, mut end: usize) -> Option<usize> {
    while let Some(&(j, next)) = chars.peek() {
        if !is_closer(next) {
            break;
        }
        end = base + j + next.len_utf8();
        chars.next();
    }
    match chars.peek() {
        None => Some(end),
        Some(&(_, next)) if next.is_whitespace() => Some(end),
        _ => None,
    }
}

impl Iterator for SentenceSpans<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let start = self.pos + (rest.len() - rest.trim_start().len());
        if start >= self.text.len() {
            self.pos = self.text.len();
            return None;
        }

        let mut end = self.text.len();
        let mut chars = self.text[start..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '\n' {
                end = start + i;
                break;
            }
            if is_terminal(c) {
                if let Some(stop) = close_sentence(&mut chars, start, start + i + c.len_utf8()) {
                    end = stop;
                    break;
                }
            }
        }

        self.pos = end;
        Some(start..end)
    }
}
