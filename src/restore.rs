//! Canonical numbering restoration.
//!
//! ## The Problem
//!
//! Extracted list numbering is local: every nested list restarts at `1)`,
//! and the only hint of depth is how far the line is indented.
//!
//! ```text
//! Source                     Restored
//! 1) Intro                   1 Intro
//!     text A                     (body of 1)
//! 2) Body                    2 Body
//!     1) Sub one             2.1 Sub one
//!     2) Sub two             2.2 Sub two
//! 3) End                     3 End
//! ```
//!
//! ## The State Machine
//!
//! A stack of frames `(marker kind, indent, counter)` tracks the open
//! levels. For each numbered line:
//!
//! - **Same indent, same marker family**: sibling, counter += 1.
//! - **Same indent, new family** (`a)` under `1)` without indentation):
//!   nested list, push a frame.
//! - **Deeper by at least `indent_step`**: child, push a frame whose counter
//!   starts at the marker's own value.
//! - **Shallower**: pop to the frame with that indent, sibling there.
//! - **Explicit dotted paths** (`2.3.1`): depth comes from the path, not the
//!   indent. Missing ancestors are pushed as implied frames.
//!
//! ## Tie-Break: Nearest Shallower Frame
//!
//! Source indentation drifts. A line indented less than `indent_step` deeper
//! than the open item, or landing between two open levels, is snapped to the
//! nearest shallower frame and becomes its sibling. This under-segments
//! rather than inventing depths, and each snap is recorded as
//! [`NumberingIssue::IndentDrift`].
//!
//! A sibling whose source value does not exceed the previous one (`3)`
//! followed by `1)` at the same indent) keeps counting up and is recorded as
//! [`NumberingIssue::NonIncreasing`]. The same holds when a level is
//! reopened after its frame was popped:
//!
//! ```text
//! 1) A                       1 A
//!     1) B                   1.1 B
//! a) C                       1.2 C   <- not 1.1 again
//! ```
//!
//! Numbers are never reused within an outline.

use serde::Serialize;

use crate::config::ChunkingConfig;
use crate::line::{normalize_whitespace, Marker, MarkerKind, RawLine};

/// One restored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RestoredLine {
    /// A numbered heading with its canonical number.
    Heading {
        /// Canonical dotted number, e.g. `"2.1"`.
        number: String,
        /// Depth, 1-based. Equals the number of segments in `number`.
        level: usize,
        /// Heading text after the marker.
        title: String,
        /// Source line number.
        line_no: usize,
    },
    /// A content line.
    Body {
        /// Whitespace-normalized text.
        text: String,
        /// Source line number.
        line_no: usize,
    },
}

/// Output of [`NumberRestorer::restore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Restoration {
    /// Non-blank lines in document order.
    pub lines: Vec<RestoredLine>,
    /// The input has content but no marker anywhere; every line is body.
    pub fell_back_to_flat: bool,
    /// Numbering irregularities resolved along the way.
    pub malformed: Vec<MalformedNumbering>,
}

/// A numbering irregularity and the line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedNumbering {
    /// Source line number.
    pub line_no: usize,
    /// What went wrong and how it was resolved.
    pub issue: NumberingIssue,
}

/// How a numbering irregularity was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NumberingIssue {
    /// The indent matched no open level; the line was snapped to an
    /// existing depth as a sibling.
    IndentDrift {
        /// Indent of the offending line, in columns.
        indent: usize,
        /// Depth the line was placed at.
        snapped_depth: usize,
    },
    /// A sibling's source value did not increase.
    NonIncreasing {
        /// Depth of the sibling.
        depth: usize,
        /// Value written in the source.
        found: u32,
        /// Value assigned instead.
        assigned: u32,
    },
    /// A dotted path named an ancestor that was already closed.
    AncestorMismatch {
        /// Depth of the ancestor segment.
        depth: usize,
        /// Value written in the source.
        found: u32,
        /// Value of the open ancestor that was kept.
        kept: u32,
    },
}

impl std::fmt::Display for MalformedNumbering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.issue {
            NumberingIssue::IndentDrift {
                indent,
                snapped_depth,
            } => write!(
                f,
                "line {}: indent {indent} matches no open level, snapped to depth {snapped_depth}",
                self.line_no
            ),
            NumberingIssue::NonIncreasing {
                depth,
                found,
                assigned,
            } => write!(
                f,
                "line {}: value {found} at depth {depth} does not increase, assigned {assigned}",
                self.line_no
            ),
            NumberingIssue::AncestorMismatch { depth, found, kept } => write!(
                f,
                "line {}: ancestor {found} at depth {depth} is closed, kept {kept}",
                self.line_no
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: MarkerKind,
    indent: usize,
    counter: u32,
    /// Last value written in the source at this level.
    source: u32,
}

/// Restores canonical dotted numbering from raw markers and indentation.
///
/// ## Example
///
/// ```rust
/// use strata::{lines_from_text, ChunkingConfig, NumberRestorer, RestoredLine};
///
/// let text = "1) Intro\n2) Body\n\t1) Sub one\n\t2) Sub two\n3) End";
/// let restorer = NumberRestorer::new(&ChunkingConfig::default());
/// let restored = restorer.restore(&lines_from_text(text, 4));
///
/// let numbers: Vec<&str> = restored
///     .lines
///     .iter()
///     .filter_map(|line| match line {
///         RestoredLine::Heading { number, .. } => Some(number.as_str()),
///         RestoredLine::Body { .. } => None,
///     })
///     .collect();
/// assert_eq!(numbers, ["1", "2", "2.1", "2.2", "3"]);
/// ```
#[derive(Debug, Clone)]
pub struct NumberRestorer {
    indent_step: usize,
}

impl NumberRestorer {
    /// Create a restorer using the config's indentation step.
    #[must_use]
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            indent_step: config.indent_step.max(1),
        }
    }

    /// Restore canonical numbering for a sequence of lines.
    ///
    /// Blank lines are dropped. Never fails: irregular numbering is resolved
    /// and reported in [`Restoration::malformed`].
    #[must_use]
    pub fn restore(&self, lines: &[RawLine]) -> Restoration {
        let mut run = Run {
            stack: Vec::new(),
            issued: Vec::new(),
            malformed: Vec::new(),
            indent_step: self.indent_step,
        };
        let mut restored = Vec::with_capacity(lines.len());
        let mut saw_marker = false;

        for line in lines.iter().filter(|line| !line.is_blank()) {
            let Some(marker) = &line.marker else {
                restored.push(RestoredLine::Body {
                    text: normalize_whitespace(&line.text),
                    line_no: line.line_no,
                });
                continue;
            };
            saw_marker = true;

            match marker {
                Marker::Dotted(path) => run.place_dotted(path, line.indent, line.line_no),
                _ => run.place_indented(marker, line.indent, line.line_no),
            }

            restored.push(RestoredLine::Heading {
                number: run.canonical(),
                level: run.stack.len(),
                title: line.title(),
                line_no: line.line_no,
            });
        }

        let fell_back_to_flat = !saw_marker && !restored.is_empty();
        if fell_back_to_flat {
            tracing::debug!(lines = restored.len(), "no numbering markers, falling back to flat");
        }

        Restoration {
            lines: restored,
            fell_back_to_flat,
            malformed: run.malformed,
        }
    }
}

/// Mutable state for one restoration pass.
struct Run {
    stack: Vec<Frame>,
    /// Last counter issued at each depth under the current ancestors.
    /// Outlives popped frames, so a reopened depth continues after them.
    issued: Vec<u32>,
    malformed: Vec<MalformedNumbering>,
    indent_step: usize,
}

impl Run {
    fn canonical(&self) -> String {
        self.stack
            .iter()
            .map(|frame| frame.counter.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    fn report(&mut self, line_no: usize, issue: NumberingIssue) {
        let event = MalformedNumbering { line_no, issue };
        tracing::debug!(%event, "malformed numbering");
        self.malformed.push(event);
    }

    /// Open a level below the top frame. The counter starts at `value`
    /// unless a popped sibling at this depth already used it.
    fn push(&mut self, kind: MarkerKind, indent: usize, value: u32, line_no: usize) {
        let depth = self.stack.len() + 1;
        let counter = match self.issued.get(depth - 1) {
            Some(&last) if value <= last => {
                self.report(
                    line_no,
                    NumberingIssue::NonIncreasing {
                        depth,
                        found: value,
                        assigned: last + 1,
                    },
                );
                last + 1
            }
            _ => value,
        };
        self.stack.push(Frame {
            kind,
            indent,
            counter,
            source: value,
        });
        self.issue(depth, counter);
    }

    fn issue(&mut self, depth: usize, counter: u32) {
        self.issued.truncate(depth - 1);
        self.issued.push(counter);
    }

    /// Next sibling at the current top frame.
    fn advance(&mut self, found: u32, line_no: usize, check: bool) {
        let depth = self.stack.len();
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let previous = top.source;
        top.counter += 1;
        if check {
            top.source = found;
        }
        let assigned = top.counter;
        self.issue(depth, assigned);
        if check && found <= previous {
            self.report(
                line_no,
                NumberingIssue::NonIncreasing {
                    depth,
                    found,
                    assigned,
                },
            );
        }
    }

    /// Sibling of the top frame, resolved as indentation drift.
    fn snap(&mut self, indent: usize, line_no: usize) {
        self.advance(0, line_no, false);
        let snapped_depth = self.stack.len();
        self.report(
            line_no,
            NumberingIssue::IndentDrift {
                indent,
                snapped_depth,
            },
        );
    }

    /// Single-letter roman numerals double as letters (`c)` is usually the
    /// third item, not the hundredth). An open frame at this indent decides;
    /// otherwise only `i` starts a roman list.
    fn resolve_letter(&self, marker: &Marker, indent: usize) -> Marker {
        let Some(alpha) = marker.as_alpha() else {
            return marker.clone();
        };
        let open = self
            .stack
            .iter()
            .rev()
            .find(|f| f.indent == indent && (f.kind == marker.kind() || f.kind == alpha.kind()));
        match open {
            Some(frame) if frame.kind == marker.kind() => marker.clone(),
            Some(_) => alpha,
            None if marker.value() == 1 => marker.clone(),
            None => alpha,
        }
    }

    fn place_indented(&mut self, marker: &Marker, indent: usize, line_no: usize) {
        let marker = self.resolve_letter(marker, indent);
        let (kind, value) = (marker.kind(), marker.value());

        let Some(top) = self.stack.last().copied() else {
            self.push(kind, indent, value, line_no);
            return;
        };

        if indent > top.indent {
            if indent - top.indent >= self.indent_step {
                self.push(kind, indent, value, line_no);
            } else {
                self.snap(indent, line_no);
            }
            return;
        }

        while self.stack.len() > 1 && self.stack.last().is_some_and(|f| f.indent > indent) {
            self.stack.pop();
        }
        if self.stack.last().is_some_and(|f| f.indent == indent) {
            self.place_same_indent(kind, value, indent, line_no);
        } else {
            self.snap(indent, line_no);
        }
    }

    fn place_same_indent(&mut self, kind: MarkerKind, value: u32, indent: usize, line_no: usize) {
        let sibling = self
            .stack
            .iter()
            .rposition(|f| f.indent == indent && f.kind == kind);
        match sibling {
            Some(pos) => {
                self.stack.truncate(pos + 1);
                self.advance(value, line_no, true);
            }
            None => self.push(kind, indent, value, line_no),
        }
    }

    fn place_dotted(&mut self, path: &[u32], indent: usize, line_no: usize) {
        let depth = path.len();

        // Reconcile the ancestors the path names with the open frames.
        let mut i = 0;
        while i + 1 < depth && i < self.stack.len() {
            let counter = self.stack[i].counter;
            match path[i].cmp(&counter) {
                std::cmp::Ordering::Equal => i += 1,
                std::cmp::Ordering::Greater => {
                    self.stack.truncate(i);
                    break;
                }
                std::cmp::Ordering::Less => {
                    self.report(
                        line_no,
                        NumberingIssue::AncestorMismatch {
                            depth: i + 1,
                            found: path[i],
                            kept: counter,
                        },
                    );
                    i += 1;
                }
            }
        }

        if self.stack.len() >= depth {
            self.stack.truncate(depth);
            self.advance(path[depth - 1], line_no, true);
            return;
        }
        while self.stack.len() < depth {
            let next = path[self.stack.len()];
            self.push(MarkerKind::Dotted, indent, next, line_no);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::lines_from_text;

    fn restore(text: &str) -> Restoration {
        NumberRestorer::new(&ChunkingConfig::default()).restore(&lines_from_text(text, 4))
    }

    fn numbers(restoration: &Restoration) -> Vec<String> {
        restoration
            .lines
            .iter()
            .filter_map(|line| match line {
                RestoredLine::Heading { number, .. } => Some(number.clone()),
                RestoredLine::Body { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_indented_lists() {
        let r = restore("1) Intro\n\ttext A\n2) Body\n\t1) Sub one\n\t\ttext B\n\t2) Sub two\n3) End");
        assert_eq!(numbers(&r), ["1", "2", "2.1", "2.2", "3"]);
        assert!(r.malformed.is_empty());
        assert!(!r.fell_back_to_flat);
    }

    #[test]
    fn test_levels_match_segments() {
        let r = restore("1) A\n\t1) B\n\t\t1) C\n2) D");
        for line in &r.lines {
            if let RestoredLine::Heading { number, level, .. } = line {
                assert_eq!(number.split('.').count(), *level);
            }
        }
    }

    #[test]
    fn test_shallow_indent_snaps_to_sibling() {
        let r = restore("1) A\n  1) B");
        assert_eq!(numbers(&r), ["1", "2"]);
        assert_eq!(r.malformed.len(), 1);
        assert!(matches!(
            r.malformed[0].issue,
            NumberingIssue::IndentDrift { indent: 2, snapped_depth: 1 }
        ));
    }

    #[test]
    fn test_indent_between_levels_snaps_shallower() {
        // Open levels at 0 and 8; a line at 4 matches neither.
        let r = restore("1) A\n\t\t1) B\n\t2) C");
        assert_eq!(numbers(&r), ["1", "1.1", "2"]);
        assert!(matches!(r.malformed[0].issue, NumberingIssue::IndentDrift { indent: 4, .. }));
    }

    #[test]
    fn test_restart_at_same_depth_is_flagged() {
        let r = restore("1) A\n2) B\n3) C\n1) D");
        assert_eq!(numbers(&r), ["1", "2", "3", "4"]);
        assert!(matches!(
            r.malformed[0].issue,
            NumberingIssue::NonIncreasing { depth: 1, found: 1, assigned: 4 }
        ));
    }

    #[test]
    fn test_reopened_depth_continues_after_popped_sibling() {
        // "a)" at the outer indent opens a nested list under 1, where 1.1
        // was already issued to B.
        let r = restore("1) A\n\t1) B\na) C");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2"]);
        assert_eq!(r.malformed.len(), 1);
        assert!(matches!(
            r.malformed[0].issue,
            NumberingIssue::NonIncreasing { depth: 2, found: 1, assigned: 2 }
        ));
    }

    #[test]
    fn test_family_switch_after_nested_list_keeps_numbers_unique() {
        let r = restore("1) A\n\ta) x\n\tb) y\n\t\t1) q\n\t1) z");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "1.2.1", "1.2.2"]);
        assert_eq!(r.malformed[0].line_no, 5);
    }

    #[test]
    fn test_renumbered_list_continues_without_further_reports() {
        let r = restore("1) A\n\t1) B\na) C\nb) D\nc) E");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "1.3", "1.4"]);
        assert_eq!(r.malformed.len(), 1);
    }

    #[test]
    fn test_source_restart_value_wins_at_new_depth() {
        let r = restore("1) A\n\t3) B\n\t4) C");
        assert_eq!(numbers(&r), ["1", "1.3", "1.4"]);
    }

    #[test]
    fn test_nested_list_at_same_indent() {
        let r = restore("1) A\na) x\nb) y\n2) B");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "2"]);
    }

    #[test]
    fn test_alpha_letters_that_look_roman() {
        let r = restore("a) one\nb) two\nc) three\nd) four");
        assert_eq!(numbers(&r), ["1", "2", "3", "4"]);
        assert!(r.malformed.is_empty());
    }

    #[test]
    fn test_roman_sequence() {
        let r = restore("1) A\n\ti) one\n\tii) two\n\tiii) three\n\tiv) four\n\tv) five");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "1.3", "1.4", "1.5"]);
        assert!(r.malformed.is_empty());
    }

    #[test]
    fn test_dotted_paths() {
        let r = restore("1. Scope\n1.1 Terms\n1.2 Symbols\n2. Rules\n2.1 General");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "2", "2.1"]);
    }

    #[test]
    fn test_dotted_gap_pushes_implied_frames() {
        let r = restore("1. Scope\n1.1.1 Deep");
        assert_eq!(numbers(&r), ["1", "1.1.1"]);
        let levels: Vec<usize> = r
            .lines
            .iter()
            .filter_map(|line| match line {
                RestoredLine::Heading { level, .. } => Some(*level),
                RestoredLine::Body { .. } => None,
            })
            .collect();
        assert_eq!(levels, [1, 3]);
    }

    #[test]
    fn test_dotted_advances_ancestor() {
        let r = restore("1. A\n1.1 B\n2.1 C");
        assert_eq!(numbers(&r), ["1", "1.1", "2.1"]);
    }

    #[test]
    fn test_dotted_backwards_ancestor_is_flagged() {
        let r = restore("3. A\n1.1 B");
        assert_eq!(numbers(&r), ["3", "3.1"]);
        assert!(matches!(
            r.malformed[0].issue,
            NumberingIssue::AncestorMismatch { depth: 1, found: 1, kept: 3 }
        ));
    }

    #[test]
    fn test_mixed_dotted_and_indented() {
        let r = restore("1) A\n\t1) B\n1.2 C\n\t\t1) D");
        assert_eq!(numbers(&r), ["1", "1.1", "1.2", "1.2.1"]);
    }

    #[test]
    fn test_no_markers_falls_back_to_flat() {
        let r = restore("Plain text.\n\nMore text.");
        assert!(r.fell_back_to_flat);
        assert_eq!(r.lines.len(), 2);
        assert!(numbers(&r).is_empty());
    }

    #[test]
    fn test_body_lines_normalized() {
        let r = restore("1) A\n\t  lots   of\tspace  ");
        assert_eq!(
            r.lines[1],
            RestoredLine::Body {
                text: "lots of space".to_string(),
                line_no: 2
            }
        );
    }
}
