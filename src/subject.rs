//! Topics and subject patterns.
//!
//! A topic is the concrete, dot-delimited name an event is published under
//! (`orders.created`). A subject is a pattern used when subscribing: each
//! segment is a literal, `*` (exactly one segment) or, as the last segment
//! only, `>` (one or more trailing segments).

use thiserror::Error;

pub const SEPARATOR: char = '.';
pub const SINGLE_WILDCARD: &str = "*";
pub const TAIL_WILDCARD: &str = ">";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("subject is empty")]
    Empty,
    #[error("segment {index} is empty")]
    EmptySegment { index: usize },
    #[error("segment {index} ({segment:?}) is not a lower-case identifier")]
    InvalidSegment { index: usize, segment: String },
    #[error("segment {index} is a wildcard, which is not allowed in a topic")]
    Wildcard { index: usize },
    #[error("'>' may only appear as the last segment (found at {index})")]
    MisplacedTail { index: usize },
}

/// Check that `topic` is a concrete topic: no wildcards, every segment a
/// lower-case identifier.
pub fn validate_topic(topic: &str) -> Result<(), SubjectError> {
    validate(topic, false)
}

/// Check that `pattern` is a valid subscription subject.
pub fn validate_pattern(pattern: &str) -> Result<(), SubjectError> {
    validate(pattern, true)
}

fn validate(subject: &str, allow_wildcards: bool) -> Result<(), SubjectError> {
    if subject.is_empty() {
        return Err(SubjectError::Empty);
    }

    let segments: Vec<&str> = subject.split(SEPARATOR).collect();
    let last = segments.len() - 1;

    for (index, segment) in segments.into_iter().enumerate() {
        match segment {
            "" => return Err(SubjectError::EmptySegment { index }),
            SINGLE_WILDCARD | TAIL_WILDCARD if !allow_wildcards => {
                return Err(SubjectError::Wildcard { index })
            }
            SINGLE_WILDCARD => {}
            TAIL_WILDCARD if index != last => return Err(SubjectError::MisplacedTail { index }),
            TAIL_WILDCARD => {}
            literal if is_literal_segment(literal) => {}
            other => {
                return Err(SubjectError::InvalidSegment {
                    index,
                    segment: other.to_string(),
                })
            }
        }
    }

    Ok(())
}

/// `[a-z]` optionally followed by `[a-z0-9_]*[a-z0-9]`.
fn is_literal_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let (first, rest) = match bytes.split_first() {
        Some(split) => split,
        None => return false,
    };

    if !first.is_ascii_lowercase() {
        return false;
    }

    if let Some(last) = rest.last() {
        if *last == b'_' {
            return false;
        }
    }

    rest.iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
}

/// Whether `pattern` selects `topic`.
///
/// Exact equality matches immediately. Otherwise segments are compared
/// pairwise: `*` accepts any single segment, a trailing `>` accepts the rest
/// of the topic (at least one segment), literals compare ASCII
/// case-insensitively. Different segment counts never match unless the
/// pattern ends in `>`.
pub fn matches(pattern: &str, topic: &str) -> bool {
    if pattern == topic {
        return true;
    }

    let mut pattern_segments = pattern.split(SEPARATOR);
    let mut topic_segments = topic.split(SEPARATOR);

    loop {
        match (pattern_segments.next(), topic_segments.next()) {
            (None, None) => return true,
            (Some(TAIL_WILDCARD), Some(_)) => return pattern_segments.next().is_none(),
            (Some(SINGLE_WILDCARD), Some(_)) => {}
            (Some(expected), Some(actual)) => {
                if !expected.eq_ignore_ascii_case(actual) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
