//! Find and replace over a [`TextBuffer`].
//!
//! Queries compile to a [`regex::Regex`] once; literal patterns are escaped.
//! Matching runs over the `\n`-normalized text and reports (line, column)
//! ranges. Empty matches are never reported or replaced.

use regex::{Captures, Regex, RegexBuilder};
use thiserror::Error;

use crate::error::EditError;
use crate::session::EditorSession;
use crate::text::{Position, TextBuffer};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search pattern is empty")]
    EmptyPattern,

    #[error("invalid regex: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// A compiled find pattern
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: String,
    case_sensitive: bool,
    regex: bool,
    compiled: Regex,
}

impl SearchQuery {
    pub fn new(pattern: &str, case_sensitive: bool, regex: bool) -> Result<Self, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }
        let source = if regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        let compiled = RegexBuilder::new(&source)
            .case_insensitive(!case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|err| SearchError::InvalidPattern(err.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            case_sensitive,
            regex,
            compiled,
        })
    }

    /// Case-sensitive literal search
    pub fn literal(pattern: &str) -> Result<Self, SearchError> {
        Self::new(pattern, true, false)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn is_regex(&self) -> bool {
        self.regex
    }

    fn captures<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Captures<'t>> + 't {
        self.compiled
            .captures_iter(text)
            .filter(|caps| caps.get(0).is_some_and(|m| !m.is_empty()))
    }

    /// Replacement text for one match; `$1`/`${name}` expand in regex mode
    fn expand(&self, caps: &Captures<'_>, replacement: &str, out: &mut String) {
        if self.regex {
            caps.expand(replacement, out);
        } else {
            out.push_str(replacement);
        }
    }
}

/// A match range, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub start: Position,
    pub end: Position,
}

/// Every non-empty match in document order
pub fn find_all(buffer: &TextBuffer, query: &SearchQuery) -> Vec<Match> {
    let text = buffer.text();
    query
        .captures(&text)
        .filter_map(|caps| caps.get(0))
        .map(|m| Match {
            start: buffer.byte_to_position(m.start()),
            end: buffer.byte_to_position(m.end()),
        })
        .collect()
}

/// First match starting at or after `from`, wrapping around to the top
pub fn find_next(buffer: &TextBuffer, query: &SearchQuery, from: Position) -> Option<Match> {
    let matches = find_all(buffer, query);
    matches
        .iter()
        .find(|m| m.start >= from)
        .or_else(|| matches.first())
        .copied()
}

/// Replace the next match at or after `from` (wrapping) as one undo step.
///
/// Returns the range of the inserted text, or `None` if nothing matched.
pub fn replace_next(
    session: &mut EditorSession,
    query: &SearchQuery,
    replacement: &str,
    from: Position,
) -> Result<Option<Match>, SearchError> {
    let Some(target) = find_next(session.buffer(), query, from) else {
        return Ok(None);
    };

    let text = session.text();
    let buffer = session.buffer();
    let mut expanded = String::new();
    let caps = query.captures(&text).find(|caps| {
        caps.get(0)
            .is_some_and(|m| buffer.byte_to_position(m.start()) == target.start)
    });
    if let Some(caps) = caps {
        query.expand(&caps, replacement, &mut expanded);
    }

    session.commit_boundary();
    let op = session.replace_range(target.start, target.end, &expanded)?;
    session.commit_boundary();

    tracing::debug!(start = %target.start, "replaced match");
    Ok(Some(Match {
        start: op.start(),
        end: op.inserted_end(),
    }))
}

/// Replace every match with a single buffer edit, so one undo reverts all.
///
/// Returns the number of matches replaced.
pub fn replace_all(
    session: &mut EditorSession,
    query: &SearchQuery,
    replacement: &str,
) -> Result<usize, SearchError> {
    let text = session.text();
    let mut span: Option<(usize, usize)> = None;
    let mut replaced = String::new();
    let mut count = 0;

    for caps in query.captures(&text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let (_, last) = span.get_or_insert((m.start(), m.start()));
        replaced.push_str(&text[*last..m.start()]);
        query.expand(&caps, replacement, &mut replaced);
        *last = m.end();
        count += 1;
    }

    let Some((first, last)) = span else {
        return Ok(0);
    };

    let buffer = session.buffer();
    let start = buffer.byte_to_position(first);
    let end = buffer.byte_to_position(last);

    session.commit_boundary();
    session.replace_range(start, end, &replaced)?;
    session.commit_boundary();

    tracing::debug!(count, pattern = query.pattern(), "replaced all matches");
    Ok(count)
}
