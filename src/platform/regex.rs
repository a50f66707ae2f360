//! Regular expression execution
//!
//! Guest patterns are translated to fancy-regex syntax and run either on the
//! interpreter thread or on a worker thread that is abandoned once the
//! configured timeout passes. Offsets in results are byte offsets into the
//! input; callers convert them to UTF-16 indices.

use std::time::Duration;

use crate::interpreter::RegexMode;

/// Span of one match and its capture groups, as byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexMatch {
    pub start: usize,
    pub end: usize,
    /// Group 0 is the whole match
    pub captures: Vec<Option<(usize, usize)>>,
}

/// What to compute for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexOp {
    /// First match at or after a byte offset
    Exec { start: usize },
    /// Every non-overlapping match, advancing past empty matches
    FindAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexOutcome {
    Match(Option<RegexMatch>),
    All(Vec<RegexMatch>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Regex support is switched off
    Refused,
    /// The worker did not answer in time
    Timeout,
    /// The pattern does not compile
    Syntax(String),
    /// The engine gave up, e.g. on its backtrack limit
    Runtime(String),
}

/// One regex evaluation, owned so it can move to a worker thread
#[derive(Debug, Clone)]
pub struct RegexRequest {
    pub source: String,
    pub ignore_case: bool,
    pub multiline: bool,
    pub input: String,
    pub op: RegexOp,
}

/// Evaluate `request` according to `mode`
pub fn execute(request: RegexRequest, mode: RegexMode, timeout: Duration) -> Result<RegexOutcome, RegexError> {
    match mode {
        RegexMode::Refuse => Err(RegexError::Refused),
        RegexMode::Inline => engine::run(&request),
        RegexMode::Thread => {
            let (sender, receiver) = std::sync::mpsc::channel();
            std::thread::Builder::new()
                .name("jsstep-regex".to_string())
                .spawn(move || {
                    let _ = sender.send(engine::run(&request));
                })
                .map_err(|err| RegexError::Runtime(err.to_string()))?;
            receiver.recv_timeout(timeout).unwrap_or(Err(RegexError::Timeout))
        }
    }
}

/// Check that `source` compiles
pub fn validate(source: &str, ignore_case: bool, multiline: bool) -> Result<(), RegexError> {
    engine::compile(source, ignore_case, multiline).map(|_| ())
}

#[cfg(feature = "regex")]
mod engine {
    use super::{RegexError, RegexMatch, RegexOp, RegexOutcome, RegexRequest, translate};

    /// Bounds the work of a runaway pattern, which also bounds how long an
    /// abandoned worker thread lives
    const BACKTRACK_LIMIT: usize = 10_000_000;

    pub(super) fn compile(source: &str, ignore_case: bool, multiline: bool) -> Result<fancy_regex::Regex, RegexError> {
        let mut pattern = translate(source);
        let mut prefix = String::new();
        if ignore_case {
            prefix.push('i');
        }
        if multiline {
            prefix.push('m');
        }
        if !prefix.is_empty() {
            pattern = format!("(?{}){}", prefix, pattern);
        }
        fancy_regex::RegexBuilder::new(&pattern)
            .backtrack_limit(BACKTRACK_LIMIT)
            .build()
            .map_err(|err| RegexError::Syntax(err.to_string()))
    }

    fn find(regex: &fancy_regex::Regex, input: &str, start: usize) -> Result<Option<RegexMatch>, RegexError> {
        if start > input.len() {
            return Ok(None);
        }
        let captures = regex
            .captures_from_pos(input, start)
            .map_err(|err| RegexError::Runtime(err.to_string()))?;
        let Some(captures) = captures else {
            return Ok(None);
        };
        let Some(whole) = captures.get(0) else {
            return Ok(None);
        };
        Ok(Some(RegexMatch {
            start: whole.start(),
            end: whole.end(),
            captures: captures
                .iter()
                .map(|group| group.map(|m| (m.start(), m.end())))
                .collect(),
        }))
    }

    pub(super) fn run(request: &RegexRequest) -> Result<RegexOutcome, RegexError> {
        let regex = compile(&request.source, request.ignore_case, request.multiline)?;
        let input = request.input.as_str();
        match request.op {
            RegexOp::Exec { start } => Ok(RegexOutcome::Match(find(&regex, input, start)?)),
            RegexOp::FindAll => {
                let mut matches = Vec::new();
                let mut position = 0;
                while let Some(found) = find(&regex, input, position)? {
                    position = if found.end == found.start {
                        next_char_boundary(input, found.end)
                    } else {
                        found.end
                    };
                    matches.push(found);
                    if position > input.len() {
                        break;
                    }
                }
                Ok(RegexOutcome::All(matches))
            }
        }
    }

    fn next_char_boundary(input: &str, position: usize) -> usize {
        let mut next = position + 1;
        while next < input.len() && !input.is_char_boundary(next) {
            next += 1;
        }
        next
    }
}

#[cfg(not(feature = "regex"))]
mod engine {
    use super::{RegexError, RegexOutcome, RegexRequest};

    pub(super) fn compile(_source: &str, _ignore_case: bool, _multiline: bool) -> Result<(), RegexError> {
        Ok(())
    }

    pub(super) fn run(_request: &RegexRequest) -> Result<RegexOutcome, RegexError> {
        Err(RegexError::Refused)
    }
}

/// Rewrite a guest pattern into fancy-regex syntax.
///
/// - `\d`, `\w` and friends are ASCII-only in guest patterns
/// - `.` excludes every line terminator
/// - `[` inside a class is literal, `[^]` matches anything, `[]` nothing
/// - `\uXXXX`, `\cX`, `\0` and `\/` escapes
#[cfg_attr(not(feature = "regex"), allow(dead_code))]
fn translate(pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    let mut class_start = false;

    while let Some(c) = chars.next() {
        if c == '\\' {
            let Some(next) = chars.next() else {
                result.push_str("\\\\");
                break;
            };
            class_start = false;
            match next {
                'd' if in_class => result.push_str("0-9"),
                'd' => result.push_str("[0-9]"),
                'D' if !in_class => result.push_str("[^0-9]"),
                'w' if in_class => result.push_str("A-Za-z0-9_"),
                'w' => result.push_str("[A-Za-z0-9_]"),
                'W' if !in_class => result.push_str("[^A-Za-z0-9_]"),
                '/' => result.push('/'),
                '0' if !chars.peek().is_some_and(|d| d.is_ascii_digit()) => result.push_str("\\x00"),
                'u' => {
                    let digits: String = chars.clone().take(4).collect();
                    if digits.len() == 4 && digits.chars().all(|d| d.is_ascii_hexdigit()) {
                        for _ in 0..4 {
                            chars.next();
                        }
                        result.push_str(&format!("\\x{{{}}}", digits));
                    } else {
                        result.push('u');
                    }
                }
                'c' => match chars.peek().copied() {
                    Some(letter) if letter.is_ascii_alphabetic() => {
                        chars.next();
                        result.push_str(&format!("\\x{:02X}", (letter as u32) % 32));
                    }
                    _ => result.push_str("\\\\c"),
                },
                other => {
                    result.push('\\');
                    result.push(other);
                }
            }
            continue;
        }

        if !in_class {
            match c {
                '[' => {
                    if chars.peek() == Some(&']') {
                        chars.next();
                        result.push_str("[^\\s\\S]");
                    } else if chars.clone().take(2).collect::<String>() == "^]" {
                        chars.next();
                        chars.next();
                        result.push_str("[\\s\\S]");
                    } else {
                        in_class = true;
                        class_start = true;
                        result.push('[');
                    }
                }
                '.' => result.push_str("[^\\n\\r\\x{2028}\\x{2029}]"),
                _ => result.push(c),
            }
            continue;
        }

        match c {
            '^' if class_start => result.push('^'),
            ']' if class_start => {
                result.push_str("\\]");
                class_start = false;
            }
            ']' => {
                in_class = false;
                result.push(']');
            }
            '[' | '&' | '~' => {
                result.push('\\');
                result.push(c);
                class_start = false;
            }
            _ => {
                result.push(c);
                class_start = false;
            }
        }
    }
    result
}
