//! Path pattern compilation and positional parameter extraction.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::{ParamValue, Params};

/// Constraint used by parameters that do not declare their own.
const DEFAULT_CONSTRAINT: &str = "[^/]+?";

/// Constraint of the bare `*` wildcard segment.
const WILDCARD_CONSTRAINT: &str = ".*";

/// Matching options applied when a pattern is compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternOptions {
    /// Match literal segments case-sensitively.
    pub case_sensitive: bool,
    /// Treat a trailing slash as significant.
    pub strict: bool,
}

/// Description of one parameter declared by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Parameter name. Anonymous groups are named by their ordinal.
    pub name: String,
    /// Declared with `?` or `*`.
    pub optional: bool,
    /// Declared with `+` or `*`.
    pub repeat: bool,
    /// Inline constraint text, if the pattern supplied one.
    pub constraint: Option<String>,
    /// Index of the segment holding this parameter within the pattern.
    pub segment: usize,
}

impl ParamDescriptor {
    /// Matcher fragment for this parameter. The value is captured in a
    /// group named after the descriptor's index, so groups nested in a
    /// constraint never shift it.
    fn regex_source(&self, index: usize) -> String {
        let c = self.constraint.as_deref().unwrap_or(DEFAULT_CONSTRAINT);
        let group = group_name(index);
        let mut source = if self.repeat {
            format!("(?:/(?P<{group}>(?:{c})(?:/(?:{c}))*))")
        } else {
            format!("(?:/(?P<{group}>{c}))")
        };
        if self.optional {
            source.push('?');
        }
        source
    }
}

/// A segment in a path pattern.
#[derive(Debug, Clone)]
enum PathSegment {
    /// A literal string segment.
    Literal(String),
    /// A parameter segment, indexing into the descriptor list.
    Param(usize),
}

/// A compiled path pattern for matching URLs.
///
/// Patterns use express-style syntax:
/// - `/users` - literal path
/// - `/users/:id` - named parameter
/// - `/users/:id(\d+)` - parameter with an inline regex constraint
/// - `/posts/:page?` - optional parameter
/// - `/files/:path+`, `/files/:path*` - repeating parameters
/// - `/(\d+)`, `/*` - anonymous parameters, named `"0"`, `"1"`, ...
///
/// The segment index of every parameter is computed once here. At dispatch
/// time each value is read from the matcher group of its descriptor, so
/// parameters are correlated by order of appearance in the pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments.
    segments: Vec<PathSegment>,
    /// Parameter descriptors in order of appearance.
    params: Vec<ParamDescriptor>,
    /// Compiled regex for matching.
    regex: Regex,
}

impl PathPattern {
    /// Compiles a pattern with default options.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_spa_router::{ParamValue, PathPattern};
    ///
    /// let pattern = PathPattern::parse("/blog/:slug/:id").unwrap();
    /// let params = pattern.extract("/blog/hello-world/123");
    /// assert_eq!(params.get("slug"), Some(&ParamValue::from("hello-world")));
    /// assert_eq!(params.get("id"), Some(&ParamValue::Number(123)));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        Self::parse_with(pattern, PatternOptions::default())
    }

    /// Compiles a pattern with explicit options.
    pub fn parse_with(pattern: &str, options: PatternOptions) -> Result<Self> {
        let mut segments = Vec::new();
        let mut params = Vec::new();
        let mut anonymous = 0;

        for (index, part) in split_segments(pattern)?.into_iter().enumerate() {
            if part == "*" {
                params.push(ParamDescriptor {
                    name: next_anonymous(&mut anonymous),
                    optional: true,
                    repeat: true,
                    constraint: Some(WILDCARD_CONSTRAINT.to_string()),
                    segment: index,
                });
                segments.push(PathSegment::Param(params.len() - 1));
            } else if part.starts_with(':') || part.starts_with('(') {
                params.push(parse_param(pattern, part, index, &mut anonymous)?);
                segments.push(PathSegment::Param(params.len() - 1));
            } else {
                segments.push(PathSegment::Literal(part.to_string()));
            }
        }

        let mut source = String::from(if options.case_sensitive { "^" } else { "(?i)^" });
        for segment in &segments {
            match segment {
                PathSegment::Literal(s) => {
                    source.push('/');
                    source.push_str(&regex::escape(s));
                }
                PathSegment::Param(i) => source.push_str(&params[*i].regex_source(*i)),
            }
        }
        if options.strict {
            if segments.is_empty() || (pattern.len() > 1 && pattern.ends_with('/')) {
                source.push('/');
            }
            source.push('$');
        } else {
            source.push_str("/?$");
        }

        let regex =
            Regex::new(&source).map_err(|e| RouterError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            params,
            regex,
        })
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter descriptors in order of appearance.
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Tests whether `path` matches. Query string and fragment are ignored.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(strip_query(path))
    }

    /// Extracts parameters from a path this pattern matches.
    ///
    /// Each parameter takes exactly what its own part of the matcher
    /// accepted. An optional parameter the path leaves out is absent, and a
    /// repeating parameter joins its segments with `/`. A path that does
    /// not match yields no parameters.
    pub fn extract(&self, path: &str) -> Params {
        let mut params = Params::new();
        let Some(captures) = self.regex.captures(strip_query(path)) else {
            return params;
        };

        for (index, param) in self.params.iter().enumerate() {
            if let Some(value) = captures.name(&group_name(index)) {
                if !value.as_str().is_empty() {
                    params.insert(param.name.clone(), ParamValue::coerce(value.as_str()));
                }
            }
        }

        params
    }

    /// Generates a path from parameters.
    ///
    /// Returns `None` if a required parameter is missing or the generated
    /// path would not match this pattern.
    pub fn reverse(&self, params: &Params) -> Option<String> {
        let mut path = String::new();

        for segment in &self.segments {
            match segment {
                PathSegment::Literal(s) => {
                    path.push('/');
                    path.push_str(s);
                }
                PathSegment::Param(i) => {
                    let param = &self.params[*i];
                    match params.get(&param.name) {
                        Some(value) => {
                            path.push('/');
                            path.push_str(&value.to_string());
                        }
                        None if param.optional => {}
                        None => return None,
                    }
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        self.is_match(&path).then_some(path)
    }
}

/// Returns `path` without its query string and fragment.
pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Name of the matcher group capturing the parameter at `index`.
fn group_name(index: usize) -> String {
    format!("p{index}")
}

/// Splits a pattern on `/`, ignoring slashes inside constraint groups.
fn split_segments(pattern: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in pattern.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| RouterError::invalid_pattern(pattern, "unbalanced ')'"))?;
            }
            '/' if depth == 0 => {
                parts.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(RouterError::invalid_pattern(pattern, "unclosed '('"));
    }
    parts.push(&pattern[start..]);

    Ok(parts.into_iter().filter(|s| !s.is_empty()).collect())
}

fn next_anonymous(counter: &mut usize) -> String {
    let name = counter.to_string();
    *counter += 1;
    name
}

/// Parses a `:name(constraint)modifier` or `(constraint)modifier` segment.
fn parse_param(
    pattern: &str,
    part: &str,
    segment: usize,
    anonymous: &mut usize,
) -> Result<ParamDescriptor> {
    let (name, rest) = match part.strip_prefix(':') {
        Some(rest) => {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            if end == 0 {
                return Err(RouterError::invalid_pattern(pattern, "empty parameter name"));
            }
            (rest[..end].to_string(), &rest[end..])
        }
        None => (next_anonymous(anonymous), part),
    };

    let (constraint, rest) = match rest.strip_prefix('(') {
        Some(group) => {
            let close = closing_paren(group)
                .ok_or_else(|| RouterError::invalid_pattern(pattern, "unclosed '('"))?;
            if close == 0 {
                return Err(RouterError::invalid_pattern(pattern, "empty constraint"));
            }
            (Some(group[..close].to_string()), &group[close + 1..])
        }
        None => (None, rest),
    };

    let (optional, repeat, rest) = match rest.chars().next() {
        Some('?') => (true, false, &rest[1..]),
        Some('+') => (false, true, &rest[1..]),
        Some('*') => (true, true, &rest[1..]),
        _ => (false, false, rest),
    };

    if !rest.is_empty() {
        return Err(RouterError::invalid_pattern(
            pattern,
            format!("unexpected '{rest}' after parameter '{name}'"),
        ));
    }

    Ok(ParamDescriptor {
        name,
        optional,
        repeat,
        constraint,
        segment,
    })
}

/// Byte offset of the `)` closing a group whose `(` was already consumed.
fn closing_paren(group: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in group.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}
