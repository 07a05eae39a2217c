//! Prompt templates with `$name` placeholders.
//!
//! Syntax: `$name` or `${name}` where `name` is an ASCII identifier, and `$$`
//! for a literal dollar sign. Templates are parsed once and filled per call.

use serde::{Deserialize, Deserializer};

use crate::domain::errors::ValidationError;

pub const CONTEXT_PIECES: &str = "context_pieces";
pub const USER_QUERY: &str = "user_query";

pub const RAG_CONTEXT_INFERENCE: &str = "$context_pieces\n\nGiven the context pieces above, \
    reply to the following user query:\n$user_query";
pub const RAG_SYSTEM_PROMPT: &str =
    "$context_pieces\n\nGiven the context pieces above, reply to the user queries.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self, ValidationError> {
        let source = source.into();
        let segments = parse(&source)?;
        Ok(Self { source, segments })
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let source = render(&segments);
        Self { source, segments }
    }

    /// Built-in template; same as parsing [`RAG_CONTEXT_INFERENCE`].
    pub fn rag_context_inference() -> Self {
        Self::from_segments(vec![
            Segment::Placeholder(CONTEXT_PIECES.into()),
            Segment::Literal(
                "\n\nGiven the context pieces above, reply to the following user query:\n".into(),
            ),
            Segment::Placeholder(USER_QUERY.into()),
        ])
    }

    /// Built-in template; same as parsing [`RAG_SYSTEM_PROMPT`].
    pub fn rag_system() -> Self {
        Self::from_segments(vec![
            Segment::Placeholder(CONTEXT_PIECES.into()),
            Segment::Literal(
                "\n\nGiven the context pieces above, reply to the user queries.".into(),
            ),
        ])
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Fails with the first placeholder not listed in `allowed`.
    pub fn ensure_placeholders(&self, allowed: &[&str]) -> Result<(), ValidationError> {
        match self.placeholders().find(|name| !allowed.contains(name)) {
            Some(name) => Err(ValidationError::UnknownPlaceholder(name.to_string())),
            None => Ok(()),
        }
    }

    /// Fills every placeholder from `values`. A placeholder with no value is an error.
    pub fn substitute(&self, values: &[(&str, &str)]) -> Result<String, ValidationError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| ValidationError::UnknownPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::rag_context_inference()
    }
}

impl<'de> Deserialize<'de> for PromptTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        PromptTemplate::new(source).map_err(serde::de::Error::custom)
    }
}

fn parse(source: &str) -> Result<Vec<Segment>, ValidationError> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        literal.push_str(&source[start..i]);

        let rest = &bytes[i + 1..];
        if rest.first() == Some(&b'$') {
            literal.push('$');
            i += 2;
        } else if let Some(len) = identifier_len(rest) {
            flush(&mut segments, &mut literal);
            segments.push(Segment::Placeholder(source[i + 1..i + 1 + len].to_string()));
            i += 1 + len;
        } else if rest.first() == Some(&b'{') {
            let len = identifier_len(&rest[1..]).ok_or(ValidationError::InvalidPlaceholder(i))?;
            if rest.get(1 + len) != Some(&b'}') {
                return Err(ValidationError::InvalidPlaceholder(i));
            }
            flush(&mut segments, &mut literal);
            segments.push(Segment::Placeholder(source[i + 2..i + 2 + len].to_string()));
            i += 3 + len;
        } else {
            return Err(ValidationError::InvalidPlaceholder(i));
        }
        start = i;
    }

    literal.push_str(&source[start..]);
    flush(&mut segments, &mut literal);
    Ok(segments)
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Literal(text) => out.push_str(&text.replace('$', "$$")),
            Segment::Placeholder(name) => {
                let glued = match segments.get(i + 1) {
                    Some(Segment::Literal(next)) => next
                        .bytes()
                        .next()
                        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_'),
                    _ => false,
                };
                if glued {
                    out.push_str(&format!("${{{name}}}"));
                } else {
                    out.push('$');
                    out.push_str(name);
                }
            }
        }
    }
    out
}

fn identifier_len(bytes: &[u8]) -> Option<usize> {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => Some(
            bytes
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count(),
        ),
        _ => None,
    }
}

fn flush(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn ensure_context(context_pieces: &[String]) -> Result<(), ValidationError> {
    if context_pieces.iter().any(|piece| !piece.trim().is_empty()) {
        Ok(())
    } else {
        Err(ValidationError::MissingContext)
    }
}

/// Substitutes retrieved context and the user query into a RAG prompt.
pub fn fill_context_prompt(
    template: &PromptTemplate,
    context_pieces: &[String],
    user_query: &str,
) -> Result<String, ValidationError> {
    ensure_context(context_pieces)?;
    if user_query.is_empty() {
        return Err(ValidationError::MissingQuery);
    }

    let context = context_pieces.join("\n");
    template.substitute(&[(CONTEXT_PIECES, &context), (USER_QUERY, user_query)])
}

/// Substitutes retrieved context into a RAG system prompt.
pub fn fill_system_prompt(
    template: &PromptTemplate,
    context_pieces: &[String],
) -> Result<String, ValidationError> {
    ensure_context(context_pieces)?;

    let context = context_pieces.join("\n");
    template.substitute(&[(CONTEXT_PIECES, &context)])
}
