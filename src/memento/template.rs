//! URI-M template compilation and translation.
//!
//! # Responsibilities
//! - Compile a template such as `https://host/memento/<datetime>/<urir>` into a matcher
//! - Split a URI-M into its capture datetime and URI-R
//! - Build a URI-M from a datetime and a URI-R
//!
//! # Design Decisions
//! - The placeholders may appear in either order; literal text is regex-escaped
//! - The matcher is derived once per template and never mutated afterwards
//! - `synthesize` performs no normalization of the URI-R

use regex::Regex;

use crate::error::EngineError;

/// Placeholder for the 14-digit capture datetime.
pub const DATETIME_PLACEHOLDER: &str = "<datetime>";

/// Placeholder for the original resource URI.
pub const URIR_PLACEHOLDER: &str = "<urir>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Datetime,
    Urir,
}

impl Placeholder {
    fn token(self) -> &'static str {
        match self {
            Placeholder::Datetime => DATETIME_PLACEHOLDER,
            Placeholder::Urir => URIR_PLACEHOLDER,
        }
    }

    fn capture_group(self) -> &'static str {
        match self {
            Placeholder::Datetime => r"(\d{14})",
            Placeholder::Urir => "(.*)",
        }
    }
}

/// The two halves of a URI-M.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memento<'a> {
    /// 14-digit capture datetime (`YYYYMMDDhhmmss`).
    pub datetime: &'a str,
    /// Original resource URI as embedded in the URI-M.
    pub urir: &'a str,
}

/// A compiled URI-M template.
#[derive(Debug, Clone)]
pub struct UrimPattern {
    template: String,
    /// Literal text before, between and after the placeholders.
    literals: [String; 3],
    /// Placeholders in order of appearance.
    order: [Placeholder; 2],
    matcher: Regex,
}

impl UrimPattern {
    /// Compile a template into a pattern.
    ///
    /// Fails with [`EngineError::Config`] unless the template contains exactly one
    /// `<datetime>` and exactly one `<urir>` placeholder.
    pub fn new(template: &str) -> Result<Self, EngineError> {
        let datetime_at = single_position(template, Placeholder::Datetime)?;
        let urir_at = single_position(template, Placeholder::Urir)?;

        let mut found = [
            (datetime_at, Placeholder::Datetime),
            (urir_at, Placeholder::Urir),
        ];
        found.sort_by_key(|(at, _)| *at);
        let [(first_at, first), (second_at, second)] = found;

        let literals = [
            template[..first_at].to_string(),
            template[first_at + first.token().len()..second_at].to_string(),
            template[second_at + second.token().len()..].to_string(),
        ];

        let source = format!(
            "^{}{}{}{}{}$",
            regex::escape(&literals[0]),
            first.capture_group(),
            regex::escape(&literals[1]),
            second.capture_group(),
            regex::escape(&literals[2]),
        );
        let matcher = Regex::new(&source)
            .map_err(|e| EngineError::config(format!("template `{template}` does not compile: {e}")))?;

        Ok(Self {
            template: template.to_string(),
            literals,
            order: [first, second],
            matcher,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns true if `url` is a URI-M under this template.
    pub fn is_match(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    /// Split a URI-M into its datetime and URI-R.
    ///
    /// When the first captured value is not purely numeric the two values are
    /// swapped, which is what makes `<urir>`-first templates work. A URI-R that
    /// is itself 14 digits long defeats this under such a template.
    pub fn extract<'a>(&self, urim: &'a str) -> Result<Memento<'a>, EngineError> {
        let captures = self
            .matcher
            .captures(urim)
            .ok_or_else(|| EngineError::NotAMemento(urim.to_string()))?;

        let first = captures.get(1).map_or("", |m| m.as_str());
        let second = captures.get(2).map_or("", |m| m.as_str());

        if is_numeric(first) {
            Ok(Memento { datetime: first, urir: second })
        } else {
            Ok(Memento { datetime: second, urir: first })
        }
    }

    /// Build a URI-M from a datetime and a URI-R.
    pub fn synthesize(&self, datetime: &str, urir: &str) -> String {
        let value = |placeholder| match placeholder {
            Placeholder::Datetime => datetime,
            Placeholder::Urir => urir,
        };

        let mut urim = String::with_capacity(
            self.literals.iter().map(String::len).sum::<usize>() + datetime.len() + urir.len(),
        );
        urim.push_str(&self.literals[0]);
        urim.push_str(value(self.order[0]));
        urim.push_str(&self.literals[1]);
        urim.push_str(value(self.order[1]));
        urim.push_str(&self.literals[2]);
        urim
    }
}

fn single_position(template: &str, placeholder: Placeholder) -> Result<usize, EngineError> {
    let token = placeholder.token();
    let mut positions = template.match_indices(token).map(|(at, _)| at);
    match (positions.next(), positions.next()) {
        (Some(at), None) => Ok(at),
        (None, _) => Err(EngineError::config(format!(
            "template `{template}` has no {token} placeholder"
        ))),
        (Some(_), Some(_)) => Err(EngineError::config(format!(
            "template `{template}` has more than one {token} placeholder"
        ))),
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
