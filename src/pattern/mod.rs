// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation of human-readable step phrases into line matchers.
//!
//! A phrase like `I add {a} and {b}` becomes the anchored regex
//! `^I add (.+?) and (.+?)$`. Every literal portion is escaped, so phrases may
//! freely contain regex metacharacters.

mod kind;

use std::collections::HashMap;

use derive_more::with_trait::{Display, Error as StdError};
use lazy_regex::regex;
use regex::Regex;

pub use self::kind::{ParamKind, UnknownKind, Value};

/// Error of compiling or matching a [`StepPattern`].
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// Captured text cannot be converted into the declared [`ParamKind`].
    #[display("cannot convert `{value}` captured by `{{{placeholder}}}` into {kind}")]
    Conversion {
        /// Name of the placeholder the `value` was captured by.
        placeholder: String,

        /// Captured raw text.
        value: String,

        /// Declared [`ParamKind`] of the placeholder.
        kind: ParamKind,
    },

    /// Generated regex failed to compile.
    #[display("step pattern `{template}` cannot be compiled: {source}")]
    InvalidRegex {
        /// Original template.
        template: String,

        /// Underlying [`regex`] error.
        source: regex::Error,
    },
}

/// Compiled step phrase, matching whole step lines and extracting typed
/// placeholder values from them.
#[derive(Clone, Debug, Display)]
#[display("{template}")]
pub struct StepPattern {
    /// Original phrase this [`StepPattern`] was compiled from.
    template: String,

    /// Anchored [`Regex`] with one capturing group per placeholder.
    regex: Regex,

    /// Placeholders in declaration order along with their [`ParamKind`]s.
    placeholders: Vec<(String, ParamKind)>,
}

impl StepPattern {
    /// Compiles the given `template`, treating every placeholder as a
    /// [`ParamKind::String`].
    ///
    /// # Errors
    ///
    /// If the generated [`Regex`] exceeds the [`regex`] size limits.
    pub fn new(template: impl Into<String>) -> Result<Self, Error> {
        Self::with_kinds(template, HashMap::<String, ParamKind>::new())
    }

    /// Compiles the given `template`, converting the named placeholders into
    /// the provided [`ParamKind`]s. Placeholders missing in `kinds` default to
    /// [`ParamKind::String`], while `kinds` naming no placeholder are ignored.
    ///
    /// # Errors
    ///
    /// If the generated [`Regex`] exceeds the [`regex`] size limits.
    pub fn with_kinds<I, S>(template: impl Into<String>, kinds: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, ParamKind)>,
        S: Into<String>,
    {
        let template = template.into();
        let kinds = kinds
            .into_iter()
            .map(|(name, kind)| (name.into(), kind))
            .collect::<HashMap<String, _>>();

        let placeholder = regex!(r"\{(\w+)\}");

        let mut source = String::with_capacity(template.len().saturating_mul(2) + 2);
        let mut placeholders = Vec::new();
        let mut last = 0;
        source.push('^');
        for caps in placeholder.captures_iter(&template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&template[last..whole.start()]));
            source.push_str("(.+?)");
            let name = name.as_str().to_owned();
            let kind = kinds.get(&name).copied().unwrap_or_default();
            placeholders.push((name, kind));
            last = whole.end();
        }
        source.push_str(&regex::escape(&template[last..]));
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| Error::InvalidRegex {
            template: template.clone(),
            source,
        })?;

        Ok(Self { template, regex, placeholders })
    }

    /// Returns the phrase this [`StepPattern`] was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled anchored [`Regex`].
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Iterates over placeholders in declaration order.
    pub fn placeholders(&self) -> impl Iterator<Item = (&str, ParamKind)> {
        self.placeholders.iter().map(|(n, k)| (n.as_str(), *k))
    }

    /// Matches the whole `line` against this [`StepPattern`].
    ///
    /// Returns [`None`] if the `line` doesn't match, or exactly one [`Value`]
    /// per placeholder in declaration order otherwise.
    ///
    /// # Errors
    ///
    /// If the `line` matches, but some captured text cannot be converted into
    /// its declared [`ParamKind`].
    pub fn matches(&self, line: &str) -> Result<Option<Vec<Value>>, Error> {
        let Some(caps) = self.regex.captures(line) else {
            return Ok(None);
        };
        self.placeholders
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                let raw = caps.get(i + 1).map_or("", |m| m.as_str());
                kind.convert(name, raw)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template_matches_only_itself() {
        let p = StepPattern::new("the total is (approx.) $5 + tax?").unwrap();
        assert_eq!(
            p.matches("the total is (approx.) $5 + tax?").unwrap(),
            Some(vec![]),
        );
        assert_eq!(p.matches("the total is (approx.) $5 + tax").unwrap(), None);
        assert_eq!(p.matches("The total is (approx.) $5 + tax?").unwrap(), None);
        assert_eq!(p.matches("xthe total is (approx.) $5 + tax?").unwrap(), None);
    }

    #[test]
    fn extracts_values_in_declaration_order() {
        let p = StepPattern::new("I add {a} and {b}").unwrap();
        assert_eq!(
            p.matches("I add 4 and 5").unwrap(),
            Some(vec![Value::from("4"), Value::from("5")]),
        );
        assert_eq!(p.template(), "I add {a} and {b}");
        assert_eq!(
            p.placeholders().collect::<Vec<_>>(),
            [("a", ParamKind::String), ("b", ParamKind::String)],
        );
    }

    #[test]
    fn short_literal_partitions_adjacent_placeholders() {
        let p = StepPattern::new("point {x}, {y}").unwrap();
        assert_eq!(
            p.matches("point 1, 2, 3").unwrap(),
            Some(vec![Value::from("1"), Value::from("2, 3")]),
        );
    }

    #[test]
    fn converts_declared_kinds() {
        let p = StepPattern::with_kinds(
            "I have {count} cukes at {price} each: {fresh}",
            [
                ("count", ParamKind::Int),
                ("price", ParamKind::Double),
                ("fresh", ParamKind::Bool),
                ("unused", ParamKind::Int),
            ],
        )
        .unwrap();
        assert_eq!(
            p.matches("I have 3 cukes at 0.5 each: true").unwrap(),
            Some(vec![Value::Int(3), Value::Double(0.5), Value::Bool(true)]),
        );
    }

    #[test]
    fn conversion_failure_is_loud() {
        let p = StepPattern::with_kinds("I have {count} cukes", [("count", ParamKind::Int)])
            .unwrap();
        let err = p.matches("I have many cukes").unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion { ref placeholder, ref value, kind: ParamKind::Int }
                if placeholder == "count" && value == "many",
        ));
        assert_eq!(err.to_string(), "cannot convert `many` captured by `{count}` into int");
        assert!(StdError::source(&err).is_none());
    }

    #[test]
    fn non_identifier_braces_stay_literal() {
        let p = StepPattern::new("a map {} with {key}").unwrap();
        assert_eq!(
            p.matches("a map {} with name").unwrap(),
            Some(vec![Value::from("name")]),
        );
    }
}
