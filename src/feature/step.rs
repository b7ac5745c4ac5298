// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Step`] and its attachments.

use std::{path::PathBuf, str::FromStr};

use derive_more::with_trait::{Display, Error};

/// Keyword a [`Step`] line starts with.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StepKeyword {
    /// `Given` keyword.
    Given,

    /// `When` keyword.
    When,

    /// `Then` keyword.
    Then,

    /// `And` keyword.
    And,

    /// `But` keyword.
    But,
}

impl StepKeyword {
    /// All the [`StepKeyword`]s.
    pub const ALL: [Self; 5] = [Self::Given, Self::When, Self::Then, Self::And, Self::But];

    /// Returns the textual form of this [`StepKeyword`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }
}

/// Error of parsing an unknown [`StepKeyword`].
#[derive(Clone, Debug, Display, Error)]
#[display("`{_0}` is not a step keyword")]
pub struct UnknownKeyword(#[error(not(source))] String);

impl FromStr for StepKeyword {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKeyword(s.to_owned()))
    }
}

/// Place in a source document, used for diagnostics only.
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{}:{line}", path.display())]
pub struct SourceLocation {
    /// Identifier of the source document.
    pub path: PathBuf,

    /// 1-based line number.
    pub line: usize,
}

impl SourceLocation {
    /// Creates a new [`SourceLocation`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self { path: path.into(), line }
    }
}

/// [Data Table] attached to a [`Step`].
///
/// The first `|`-delimited row of the table becomes its headers.
///
/// [Data Table]: https://cucumber.io/docs/gherkin/reference#data-tables
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataTable {
    /// First row of the table.
    pub headers: Vec<String>,

    /// Rows following the headers.
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Iterates over data rows as `(header, cell)` pairs.
    pub fn hashes(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(|row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }

    /// Returns the headers followed by the data rows.
    #[must_use]
    pub fn raw(&self) -> Vec<&[String]> {
        std::iter::once(self.headers.as_slice())
            .chain(self.rows.iter().map(Vec::as_slice))
            .collect()
    }
}

/// [Doc String] attached to a [`Step`].
///
/// [Doc String]: https://cucumber.io/docs/gherkin/reference#doc-strings
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DocString {
    /// Raw content between the delimiters, internal indentation preserved.
    pub content: String,

    /// Media type following the opening delimiter, if any.
    pub media_type: Option<String>,
}

/// Single `Given`/`When`/`Then`/`And`/`But` line of a scenario.
///
/// Equality ignores [`Step::location`].
#[derive(Clone, Debug)]
pub struct Step {
    /// Keyword this [`Step`] starts with.
    pub keyword: StepKeyword,

    /// Text following the [`Step::keyword`].
    pub text: String,

    /// Where this [`Step`] was declared.
    pub location: Option<SourceLocation>,

    /// Attached [`DataTable`], if any.
    pub table: Option<DataTable>,

    /// Attached [`DocString`], if any.
    pub docstring: Option<DocString>,
}

impl Step {
    /// Creates a new [`Step`] without location or attachments.
    #[must_use]
    pub fn new(keyword: StepKeyword, text: impl Into<String>) -> Self {
        Self {
            keyword,
            text: text.into(),
            location: None,
            table: None,
            docstring: None,
        }
    }

    /// Sets the [`SourceLocation`] of this [`Step`].
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches the given [`DataTable`].
    #[must_use]
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Attaches the given [`DocString`].
    #[must_use]
    pub fn with_docstring(mut self, docstring: DocString) -> Self {
        self.docstring = Some(docstring);
        self
    }

    /// Returns this [`Step`] as it was written, e.g. `Given I have 3 cukes`.
    #[must_use]
    pub fn full_text(&self) -> String {
        format!("{} {}", self.keyword, self.text)
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.text == other.text
            && self.table == other.table
            && self.docstring == other.docstring
    }
}
