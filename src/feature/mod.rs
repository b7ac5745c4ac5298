// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Document model of parsed [Gherkin] files.
//!
//! Everything here is produced by the [`parser`] and is read-only afterwards.
//! [`SourceLocation`]s are carried for diagnostics only and never take part in
//! equality of the domain objects.
//!
//! [`parser`]: crate::parser
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

mod outline;
mod step;

use std::path::PathBuf;

pub use self::step::{DataTable, DocString, SourceLocation, Step, StepKeyword, UnknownKeyword};

/// Parsed [Feature] file.
///
/// [Feature]: https://cucumber.io/docs/gherkin/reference#feature
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// Name of this [`Feature`], or `Unnamed Feature` if the source has no
    /// `Feature:` line.
    pub name: String,

    /// Identifier of the source this [`Feature`] was parsed from.
    pub path: Option<PathBuf>,

    /// Free-text description following the `Feature:` line.
    pub description: Option<String>,

    /// Tags of this [`Feature`] (without the leading `@`).
    pub tags: Vec<String>,

    /// [`Background`] shared by every [`Scenario`] of this [`Feature`].
    pub background: Option<Background>,

    /// Plain [`Scenario`]s in declaration order.
    pub scenarios: Vec<Scenario>,

    /// [`ScenarioOutline`]s in declaration order.
    pub outlines: Vec<ScenarioOutline>,
}

impl Feature {
    /// Name given to a [`Feature`] whose source has no `Feature:` line.
    pub const UNNAMED: &'static str = "Unnamed Feature";

    /// Creates an empty [`Feature`] with the given `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            description: None,
            tags: Vec::new(),
            background: None,
            scenarios: Vec::new(),
            outlines: Vec::new(),
        }
    }

    /// Returns [`Feature::scenarios`] followed by the expansion of every
    /// [`ScenarioOutline`], in outline-then-example-row order.
    #[must_use]
    pub fn all_scenarios(&self) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .cloned()
            .chain(self.outlines.iter().flat_map(ScenarioOutline::expand_to_scenarios))
            .collect()
    }

    /// Returns the steps of the [`Background`], if any.
    #[must_use]
    pub fn background_steps(&self) -> &[Step] {
        self.background.as_ref().map_or(&[], |bg| &bg.steps)
    }

    /// Counts all the [`Scenario`]s this [`Feature`] expands into.
    #[must_use]
    pub fn count_scenarios(&self) -> usize {
        self.scenarios.len()
            + self
                .outlines
                .iter()
                .flat_map(|o| &o.examples)
                .map(|e| e.rows.len())
                .sum::<usize>()
    }

    /// Counts all the [`Step`]s this [`Feature`] expands into, not including
    /// the [`Background`] ones.
    #[must_use]
    pub fn count_steps(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps.len()).sum::<usize>()
            + self
                .outlines
                .iter()
                .map(|o| {
                    o.steps.len() * o.examples.iter().map(|e| e.rows.len()).sum::<usize>()
                })
                .sum::<usize>()
    }
}

/// [Background] steps, logically prefixed to every [`Scenario`] of the owning
/// [`Feature`] at execution time.
///
/// [Background]: https://cucumber.io/docs/gherkin/reference#background
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Background {
    /// [`Step`]s in declaration order.
    pub steps: Vec<Step>,
}

/// Concrete [Scenario], either declared directly or expanded from a
/// [`ScenarioOutline`].
///
/// [Scenario]: https://cucumber.io/docs/gherkin/reference#example
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Name of this [`Scenario`].
    pub name: String,

    /// Tags of this [`Scenario`] (without the leading `@`).
    pub tags: Vec<String>,

    /// [`Step`]s in declaration order.
    pub steps: Vec<Step>,
}

/// [Scenario Outline] template, expanded once per row of its
/// [`ExampleTable`]s.
///
/// [Scenario Outline]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioOutline {
    /// Name of this [`ScenarioOutline`].
    pub name: String,

    /// Tags of this [`ScenarioOutline`] (without the leading `@`).
    pub tags: Vec<String>,

    /// Template [`Step`]s, containing `<name>` or `{name}` placeholders.
    pub steps: Vec<Step>,

    /// [`ExampleTable`]s in declaration order.
    pub examples: Vec<ExampleTable>,
}

/// [Examples] table of a [`ScenarioOutline`].
///
/// [Examples]: https://cucumber.io/docs/gherkin/reference#examples
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExampleTable {
    /// Optional name following the `Examples:` keyword.
    pub name: Option<String>,

    /// Tags of this [`ExampleTable`] (without the leading `@`).
    pub tags: Vec<String>,

    /// Column names, defining column identity.
    pub headers: Vec<String>,

    /// Data rows, each of [`ExampleTable::headers`] length.
    pub rows: Vec<Vec<String>>,
}
