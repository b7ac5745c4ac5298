// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Expansion of [`ScenarioOutline`]s into concrete [`Scenario`]s.

use itertools::Itertools as _;
use lazy_regex::regex;
use regex::Captures;

use super::{DataTable, DocString, Scenario, ScenarioOutline, Step};

impl ScenarioOutline {
    /// Expands this [`ScenarioOutline`] into one [`Scenario`] per row of each
    /// of its [`ExampleTable`]s.
    ///
    /// So this one:
    /// ```gherkin
    /// Scenario Outline: eating
    ///   Given there are <start> cucumbers
    ///   When I eat {eat} cucumbers
    ///
    ///   Examples: small
    ///     | start | eat |
    ///     |    12 |   5 |
    /// ```
    ///
    /// Will be expanded as:
    /// ```gherkin
    /// Scenario: eating (small #1)
    ///   Given there are 12 cucumbers
    ///   When I eat 5 cucumbers
    /// ```
    ///
    /// Unnamed tables are referred to as `Example N`, where `N` is the 1-based
    /// index of the table. Tags of the produced [`Scenario`]s are the outline
    /// ones followed by the table ones, without duplicates.
    ///
    /// Placeholders naming no column are left verbatim. The expansion depends
    /// on this [`ScenarioOutline`] only, so calling it repeatedly yields equal
    /// results.
    ///
    /// [`ExampleTable`]: super::ExampleTable
    #[must_use]
    pub fn expand_to_scenarios(&self) -> Vec<Scenario> {
        self.examples
            .iter()
            .enumerate()
            .flat_map(|(table_idx, table)| {
                let label = table
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Example {}", table_idx + 1));
                let tags = self
                    .tags
                    .iter()
                    .chain(&table.tags)
                    .unique()
                    .cloned()
                    .collect::<Vec<_>>();

                table.rows.iter().enumerate().map(move |(row_idx, row)| {
                    let values = table
                        .headers
                        .iter()
                        .map(String::as_str)
                        .zip(row.iter().map(String::as_str))
                        .collect::<Vec<_>>();
                    Scenario {
                        name: format!("{} ({label} #{})", self.name, row_idx + 1),
                        tags: tags.clone(),
                        steps: self.steps.iter().map(|s| substitute_step(s, &values)).collect(),
                    }
                })
            })
            .collect()
    }
}

/// Produces a new [`Step`] of the same shape as the given one, with every
/// `<key>` and `{key}` replaced by the corresponding example `values`.
fn substitute_step(step: &Step, values: &[(&str, &str)]) -> Step {
    Step {
        keyword: step.keyword,
        text: substitute(&step.text, values),
        location: step.location.clone(),
        table: step.table.as_ref().map(|t| DataTable {
            headers: t.headers.iter().map(|c| substitute(c, values)).collect(),
            rows: t
                .rows
                .iter()
                .map(|r| r.iter().map(|c| substitute(c, values)).collect())
                .collect(),
        }),
        docstring: step.docstring.as_ref().map(|d| DocString {
            content: substitute(&d.content, values),
            media_type: d.media_type.clone(),
        }),
    }
}

/// Replaces every `<key>` and `{key}` occurrence in the `text` in a single
/// pass, so substituted values are never substituted again.
fn substitute(text: &str, values: &[(&str, &str)]) -> String {
    regex!(r"<([^<>\n]+)>|\{([^{}\n]+)\}")
        .replace_all(text, |caps: &Captures<'_>| {
            let key = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map_or_else(|| caps[0].to_owned(), |(_, v)| (*v).to_owned())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{ExampleTable, SourceLocation, StepKeyword};

    fn outline() -> ScenarioOutline {
        ScenarioOutline {
            name: "Addition".into(),
            tags: vec!["math".into(), "fast".into()],
            steps: vec![
                Step::new(StepKeyword::Given, "I have <a> and {b}")
                    .at(SourceLocation::new("calc.feature", 3)),
                Step::new(StepKeyword::Then, "I get <result> not <missing>")
                    .with_table(DataTable {
                        headers: vec!["sum".into()],
                        rows: vec![vec!["<result>".into()]],
                    })
                    .with_docstring(DocString {
                        content: "total: {result}".into(),
                        media_type: Some("text".into()),
                    }),
            ],
            examples: vec![
                ExampleTable {
                    name: None,
                    tags: vec!["fast".into(), "small".into()],
                    headers: vec!["a".into(), "b".into(), "result".into()],
                    rows: vec![
                        vec!["1".into(), "2".into(), "3".into()],
                        vec!["5".into(), "5".into(), "10".into()],
                    ],
                },
                ExampleTable {
                    name: Some("big".into()),
                    tags: vec![],
                    headers: vec!["a".into(), "b".into(), "result".into()],
                    rows: vec![vec!["100".into(), "1".into(), "101".into()]],
                },
            ],
        }
    }

    #[test]
    fn names_scenarios_per_table_and_row() {
        let names = outline()
            .expand_to_scenarios()
            .into_iter()
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "Addition (Example 1 #1)",
                "Addition (Example 1 #2)",
                "Addition (big #1)",
            ],
        );
    }

    #[test]
    fn substitutes_both_placeholder_styles() {
        let scenarios = outline().expand_to_scenarios();
        let first = &scenarios[0];
        assert_eq!(first.steps[0].text, "I have 1 and 2");
        assert_eq!(first.steps[1].text, "I get 3 not <missing>");
        assert_eq!(
            first.steps[1].table.as_ref().unwrap().rows,
            [vec!["3".to_owned()]],
        );
        assert_eq!(first.steps[1].docstring.as_ref().unwrap().content, "total: 3");
        assert_eq!(
            first.steps[0].location,
            Some(SourceLocation::new("calc.feature", 3)),
        );
    }

    #[test]
    fn substituted_values_are_not_substituted_again() {
        let values = [("a", "<b>"), ("b", "{a}"), ("first name", "Ann")];
        assert_eq!(
            substitute("<a> then {b}, <first name> and <c>", &values),
            "<b> then {a}, Ann and <c>",
        );
    }

    #[test]
    fn merges_tags_without_duplicates() {
        let scenarios = outline().expand_to_scenarios();
        assert_eq!(scenarios[0].tags, ["math", "fast", "small"]);
        assert_eq!(scenarios[2].tags, ["math", "fast"]);
    }

    #[test]
    fn expansion_is_repeatable() {
        let o = outline();
        assert_eq!(o.expand_to_scenarios(), o.expand_to_scenarios());
    }
}
