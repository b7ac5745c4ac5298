// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line-oriented [Gherkin] parser.
//!
//! The parser never fails: malformed input yields a structurally incomplete
//! [`Feature`] instead, e.g. an unterminated doc string swallows everything up
//! to the end of input.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use std::{mem, path::Path};

use lazy_regex::regex_captures;

use crate::feature::{
    Background, DataTable, DocString, ExampleTable, Feature, Scenario,
    ScenarioOutline, SourceLocation, Step, StepKeyword,
};

/// Parses the given `text` into a [`Feature`].
///
/// The `path` identifies the source and is used for [`SourceLocation`]s.
#[must_use]
pub fn parse(text: &str, path: Option<&Path>) -> Feature {
    let mut state = State::new(path);
    for (idx, line) in text.lines().enumerate() {
        state.line(line, idx + 1);
    }
    state.finish()
}

/// Section header keywords.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Header {
    Feature,
    Background,
    Scenario,
    Outline,
    Examples,
}

impl Header {
    /// Keyword prefixes along with the [`Header`] they open.
    const PREFIXES: [(&'static str, Self); 8] = [
        ("Feature:", Self::Feature),
        ("Background:", Self::Background),
        ("Scenario Outline:", Self::Outline),
        ("Scenario Template:", Self::Outline),
        ("Scenario:", Self::Scenario),
        ("Examples:", Self::Examples),
        ("Scenarios:", Self::Examples),
        ("Example:", Self::Scenario),
    ];

    /// Recognizes a header `line`, returning the text following its keyword.
    fn parse(line: &str) -> Option<(Self, &str)> {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, h)| line.strip_prefix(prefix).map(|rest| (*h, rest.trim())))
    }
}

/// Section the parser is currently in, owning whatever is being built there.
#[derive(Debug)]
enum Section {
    /// Nothing has been opened yet.
    None,

    /// Right after the `Feature:` header.
    Feature {
        /// Whether free-text lines still belong to the description.
        describing: bool,
    },

    /// Inside a `Background:`.
    Background(Vec<Step>),

    /// Inside a `Scenario:`.
    Scenario(Scenario),

    /// Inside a `Scenario Outline:`, before any `Examples:`.
    Outline(ScenarioOutline),

    /// Inside an `Examples:` of an outline.
    Examples(ScenarioOutline, ExampleTable),
}

/// Multi-line construct attached to the most recent [`Step`].
#[derive(Debug)]
enum Collecting {
    /// Nothing is being collected.
    Nothing,

    /// `|`-delimited rows of a [`DataTable`].
    Table(DataTable),

    /// Lines of a [`DocString`].
    DocString {
        /// Opening delimiter, either `"""` or `'''`.
        delimiter: &'static str,

        /// Text following the opening delimiter.
        media_type: Option<String>,

        /// Collected lines, verbatim.
        lines: Vec<String>,
    },
}

/// Parser state threaded through every line.
#[derive(Debug)]
struct State<'p> {
    path: Option<&'p Path>,
    feature: Feature,
    has_feature_line: bool,
    section: Section,
    collecting: Collecting,
    pending_tags: Vec<String>,
}

impl<'p> State<'p> {
    fn new(path: Option<&'p Path>) -> Self {
        let mut feature = Feature::new(Feature::UNNAMED);
        feature.path = path.map(Path::to_path_buf);
        Self {
            path,
            feature,
            has_feature_line: false,
            section: Section::None,
            collecting: Collecting::Nothing,
            pending_tags: Vec::new(),
        }
    }

    fn line(&mut self, raw: &str, number: usize) {
        let line = raw.trim();

        if let Collecting::DocString { delimiter, lines, .. } = &mut self.collecting {
            if !line.starts_with(*delimiter) {
                lines.push(raw.to_owned());
                return;
            }
            self.finish_collecting();
            return;
        }

        if let Some(delimiter) = ["\"\"\"", "'''"].into_iter().find(|d| line.starts_with(d)) {
            if self.last_step_mut().is_some() {
                self.finish_collecting();
                let media_type = line[delimiter.len()..].trim();
                self.collecting = Collecting::DocString {
                    delimiter,
                    media_type: (!media_type.is_empty()).then(|| media_type.to_owned()),
                    lines: Vec::new(),
                };
                return;
            }
        }

        if line.starts_with('|') {
            if let Section::Examples(_, table) = &mut self.section {
                let row = split_row(line);
                if table.headers.is_empty() {
                    table.headers = row;
                } else {
                    table.rows.push(fit_row(row, table.headers.len(), self.path, number));
                }
                return;
            }
            if self.last_step_mut().is_some() {
                let row = split_row(line);
                match &mut self.collecting {
                    Collecting::Table(table) => table.rows.push(row),
                    Collecting::Nothing | Collecting::DocString { .. } => {
                        self.collecting = Collecting::Table(DataTable {
                            headers: row,
                            rows: Vec::new(),
                        });
                    }
                }
                return;
            }
        }
        self.finish_collecting();

        if line.is_empty() {
            if let Section::Feature { describing } = &mut self.section {
                *describing = false;
            }
            return;
        }
        if line.starts_with('#') || line.starts_with("import ") {
            return;
        }

        if line.starts_with('@') {
            self.pending_tags.extend(parse_tags(line));
            return;
        }

        if let Some((header, title)) = Header::parse(line) {
            self.open(header, title);
            return;
        }

        if let Some((_, keyword, text)) =
            regex_captures!(r"^(Given|When|Then|And|But)\s+(.+)$", line)
        {
            if let Ok(keyword) = keyword.parse::<StepKeyword>() {
                self.push_step(keyword, text, number);
                return;
            }
        }

        if let Section::Feature { describing: true } = self.section {
            match &mut self.feature.description {
                Some(desc) => {
                    desc.push('\n');
                    desc.push_str(line);
                }
                None => self.feature.description = Some(line.to_owned()),
            }
        } else {
            tracing::trace!(number, "ignoring unrecognized line: {line}");
        }
    }

    fn open(&mut self, header: Header, title: &str) {
        tracing::trace!(?header, title, "opening section");

        if header != Header::Examples {
            self.close_section();
        }
        let title = title.to_owned();
        self.section = match header {
            Header::Examples => {
                self.open_examples(&title);
                return;
            }
            Header::Feature => {
                if self.has_feature_line {
                    tracing::warn!(
                        path = ?self.path,
                        "repeated `Feature:` header, renaming the feature",
                    );
                }
                self.has_feature_line = true;
                self.feature.name = title;
                self.feature.tags.append(&mut self.pending_tags);
                Section::Feature { describing: true }
            }
            Header::Background => Section::Background(Vec::new()),
            Header::Scenario => Section::Scenario(Scenario {
                name: title,
                tags: mem::take(&mut self.pending_tags),
                steps: Vec::new(),
            }),
            Header::Outline => Section::Outline(ScenarioOutline {
                name: title,
                tags: mem::take(&mut self.pending_tags),
                steps: Vec::new(),
                examples: Vec::new(),
            }),
        };
    }

    fn open_examples(&mut self, title: &str) {
        self.finish_collecting();
        let outline = match mem::replace(&mut self.section, Section::None) {
            Section::Outline(outline) => outline,
            Section::Examples(mut outline, table) => {
                outline.examples.push(table);
                outline
            }
            Section::Scenario(Scenario { name, tags, steps }) => ScenarioOutline {
                name,
                tags,
                steps,
                examples: Vec::new(),
            },
            other => {
                tracing::warn!(
                    path = ?self.path,
                    "`Examples:` outside of a scenario outline are ignored",
                );
                self.section = other;
                self.close_section();
                self.section = Section::Feature { describing: false };
                self.pending_tags.clear();
                return;
            }
        };
        let table = ExampleTable {
            name: (!title.is_empty()).then(|| title.to_owned()),
            tags: mem::take(&mut self.pending_tags),
            headers: Vec::new(),
            rows: Vec::new(),
        };
        self.section = Section::Examples(outline, table);
    }

    fn push_step(&mut self, keyword: StepKeyword, text: &str, number: usize) {
        let location = self.path.map(|p| SourceLocation::new(p, number));
        let step = Step {
            keyword,
            text: text.to_owned(),
            location,
            table: None,
            docstring: None,
        };
        match &mut self.section {
            Section::Background(steps)
            | Section::Scenario(Scenario { steps, .. })
            | Section::Outline(ScenarioOutline { steps, .. }) => steps.push(step),
            Section::None | Section::Feature { .. } | Section::Examples(..) => {
                tracing::warn!(
                    path = ?self.path,
                    line = number,
                    "step outside of a scenario is ignored: {}",
                    step.full_text(),
                );
            }
        }
    }

    fn last_step_mut(&mut self) -> Option<&mut Step> {
        match &mut self.section {
            Section::Background(steps)
            | Section::Scenario(Scenario { steps, .. })
            | Section::Outline(ScenarioOutline { steps, .. }) => steps.last_mut(),
            Section::None | Section::Feature { .. } | Section::Examples(..) => None,
        }
    }

    /// Attaches whatever is being collected to the most recent [`Step`].
    fn finish_collecting(&mut self) {
        match mem::replace(&mut self.collecting, Collecting::Nothing) {
            Collecting::Nothing => {}
            Collecting::Table(table) => {
                if let Some(step) = self.last_step_mut() {
                    step.table = Some(table);
                }
            }
            Collecting::DocString { media_type, lines, .. } => {
                if let Some(step) = self.last_step_mut() {
                    step.docstring = Some(DocString {
                        content: lines.join("\n"),
                        media_type,
                    });
                }
            }
        }
    }

    /// Moves whatever the current [`Section`] has built into the [`Feature`].
    fn close_section(&mut self) {
        self.finish_collecting();
        match mem::replace(&mut self.section, Section::None) {
            Section::None | Section::Feature { .. } => {}
            Section::Background(steps) => {
                if self.feature.background.is_some() {
                    tracing::warn!(
                        path = ?self.path,
                        "repeated `Background:` replaces the previous one",
                    );
                }
                self.feature.background = Some(Background { steps });
            }
            Section::Scenario(scenario) => self.feature.scenarios.push(scenario),
            Section::Outline(outline) => self.feature.outlines.push(outline),
            Section::Examples(mut outline, table) => {
                outline.examples.push(table);
                self.feature.outlines.push(outline);
            }
        }
    }

    fn finish(mut self) -> Feature {
        if let Collecting::DocString { .. } = self.collecting {
            tracing::warn!(path = ?self.path, "doc string is not terminated");
        }
        self.close_section();
        self.feature
    }
}

/// Splits a `|`-delimited row into trimmed cells.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|c| c.trim().to_owned()).collect()
}

/// Pads or truncates an examples `row` to the headers `len`.
fn fit_row(mut row: Vec<String>, len: usize, path: Option<&Path>, number: usize) -> Vec<String> {
    if row.len() != len {
        tracing::warn!(
            ?path,
            line = number,
            "examples row has {} cells, while headers have {len}",
            row.len(),
        );
        row.resize(len, String::new());
    }
    row
}

/// Parses a `@tag1 @tag2` line, stopping at a trailing comment.
fn parse_tags(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split_whitespace()
        .take_while(|t| !t.starts_with('#'))
        .filter_map(|t| t.strip_prefix('@'))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_rows_dropping_outer_pipes() {
        assert_eq!(split_row("| a |  b|c  |"), ["a", "b", "c"]);
        assert_eq!(split_row("|a|"), ["a"]);
        assert_eq!(split_row("| a | |"), ["a", ""]);
    }

    #[test]
    fn parses_tags_until_comment() {
        assert_eq!(
            parse_tags("@slow @db  # not @this").collect::<Vec<_>>(),
            ["slow", "db"],
        );
    }

    #[test]
    fn recognizes_header_synonyms() {
        assert_eq!(Header::parse("Scenario Template: x"), Some((Header::Outline, "x")));
        assert_eq!(Header::parse("Scenarios:"), Some((Header::Examples, "")));
        assert_eq!(Header::parse("Example: y"), Some((Header::Scenario, "y")));
        assert_eq!(Header::parse("Examples: z"), Some((Header::Examples, "z")));
        assert_eq!(Header::parse("Scenario y"), None);
    }

    #[test]
    fn examples_open_from_every_section() {
        let feature = parse(
            "Feature: F\n\
             \x20 Background:\n    Given base\n\
             \x20 Examples:\n    | x |\n    | 0 |\n\
             \x20 Scenario: plain <n>\n    Given <n>\n\
             \x20 Examples: one\n    | n |\n    | 1 |\n\
             \x20 Examples: two\n    | n |\n    | 2 |\n",
            None,
        );

        assert_eq!(feature.background_steps().len(), 1);
        assert!(feature.scenarios.is_empty());
        assert_eq!(feature.outlines.len(), 1);
        let names = feature.outlines[0]
            .examples
            .iter()
            .map(|e| e.name.as_deref())
            .collect::<Vec<_>>();
        assert_eq!(names, [Some("one"), Some("two")]);
    }

    #[test]
    fn fits_rows_to_headers() {
        assert_eq!(fit_row(vec!["1".into()], 2, None, 1), ["1", ""]);
        assert_eq!(fit_row(vec!["1".into(), "2".into(), "3".into()], 2, None, 1), ["1", "2"]);
    }
}
