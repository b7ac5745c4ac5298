// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use gherkin::tagexpr::TagOperation;
use regex::Regex;
use smart_default::SmartDefault;

use crate::{plan::TestCase, tag::Ext as _};

/// Configuration of a [`Runner`].
///
/// [`Runner`]: super::Runner
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Tag marking work-in-progress scenarios, which are skipped unless
    /// [`Config::run_wip`] is set.
    #[default("wip".to_owned())]
    pub wip_tag: String,

    /// Whether to run work-in-progress scenarios too.
    pub run_wip: bool,

    /// Tag expression scenarios must satisfy to be registered at all.
    pub tags_filter: Option<TagOperation>,

    /// Regex scenario names must match to be registered at all.
    pub name_filter: Option<Regex>,

    /// Whether a scenario with unmatched steps fails, rather than being
    /// skipped.
    #[default(true)]
    pub fail_on_missing_steps: bool,
}

impl Config {
    /// Sets the work-in-progress tag.
    #[must_use]
    pub fn wip_tag(mut self, tag: impl Into<String>) -> Self {
        self.wip_tag = tag.into();
        self
    }

    /// Makes work-in-progress scenarios run.
    #[must_use]
    pub const fn run_wip(mut self, yes: bool) -> Self {
        self.run_wip = yes;
        self
    }

    /// Registers only scenarios satisfying the given tag expression.
    #[must_use]
    pub fn filter_tags(mut self, op: TagOperation) -> Self {
        self.tags_filter = Some(op);
        self
    }

    /// Registers only scenarios with names matching the given [`Regex`].
    #[must_use]
    pub fn filter_name(mut self, re: Regex) -> Self {
        self.name_filter = Some(re);
        self
    }

    /// Sets whether scenarios with unmatched steps fail.
    #[must_use]
    pub const fn fail_on_missing_steps(mut self, yes: bool) -> Self {
        self.fail_on_missing_steps = yes;
        self
    }

    /// Indicates whether the [`TestCase`] passes the filters.
    #[must_use]
    pub fn selects(&self, case: &TestCase) -> bool {
        self.tags_filter.as_ref().map_or(true, |op| op.eval(&case.tags))
            && self.name_filter.as_ref().map_or(true, |re| re.is_match(&case.name))
    }

    /// Indicates whether the [`TestCase`] is to be skipped as a
    /// work-in-progress one.
    #[must_use]
    pub fn skips(&self, case: &TestCase) -> bool {
        !self.run_wip && case.has_tag(&self.wip_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, tags: &[&str]) -> TestCase {
        TestCase {
            name: name.into(),
            steps: vec![],
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.wip_tag, "wip");
        assert!(!c.run_wip);
        assert!(c.fail_on_missing_steps);
        assert!(c.selects(&case("any", &[])));
    }

    #[test]
    fn wip_cases_are_skipped_unless_overridden() {
        let wip = case("w", &["wip"]);
        assert!(Config::default().skips(&wip));
        assert!(!Config::default().run_wip(true).skips(&wip));
        assert!(!Config::default().skips(&case("x", &["fast"])));
        assert!(Config::default().wip_tag("todo").skips(&case("t", &["todo"])));
    }

    #[test]
    fn filters_by_tags_and_name() {
        let c = Config::default()
            .filter_tags("@fast and not @db".parse().unwrap())
            .filter_name(Regex::new("^login").unwrap());

        assert!(c.selects(&case("login ok", &["fast"])));
        assert!(!c.selects(&case("login ok", &["fast", "db"])));
        assert!(!c.selects(&case("logout", &["fast"])));
    }
}
