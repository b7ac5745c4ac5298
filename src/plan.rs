// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution-ready hierarchy of [`Feature`]s, independent of any test
//! framework.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

use crate::{
    event::FeatureId,
    feature::{Feature, Scenario, Step},
};

/// Grouping mode of a [`Builder`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Mode {
    /// One [`TestGroup`] per [`Feature`].
    #[default]
    Flat,

    /// [`Feature`] groups nested into one [`TestGroup`] per source directory.
    Tree,
}

/// Builder of a [`TestPlan`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    mode: Mode,
    root: PathBuf,
}

impl Builder {
    /// Creates a new flat [`Builder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grouping [`Mode`].
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the root directory [`Mode::Tree`] groups are relative to.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Builds a [`TestPlan`] out of the given [`Feature`]s.
    #[must_use]
    pub fn build(&self, features: &[Feature]) -> TestPlan {
        match self.mode {
            Mode::Flat => TestPlan {
                groups: features.iter().map(TestGroup::of_feature).collect(),
            },
            Mode::Tree => self.build_tree(features),
        }
    }

    fn build_tree(&self, features: &[Feature]) -> TestPlan {
        let mut buckets = LinkedHashMap::<PathBuf, Vec<TestGroup>>::new();
        for f in features {
            buckets
                .entry(self.directory_of(f))
                .or_insert_with(Vec::new)
                .push(TestGroup::of_feature(f));
        }

        let mut groups = Vec::new();
        for (dir, features) in buckets {
            if dir.as_os_str().is_empty() {
                groups.extend(features);
            } else {
                groups.push(TestGroup {
                    name: dir.display().to_string(),
                    feature: None,
                    background: Vec::new(),
                    groups: features,
                    cases: Vec::new(),
                });
            }
        }
        TestPlan { groups }
    }

    /// Returns the directory of the [`Feature`] source relative to the root,
    /// which is empty for the root itself.
    fn directory_of(&self, feature: &Feature) -> PathBuf {
        let Some(dir) = feature.path.as_deref().and_then(Path::parent) else {
            return PathBuf::new();
        };
        dir.strip_prefix(&self.root).unwrap_or(dir).to_path_buf()
    }
}

/// Ordered [`TestGroup`]s to run.
///
/// Read-only once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestPlan {
    /// Top-level [`TestGroup`]s.
    pub groups: Vec<TestGroup>,
}

impl TestPlan {
    /// Returns every [`TestCase`] along with its owning [`TestGroup`],
    /// depth-first.
    #[must_use]
    pub fn cases(&self) -> Vec<(&TestGroup, &TestCase)> {
        let mut out = Vec::new();
        for g in &self.groups {
            g.collect_cases(&mut out);
        }
        out
    }

    /// Indicates whether this [`TestPlan`] has no [`TestCase`]s at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(TestGroup::is_empty)
    }
}

/// Named group of [`TestCase`]s and nested [`TestGroup`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct TestGroup {
    /// Name of this [`TestGroup`].
    pub name: String,

    /// [`FeatureId`] of the [`Feature`] this [`TestGroup`] was built from, if
    /// any.
    pub feature: Option<FeatureId>,

    /// Background [`Step`]s to run before every [`TestGroup::cases`] one.
    pub background: Vec<Step>,

    /// Nested [`TestGroup`]s.
    pub groups: Vec<TestGroup>,

    /// Leaf [`TestCase`]s.
    pub cases: Vec<TestCase>,
}

impl TestGroup {
    /// Builds a [`TestGroup`] out of the given [`Feature`].
    fn of_feature(feature: &Feature) -> Self {
        Self {
            name: feature.name.clone(),
            feature: Some(FeatureId::from(feature)),
            background: feature.background_steps().to_vec(),
            groups: Vec::new(),
            cases: {
                let mut seen = HashSet::new();
                feature
                    .all_scenarios()
                    .into_iter()
                    .map(|s| {
                        let mut case = TestCase::new(&feature.tags, s);
                        case.name = unique_name(&mut seen, case.name);
                        case
                    })
                    .collect()
            },
        }
    }

    fn collect_cases<'g>(&'g self, out: &mut Vec<(&'g Self, &'g TestCase)>) {
        out.extend(self.cases.iter().map(|c| (self, c)));
        for g in &self.groups {
            g.collect_cases(out);
        }
    }

    fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.groups.iter().all(Self::is_empty)
    }
}

/// Suffixes a repeated scenario `name` with ` #2`, ` #3` and so on, until it's
/// unique within its [`Feature`].
fn unique_name(seen: &mut HashSet<String>, name: String) -> String {
    let mut candidate = name.clone();
    let mut n = 1_usize;
    while !seen.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{name} #{n}");
    }
    candidate
}

/// Immutable snapshot of a single scenario to run.
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    /// Name of the scenario.
    pub name: String,

    /// Scenario [`Step`]s, without the background ones.
    pub steps: Vec<Step>,

    /// [`Feature`] tags merged with the scenario ones, without duplicates.
    pub tags: Vec<String>,
}

impl TestCase {
    fn new(feature_tags: &[String], scenario: Scenario) -> Self {
        let Scenario { name, tags, steps } = scenario;
        Self {
            name,
            steps,
            tags: feature_tags.iter().chain(&tags).unique().cloned().collect(),
        }
    }

    /// Indicates whether this [`TestCase`] has the given `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::{Background, StepKeyword},
        parser,
    };

    fn feature(path: &str, name: &str) -> Feature {
        parser::parse(
            &format!(
                "@shared\nFeature: {name}\n  Background:\n    Given a base\n\n  \
                 @shared @own\n  Scenario: s1\n    When it runs\n",
            ),
            Some(Path::new(path)),
        )
    }

    #[test]
    fn flat_mode_groups_per_feature_with_merged_tags() {
        let plan = Builder::new().build(&[feature("f/a.feature", "A")]);

        assert_eq!(plan.groups.len(), 1);
        let group = &plan.groups[0];
        assert_eq!(group.name, "A");
        assert_eq!(
            group.feature,
            Some(FeatureId::new("A", Some(Path::new("f/a.feature")))),
        );
        assert_eq!(group.background, [Step::new(StepKeyword::Given, "a base")]);
        assert_eq!(group.cases[0].tags, ["shared", "own"]);
        assert!(group.cases[0].has_tag("own"));
    }

    #[test]
    fn repeated_scenario_names_are_made_unique() {
        let f = parser::parse(
            "Feature: F\n  Scenario: s\n    Given a\n  Scenario: s #2\n    Given b\n  \
             Scenario: s\n    Given c\n  Scenario: s\n    Given d\n",
            Some(Path::new("f.feature")),
        );
        let plan = Builder::new().build(&[f]);

        let names = plan.groups[0].cases.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["s", "s #2", "s #3", "s #4"]);
    }

    #[test]
    fn missing_background_is_empty() {
        let mut f = Feature::new("bare");
        f.background = None;
        let plan = Builder::new().build(&[f]);
        assert!(plan.groups[0].background.is_empty());
        assert!(plan.is_empty());

        let mut f = Feature::new("with");
        f.background = Some(Background::default());
        assert!(Builder::new().build(&[f]).groups[0].background.is_empty());
    }

    #[test]
    fn tree_mode_with_single_root_bucket_is_flat() {
        let features = [feature("features/a.feature", "A"), feature("features/b.feature", "B")];
        let tree = Builder::new().mode(Mode::Tree).root("features").build(&features);
        let flat = Builder::new().build(&features);
        assert_eq!(tree, flat);
    }

    #[test]
    fn tree_mode_nests_by_directory() {
        let features = [
            feature("features/auth/login.feature", "Login"),
            feature("features/top.feature", "Top"),
            feature("features/auth/logout.feature", "Logout"),
            feature("features/cart/add.feature", "Add"),
        ];
        let plan = Builder::new().mode(Mode::Tree).root("features").build(&features);

        let names = plan.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["auth", "Top", "cart"]);
        let auth = &plan.groups[0];
        assert_eq!(auth.feature, None);
        assert_eq!(
            auth.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            ["Login", "Logout"],
        );

        let order = plan
            .cases()
            .into_iter()
            .map(|(g, c)| format!("{}/{}", g.name, c.name))
            .collect::<Vec<_>>();
        assert_eq!(order, ["Login/s1", "Logout/s1", "Top/s1", "Add/s1"]);
    }
}
