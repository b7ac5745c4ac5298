// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Definitions for a [`Registry`] which is used to store step [`fn`]s and
//! corresponding [`StepPattern`]s.

mod context;
mod location;
pub mod suggest;

use std::collections::HashSet;

use derive_more::with_trait::{Debug, Display};
use futures::future::BoxFuture;

use crate::{
    feature::{SourceLocation, StepKeyword},
    pattern::{self, ParamKind, StepPattern, Value},
    plan::TestPlan,
};

#[doc(inline)]
pub use self::{context::Context, location::Location, suggest::Suggestion};

/// Alias for a step [`fn`] that returns a [`BoxFuture`].
///
/// Any error returned is reported as the failure of the step.
pub type StepFn<World> =
    for<'a> fn(&'a mut World, Context) -> BoxFuture<'a, anyhow::Result<()>>;

/// Single registered step [`fn`].
#[derive(Debug)]
struct Entry<World> {
    pattern: StepPattern,
    #[debug("{:p}", step)]
    step: StepFn<World>,
    location: Location,
}

// Implemented manually to omit redundant `World: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<World> Clone for Entry<World> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            step: self.step,
            location: self.location,
        }
    }
}

/// Ordered collection of step [`fn`]s.
///
/// Lookup is first-match-wins in registration order, so an earlier
/// [`StepPattern`] always takes precedence over a later one matching the same
/// line. No ambiguity is reported.
#[derive(Debug)]
pub struct Registry<World> {
    entries: Vec<Entry<World>>,
}

// Implemented manually to omit redundant `World: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<World> Clone for Registry<World> {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone() }
    }
}

// Implemented manually to omit redundant `World: Default` trait bound, imposed
// by `#[derive(Default)]`.
impl<World> Default for Registry<World> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

/// Result of a successful [`Registry::find()`].
#[derive(Debug)]
pub struct Match<'r, World> {
    /// Matched step [`fn`].
    #[debug("{:p}", step)]
    pub step: StepFn<World>,

    /// [`StepPattern`] the step text matched.
    pub pattern: &'r StepPattern,

    /// Extracted values, one per placeholder in declaration order.
    pub args: Vec<Value>,

    /// Where the step [`fn`] was registered.
    pub location: Location,
}

impl<World> Registry<World> {
    /// Creates a new empty [`Registry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step [`fn`] for the given `template`, treating every placeholder
    /// as a [`ParamKind::String`].
    ///
    /// # Errors
    ///
    /// If the `template` cannot be compiled.
    #[track_caller]
    pub fn step(self, template: &str, step: StepFn<World>) -> Result<Self, pattern::Error> {
        Ok(self.pattern(StepPattern::new(template)?, step))
    }

    /// Adds a step [`fn`] for the given `template`, converting the named
    /// placeholders into the provided [`ParamKind`]s.
    ///
    /// # Errors
    ///
    /// If the `template` cannot be compiled.
    #[track_caller]
    pub fn step_with_kinds<I, S>(
        self,
        template: &str,
        kinds: I,
        step: StepFn<World>,
    ) -> Result<Self, pattern::Error>
    where
        I: IntoIterator<Item = (S, ParamKind)>,
        S: Into<String>,
    {
        Ok(self.pattern(StepPattern::with_kinds(template, kinds)?, step))
    }

    /// Adds a step [`fn`] for the already compiled [`StepPattern`].
    #[must_use]
    #[track_caller]
    pub fn pattern(mut self, pattern: StepPattern, step: StepFn<World>) -> Self {
        self.entries.push(Entry {
            pattern,
            step,
            location: Location::caller(),
        });
        self
    }

    /// Appends all the entries of the `other` [`Registry`] after the ones of
    /// this [`Registry`], so this one keeps precedence.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Returns the number of registered step [`fn`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether no step [`fn`]s are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered [`StepPattern`]s in precedence order.
    pub fn patterns(&self) -> impl Iterator<Item = &StepPattern> {
        self.entries.iter().map(|e| &e.pattern)
    }

    /// Returns the first step [`fn`] matching the given step `text`, if any.
    ///
    /// # Errors
    ///
    /// If the first matching [`StepPattern`] fails to convert some captured
    /// value into its declared [`ParamKind`].
    pub fn find(&self, text: &str) -> Result<Option<Match<'_, World>>, pattern::Error> {
        for entry in &self.entries {
            if let Some(args) = entry.pattern.matches(text)? {
                tracing::debug!(
                    step = text,
                    pattern = entry.pattern.template(),
                    location = %entry.location,
                    "matched step",
                );
                return Ok(Some(Match {
                    step: entry.step,
                    pattern: &entry.pattern,
                    args,
                    location: entry.location,
                }));
            }
        }
        Ok(None)
    }

    /// Collects every step of the given [`TestPlan`] no step [`fn`] matches.
    ///
    /// Each distinct step text is reported once, at its first occurrence.
    #[must_use]
    pub fn missing_steps(&self, plan: &TestPlan) -> Vec<MissingStep> {
        let mut seen = HashSet::new();
        plan.cases()
            .into_iter()
            .flat_map(|(group, case)| group.background.iter().chain(&case.steps))
            .filter(|step| seen.insert(step.text.as_str()))
            .filter(|step| matches!(self.find(&step.text), Ok(None)))
            .map(|step| MissingStep::new(step.keyword, &step.text, step.location.clone()))
            .collect()
    }
}

/// Step text no step [`fn`] matches.
#[derive(Clone, Debug, Display, PartialEq)]
#[display("{} {keyword} {text}", location.as_ref().map_or_else(|| "<unknown>".to_owned(), ToString::to_string))]
pub struct MissingStep {
    /// Keyword of the step.
    pub keyword: StepKeyword,

    /// Text of the step.
    pub text: String,

    /// Where the step was declared, if known.
    pub location: Option<SourceLocation>,

    /// Suggested step definition.
    pub suggestion: Suggestion,
}

impl MissingStep {
    /// Creates a new [`MissingStep`] with a generated [`Suggestion`].
    #[must_use]
    pub fn new(
        keyword: StepKeyword,
        text: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        let text = text.into();
        let suggestion = suggest::suggest(&text);
        Self { keyword, text, location, suggestion }
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt as _;

    use super::*;
    use crate::{
        feature::{Feature, Scenario, Step},
        plan,
    };

    #[derive(Default)]
    struct World(Vec<String>);

    fn first(w: &mut World, _: Context) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            w.0.push("first".into());
            Ok(())
        }
        .boxed()
    }

    fn second(w: &mut World, _: Context) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            w.0.push("second".into());
            Ok(())
        }
        .boxed()
    }

    #[test]
    fn first_registered_match_wins() {
        let registry = Registry::new()
            .step("I have {n} apples", first)
            .unwrap()
            .step("I have 3 apples", second)
            .unwrap();

        let m = registry.find("I have 3 apples").unwrap().unwrap();
        assert_eq!(m.pattern.template(), "I have {n} apples");
        assert_eq!(m.args, [Value::from("3")]);
        assert!(registry.find("I have apples").unwrap().is_none());
    }

    #[test]
    fn merge_keeps_own_precedence() {
        let own = Registry::new().step("go {where}", first).unwrap();
        let other = Registry::new()
            .step("go home", second)
            .unwrap()
            .step("stay", second)
            .unwrap();
        let merged = own.clone().merge(other);

        assert_eq!(merged.len(), 3);
        let m = merged.find("go home").unwrap().unwrap();
        assert_eq!(m.pattern.template(), "go {where}");
        assert_eq!(merged.find("stay").unwrap().unwrap().pattern.template(), "stay");

        let mut world = World::default();
        futures::executor::block_on((m.step)(
            &mut world,
            Context::new(Step::new(StepKeyword::Given, "go home"), m.args),
        ))
        .unwrap();
        assert_eq!(world.0, ["first"]);
    }

    #[test]
    fn conversion_failure_is_an_error() {
        let registry = Registry::<World>::new()
            .step_with_kinds("I wait {secs} seconds", [("secs", ParamKind::Int)], first)
            .unwrap();

        assert!(matches!(
            registry.find("I wait many seconds"),
            Err(pattern::Error::Conversion { .. }),
        ));
    }

    #[test]
    fn registration_location_points_to_caller() {
        let registry = Registry::<World>::new().step("x", first).unwrap();
        let m = registry.find("x").unwrap().unwrap();
        assert!(m.location.path.ends_with("mod.rs"));
    }

    #[test]
    fn missing_steps_are_deduplicated() {
        let mut feature = Feature::new("f");
        for name in ["a", "b"] {
            feature.scenarios.push(Scenario {
                name: name.into(),
                tags: vec![],
                steps: vec![
                    Step::new(StepKeyword::Given, "known"),
                    Step::new(StepKeyword::When, "unknown \"thing\""),
                ],
            });
        }
        let plan = plan::Builder::default().build(&[feature]);
        let registry = Registry::<World>::new().step("known", first).unwrap();

        let missing = registry.missing_steps(&plan);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].text, "unknown \"thing\"");
        assert_eq!(missing[0].suggestion.pattern, "unknown \"{string}\"");
    }
}
