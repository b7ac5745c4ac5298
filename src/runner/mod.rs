// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for registering a [`TestPlan`] with a test [`Framework`].
//!
//! The [`Runner`] doesn't execute anything on its own: it translates every
//! [`TestGroup`] into a [`Framework::group()`] and every [`TestCase`] into a
//! [`Framework::test()`], whose body executes the steps once the [`Framework`]
//! decides to run it.
//!
//! # Order guarantees
//!
//! Within a single [`TestCase`] the events are emitted strictly in order:
//! [`Scenario::Started`], then every step (background ones first), then
//! [`Scenario::Finished`]. Across [`TestCase`]s no order is guaranteed, as the
//! [`Framework`] is free to run them concurrently.
//!
//! [`Scenario::Finished`]: event::Scenario::Finished
//! [`Scenario::Started`]: event::Scenario::Started
//! [`TestCase`]: crate::plan::TestCase

mod config;
mod executor;

use std::{fmt, future::Future, path::PathBuf, sync::Arc};

use derive_more::with_trait::{Debug, Display, Error};
use futures::{future::BoxFuture, FutureExt as _};
use itertools::Itertools as _;

use crate::{
    event::{self, FeatureId, ScenarioId},
    feature::SourceLocation,
    observer::Observers,
    plan::{TestGroup, TestPlan},
    scheme::Resolver,
    step::{MissingStep, Registry},
};

#[doc(inline)]
pub use self::config::Config;
use self::executor::Executor;

/// Represents a shared user-defined state for a scenario execution.
///
/// A fresh [`World`] is created for every [`TestCase`], so no state leaks
/// between scenarios.
///
/// [`TestCase`]: crate::plan::TestCase
pub trait World: Sized + Send + 'static {
    /// Error of creating a new [`World`] instance.
    type Error: fmt::Display;

    /// Creates a new [`World`] instance.
    fn new() -> impl Future<Output = Result<Self, Self::Error>> + Send;
}

/// Body of a [`Framework::test()`].
pub type TestBody = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), Failure>> + Send>;

/// Hook of a [`Framework`] group, run once before or after all of its tests.
pub type Hook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// External test-execution primitive the [`Runner`] registers tests with.
///
/// [`Framework::set_up_all()`] and [`Framework::tear_down_all()`] apply to the
/// innermost [`Framework::group()`] being registered, or to the whole run
/// outside of any.
pub trait Framework {
    /// Groups the tests registered by the `body` under the given `name`.
    fn group<G>(&mut self, name: &str, body: G)
    where
        G: FnOnce(&mut Self),
        Self: Sized;

    /// Registers a named test.
    ///
    /// A `skip`ped test must not have its `body` invoked. A failed test
    /// resolves its `body` into a [`Failure`].
    fn test(&mut self, name: &str, tags: &[String], skip: bool, body: TestBody);

    /// Registers a [`Hook`] to run once before all the tests of the current
    /// group.
    fn set_up_all(&mut self, hook: Hook);

    /// Registers a [`Hook`] to run once after all the tests of the current
    /// group.
    fn tear_down_all(&mut self, hook: Hook);
}

/// Failure of a test, signalled to the [`Framework`].
#[derive(Clone, Debug, Display, Error)]
pub enum Failure {
    /// Some steps match no step [`fn`].
    #[display(
        "{} step(s) not found:\n{}",
        _0.len(),
        _0.iter().map(|m| format!("  {m}")).join("\n"),
    )]
    StepsNotFound(#[error(not(source))] Vec<MissingStep>),

    /// Step failed to resolve its parameters, or its step [`fn`] failed.
    #[display(
        "`{text}` failed at {}: {message}",
        location.as_ref().map_or_else(|| "<unknown>".to_owned(), ToString::to_string),
    )]
    Step {
        /// Where the step was declared, if known.
        location: Option<SourceLocation>,

        /// Keyword and text of the step.
        text: String,

        /// Failure message.
        message: String,
    },

    /// [`World`] failed to be created.
    #[display("failed to initialize world: {_0}")]
    World(#[error(not(source))] String),

    /// No features were found at all.
    #[display(
        "no features found in: {}",
        roots.iter().map(|p| p.display().to_string()).join(", "),
    )]
    NoFeatures {
        /// Roots the features were looked up in.
        roots: Vec<PathBuf>,
    },
}

/// Registers [`TestPlan`]s with a [`Framework`], executing their steps with
/// the step [`fn`]s of a [`Registry`].
#[derive(Debug)]
pub struct Runner<W> {
    registry: Arc<Registry<W>>,
    resolver: Option<Arc<Resolver>>,
    observers: Observers,
    config: Arc<Config>,
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for Runner<W> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            resolver: self.resolver.clone(),
            observers: self.observers.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<W: World> Runner<W> {
    /// Creates a new [`Runner`] out of the given [`Registry`].
    #[must_use]
    pub fn new(registry: Registry<W>) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver: None,
            observers: Observers::new(),
            config: Arc::new(Config::default()),
        }
    }

    /// Resolves every step argument with the given [`Resolver`] before
    /// passing it to a step [`fn`].
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Notifies the given [`Observers`] about the run.
    #[must_use]
    pub fn observers(mut self, observers: Observers) -> Self {
        self.observers = observers;
        self
    }

    /// Sets the [`Config`].
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Returns the [`Registry`] of step [`fn`]s.
    #[must_use]
    pub fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    /// Registers the whole [`TestPlan`] with the given [`Framework`].
    ///
    /// [`event::Run::Started`] and [`event::Run::Finished`] are emitted by
    /// the outermost set-up and tear-down hooks.
    pub fn register<F: Framework>(&self, plan: &TestPlan, fw: &mut F) {
        let observers = self.observers.clone();
        fw.set_up_all(Box::new(move || {
            async move { observers.emit(event::Run::Started) }.boxed()
        }));

        for group in &plan.groups {
            self.register_group(group, fw);
        }

        let observers = self.observers.clone();
        fw.tear_down_all(Box::new(move || {
            async move { observers.emit(event::Run::Finished) }.boxed()
        }));
    }

    fn register_group<F: Framework>(&self, group: &TestGroup, fw: &mut F) {
        fw.group(&group.name, |fw| {
            if let Some(feature) = &group.feature {
                self.register_feature_hooks(feature, group, fw);
            }

            for child in &group.groups {
                self.register_group(child, fw);
            }

            for case in &group.cases {
                if !self.config.selects(case) {
                    tracing::debug!(scenario = %case.name, "filtered out");
                    continue;
                }
                let skip = self.config.skips(case);
                let body: TestBody = match (&group.feature, skip) {
                    (Some(feature), false) => {
                        let executor = Executor {
                            registry: Arc::clone(&self.registry),
                            resolver: self.resolver.clone(),
                            observers: self.observers.clone(),
                            fail_on_missing_steps: self.config.fail_on_missing_steps,
                        };
                        let id = ScenarioId {
                            feature: feature.clone(),
                            scenario: case.name.clone(),
                        };
                        let steps = group.background.iter().chain(&case.steps).cloned().collect();
                        Box::new(move || executor.run(id, steps).boxed())
                    }
                    _ => Box::new(|| async { Ok(()) }.boxed()),
                };
                fw.test(&case.name, &case.tags, skip, body);
            }
        });
    }

    /// Emits the [`event::Feature`] boundaries, along with
    /// [`event::Scenario::Skipped`] for every work-in-progress
    /// [`TestCase`](crate::plan::TestCase).
    fn register_feature_hooks<F: Framework>(
        &self,
        feature: &FeatureId,
        group: &TestGroup,
        fw: &mut F,
    ) {
        let skipped = group
            .cases
            .iter()
            .filter(|c| self.config.selects(c) && self.config.skips(c))
            .map(|c| c.name.clone())
            .collect::<Vec<_>>();

        let (observers, id) = (self.observers.clone(), feature.clone());
        fw.set_up_all(Box::new(move || {
            async move {
                observers.emit(event::Run::feature_started(id.clone()));
                for scenario in skipped {
                    tracing::info!(feature = %id, %scenario, "skipped as work in progress");
                    observers.emit(event::Run::scenario(
                        ScenarioId { feature: id.clone(), scenario },
                        event::Scenario::Skipped,
                    ));
                }
            }
            .boxed()
        }));

        let (observers, id) = (self.observers.clone(), feature.clone());
        fw.tear_down_all(Box::new(move || {
            async move { observers.emit(event::Run::feature_finished(id)) }.boxed()
        }));
    }
}
