// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [`Pickle`] executor.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::with_trait::Debug;
use futures::{future, FutureExt as _, TryStreamExt as _};

use crate::{
    cli,
    framework::{Collected, TestResult},
    observer::{Observer, Observers},
    parser::{self, Parser, Provider, SourceError},
    plan::{self, TestPlan},
    runner::{Config, Failure, Framework, Runner, World},
    scheme::Resolver,
    step::Registry,
};

/// Top-level executor of Gherkin documents.
///
/// Ties a [`Parser`], a [`plan::Builder`] and a [`Runner`] together.
///
/// # Example
///
/// ```rust
/// # use futures::{future::BoxFuture, FutureExt as _};
/// # use pickle::{parser::MemoryProvider, step::Context, Pickle, Registry, World};
/// #
/// #[derive(Debug, Default)]
/// struct Calculator {
///     result: i64,
/// }
///
/// impl World for Calculator {
///     type Error = std::convert::Infallible;
///
///     async fn new() -> Result<Self, Self::Error> {
///         Ok(Self::default())
///     }
/// }
///
/// fn add(w: &mut Calculator, ctx: Context) -> BoxFuture<'_, anyhow::Result<()>> {
///     async move {
///         let a: i64 = ctx.args[0].as_str().unwrap_or_default().parse()?;
///         let b: i64 = ctx.args[1].as_str().unwrap_or_default().parse()?;
///         w.result = a + b;
///         Ok(())
///     }
///     .boxed()
/// }
///
/// let steps = Registry::<Calculator>::new()
///     .step("I add {a} and {b}", add)
///     .unwrap();
///
/// let provider = MemoryProvider::new().with(
///     "calc.feature",
///     "Feature: Calc\n  Scenario: add\n    When I add 1 and 2\n",
/// );
///
/// let results = futures::executor::block_on(
///     Pickle::new()
///         .with_provider(provider)
///         .steps(steps)
///         .run(["."]),
/// )
/// .unwrap();
/// assert!(results.iter().all(|r| !r.is_failed()));
/// ```
#[derive(Debug)]
pub struct Pickle<W, P = parser::Basic> {
    parser: P,
    plan: plan::Builder,
    registry: Registry<W>,
    resolver: Option<Resolver>,
    observers: Observers,
    config: Config,
}

impl<W: World> Pickle<W> {
    /// Creates a new [`Pickle`] reading `*.feature` files from the file
    /// system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: parser::Basic::default(),
            plan: plan::Builder::default(),
            registry: Registry::new(),
            resolver: None,
            observers: Observers::new(),
            config: Config::default(),
        }
    }
}

impl<W: World> Default for Pickle<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: World, P> Pickle<W, P> {
    /// Replaces the [`Parser`] with the [`parser::Basic`] one reading
    /// documents through the given [`Provider`].
    #[must_use]
    pub fn with_provider<Q: Provider>(self, provider: Q) -> Pickle<W, parser::Basic<Q>> {
        self.with_parser(parser::Basic::new(provider))
    }

    /// Replaces the [`Parser`].
    #[must_use]
    pub fn with_parser<Q>(self, parser: Q) -> Pickle<W, Q> {
        let Self { parser: _, plan, registry, resolver, observers, config } = self;
        Pickle { parser, plan, registry, resolver, observers, config }
    }

    /// Adds the step [`fn`]s of the given [`Registry`], after the already
    /// registered ones.
    #[must_use]
    pub fn steps(self, registry: Registry<W>) -> Self {
        Self { registry: self.registry.merge(registry), ..self }
    }

    /// Resolves step arguments with the given [`Resolver`].
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Adds an [`Observer`] of the run.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Sets the runner [`Config`].
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the [`plan::Builder`].
    #[must_use]
    pub fn plan(mut self, builder: plan::Builder) -> Self {
        self.plan = builder;
        self
    }

    /// Applies the given [`cli::Opts`] onto the [`Config`] and the
    /// [`plan::Builder`].
    #[must_use]
    pub fn with_cli<C: clap::Args>(mut self, opts: &cli::Opts<C>) -> Self {
        self.config = opts.apply(self.config);
        self.plan = opts.plan_builder();
        self
    }

    /// Returns the [`Registry`] of step [`fn`]s.
    #[must_use]
    pub const fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    /// Parses the documents under the given `roots` and registers the
    /// resulting [`TestPlan`] with the given [`Framework`].
    ///
    /// If no documents are found at all, a single failing test naming the
    /// `roots` is registered instead.
    ///
    /// # Errors
    ///
    /// If some document fails to be read.
    pub async fn register<I, F>(self, roots: I, fw: &mut F) -> Result<TestPlan, SourceError>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
        P: Parser<Vec<PathBuf>>,
        F: Framework,
    {
        let roots = roots
            .into_iter()
            .map(|r| r.as_ref().to_path_buf())
            .collect::<Vec<_>>();
        let features = self
            .parser
            .parse(roots.clone())
            .try_collect::<Vec<_>>()
            .await?;
        let plan = self.plan.build(&features);
        tracing::debug!(features = features.len(), cases = plan.cases().len(), "built test plan");

        let mut runner = Runner::new(self.registry)
            .observers(self.observers)
            .config(self.config);
        if let Some(resolver) = self.resolver {
            runner = runner.resolver(resolver);
        }
        runner.register(&plan, fw);

        if features.is_empty() {
            tracing::warn!(?roots, "no features found");
            let failure = Failure::NoFeatures { roots };
            fw.test(
                "no features found",
                &[],
                false,
                Box::new(move || future::err(failure).boxed()),
            );
        }
        Ok(plan)
    }

    /// Parses the documents under the given `roots` and runs them with the
    /// in-process [`Collected`] [`Framework`].
    ///
    /// # Errors
    ///
    /// If some document fails to be read.
    pub async fn run<I>(self, roots: I) -> Result<Vec<TestResult>, SourceError>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
        P: Parser<Vec<PathBuf>>,
    {
        let mut fw = Collected::new();
        _ = self.register(roots, &mut fw).await?;
        Ok(fw.run().await)
    }
}
