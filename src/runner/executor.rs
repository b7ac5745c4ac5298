// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single [`TestCase`].
//!
//! [`TestCase`]: crate::plan::TestCase

use std::{any::Any, collections::HashSet, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt as _;
use tracing::Instrument as _;

use super::{Failure, World};
use crate::{
    event::{self, Outcome, ScenarioId},
    feature::Step,
    observer::Observers,
    scheme::Resolver,
    step::{Context, MissingStep, Registry},
};

/// Executor of a single [`TestCase`], owning everything it needs to be moved
/// into a [`TestBody`].
///
/// [`TestBody`]: super::TestBody
/// [`TestCase`]: crate::plan::TestCase
pub(super) struct Executor<W> {
    pub(super) registry: Arc<Registry<W>>,
    pub(super) resolver: Option<Arc<Resolver>>,
    pub(super) observers: Observers,
    pub(super) fail_on_missing_steps: bool,
}

impl<W: World> Executor<W> {
    /// Runs the given `steps` (background ones first) as the identified
    /// scenario.
    pub(super) async fn run(self, id: ScenarioId, steps: Vec<Step>) -> Result<(), Failure> {
        let span = tracing::error_span!(
            "scenario",
            feature = %id.feature,
            scenario = %id.scenario,
        );
        let steps = steps.into_iter().map(Arc::new).collect::<Vec<_>>();
        self.execute(&id, &steps).instrument(span).await
    }

    async fn execute(&self, id: &ScenarioId, steps: &[Arc<Step>]) -> Result<(), Failure> {
        self.scenario(id, event::Scenario::Started);

        let missing = self.missing(steps);
        if !missing.is_empty() {
            return self.not_found(id, steps, missing);
        }

        let mut world = match W::new().await {
            Ok(w) => w,
            Err(e) => {
                let failure = Failure::World(e.to_string());
                self.skip_all(id, steps);
                self.finish(id, Outcome::Failed(failure.to_string()));
                return Err(failure);
            }
        };

        let mut failure = None;
        for step in steps {
            if failure.is_some() {
                self.step(id, step, event::Step::Skipped);
                continue;
            }

            self.step(id, step, event::Step::Started);
            let span = tracing::error_span!("step", text = %step.full_text());
            match self.run_step(&mut world, step).instrument(span).await {
                Ok(()) => self.step(id, step, event::Step::Passed),
                Err(f) => {
                    self.step(id, step, event::Step::Failed(f.to_string()));
                    failure = Some(f);
                }
            }
        }

        match failure {
            None => {
                self.finish(id, Outcome::Passed);
                Ok(())
            }
            Some(f) => {
                self.finish(id, Outcome::Failed(f.to_string()));
                Err(f)
            }
        }
    }

    /// Resolves the arguments of the `step` and invokes its step [`fn`].
    async fn run_step(&self, world: &mut W, step: &Step) -> Result<(), Failure> {
        let wrap = |message: String| Failure::Step {
            location: step.location.clone(),
            text: step.full_text(),
            message,
        };

        let Some(matched) = self.registry.find(&step.text).map_err(|e| wrap(e.to_string()))?
        else {
            return Err(wrap("step not found".to_owned()));
        };
        let args = match &self.resolver {
            Some(resolver) => resolver
                .resolve_all(&matched.args)
                .await
                .map_err(|e| wrap(e.to_string()))?
                .into_iter()
                .map(|r| r.value)
                .collect(),
            None => matched.args,
        };

        let fut = (matched.step)(world, Context::new(step.clone(), args));
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::error!("{e:#}");
                Err(wrap(format!("{e:#}")))
            }
            Err(panic) => Err(wrap(format!("panicked: {}", panic_message(&*panic)))),
        }
    }

    /// Collects the `steps` matching no step [`fn`], each text once.
    fn missing(&self, steps: &[Arc<Step>]) -> Vec<MissingStep> {
        let mut seen = HashSet::new();
        steps
            .iter()
            .filter(|s| matches!(self.registry.find(&s.text), Ok(None)))
            .filter(|s| seen.insert(s.text.as_str()))
            .map(|s| MissingStep::new(s.keyword, &s.text, s.location.clone()))
            .collect()
    }

    /// Reports the `missing` steps either as a failure, or as a skip of the
    /// whole scenario.
    fn not_found(
        &self,
        id: &ScenarioId,
        steps: &[Arc<Step>],
        missing: Vec<MissingStep>,
    ) -> Result<(), Failure> {
        for m in &missing {
            tracing::warn!("step not found: {m}");
        }

        if !self.fail_on_missing_steps {
            self.skip_all(id, steps);
            self.scenario(id, event::Scenario::Skipped);
            return Ok(());
        }

        for step in steps {
            let ev = match missing.iter().find(|m| m.text == step.text) {
                Some(m) => event::Step::Failed(format!("step not found: {m}")),
                None => event::Step::Skipped,
            };
            self.step(id, step, ev);
        }
        let failure = Failure::StepsNotFound(missing);
        self.finish(id, Outcome::Failed(failure.to_string()));
        Err(failure)
    }

    fn skip_all(&self, id: &ScenarioId, steps: &[Arc<Step>]) {
        for step in steps {
            self.step(id, step, event::Step::Skipped);
        }
    }

    fn scenario(&self, id: &ScenarioId, ev: event::Scenario) {
        self.observers.emit(event::Run::scenario(id.clone(), ev));
    }

    fn step(&self, id: &ScenarioId, step: &Arc<Step>, ev: event::Step) {
        self.scenario(id, event::Scenario::Step(Arc::clone(step), ev));
    }

    fn finish(&self, id: &ScenarioId, outcome: Outcome) {
        self.scenario(id, event::Scenario::Finished(outcome));
    }
}

/// Extracts a message out of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
        .unwrap_or_else(|| "<non-string payload>".to_owned())
}
