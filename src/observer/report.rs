// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Observer`] aggregating events into a per-[`Feature`] report.
//!
//! [`Feature`]: crate::feature::Feature

use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use linked_hash_map::LinkedHashMap;
use serde::{Serialize, Serializer};

use super::Observer;
use crate::{
    event::{self, FeatureId, ScenarioId},
    feature::Step,
    Event,
};

/// Status of a reported feature, scenario or step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Started, but not finished yet.
    Running,

    /// Finished successfully.
    Passed,

    /// Finished with a failure.
    Failed,

    /// Not executed.
    Skipped,
}

/// Reported [`Feature`].
///
/// [`Feature`]: crate::feature::Feature
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureReport {
    /// Name of the [`Feature`].
    ///
    /// [`Feature`]: crate::feature::Feature
    pub name: String,

    /// Source of the [`Feature`], if known.
    ///
    /// [`Feature`]: crate::feature::Feature
    pub path: Option<PathBuf>,

    /// Overall [`Status`].
    pub status: Status,

    /// Scenarios in the order they have started.
    pub scenarios: Vec<ScenarioReport>,
}

/// Reported scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Name of the scenario.
    pub name: String,

    /// [`Status`] of the scenario.
    pub status: Status,

    /// Failure message, if failed.
    pub message: Option<String>,

    /// Steps in execution order, background ones included.
    pub steps: Vec<StepReport>,
}

/// Reported step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepReport {
    /// Keyword of the step.
    pub keyword: String,

    /// Text of the step.
    pub text: String,

    /// `path:line` of the step, if known.
    pub location: Option<String>,

    /// [`Status`] of the step.
    pub status: Status,

    /// Failure message, if failed.
    pub message: Option<String>,
}

impl StepReport {
    fn new(step: &Step, status: Status) -> Self {
        Self {
            keyword: step.keyword.to_string(),
            text: step.text.clone(),
            location: step.location.as_ref().map(ToString::to_string),
            status,
            message: None,
        }
    }

    fn is_running(&self, step: &Step) -> bool {
        self.status == Status::Running
            && self.text == step.text
            && self.location == step.location.as_ref().map(ToString::to_string)
    }
}

/// [`Observer`] correlating events into [`FeatureReport`]s.
///
/// Every event is attributed by the [`FeatureId`] and scenario name it
/// carries, so scenarios of the same [`Feature`] may run concurrently and
/// interleave arbitrarily. Only events of features without a source path that
/// haven't been seen yet fall back to the most recently started scenario.
///
/// [`Feature`]: crate::feature::Feature
#[derive(Debug, Default)]
pub struct Report {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    features: LinkedHashMap<FeatureId, FeatureEntry>,
    current: Option<ScenarioId>,
    finished: bool,
}

#[derive(Debug)]
struct FeatureEntry {
    status: Status,
    scenarios: LinkedHashMap<String, ScenarioReport>,
}

impl Report {
    /// Creates a new empty [`Report`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of all the reported features, in the order they
    /// have started.
    #[must_use]
    pub fn features(&self) -> Vec<FeatureReport> {
        self.lock()
            .features
            .iter()
            .map(|(id, f)| FeatureReport {
                name: id.name.clone(),
                path: id.path.clone(),
                status: f.status,
                scenarios: f.scenarios.values().cloned().collect(),
            })
            .collect()
    }

    /// Returns a snapshot of the identified scenario, if reported.
    #[must_use]
    pub fn scenario(&self, id: &ScenarioId) -> Option<ScenarioReport> {
        self.lock()
            .features
            .get(&id.feature)?
            .scenarios
            .get(&id.scenario)
            .cloned()
    }

    /// Indicates whether [`event::Run::Finished`] has been received.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }
}

impl Observer for Report {
    fn on_event(&self, event: &Event<event::Run>) {
        use event::{Feature, Run};

        let mut state = self.lock();
        match &event.value {
            Run::Started => {}
            Run::Finished => state.finished = true,
            Run::Feature(id, Feature::Started) => {
                state.feature(id.clone()).status = Status::Running;
            }
            Run::Feature(id, Feature::Finished) => {
                let f = state.feature(id.clone());
                f.status = if f.scenarios.values().any(|s| s.status == Status::Failed) {
                    Status::Failed
                } else if !f.scenarios.is_empty()
                    && f.scenarios.values().all(|s| s.status == Status::Skipped)
                {
                    Status::Skipped
                } else {
                    Status::Passed
                };
            }
            Run::Feature(id, Feature::Scenario(name, ev)) => {
                state.scenario_event(id, name, ev);
            }
        }
    }
}

impl State {
    /// Returns the entry of the identified feature, creating it if needed.
    fn feature(&mut self, key: FeatureId) -> &mut FeatureEntry {
        self.features.entry(key).or_insert_with(|| FeatureEntry {
            status: Status::Running,
            scenarios: LinkedHashMap::new(),
        })
    }

    /// Picks the feature a scenario event of the given [`FeatureId`] is
    /// attributed to.
    fn correlate(&self, id: &FeatureId) -> FeatureId {
        if id.path.is_none() && !self.features.contains_key(id) {
            if let Some(current) = &self.current {
                return current.feature.clone();
            }
        }
        id.clone()
    }

    fn scenario_event(&mut self, id: &FeatureId, name: &str, ev: &event::Scenario) {
        use event::{Outcome, Scenario};

        let feature = self.correlate(id);
        let scenario = self
            .feature(feature.clone())
            .scenarios
            .entry(name.to_owned())
            .or_insert_with(|| ScenarioReport {
                name: name.to_owned(),
                status: Status::Running,
                message: None,
                steps: Vec::new(),
            });

        match ev {
            Scenario::Started => {
                scenario.status = Status::Running;
                self.current = Some(ScenarioId { feature, scenario: name.to_owned() });
            }
            Scenario::Skipped => scenario.status = Status::Skipped,
            Scenario::Step(step, ev) => handle_step(scenario, step, ev),
            Scenario::Finished(outcome) => {
                (scenario.status, scenario.message) = match outcome {
                    Outcome::Passed => (Status::Passed, None),
                    Outcome::Failed(msg) => (Status::Failed, Some(msg.clone())),
                };
                if self
                    .current
                    .as_ref()
                    .is_some_and(|c| c.feature == feature && c.scenario == name)
                {
                    self.current = None;
                }
            }
        }
    }
}

fn handle_step(scenario: &mut ScenarioReport, step: &Step, ev: &event::Step) {
    use event::Step as Ev;

    let (status, message) = match ev {
        Ev::Started => {
            scenario.steps.push(StepReport::new(step, Status::Running));
            return;
        }
        Ev::Passed => (Status::Passed, None),
        Ev::Skipped => (Status::Skipped, None),
        Ev::Failed(msg) => (Status::Failed, Some(msg.clone())),
    };
    let report = match scenario.steps.iter().rposition(|s| s.is_running(step)) {
        Some(i) => &mut scenario.steps[i],
        None => {
            scenario.steps.push(StepReport::new(step, status));
            let last = scenario.steps.len() - 1;
            &mut scenario.steps[last]
        }
    };
    report.status = status;
    report.message = message;
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Snapshot {
            finished: bool,
            features: Vec<FeatureReport>,
        }

        Snapshot {
            finished: self.is_finished(),
            features: self.features(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use super::*;
    use crate::{
        event::{Outcome, Run, Scenario},
        feature::StepKeyword,
    };

    fn id(path: Option<&str>, feature: &str, scenario: &str) -> ScenarioId {
        ScenarioId {
            feature: FeatureId::new(feature, path.map(Path::new)),
            scenario: scenario.into(),
        }
    }

    fn send(report: &Report, ev: Run) {
        report.on_event(&Event::new(ev));
    }

    #[test]
    fn steps_are_updated_in_place() {
        let report = Report::new();
        let sc = id(Some("a.feature"), "A", "s");
        let step = Arc::new(Step::new(StepKeyword::Given, "x"));

        send(&report, Run::scenario(sc.clone(), Scenario::Started));
        send(&report, Run::step(sc.clone(), step.clone(), event::Step::Started));
        send(&report, Run::step(sc.clone(), step, event::Step::Failed("boom".into())));
        send(&report, Run::scenario(sc.clone(), Scenario::Finished(Outcome::Failed("boom".into()))));

        let s = report.scenario(&sc).unwrap();
        assert_eq!(s.status, Status::Failed);
        assert_eq!(s.steps.len(), 1);
        assert_eq!(s.steps[0].status, Status::Failed);
        assert_eq!(s.steps[0].message.as_deref(), Some("boom"));
    }

    #[test]
    fn pathless_unknown_feature_falls_back_to_current_scenario() {
        let report = Report::new();
        let sc = id(Some("a.feature"), "A", "s");
        send(&report, Run::scenario(sc.clone(), Scenario::Started));
        send(
            &report,
            Run::scenario(id(None, "?", "s"), Scenario::Finished(Outcome::Passed)),
        );

        assert_eq!(report.features().len(), 1);
        assert_eq!(report.scenario(&sc).unwrap().status, Status::Passed);
    }

    #[test]
    fn serializes_to_json() {
        let report = Report::new();
        send(&report, Run::feature_started(FeatureId::new("A", None)));
        send(&report, Run::scenario(id(None, "A", "s"), Scenario::Skipped));
        send(&report, Run::feature_finished(FeatureId::new("A", None)));
        send(&report, Run::Finished);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["finished"], true);
        assert_eq!(json["features"][0]["status"], "skipped");
        assert_eq!(json["features"][0]["scenarios"][0]["name"], "s");
    }
}
