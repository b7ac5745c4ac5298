// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of a run.
//!
//! The top-level enum here is [`Run`].
//!
//! Scenarios may run concurrently, so events of different scenarios arrive in
//! any interleaving. Every event carries the [`FeatureId`] and the scenario
//! name it belongs to, so consumers never need to rely on arrival order.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
#[cfg(feature = "timestamps")]
use std::time::SystemTime;

use derive_more::with_trait::{AsRef, Deref, Display};
use serde::Serialize;

use crate::feature;

/// Arbitrary event, optionally paired with additional metadata.
///
/// Any metadata is added by enabling the correspondent library feature:
/// - `timestamps`: adds time of when this [`Event`] has happened.
#[derive(AsRef, Clone, Debug, Deref)]
#[non_exhaustive]
pub struct Event<T: ?Sized> {
    /// [`SystemTime`] when this [`Event`] has happened.
    #[cfg(feature = "timestamps")]
    pub at: SystemTime,

    /// Actual value of this [`Event`].
    #[as_ref]
    #[deref]
    pub value: T,
}

impl<T> Event<T> {
    /// Creates a new [`Event`] out of the given `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(feature = "timestamps")]
            at: SystemTime::now(),
            value,
        }
    }

    /// Unwraps the inner [`Event::value`] loosing all the attached metadata.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Identity of a [`Feature`] across events.
///
/// [`Feature`]: feature::Feature
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{name}")]
pub struct FeatureId {
    /// Name of the [`Feature`].
    ///
    /// [`Feature`]: feature::Feature
    pub name: String,

    /// Identifier of the source the [`Feature`] was parsed from, if any.
    ///
    /// [`Feature`]: feature::Feature
    pub path: Option<PathBuf>,
}

impl FeatureId {
    /// Creates a new [`FeatureId`].
    #[must_use]
    pub fn new(name: impl Into<String>, path: Option<&Path>) -> Self {
        Self {
            name: name.into(),
            path: path.map(Path::to_path_buf),
        }
    }
}

impl From<&feature::Feature> for FeatureId {
    fn from(f: &feature::Feature) -> Self {
        Self::new(f.name.clone(), f.path.as_deref())
    }
}

/// Identity of a scenario across events.
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{feature} / {scenario}")]
pub struct ScenarioId {
    /// [`FeatureId`] of the owning [`Feature`].
    ///
    /// [`Feature`]: feature::Feature
    pub feature: FeatureId,

    /// Name of the scenario.
    pub scenario: String,
}

/// Top-level run event.
#[derive(Clone, Debug, PartialEq)]
pub enum Run {
    /// Run has started.
    Started,

    /// [`Feature`] event.
    Feature(FeatureId, Feature),

    /// Run has finished, and no more events will follow.
    Finished,
}

impl Run {
    /// Constructs event of a [`Feature`] being started.
    ///
    /// [`Feature`]: feature::Feature
    #[must_use]
    pub const fn feature_started(feature: FeatureId) -> Self {
        Self::Feature(feature, Feature::Started)
    }

    /// Constructs event of a finished [`Feature`].
    ///
    /// [`Feature`]: feature::Feature
    #[must_use]
    pub const fn feature_finished(feature: FeatureId) -> Self {
        Self::Feature(feature, Feature::Finished)
    }

    /// Constructs [`Run`] event of the given scenario.
    #[must_use]
    pub fn scenario(id: ScenarioId, event: Scenario) -> Self {
        Self::Feature(id.feature, Feature::Scenario(id.scenario, event))
    }

    /// Constructs [`Run`] event of the given scenario's [`Step`].
    ///
    /// [`Step`]: feature::Step
    #[must_use]
    pub fn step(id: ScenarioId, step: Arc<feature::Step>, event: Step) -> Self {
        Self::scenario(id, Scenario::Step(step, event))
    }

    /// Returns the [`ScenarioId`] this event belongs to, if any.
    #[must_use]
    pub fn scenario_id(&self) -> Option<ScenarioId> {
        match self {
            Self::Feature(feature, Feature::Scenario(scenario, _)) => Some(ScenarioId {
                feature: feature.clone(),
                scenario: scenario.clone(),
            }),
            Self::Started | Self::Finished | Self::Feature(..) => None,
        }
    }
}

/// Event specific to a particular [Feature].
///
/// [Feature]: https://cucumber.io/docs/gherkin/reference#feature
#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    /// [`Feature`] execution started.
    ///
    /// [`Feature`]: feature::Feature
    Started,

    /// Event of the named scenario.
    Scenario(String, Scenario),

    /// [`Feature`] execution finished.
    ///
    /// [`Feature`]: feature::Feature
    Finished,
}

/// Event specific to a particular [Scenario].
///
/// [Scenario]: https://cucumber.io/docs/gherkin/reference#example
#[derive(Clone, Debug, PartialEq)]
pub enum Scenario {
    /// Scenario execution started.
    Started,

    /// Scenario won't be executed.
    Skipped,

    /// [`Step`] event, background ones included.
    ///
    /// [`Step`]: feature::Step
    Step(Arc<feature::Step>, Step),

    /// Scenario execution finished.
    Finished(Outcome),
}

/// Final result of a scenario execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Every step passed.
    Passed,

    /// Some step failed with the given message.
    Failed(String),
}

/// Event specific to a particular [Step].
///
/// [Step]: https://cucumber.io/docs/gherkin/reference#step
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// [`Step`] execution started.
    ///
    /// [`Step`]: feature::Step
    Started,

    /// [`Step`] passed.
    ///
    /// [`Step`]: feature::Step
    Passed,

    /// [`Step`] wasn't executed, as some previous one failed.
    ///
    /// [`Step`]: feature::Step
    Skipped,

    /// [`Step`] failed with the given message.
    ///
    /// [`Step`]: feature::Step
    Failed(String),
}
