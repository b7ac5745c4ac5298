// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Observer`] keeping track of passed, skipped and failed counts.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use itertools::Itertools as _;

use super::Observer;
use crate::{event, Event};

/// Execution statistics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed steps (or scenarios).
    pub passed: usize,

    /// Number of skipped steps (or scenarios).
    pub skipped: usize,

    /// Number of failed steps (or scenarios).
    pub failed: usize,
}

impl Stats {
    /// Returns total number of steps (or scenarios), these [`Stats`] have been
    /// collected for.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = [
            (self.passed > 0).then(|| format!("{} passed", self.passed)),
            (self.skipped > 0).then(|| format!("{} skipped", self.skipped)),
            (self.failed > 0).then(|| format!("{} failed", self.failed)),
        ]
        .into_iter()
        .flatten()
        .join(", ");
        if formatted.is_empty() {
            Ok(())
        } else {
            write!(f, " ({formatted})")
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Counts {
    features: usize,
    scenarios: Stats,
    steps: Stats,
}

/// [`Observer`] summarizing a run.
#[derive(Debug, Default)]
pub struct Summary {
    counts: Mutex<Counts>,
}

impl Summary {
    /// Creates a new empty [`Summary`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn counts(&self) -> Counts {
        *self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns number of started features.
    #[must_use]
    pub fn features(&self) -> usize {
        self.counts().features
    }

    /// Returns [`Stats`] of scenarios.
    #[must_use]
    pub fn scenarios_stats(&self) -> Stats {
        self.counts().scenarios
    }

    /// Returns [`Stats`] of steps.
    #[must_use]
    pub fn steps_stats(&self) -> Stats {
        self.counts().steps
    }

    /// Indicates whether there have been failed scenarios.
    #[must_use]
    pub fn execution_has_failed(&self) -> bool {
        self.counts().scenarios.failed > 0
    }
}

impl Observer for Summary {
    fn on_event(&self, event: &Event<event::Run>) {
        use event::{Feature, Outcome, Run, Scenario, Step};

        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        match &event.value {
            Run::Feature(_, Feature::Started) => counts.features += 1,
            Run::Feature(_, Feature::Scenario(_, ev)) => match ev {
                Scenario::Started => {}
                Scenario::Skipped => counts.scenarios.skipped += 1,
                Scenario::Step(_, Step::Started) => {}
                Scenario::Step(_, Step::Passed) => counts.steps.passed += 1,
                Scenario::Step(_, Step::Skipped) => counts.steps.skipped += 1,
                Scenario::Step(_, Step::Failed(_)) => counts.steps.failed += 1,
                Scenario::Finished(Outcome::Passed) => counts.scenarios.passed += 1,
                Scenario::Finished(Outcome::Failed(_)) => counts.scenarios.failed += 1,
            },
            Run::Started | Run::Finished | Run::Feature(_, Feature::Finished) => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self.counts();
        let plural = |n: usize, what: &str| format!("{n} {what}{}", if n == 1 { "" } else { "s" });
        write!(
            f,
            "[Summary]\n{}\n{}{}\n{}{}",
            plural(counts.features, "feature"),
            plural(counts.scenarios.total(), "scenario"),
            counts.scenarios,
            plural(counts.steps.total(), "step"),
            counts.steps,
        )
    }
}
