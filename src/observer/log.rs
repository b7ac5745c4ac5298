// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Observer`] forwarding events into [`tracing`].

use super::Observer;
use crate::{event, Event};

/// [`Observer`] emitting every event as a [`tracing`] event.
///
/// Failures are emitted at `WARN` level, everything else at `INFO` or `DEBUG`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Observer for Log {
    fn on_event(&self, event: &Event<event::Run>) {
        use event::{Feature, Outcome, Run, Scenario, Step};

        match &event.value {
            Run::Started => tracing::info!("run started"),
            Run::Finished => tracing::info!("run finished"),
            Run::Feature(f, Feature::Started) => {
                tracing::info!(feature = %f, path = ?f.path, "feature started");
            }
            Run::Feature(f, Feature::Finished) => {
                tracing::info!(feature = %f, path = ?f.path, "feature finished");
            }
            Run::Feature(f, Feature::Scenario(name, ev)) => match ev {
                Scenario::Started => {
                    tracing::info!(feature = %f, scenario = %name, "scenario started");
                }
                Scenario::Skipped => {
                    tracing::info!(feature = %f, scenario = %name, "scenario skipped");
                }
                Scenario::Finished(Outcome::Passed) => {
                    tracing::info!(feature = %f, scenario = %name, "scenario passed");
                }
                Scenario::Finished(Outcome::Failed(msg)) => {
                    tracing::warn!(feature = %f, scenario = %name, "scenario failed: {msg}");
                }
                Scenario::Step(step, ev) => {
                    let text = step.full_text();
                    match ev {
                        Step::Started => tracing::debug!(scenario = %name, "{text}"),
                        Step::Passed => tracing::debug!(scenario = %name, "{text}: passed"),
                        Step::Skipped => tracing::debug!(scenario = %name, "{text}: skipped"),
                        Step::Failed(msg) => {
                            tracing::warn!(
                                scenario = %name,
                                location = ?step.location.as_ref().map(ToString::to_string),
                                "{text}: {msg}",
                            );
                        }
                    }
                }
            },
        }
    }
}
