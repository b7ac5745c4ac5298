// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sinks of [`event::Run`]s.
//!
//! An [`Observer`] is shared by all the concurrently running scenarios, so it
//! receives events in any interleaving and through a shared reference only.

pub mod log;
pub mod report;
pub mod summary;

use std::sync::Arc;

use derive_more::with_trait::Debug;

use crate::{event, Event};

#[doc(inline)]
pub use self::{log::Log, report::Report, summary::Summary};

/// Sink of [`event::Run`]s.
pub trait Observer: Send + Sync {
    /// Handles the given [`Event`].
    ///
    /// [`event::Run::Finished`] is the last one of a run.
    fn on_event(&self, event: &Event<event::Run>);
}

impl<O: Observer + ?Sized> Observer for Arc<O> {
    fn on_event(&self, event: &Event<event::Run>) {
        (**self).on_event(event);
    }
}

/// Fan-out of [`Observer`]s, notified in registration order.
#[derive(Clone, Debug, Default)]
pub struct Observers {
    #[debug("{}", observers.len())]
    observers: Vec<Arc<dyn Observer>>,
}

impl Observers {
    /// Creates a new empty [`Observers`] fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the given [`Observer`].
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Registers the given [`Observer`].
    pub fn push(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Indicates whether no [`Observer`]s are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Wraps the given `event` into an [`Event`] and notifies everyone.
    pub fn emit(&self, event: event::Run) {
        self.on_event(&Event::new(event));
    }
}

impl Observer for Observers {
    fn on_event(&self, event: &Event<event::Run>) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::event::{FeatureId, Run};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Run>>);

    impl Observer for Recorder {
        fn on_event(&self, event: &Event<Run>) {
            self.0.lock().unwrap().push(event.value.clone());
        }
    }

    #[test]
    fn fans_out_in_order() {
        let (a, b) = (Arc::new(Recorder::default()), Arc::new(Recorder::default()));
        let observers = Observers::new().with(a.clone()).with(b.clone());

        observers.emit(Run::Started);
        observers.emit(Run::feature_started(FeatureId::new("f", None)));
        observers.emit(Run::Finished);

        let expected = [
            Run::Started,
            Run::feature_started(FeatureId::new("f", None)),
            Run::Finished,
        ];
        assert_eq!(*a.0.lock().unwrap(), expected);
        assert_eq!(*b.0.lock().unwrap(), expected);
    }
}
