// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    feature::{DataTable, DocString, SourceLocation, Step},
    pattern::Value,
};

/// Context of a step [`fn`] execution.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Step`] matched to the step [`fn`].
    pub step: Step,

    /// Values extracted from the [`Step::text`], one per placeholder, after
    /// scheme resolution.
    pub args: Vec<Value>,
}

impl Context {
    /// Creates a new [`Context`].
    #[must_use]
    pub const fn new(step: Step, args: Vec<Value>) -> Self {
        Self { step, args }
    }

    /// Returns the argument at the given placeholder `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Returns the [`DataTable`] attached to the [`Step`], if any.
    #[must_use]
    pub const fn table(&self) -> Option<&DataTable> {
        self.step.table.as_ref()
    }

    /// Returns the [`DocString`] attached to the [`Step`], if any.
    #[must_use]
    pub const fn docstring(&self) -> Option<&DocString> {
        self.step.docstring.as_ref()
    }

    /// Returns where the [`Step`] was declared, if known.
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        self.step.location.as_ref()
    }
}
