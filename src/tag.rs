// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Extension of a [`TagOperation`].

use std::collections::HashSet;

use gherkin::tagexpr::TagOperation;
use sealed::sealed;

/// Extension of a [`TagOperation`] allowing to evaluate it against scenario
/// tags.
///
/// Tags are compared without their leading `@`, so both `@fast` and `fast`
/// satisfy a `@fast` expression.
#[sealed]
pub trait Ext {
    /// Evaluates this [`TagOperation`] for the given `tags`.
    #[must_use]
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>;
}

#[sealed]
impl Ext for TagOperation {
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let tags = tags
            .into_iter()
            .map(|t| strip(t.as_ref()).to_owned())
            .collect::<HashSet<_>>();
        eval(self, &tags)
    }
}

fn strip(tag: &str) -> &str {
    tag.trim().trim_start_matches('@')
}

fn eval(op: &TagOperation, tags: &HashSet<String>) -> bool {
    match op {
        TagOperation::And(l, r) => eval(l, tags) && eval(r, tags),
        TagOperation::Or(l, r) => eval(l, tags) || eval(r, tags),
        TagOperation::Not(t) => !eval(t, tags),
        TagOperation::Tag(t) => tags.contains(strip(t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(expr: &str) -> TagOperation {
        expr.parse().unwrap()
    }

    #[test]
    fn evaluates_boolean_expressions() {
        let tags = ["fast", "@smoke"];
        assert!(op("@fast").eval(tags));
        assert!(op("@fast and @smoke").eval(tags));
        assert!(op("@slow or @smoke").eval(tags));
        assert!(!op("not @fast").eval(tags));
        assert!(op("@fast and not (@db or @slow)").eval(tags));
        assert!(!op("@db").eval(Vec::<String>::new()));
    }
}
