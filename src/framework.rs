// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! In-process [`Framework`] implementation.

use derive_more::with_trait::Debug;
use futures::{
    future::{self, BoxFuture},
    FutureExt as _,
};

use crate::runner::{Failure, Framework, Hook, TestBody};

/// [`Framework`] collecting the registered tests to [`run`] them later.
///
/// Sibling tests and groups run concurrently, each group after its set-up
/// hooks and before its tear-down ones.
///
/// [`run`]: Collected::run
#[derive(Debug, Default)]
pub struct Collected {
    root: Node,
    stack: Vec<Node>,
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    #[debug(skip)]
    set_up: Vec<Hook>,
    #[debug(skip)]
    tear_down: Vec<Hook>,
    children: Vec<Child>,
}

#[derive(Debug)]
enum Child {
    Group(Node),
    Test(Test),
}

#[derive(Debug)]
struct Test {
    name: String,
    tags: Vec<String>,
    skip: bool,
    #[debug(skip)]
    body: TestBody,
}

/// Outcome of a single test of a [`Collected`] run.
#[derive(Clone, Debug)]
pub enum TestOutcome {
    /// Test passed.
    Passed,

    /// Test was skipped, so its body never ran.
    Skipped,

    /// Test failed.
    Failed(Failure),
}

/// Result of a single test of a [`Collected`] run.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// Names of the groups the test is nested in, outermost first.
    pub path: Vec<String>,

    /// Name of the test.
    pub name: String,

    /// Tags the test was registered with.
    pub tags: Vec<String>,

    /// [`TestOutcome`] of the test.
    pub outcome: TestOutcome,
}

impl TestResult {
    /// Indicates whether the test failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, TestOutcome::Failed(_))
    }

    /// Returns the [`Failure`] of the test, if it failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            TestOutcome::Failed(f) => Some(f),
            TestOutcome::Passed | TestOutcome::Skipped => None,
        }
    }
}

impl Collected {
    /// Creates a new empty [`Collected`] framework.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> &mut Node {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    /// Returns the number of registered tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Indicates whether no tests are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs all the registered tests, returning their [`TestResult`]s in
    /// registration order.
    pub async fn run(self) -> Vec<TestResult> {
        run_node(self.root, Vec::new()).await
    }
}

impl Framework for Collected {
    fn group<G>(&mut self, name: &str, body: G)
    where
        G: FnOnce(&mut Self),
    {
        self.stack.push(Node {
            name: name.to_owned(),
            ..Node::default()
        });
        body(self);
        if let Some(node) = self.stack.pop() {
            self.current().children.push(Child::Group(node));
        }
    }

    fn test(&mut self, name: &str, tags: &[String], skip: bool, body: TestBody) {
        self.current().children.push(Child::Test(Test {
            name: name.to_owned(),
            tags: tags.to_vec(),
            skip,
            body,
        }));
    }

    fn set_up_all(&mut self, hook: Hook) {
        self.current().set_up.push(hook);
    }

    fn tear_down_all(&mut self, hook: Hook) {
        self.current().tear_down.push(hook);
    }
}

impl Node {
    fn count(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                Child::Group(g) => g.count(),
                Child::Test(_) => 1,
            })
            .sum()
    }
}

fn run_node(node: Node, path: Vec<String>) -> BoxFuture<'static, Vec<TestResult>> {
    async move {
        for hook in node.set_up {
            hook().await;
        }

        let children = node.children.into_iter().map(|child| match child {
            Child::Group(group) => {
                let mut path = path.clone();
                path.push(group.name.clone());
                run_node(group, path)
            }
            Child::Test(test) => {
                let path = path.clone();
                async move { vec![run_test(test, path).await] }.boxed()
            }
        });
        let results = future::join_all(children).await.into_iter().flatten().collect();

        for hook in node.tear_down {
            hook().await;
        }
        results
    }
    .boxed()
}

async fn run_test(test: Test, path: Vec<String>) -> TestResult {
    let outcome = if test.skip {
        TestOutcome::Skipped
    } else {
        match (test.body)().await {
            Ok(()) => TestOutcome::Passed,
            Err(f) => TestOutcome::Failed(f),
        }
    };
    TestResult {
        path,
        name: test.name,
        tags: test.tags,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn log(journal: &Arc<Mutex<Vec<String>>>, entry: &str) -> Hook {
        let (journal, entry) = (Arc::clone(journal), entry.to_owned());
        Box::new(move || async move { journal.lock().unwrap().push(entry) }.boxed())
    }

    #[test]
    fn runs_hooks_around_nested_tests() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut fw = Collected::new();
        fw.set_up_all(log(&journal, "run up"));
        fw.group("outer", |fw| {
            fw.set_up_all(log(&journal, "outer up"));
            fw.group("inner", |fw| {
                fw.test("ok", &[], false, Box::new(|| async { Ok(()) }.boxed()));
                fw.test(
                    "bad",
                    &["t".into()],
                    false,
                    Box::new(|| async { Err(Failure::World("nope".into())) }.boxed()),
                );
            });
            fw.test(
                "skipped",
                &[],
                true,
                Box::new(|| future::ready(Err(Failure::World("ran".into()))).boxed()),
            );
            fw.tear_down_all(log(&journal, "outer down"));
        });
        fw.tear_down_all(log(&journal, "run down"));
        assert_eq!(fw.len(), 3);

        let results = futures::executor::block_on(fw.run());

        assert_eq!(
            *journal.lock().unwrap(),
            ["run up", "outer up", "outer down", "run down"],
        );
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].path, ["outer", "inner"]);
        assert!(matches!(results[0].outcome, TestOutcome::Passed));
        assert!(results[1].is_failed());
        assert_eq!(results[1].tags, ["t"]);
        assert_eq!(
            results[1].failure().map(ToString::to_string).as_deref(),
            Some("failed to initialize world: nope"),
        );
        assert_eq!(results[2].path, ["outer"]);
        assert!(matches!(results[2].outcome, TestOutcome::Skipped));
    }
}
