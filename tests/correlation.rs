use std::{convert::Infallible, path::Path, sync::Arc, thread, time::Duration};

use futures::{future::BoxFuture, FutureExt as _};
use pickle::{
    event::{FeatureId, Outcome, Run, Scenario, ScenarioId, Step},
    feature::{self, StepKeyword},
    observer::{report::Status, Observer as _, Report},
    parser::MemoryProvider,
    step::Context,
    Event, ParamKind, Pickle, Registry, Value, World,
};

fn id(path: &str, feature: &str, scenario: &str) -> ScenarioId {
    ScenarioId {
        feature: FeatureId::new(feature, Some(Path::new(path))),
        scenario: scenario.into(),
    }
}

fn send(report: &Report, ev: Run) {
    report.on_event(&Event::new(ev));
}

#[test]
fn interleaved_scenarios_are_attributed_correctly() {
    let report = Report::new();
    let a = id("a.feature", "A", "first");
    let b = id("b.feature", "B", "second");
    let step = Arc::new(feature::Step::new(StepKeyword::Given, "x"));

    send(&report, Run::feature_started(a.feature.clone()));
    send(&report, Run::feature_started(b.feature.clone()));
    send(&report, Run::scenario(a.clone(), Scenario::Started));
    send(&report, Run::scenario(b.clone(), Scenario::Started));
    send(&report, Run::step(a.clone(), step.clone(), Step::Started));
    send(&report, Run::step(b.clone(), step.clone(), Step::Started));
    send(&report, Run::step(a.clone(), step.clone(), Step::Passed));
    send(&report, Run::scenario(a.clone(), Scenario::Finished(Outcome::Passed)));
    send(&report, Run::step(b.clone(), step, Step::Failed("boom".into())));
    send(
        &report,
        Run::scenario(b.clone(), Scenario::Finished(Outcome::Failed("boom".into()))),
    );
    send(&report, Run::feature_finished(a.feature.clone()));
    send(&report, Run::feature_finished(b.feature.clone()));

    let first = report.scenario(&a).unwrap();
    assert_eq!(first.status, Status::Passed);
    assert_eq!(first.steps.len(), 1);
    assert_eq!(first.steps[0].status, Status::Passed);

    let second = report.scenario(&b).unwrap();
    assert_eq!(second.status, Status::Failed);
    assert_eq!(second.message.as_deref(), Some("boom"));
    assert_eq!(second.steps[0].status, Status::Failed);

    let statuses = report.features().iter().map(|f| f.status).collect::<Vec<_>>();
    assert_eq!(statuses, [Status::Passed, Status::Failed]);
}

#[test]
fn same_names_in_different_files_stay_apart() {
    let report = Report::new();
    let a = id("a/login.feature", "Login", "works");
    let b = id("b/login.feature", "Login", "works");

    send(&report, Run::scenario(a.clone(), Scenario::Started));
    send(&report, Run::scenario(b.clone(), Scenario::Started));
    send(&report, Run::scenario(b.clone(), Scenario::Finished(Outcome::Passed)));

    assert_eq!(report.features().len(), 2);
    assert_eq!(report.scenario(&a).unwrap().status, Status::Running);
    assert_eq!(report.scenario(&b).unwrap().status, Status::Passed);
}

#[test]
fn concurrent_events_are_not_lost() {
    let report = Arc::new(Report::new());

    let handles = (0..8)
        .map(|n| {
            let report = Arc::clone(&report);
            thread::spawn(move || {
                for s in 0..25 {
                    let sc = id(&format!("{n}.feature"), &format!("F{n}"), &format!("s{s}"));
                    send(&report, Run::scenario(sc.clone(), Scenario::Started));
                    send(&report, Run::scenario(sc, Scenario::Finished(Outcome::Passed)));
                }
            })
        })
        .collect::<Vec<_>>();
    for h in handles {
        h.join().unwrap();
    }
    send(&report, Run::Finished);

    let features = report.features();
    assert_eq!(features.len(), 8);
    assert!(features.iter().all(|f| f.scenarios.len() == 25));
    assert!(features
        .iter()
        .flat_map(|f| &f.scenarios)
        .all(|s| s.status == Status::Passed));
    assert!(report.is_finished());
}

#[derive(Debug, Default)]
struct Sleeper;

impl World for Sleeper {
    type Error = Infallible;

    async fn new() -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

fn slow(_: &mut Sleeper, ctx: Context) -> BoxFuture<'_, anyhow::Result<()>> {
    async move {
        let ms = ctx.arg(0).and_then(Value::as_int).unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(ms.unsigned_abs())).await;
        anyhow::ensure!(ms != 2, "too slow");
        Ok(())
    }
    .boxed()
}

#[tokio::test]
async fn repeated_scenario_names_are_reported_apart() {
    let feature = |n: usize| {
        format!(
            "Feature: F{n}\n\
             \x20 Scenario: s\n    Given slow 5\n    And slow 1\n\
             \x20 Scenario: s\n    Given slow 1\n    And slow 2\n\
             \x20 Scenario: s\n    Given slow 3\n\
             \x20 Scenario: s\n    Given slow 4\n",
        )
    };
    let provider = (0..3).fold(MemoryProvider::new(), |p, n| {
        p.with(format!("{n}.feature"), feature(n))
    });
    let report = Arc::new(Report::new());

    let results = Pickle::new()
        .with_provider(provider)
        .steps(
            Registry::<Sleeper>::new()
                .step_with_kinds("slow {ms}", [("ms", ParamKind::Int)], slow)
                .unwrap(),
        )
        .observer(report.clone())
        .run(["."])
        .await
        .unwrap();

    assert_eq!(results.len(), 12);
    assert_eq!(results.iter().filter(|r| r.is_failed()).count(), 3);

    let features = report.features();
    assert_eq!(features.len(), 3);
    for f in &features {
        assert_eq!(f.status, Status::Failed, "{}", f.name);
        let names = f.scenarios.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names.len(), 4);
        for name in ["s", "s #2", "s #3", "s #4"] {
            assert!(names.contains(&name), "{name} missing in {}", f.name);
        }
        for s in &f.scenarios {
            let expected = if s.name == "s #2" { Status::Failed } else { Status::Passed };
            assert_eq!(s.status, expected, "{}/{}", f.name, s.name);
            let steps = if s.name == "s" || s.name == "s #2" { 2 } else { 1 };
            assert_eq!(s.steps.len(), steps, "{}/{}", f.name, s.name);
        }
    }
}
