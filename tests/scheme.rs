use std::fs;

use pickle::{
    scheme::{self, plural, FileTranslations, MapTranslations, Params},
    Resolver, Value,
};

const SHOTS: &str = "{count, plural, =0{no shots} =1{1 shot} other{{count} shots}}";

fn translations() -> Resolver {
    Resolver::new().with(
        "t",
        MapTranslations::new([
            ("shotLabel", SHOTS),
            ("hashLabel", "{count, plural, =1{one shot} other{# shots}}"),
            ("greeting", "Good {time}, {name}!"),
        ]),
    )
}

fn env(key: &str, _: &Params) -> anyhow::Result<Value> {
    Ok(Value::from(key))
}

async fn resolve(resolver: &Resolver, raw: &str) -> String {
    resolver.resolve(raw).await.unwrap().value.to_string()
}

#[tokio::test]
async fn resolves_plural_forms() {
    let r = translations();

    assert_eq!(resolve(&r, "{t:shotLabel(count: 0)}").await, "no shots");
    assert_eq!(resolve(&r, "{t:shotLabel(count: 1)}").await, "1 shot");
    assert_eq!(resolve(&r, "{t:shotLabel(count: 5)}").await, "5 shots");
    assert_eq!(resolve(&r, "{t:hashLabel(count: 42)}").await, "42 shots");
}

#[tokio::test]
async fn substitutes_quoted_params() {
    let r = translations();

    assert_eq!(
        resolve(&r, "{t:greeting(name: 'Alice', time: 'morning')}").await,
        "Good morning, Alice!",
    );
    assert_eq!(
        resolve(&r, "{t:greeting(name: 'Smith, Jr.', time: evening)}").await,
        "Good evening, Smith, Jr.!",
    );
}

#[tokio::test]
async fn passes_plain_values_through() {
    let resolved = translations().resolve("just text").await.unwrap();

    assert_eq!(resolved.value, Value::from("just text"));
    assert_eq!(resolved.scheme, None);
}

#[tokio::test]
async fn reports_unknown_scheme_with_registered_ones() {
    let r = translations().with("env", env);

    let err = r.resolve("{db:users}").await.unwrap_err();

    assert!(matches!(err, scheme::Error::UnknownScheme { .. }));
    assert_eq!(
        err.to_string(),
        "unknown scheme in parameter `{db:users}`, registered schemes: [env, t]",
    );
}

#[tokio::test]
async fn reports_missing_translation() {
    let err = translations().resolve("{t:nope}").await.unwrap_err();

    assert!(matches!(
        err,
        scheme::Error::Handler { scheme: ref s, ref key, .. } if s == "t" && key == "nope",
    ));
}

#[tokio::test]
async fn loads_translation_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("en.json");
    fs::write(&path, r#"{"menu": {"title": "Menu of {name}", "items": 3}}"#).unwrap();
    let r = Resolver::new().with("t", FileTranslations::new(&path));

    assert_eq!(resolve(&r, "{t:menu.title(name: 'Bob')}").await, "Menu of Bob");

    fs::remove_file(&path).unwrap();
    assert_eq!(resolve(&r, "{t:menu.items}").await, "3");
}

#[test]
fn plural_blocks_may_nest() {
    let params = [("n", "2"), ("who", "cats")].into_iter().collect::<Params>();

    assert_eq!(
        plural::format("{n, plural, =1{one} other{{n} of {who}}}!", &params),
        "2 of cats!",
    );
    assert_eq!(plural::format("{missing, plural, other{x}}", &params), "{missing, plural, other{x}}");
    assert_eq!(plural::format("{n, plural, =1{one}}", &params), "");
}
