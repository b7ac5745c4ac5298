// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Built-in translation lookup [`Handler`]s.

use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value as Json;

use super::{plural, Handler, Params};
use crate::pattern::Value;

/// [`Handler`] looking keys up in an in-memory map.
///
/// Found text is formatted with [`plural::format()`].
#[derive(Clone, Debug, Default)]
pub struct MapTranslations {
    entries: HashMap<String, String>,
}

impl MapTranslations {
    /// Creates a new [`MapTranslations`] out of the given `(key, text)` pairs.
    #[must_use]
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[async_trait]
impl Handler for MapTranslations {
    async fn resolve(&self, key: &str, params: &Params) -> anyhow::Result<Value> {
        let text = self
            .entries
            .get(key)
            .ok_or_else(|| anyhow!("no translation for `{key}`"))?;
        Ok(Value::String(plural::format(text, params)))
    }
}

/// [`Handler`] looking keys up in a JSON file.
///
/// The file is read once, on the first lookup. Concurrent first lookups are
/// safe: exactly one of them reads the file while others wait for it. Nested
/// objects are addressed with dot-separated keys, like `menu.title`.
#[derive(Debug)]
pub struct FileTranslations {
    path: PathBuf,
    cache: OnceCell<HashMap<String, String>>,
}

impl FileTranslations {
    /// Creates a new [`FileTranslations`] reading the file at the given `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    /// Returns the loaded translations, loading them if needed.
    fn entries(&self) -> anyhow::Result<&HashMap<String, String>> {
        self.cache.get_or_try_init(|| {
            tracing::debug!(path = %self.path.display(), "loading translations");
            let raw = fs::read_to_string(&self.path)
                .with_context(|| format!("failed to read `{}`", self.path.display()))?;
            let json = serde_json::from_str::<Json>(&raw)
                .with_context(|| format!("`{}` is not valid JSON", self.path.display()))?;
            let mut entries = HashMap::new();
            flatten(None, &json, &mut entries);
            Ok(entries)
        })
    }
}

#[async_trait]
impl Handler for FileTranslations {
    async fn resolve(&self, key: &str, params: &Params) -> anyhow::Result<Value> {
        let text = self
            .entries()?
            .get(key)
            .ok_or_else(|| anyhow!("no translation for `{key}` in `{}`", self.path.display()))?;
        Ok(Value::String(plural::format(text, params)))
    }
}

/// Flattens nested JSON objects into dot-separated keys.
fn flatten(prefix: Option<&str>, json: &Json, out: &mut HashMap<String, String>) {
    let join = |k: &str| prefix.map_or_else(|| k.to_owned(), |p| format!("{p}.{k}"));
    match json {
        Json::Object(map) => {
            for (k, v) in map {
                flatten(Some(&join(k)), v, out);
            }
        }
        Json::String(s) => {
            if let Some(p) = prefix {
                _ = out.insert(p.to_owned(), s.clone());
            }
        }
        Json::Number(_) | Json::Bool(_) => {
            if let Some(p) = prefix {
                _ = out.insert(p.to_owned(), json.to_string());
            }
        }
        Json::Null | Json::Array(_) => {}
    }
}
