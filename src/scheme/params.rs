// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing of `{scheme:key(name: value, ...)}` parameters.

use lazy_regex::regex_captures;
use linked_hash_map::LinkedHashMap;

use super::Error;

/// Named parameters passed to a scheme [`Handler`], in declaration order.
///
/// [`Handler`]: super::Handler
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(LinkedHashMap<String, String>);

impl Params {
    /// Creates empty [`Params`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of the parameter with the given `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Scheme reference parsed out of a raw parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Reference<'a> {
    pub(crate) scheme: &'a str,
    pub(crate) key: &'a str,
    pub(crate) params: Params,
}

/// Parses the given `raw` parameter.
///
/// Returns [`None`] if it's not of the `{scheme:rest}` shape, so should be
/// used literally.
pub(crate) fn parse(raw: &str) -> Result<Option<Reference<'_>>, Error> {
    let Some((_, scheme, rest)) = regex_captures!(r"^\{(\w+):(.*)\}$"s, raw) else {
        return Ok(None);
    };

    let malformed = |reason| Error::MalformedParams { param: raw.to_owned(), reason };

    let Some(open) = rest.find('(') else {
        return Ok(Some(Reference {
            scheme,
            key: rest.trim(),
            params: Params::new(),
        }));
    };
    let key = rest[..open].trim();
    let list = rest[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| malformed("unclosed parameter list"))?;

    let params = split_list(list)
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let (name, value) = item
                .split_once(':')
                .ok_or_else(|| malformed("parameter has no `name: value` form"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(malformed("parameter has empty name"));
            }
            Ok((name.to_owned(), unquote(value.trim()).to_owned()))
        })
        .collect::<Result<Params, _>>()?;

    Ok(Some(Reference { scheme, key, params }))
}

/// Splits the `list` on commas outside of single quotes.
fn split_list(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
}

/// Strips the matching single quotes around the `value`, if any.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}
