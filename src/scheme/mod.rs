// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolution of `{scheme:key(name: value, ...)}` step parameters.
//!
//! A parameter of this shape is not used literally. Instead, the [`Handler`]
//! registered for its scheme resolves it into a [`Value`]:
//!
//! ```rust
//! # use pickle::{pattern::Value, scheme::{MapTranslations, Resolver}};
//! # futures::executor::block_on(async {
//! let resolver = Resolver::new()
//!     .with("t", MapTranslations::new([("greeting", "Good {time}, {name}!")]));
//!
//! let resolved = resolver
//!     .resolve("{t:greeting(name: 'Alice', time: 'morning')}")
//!     .await
//!     .unwrap();
//! assert_eq!(resolved.value, Value::from("Good morning, Alice!"));
//! assert_eq!(resolved.scheme.as_deref(), Some("t"));
//! # });
//! ```

mod params;
pub mod plural;
mod translations;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use derive_more::with_trait::{Debug, Display, Error as StdError};
use itertools::Itertools as _;

use crate::pattern::Value;

#[doc(inline)]
pub use self::{
    params::Params,
    translations::{FileTranslations, MapTranslations},
};

/// Error of resolving a scheme parameter.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// No [`Handler`] is registered for the scheme.
    #[display(
        "unknown scheme in parameter `{param}`, registered schemes: [{}]",
        schemes.join(", "),
    )]
    UnknownScheme {
        /// Raw parameter text.
        param: String,

        /// Names of all the registered schemes, sorted.
        schemes: Vec<String>,
    },

    /// [`Handler`] failed to resolve the key.
    #[display("scheme `{scheme}` failed to resolve `{key}`: {source:#}")]
    Handler {
        /// Scheme of the parameter.
        scheme: String,

        /// Key of the parameter.
        key: String,

        /// Error returned by the [`Handler`].
        #[error(not(source))]
        source: anyhow::Error,
    },

    /// Parameter list cannot be parsed.
    #[display("malformed parameter `{param}`: {reason}")]
    MalformedParams {
        /// Raw parameter text.
        param: String,

        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Resolver of scheme keys into [`Value`]s.
///
/// A [`Handler`] is shared by all the concurrently running scenarios, so any
/// internal caching of it must be safe for concurrent first use.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Resolves the given `key` with the given `params`.
    ///
    /// # Errors
    ///
    /// Any error is reported as the failure of the step using the parameter.
    async fn resolve(&self, key: &str, params: &Params) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&str, &Params) -> anyhow::Result<Value> + Send + Sync,
{
    async fn resolve(&self, key: &str, params: &Params) -> anyhow::Result<Value> {
        self(key, params)
    }
}

/// Parameter after resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedParam {
    /// Parameter as it was extracted from the step text.
    pub original: Value,

    /// Resolved value, equal to the [`ResolvedParam::original`] for literals.
    pub value: Value,

    /// Scheme the parameter was resolved through, if any.
    pub scheme: Option<String>,
}

impl ResolvedParam {
    /// Creates a [`ResolvedParam`] of a literal `value`.
    #[must_use]
    pub fn literal(value: Value) -> Self {
        Self {
            original: value.clone(),
            value,
            scheme: None,
        }
    }
}

/// Registry of scheme [`Handler`]s.
///
/// Handlers are registered during setup, and the [`Resolver`] is read-only
/// afterwards, so it can be shared across concurrently running scenarios.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    #[debug("{:?}", handlers.keys().collect::<Vec<_>>())]
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl Resolver {
    /// Creates a new [`Resolver`] without any [`Handler`]s.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the `handler` for the given `scheme`, replacing the previous
    /// one, if any.
    #[must_use]
    pub fn with(mut self, scheme: impl Into<String>, handler: impl Handler + 'static) -> Self {
        _ = self.handlers.insert(scheme.into(), Arc::new(handler));
        self
    }

    /// Iterates over the registered scheme names, sorted.
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Resolves the given `raw` parameter.
    ///
    /// Parameters not of the `{scheme:rest}` shape are returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedParams`] if the parameter list cannot be parsed.
    /// - [`Error::UnknownScheme`] if no [`Handler`] is registered for the
    ///   scheme.
    /// - [`Error::Handler`] if the [`Handler`] fails.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedParam, Error> {
        let Some(reference) = params::parse(raw)? else {
            return Ok(ResolvedParam::literal(Value::from(raw)));
        };
        let handler =
            self.handlers
                .get(reference.scheme)
                .ok_or_else(|| Error::UnknownScheme {
                    param: raw.to_owned(),
                    schemes: self.schemes().map(str::to_owned).collect(),
                })?;

        tracing::trace!(
            scheme = reference.scheme,
            key = reference.key,
            params = %reference.params.iter().map(|(k, v)| format!("{k}: {v}")).join(", "),
            "resolving parameter",
        );
        let value = handler
            .resolve(reference.key, &reference.params)
            .await
            .map_err(|source| Error::Handler {
                scheme: reference.scheme.to_owned(),
                key: reference.key.to_owned(),
                source,
            })?;

        Ok(ResolvedParam {
            original: Value::from(raw),
            value,
            scheme: Some(reference.scheme.to_owned()),
        })
    }

    /// Resolves every [`Value`] in order, passing non-[`Value::String`]s
    /// through untouched.
    ///
    /// # Errors
    ///
    /// On the first [`Value`] failing to resolve.
    pub async fn resolve_all(&self, values: &[Value]) -> Result<Vec<ResolvedParam>, Error> {
        let mut resolved = Vec::with_capacity(values.len());
        for value in values {
            resolved.push(match value {
                Value::String(raw) => self.resolve(raw).await?,
                Value::Int(_) | Value::Double(_) | Value::Bool(_) => {
                    ResolvedParam::literal(value.clone())
                }
            });
        }
        Ok(resolved)
    }
}
