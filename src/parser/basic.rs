// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Parser`] implementation.

use std::{path::Path, vec};

use futures::stream;

use super::{parse, FsProvider, Parser, Provider, Result, SourceError};
use crate::feature::Feature;

/// Default [`Parser`], reading documents through a [`Provider`].
///
/// Roots that don't exist are logged and skipped, so a run over them ends up
/// with no [`Feature`]s at all rather than with an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic<P = FsProvider> {
    provider: P,
}

impl<P> Basic<P> {
    /// Creates a new [`Basic`] [`Parser`] over the given [`Provider`].
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns the [`Provider`] of this [`Parser`].
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> Basic<P> {
    /// Loads and parses every document under the given `root`.
    fn load(&self, root: &Path) -> Vec<Result<Feature>> {
        let ids = match self.provider.list(root) {
            Ok(ids) => ids,
            Err(SourceError::NotFound(path)) => {
                tracing::warn!(root = %path.display(), "no documents found");
                return Vec::new();
            }
            Err(e) => return vec![Err(e)],
        };
        tracing::debug!(root = %root.display(), count = ids.len(), "listed documents");

        ids.into_iter()
            .map(|id| {
                let text = self.provider.read(&id)?;
                Ok(parse(&text, Some(&id)))
            })
            .collect()
    }
}

impl<P, I> Parser<I> for Basic<P>
where
    P: Provider,
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    type Output = stream::Iter<vec::IntoIter<Result<Feature>>>;

    fn parse(self, roots: I) -> Self::Output {
        let features = roots
            .into_iter()
            .flat_map(|root| self.load(root.as_ref()))
            .collect::<Vec<_>>();
        stream::iter(features)
    }
}
