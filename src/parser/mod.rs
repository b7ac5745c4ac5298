// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for parsing [Gherkin] files.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod basic;
mod document;
mod provider;

use futures::Stream;

use crate::feature::Feature;

#[doc(inline)]
pub use self::{
    basic::Basic,
    document::parse,
    provider::{FsProvider, MemoryProvider, Provider, SourceError},
};

/// Source of parsed [`Feature`]s.
pub trait Parser<I> {
    /// Output [`Stream`] of parsed [`Feature`]s.
    type Output: Stream<Item = Result<Feature>> + 'static;

    /// Parses the given `input` into a [`Stream`] of [`Feature`]s.
    fn parse(self, input: I) -> Self::Output;
}

/// Result of loading [Gherkin] files.
///
/// Parsing itself never fails, so the only errors are the ones of reading.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub type Result<T> = std::result::Result<T, SourceError>;
