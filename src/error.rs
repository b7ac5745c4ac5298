// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! All the errors of this crate in one place.
//!
//! | Error                  | Raised when                                        |
//! |------------------------|----------------------------------------------------|
//! | [`PatternError`]       | a placeholder value doesn't convert to its kind     |
//! | [`SchemeError`]        | a `{scheme:value}` parameter fails to resolve       |
//! | [`SourceError`]        | a document cannot be listed or read                 |
//! | [`Failure`]            | a test fails, as signalled to the [`Framework`]     |
//!
//! [`Framework`]: crate::runner::Framework

#[doc(inline)]
pub use crate::{
    feature::UnknownKeyword,
    parser::SourceError,
    pattern::Error as PatternError,
    runner::Failure,
    scheme::Error as SchemeError,
};
