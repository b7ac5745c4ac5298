// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime [Gherkin] execution engine.
//!
//! Turns plain-text [Gherkin] documents into executable test cases:
//! 1. [`parser`] reads documents into [`Feature`]s, expanding scenario
//!    outlines into concrete scenarios.
//! 2. [`plan::Builder`] arranges them into a [`TestPlan`].
//! 3. [`Runner`] registers the [`TestPlan`] with a test [`Framework`],
//!    matching every step line against a [`Registry`] of [`StepPattern`]s
//!    and optionally resolving `{scheme:value}` arguments with a
//!    [`Resolver`].
//! 4. [`Observer`]s receive [`event::Run`]s, which [`observer::Report`]
//!    correlates back into per-feature results even when scenarios run
//!    concurrently.
//!
//! [`Pickle`] ties all of these together.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(nonstandard_style, rustdoc::broken_intra_doc_links)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(missing_docs, unused_qualifications)]

pub mod cli;
pub mod error;
pub mod event;
pub mod feature;
pub mod framework;
pub mod observer;
pub mod parser;
pub mod pattern;
mod pickle;
pub mod plan;
pub mod runner;
pub mod scheme;
pub mod step;
pub mod tag;

#[doc(inline)]
pub use gherkin;

#[doc(inline)]
pub use self::{
    event::Event,
    feature::Feature,
    framework::Collected,
    observer::Observer,
    parser::Parser,
    pattern::{ParamKind, StepPattern, Value},
    pickle::Pickle,
    plan::TestPlan,
    runner::{Failure, Framework, Runner, World},
    scheme::Resolver,
    step::Registry,
};
