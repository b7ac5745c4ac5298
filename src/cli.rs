// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options.
//!
//! [`Opts`] can be extended with custom options via its `Custom` type
//! parameter:
//!
//! ```rust
//! # use clap::Parser as _;
//! #[derive(clap::Args, Clone, Debug)]
//! struct CustomOpts {
//!     /// Base URL of the service under test.
//!     #[arg(long)]
//!     base_url: Option<String>,
//! }
//!
//! let opts = pickle::cli::Opts::<CustomOpts>::try_parse_from([
//!     "pickle", "--wip", "--base-url", "http://localhost",
//! ])
//! .unwrap();
//! assert!(opts.wip);
//! assert_eq!(opts.custom.base_url.as_deref(), Some("http://localhost"));
//! ```

use std::path::PathBuf;

use clap::Args;
use gherkin::tagexpr::TagOperation;
use regex::Regex;

use crate::{
    plan::{self, Mode},
    runner::Config,
};

/// Root CLI (command line interface) of a top-level [`Pickle`] executor.
///
/// [`Pickle`]: crate::Pickle
#[derive(clap::Parser, Clone, Debug, Default)]
#[command(name = "pickle", about = "Run the Gherkin scenarios.")]
pub struct Opts<Custom = Empty>
where
    Custom: Args,
{
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name",
        global = true
    )]
    pub re_filter: Option<Regex>,

    /// Tag expression to filter scenarios by.
    ///
    /// Note: Tags from Feature and Scenario are merged together on
    /// filtering.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        conflicts_with = "name",
        global = true
    )]
    pub tags_filter: Option<TagOperation>,

    /// Run work-in-progress scenarios too.
    #[arg(long, global = true)]
    pub wip: bool,

    /// Shape of the test plan: one group per feature, or features nested
    /// into groups per directory.
    #[arg(long, value_name = "mode", value_enum, default_value_t = Mode::Flat, global = true)]
    pub plan_mode: Mode,

    /// Directory the tree plan groups are relative to.
    #[arg(long, value_name = "dir", global = true)]
    pub root: Option<PathBuf>,

    /// Additional custom CLI options.
    #[command(flatten)]
    pub custom: Custom,
}

impl<Custom: Args> Opts<Custom> {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the
    /// trait being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Merges these [`Opts`] onto the given [`Config`].
    ///
    /// Only options actually given override the [`Config`].
    #[must_use]
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(re) = &self.re_filter {
            config.name_filter = Some(re.clone());
        }
        if let Some(op) = &self.tags_filter {
            config.tags_filter = Some(op.clone());
        }
        if self.wip {
            config.run_wip = true;
        }
        config
    }

    /// Returns the [`plan::Builder`] these [`Opts`] describe.
    #[must_use]
    pub fn plan_builder(&self) -> plan::Builder {
        let builder = plan::Builder::new().mode(self.plan_mode);
        match &self.root {
            Some(root) => builder.root(root.clone()),
            None => builder,
        }
    }
}

/// Empty CLI options.
#[derive(Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Empty;
