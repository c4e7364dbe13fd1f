// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analysis;
pub mod categories;
pub mod clients;
pub mod goals;
pub mod months;
pub mod profile;
pub mod reports;
pub mod transactions;

use anyhow::{Context, Result};

/// Value of a required string argument.
pub(crate) fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing required argument --{}", name))
}
