//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the portal server with its tenant configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::tenants;
use anyhow::Result;
use std::{path::PathBuf, time::Duration};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let tenants_path = matches.get_one::<PathBuf>(tenants::ARG_TENANTS).cloned();

    let default_tenant = matches
        .get_one::<String>(tenants::ARG_DEFAULT_TENANT)
        .cloned();

    let request_timeout = matches
        .get_one::<u64>(tenants::ARG_REQUEST_TIMEOUT)
        .copied()
        .map_or(crate::flow::DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

    Ok(Action::Server(Args {
        port,
        tenants_path,
        default_tenant,
        request_timeout,
    }))
}
