//! # Vestibule (Multi-tenant Login Portal)
//!
//! `vestibule` is a hostname-branded login/signup portal that delegates all
//! real authentication to an external OAuth2/OIDC identity backend (the IAM).
//! It owns two things:
//!
//! - **Tenant resolution:** every request's `Host` header maps to exactly one
//!   immutable [`tenant::TenantConfig`] (branding, feature flags, IAM
//!   endpoint, OAuth client credentials). Matching is substring-based over
//!   registered domain fragments, checked in a fixed priority order with a
//!   guaranteed fallback to the default tenant.
//! - **Credential exchange:** signup, password/code login, social-provider
//!   OAuth entry, and wallet-signature login are translated into a handful of
//!   REST calls against the tenant's IAM and finish in a browser redirect
//!   carrying a bearer token, a wallet linkage, or an authorize-endpoint URL.
//!
//! The portal holds no state of its own: no database, no sessions, no retry
//! queues. Every failure is surfaced as a single human-readable message and
//! recovered by resubmitting the form.

pub mod api;
pub mod cli;
pub mod flow;
pub mod tenant;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
