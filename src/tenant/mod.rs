//! Tenant resolution: one immutable [`TenantConfig`] per hostname.
//!
//! The set of known tenants is fixed at process start, either from the
//! compiled-in defaults or from a JSON file passed on the command line.
//! Resolution is a pure lookup: tenants are checked in registration order and
//! the first whose domain fragments match the host wins; unmatched hosts fall
//! back to the designated default tenant, so resolution is total over all
//! strings.

use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use utoipa::ToSchema;

/// Color palette handed to the rendering surface.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background: String,
    pub surface: String,
    pub primary: String,
    pub primary_hover: String,
    pub text: String,
    pub text_muted: String,
    pub border: String,
    pub border_focus: String,
}

/// Upstream identity providers the IAM can complete an OAuth dance against.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Github,
    Google,
    Facebook,
    Apple,
    Wallet,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SocialProvider {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub label: String,
}

/// Immutable per-tenant configuration record.
///
/// `client_secret` is deserialized from the tenants file but never serialized,
/// so the `/api/tenant` endpoint cannot leak it.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub id: String,
    pub name: String,
    pub display_name: String,
    /// Domain fragments matched as substrings against the request host.
    pub domains: Vec<String>,

    pub iam_url: String,
    pub client_id: String,
    #[serde(skip_serializing, default)]
    #[schema(value_type = Option<String>)]
    pub client_secret: Option<SecretString>,
    pub organization_name: String,
    pub application_name: String,

    pub logo_path: String,
    pub favicon_path: String,
    pub theme: Theme,
    #[serde(default)]
    pub tagline: Option<String>,

    #[serde(default)]
    pub enable_signup: bool,
    #[serde(default)]
    pub enable_password_login: bool,
    #[serde(default)]
    pub enable_code_login: bool,
    #[serde(default)]
    pub enable_webauthn: bool,
    #[serde(default)]
    pub enable_face_id: bool,
    #[serde(default)]
    pub enable_wallet: bool,
    #[serde(default)]
    pub social_providers: Vec<SocialProvider>,

    pub homepage_url: String,
    #[serde(default)]
    pub terms_url: Option<String>,
    #[serde(default)]
    pub privacy_url: Option<String>,
}

impl TenantConfig {
    /// Look up a configured social provider by id.
    #[must_use]
    pub fn social_provider(&self, id: &str) -> Option<&SocialProvider> {
        self.social_providers.iter().find(|p| p.id == id)
    }
}

/// On-disk shape of the tenants file.
#[derive(Deserialize, Debug)]
struct TenantsFile {
    default: String,
    tenants: Vec<TenantConfig>,
}

/// Priority-ordered tenant set with a guaranteed default.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    tenants: Vec<TenantConfig>,
    default: usize,
}

impl TenantRegistry {
    /// Build a registry from an ordered tenant list and the id of the default.
    ///
    /// # Errors
    /// Returns an error if the list is empty, ids collide, or the default id
    /// is not in the list.
    pub fn new(mut tenants: Vec<TenantConfig>, default_id: &str) -> Result<Self> {
        if tenants.is_empty() {
            return Err(anyhow!("tenant registry must contain at least one tenant"));
        }

        // Hosts are lowercased before matching, so fragments must be too.
        for tenant in &mut tenants {
            for domain in &mut tenant.domains {
                *domain = domain.to_lowercase();
            }
        }

        for (index, tenant) in tenants.iter().enumerate() {
            if tenants[..index].iter().any(|t| t.id == tenant.id) {
                return Err(anyhow!("duplicate tenant id: {}", tenant.id));
            }
        }

        let default = tenants
            .iter()
            .position(|t| t.id == default_id)
            .ok_or_else(|| anyhow!("default tenant not found: {default_id}"))?;

        Ok(Self { tenants, default })
    }

    /// Parse a registry from the JSON tenants file format.
    ///
    /// # Errors
    /// Returns an error on malformed JSON or an invalid tenant set.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TenantsFile = serde_json::from_str(json).context("invalid tenants JSON")?;
        Self::new(file.tenants, &file.default)
    }

    /// Load a registry from a JSON file on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read tenants file: {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Re-point the default tenant, keeping the resolution order intact.
    ///
    /// # Errors
    /// Returns an error if no tenant carries the given id.
    pub fn with_default(mut self, default_id: &str) -> Result<Self> {
        self.default = self
            .tenants
            .iter()
            .position(|t| t.id == default_id)
            .ok_or_else(|| anyhow!("default tenant not found: {default_id}"))?;
        Ok(self)
    }

    /// Map a request host to its tenant.
    ///
    /// The host may include a port. Tenants are checked in registration
    /// order, each against its domain fragments in order; the first substring
    /// match wins. Fragments are not guaranteed disjoint, so the order is
    /// part of the contract. Unmatched hosts resolve to the default tenant.
    #[must_use]
    pub fn resolve(&self, host: &str) -> &TenantConfig {
        let host = host.to_lowercase();
        self.tenants
            .iter()
            .find(|tenant| tenant.domains.iter().any(|d| host.contains(d.as_str())))
            .unwrap_or(&self.tenants[self.default])
    }

    #[must_use]
    pub fn default_tenant(&self) -> &TenantConfig {
        &self.tenants[self.default]
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TenantConfig> {
        self.tenants.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    /// Compiled-in tenant set used when no tenants file is given.
    #[must_use]
    pub fn builtin() -> Self {
        let dark = Theme {
            background: "#050508".to_string(),
            surface: "#0c0c10".to_string(),
            primary: "#ffffff".to_string(),
            primary_hover: "#e5e5e5".to_string(),
            text: "#ffffff".to_string(),
            text_muted: "#666666".to_string(),
            border: "#222222".to_string(),
            border_focus: "#444444".to_string(),
        };

        let lux = TenantConfig {
            id: "lux".to_string(),
            name: "lux".to_string(),
            display_name: "Lux".to_string(),
            domains: vec!["lux.id".to_string()],
            iam_url: "https://iam.hanzo.ai".to_string(),
            client_id: "lux-app-client-id".to_string(),
            client_secret: None,
            organization_name: "lux".to_string(),
            application_name: "lux-app".to_string(),
            logo_path: "/logos/lux.svg".to_string(),
            favicon_path: "/favicons/lux.svg".to_string(),
            theme: dark.clone(),
            tagline: Some("Blockchain Identity".to_string()),
            enable_signup: true,
            enable_password_login: true,
            enable_code_login: true,
            enable_webauthn: true,
            enable_face_id: true,
            enable_wallet: true,
            social_providers: vec![SocialProvider {
                id: "github".to_string(),
                kind: ProviderKind::Github,
                label: "GitHub".to_string(),
            }],
            homepage_url: "https://lux.network".to_string(),
            terms_url: Some("https://lux.network/terms".to_string()),
            privacy_url: Some("https://lux.network/privacy".to_string()),
        };

        let pars = TenantConfig {
            id: "pars".to_string(),
            name: "pars".to_string(),
            display_name: "Pars".to_string(),
            domains: vec!["pars.id".to_string()],
            iam_url: "https://iam.hanzo.ai".to_string(),
            client_id: "pars-app-client-id".to_string(),
            client_secret: None,
            organization_name: "pars".to_string(),
            application_name: "pars-app".to_string(),
            logo_path: "/logos/pars.svg".to_string(),
            favicon_path: "/favicons/pars.svg".to_string(),
            theme: dark,
            tagline: Some("Global Persian Network".to_string()),
            enable_signup: true,
            enable_password_login: true,
            enable_code_login: true,
            enable_webauthn: true,
            enable_face_id: false,
            enable_wallet: false,
            social_providers: vec![
                SocialProvider {
                    id: "google".to_string(),
                    kind: ProviderKind::Google,
                    label: "Google".to_string(),
                },
                SocialProvider {
                    id: "facebook".to_string(),
                    kind: ProviderKind::Facebook,
                    label: "Facebook".to_string(),
                },
            ],
            homepage_url: "https://pars.id".to_string(),
            terms_url: Some("https://pars.id/terms".to_string()),
            privacy_url: Some("https://pars.id/privacy".to_string()),
        };

        let hanzo = TenantConfig {
            id: "hanzo".to_string(),
            name: "hanzo".to_string(),
            display_name: "Hanzo".to_string(),
            domains: vec!["hanzo.ai".to_string()],
            iam_url: "https://iam.hanzo.ai".to_string(),
            client_id: "hanzo-app-client-id".to_string(),
            client_secret: None,
            organization_name: "hanzo".to_string(),
            application_name: "hanzo-app".to_string(),
            logo_path: "/logos/hanzo.svg".to_string(),
            favicon_path: "/favicons/hanzo.svg".to_string(),
            theme: Theme {
                background: "#0a0a0f".to_string(),
                surface: "#141419".to_string(),
                primary: "#ffffff".to_string(),
                primary_hover: "#e5e5e5".to_string(),
                text: "#ffffff".to_string(),
                text_muted: "#888888".to_string(),
                border: "#333333".to_string(),
                border_focus: "#555555".to_string(),
            },
            tagline: None,
            enable_signup: true,
            enable_password_login: true,
            enable_code_login: true,
            enable_webauthn: true,
            enable_face_id: true,
            enable_wallet: true,
            social_providers: vec![
                SocialProvider {
                    id: "github".to_string(),
                    kind: ProviderKind::Github,
                    label: "GitHub".to_string(),
                },
                SocialProvider {
                    id: "google".to_string(),
                    kind: ProviderKind::Google,
                    label: "Google".to_string(),
                },
            ],
            homepage_url: "https://hanzo.ai".to_string(),
            terms_url: Some("https://hanzo.ai/terms".to_string()),
            privacy_url: Some("https://hanzo.ai/privacy".to_string()),
        };

        // Resolution priority: lux, pars, then the default catch-all.
        Self {
            tenants: vec![lux, pars, hanzo],
            default: 2,
        }
    }
}
