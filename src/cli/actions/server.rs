use crate::{api, flow::AuthClient, tenant::TenantRegistry};
use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub tenants_path: Option<PathBuf>,
    pub default_tenant: Option<String>,
    pub request_timeout: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the tenants file is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let registry = load_registry(&args)?;

    let client = AuthClient::new(args.request_timeout)?;

    api::new(args.port, registry, client).await
}

fn load_registry(args: &Args) -> Result<TenantRegistry> {
    let registry = match &args.tenants_path {
        Some(path) => {
            info!("Loading tenants from {}", path.display());
            TenantRegistry::from_path(path)?
        }
        None => {
            info!("Using compiled-in tenants");
            TenantRegistry::builtin()
        }
    };

    match &args.default_tenant {
        Some(id) => registry
            .with_default(id)
            .context("invalid --default-tenant"),
        None => Ok(registry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            tenants_path: None,
            default_tenant: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn builtin_registry_when_no_file_given() {
        let registry = load_registry(&args()).expect("registry");
        assert_eq!(registry.default_tenant().id, "hanzo");
    }

    #[test]
    fn default_tenant_override() {
        let registry = load_registry(&Args {
            default_tenant: Some("pars".to_string()),
            ..args()
        })
        .expect("registry");
        assert_eq!(registry.default_tenant().id, "pars");

        let err = load_registry(&Args {
            default_tenant: Some("nope".to_string()),
            ..args()
        });
        assert!(err.is_err());
    }

    #[test]
    fn missing_tenants_file_is_an_error() {
        let err = load_registry(&Args {
            tenants_path: Some(PathBuf::from("/nonexistent/tenants.json")),
            ..args()
        });
        assert!(err.is_err());
    }
}
