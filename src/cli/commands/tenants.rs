use clap::{Arg, Command};

pub const ARG_TENANTS: &str = "tenants";
pub const ARG_DEFAULT_TENANT: &str = "default-tenant";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TENANTS)
                .short('t')
                .long("tenants")
                .help("Path to the tenants JSON file (falls back to the compiled-in set)")
                .env("VESTIBULE_TENANTS")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new(ARG_DEFAULT_TENANT)
                .long("default-tenant")
                .help("Tenant id unmatched hosts resolve to (overrides the file's default)")
                .env("VESTIBULE_DEFAULT_TENANT"),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long("request-timeout")
                .help("Upper bound in seconds for any single IAM request")
                .default_value("10")
                .env("VESTIBULE_REQUEST_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
}
