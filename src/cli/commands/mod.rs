pub mod logging;
pub mod tenants;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("vestibule")
        .about("Multi-tenant login portal")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("VESTIBULE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = tenants::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "vestibule");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Multi-tenant login portal".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_tenants() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "vestibule",
            "--port",
            "8080",
            "--tenants",
            "/etc/vestibule/tenants.json",
            "--default-tenant",
            "hanzo",
            "--request-timeout",
            "30",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<PathBuf>(tenants::ARG_TENANTS).cloned(),
            Some(PathBuf::from("/etc/vestibule/tenants.json"))
        );
        assert_eq!(
            matches
                .get_one::<String>(tenants::ARG_DEFAULT_TENANT)
                .cloned(),
            Some("hanzo".to_string())
        );
        assert_eq!(
            matches
                .get_one::<u64>(tenants::ARG_REQUEST_TIMEOUT)
                .copied(),
            Some(30)
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("VESTIBULE_PORT", Some("443")),
                ("VESTIBULE_TENANTS", Some("/etc/vestibule/tenants.json")),
                ("VESTIBULE_DEFAULT_TENANT", Some("pars")),
                ("VESTIBULE_REQUEST_TIMEOUT", Some("5")),
                ("VESTIBULE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["vestibule"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<PathBuf>(tenants::ARG_TENANTS).cloned(),
                    Some(PathBuf::from("/etc/vestibule/tenants.json"))
                );
                assert_eq!(
                    matches
                        .get_one::<String>(tenants::ARG_DEFAULT_TENANT)
                        .cloned(),
                    Some("pars".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(tenants::ARG_REQUEST_TIMEOUT)
                        .copied(),
                    Some(5)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("VESTIBULE_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["vestibule"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("VESTIBULE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["vestibule".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();
                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_request_timeout_bounds() {
        let command = new();
        let result = command
            .clone()
            .try_get_matches_from(vec!["vestibule", "--request-timeout", "0"]);
        assert!(result.is_err());

        let result = command.try_get_matches_from(vec!["vestibule", "--request-timeout", "301"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_args_fail() {
        let command = new();
        let result = command.try_get_matches_from(vec!["vestibule", "--dsn", "postgres://nope"]);
        assert_eq!(
            result.map_err(|e| e.kind()),
            Err(clap::error::ErrorKind::UnknownArgument)
        );
    }
}
