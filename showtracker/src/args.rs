use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use showtracker_config::Environment;

/// ShowTracker backend
#[derive(Debug, Parser)]
#[command(name = "showtracker", about = "Personal movie and TV library backed by TMDb")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "showtracker.toml", env = "SHOWTRACKER_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SHOWTRACKER_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the execution mode (development, test, production)
    #[arg(long, env = "SHOWTRACKER_ENV")]
    pub environment: Option<Environment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse() {
        let args = Args::try_parse_from([
            "showtracker",
            "--config",
            "custom.toml",
            "--listen",
            "127.0.0.1:8080",
            "--environment",
            "Development",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("custom.toml"));
        assert_eq!(args.listen, Some(SocketAddr::from(([127, 0, 0, 1], 8080))));
        assert_eq!(args.environment, Some(Environment::Development));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Args::try_parse_from(["showtracker", "--environment", "staging"]).is_err());
    }
}
