use std::{
    env,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use clap_serde_derive::{
    clap::{self, Parser, ValueEnum},
    serde::{Deserialize, Serialize},
    ClapSerde,
};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use expand_tilde::ExpandTilde;
use log::LevelFilter;

const APP_VERSION: &str = env!("KEYRING_UNLOCK_BUILD_VERSION");

fn default_config_path() -> PathBuf {
    let config_dir = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| PathBuf::from("~/.config").expand_tilde_owned().ok())
        .unwrap_or_default();

    config_dir
        .join(env!("CARGO_PKG_NAME"))
        .join(concat!(env!("CARGO_PKG_NAME"), ".toml"))
}

/// Reads the keyring password from standard input and unlocks the login
/// keyring through the daemon's control socket.
#[derive(Parser)]
#[command(author, version = APP_VERSION, about)]
pub struct Args {
    /// Config file
    #[arg(short, long = "config", default_value_os_t = default_config_path())]
    pub config_path: PathBuf,

    /// Config from file or args
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Clone, Debug)]
pub struct Config {
    /// Log level
    #[default(LogLevel::Warn)]
    #[arg(long, value_enum)]
    pub log_level: LogLevel,

    /// Optional log file (logs to standard error, otherwise)
    #[arg(long, num_args = 1)]
    pub log_file: Option<PathBuf>,

    /// Control socket to use instead of looking it up in the environment
    #[arg(long = "control-socket", short = 's', num_args = 1)]
    pub control_socket: Option<PathBuf>,

    /// Seconds to wait on each send and receive (0 waits forever)
    #[default(0u64)]
    #[arg(long)]
    pub timeout_secs: u64,
}

impl Config {
    /// Merge the config file at `config_path`, if any, under the command line
    pub fn load(config_path: &Path, mut config_opt: <Config as ClapSerde>::Opt) -> EyreResult<Self> {
        let mut config = if let Ok(mut f) = File::open(config_path) {
            let mut config_text = String::new();
            f.read_to_string(&mut config_text)?;
            let file_config = toml::from_str::<<Config as ClapSerde>::Opt>(&config_text)
                .wrap_err_with(|| format!("invalid config file {}", config_path.display()))?;
            Config::from(file_config).merge(&mut config_opt)
        } else {
            Config::from(&mut config_opt)
        };

        config.log_file = config
            .log_file
            .map(|p| p.expand_tilde_owned())
            .transpose()?;
        config.control_socket = config
            .control_socket
            .map(|p| p.expand_tilde_owned())
            .transpose()?;

        Ok(config)
    }

    /// Deadline for socket I/O, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    #[value(hide = true)]
    Trace = 5,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    fn load(argv: &[&str], config_path: &Path) -> Config {
        let args = Args::try_parse_from(argv).unwrap();
        Config::load(config_path, args.config).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = load(&["keyring-unlock"], &dir.path().join("missing.toml"));

        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_file, None);
        assert_eq!(config.control_socket, None);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_config_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring-unlock.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\ntimeout_secs = 3\ncontrol_socket = \"/run/user/1000/keyring/control\"\n",
        )
        .unwrap();

        let config = load(&["keyring-unlock"], &path);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(
            config.control_socket,
            Some(PathBuf::from("/run/user/1000/keyring/control"))
        );
    }

    #[test]
    fn test_command_line_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring-unlock.toml");
        fs::write(&path, "timeout_secs = 3\n").unwrap();

        let config = load(&["keyring-unlock", "--timeout-secs", "7"], &path);
        assert_eq!(config.timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring-unlock.toml");
        fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();

        let args = Args::try_parse_from(["keyring-unlock"]).unwrap();
        let Err(err) = Config::load(&path, args.config) else {
            panic!("config with a string timeout was accepted");
        };
        assert!(err.to_string().starts_with("invalid config file"));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
    }
}
