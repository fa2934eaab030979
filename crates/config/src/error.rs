use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the settings file failed.
    Io { path: PathBuf, message: String },
    /// The settings file is not valid JSON for `Settings`.
    Parse { path: PathBuf, message: String },
    /// Settings could not be serialized.
    Serialize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "{}: cannot parse settings: {message}", path.display())
            }
            Self::Serialize(msg) => write!(f, "cannot serialize settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
