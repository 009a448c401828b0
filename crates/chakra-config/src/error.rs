/// Failure modes surfaced by this crate (spec §7 `ConfigError`).
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Couldn't read a config file at the given path.
    Io(String, String),
    /// Layer `index` failed to parse as YAML.
    InvalidYaml(usize, String),
    /// `--params` was not valid JSON, or not a JSON object.
    InvalidParams(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, reason) => write!(f, "failed to read config file '{path}': {reason}"),
            Self::InvalidYaml(index, reason) => write!(f, "config layer {index} is not valid YAML: {reason}"),
            Self::InvalidParams(reason) => write!(f, "--params is not valid: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
