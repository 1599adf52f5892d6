use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// No DOM element with the configured container id.
    MissingContainer(String),
    Config(ConfigError),
    Graphics(String),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::MissingContainer(id) => write!(f, "container element `#{id}` not found"),
            ViewerError::Config(err) => write!(f, "{err}"),
            ViewerError::Graphics(msg) => write!(f, "graphics init failed: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ViewerError {
    fn from(err: ConfigError) -> Self {
        ViewerError::Config(err)
    }
}
