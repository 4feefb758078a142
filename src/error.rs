use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("operation on protected path not allowed: {0}")]
    ProtectedPath(String),

    #[error("{0}")]
    General(String),
}

impl AppError {
    /// Heading used when the error is shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "Invalid Path",
            Self::NotADirectory(_) => "Not a Directory",
            _ => "Error",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
