use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Malformed {topic} message: missing {field}")]
    MalformedMessage { topic: String, field: &'static str },

    #[error("No skill settings registered for {0}")]
    UnknownSkill(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlatformError {
    pub fn malformed(topic: &str, field: &'static str) -> Self {
        PlatformError::MalformedMessage {
            topic: topic.to_string(),
            field,
        }
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;
