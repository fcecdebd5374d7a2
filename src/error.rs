pub type FramestepResult<T> = Result<T, FramestepError>;

#[derive(thiserror::Error, Debug)]
pub enum FramestepError {
    #[error("unknown render step: \"{0}\"")]
    UnknownStep(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramestepError {
    pub fn unknown_step(name: impl Into<String>) -> Self {
        Self::UnknownStep(name.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
