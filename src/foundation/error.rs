pub type FlipResult<T> = Result<T, FlipError>;

#[derive(thiserror::Error, Debug)]
pub enum FlipError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("listener error during {event}: {source}")]
    Listener {
        event: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn listener(event: &'static str, source: anyhow::Error) -> Self {
        Self::Listener { event, source }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FlipError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(FlipError::render("x").to_string().contains("render error:"));
        assert!(FlipError::encode("x").to_string().contains("encode error:"));
        assert!(
            FlipError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn listener_error_names_the_event() {
        let err = FlipError::listener("flip_ended", anyhow::anyhow!("boom"));
        let msg = err.to_string();
        assert!(msg.contains("flip_ended"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FlipError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
