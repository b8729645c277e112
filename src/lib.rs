pub mod editor;
pub mod problem;
pub mod relay;
pub mod service;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MocktalkError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Voice service error: {0}")]
    ServiceError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

}

impl From<reqwest::Error> for MocktalkError {
    fn from(e: reqwest::Error) -> Self {
        MocktalkError::ConnectionError(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for MocktalkError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        MocktalkError::TransportError(e.to_string())
    }
}

impl MocktalkError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Missing credentials never fix themselves
            MocktalkError::ConfigError(_) => false,
            // The user can press Start again
            MocktalkError::ConnectionError(_) => true,
            MocktalkError::ServiceError(_) => true,
            MocktalkError::TransportError(_) => true,
            // The relay task is gone
            MocktalkError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            MocktalkError::ConfigError(_) => {
                "Voice assistant is not configured. Set VAPI_API_KEY and VAPI_ASSISTANT_ID.".to_string()
            }
            MocktalkError::ConnectionError(_) => {
                "Could not start the interview call. Please try again.".to_string()
            }
            MocktalkError::ServiceError(_) => {
                "The voice assistant reported an error.".to_string()
            }
            MocktalkError::TransportError(_) => {
                "Connection to the voice assistant was interrupted.".to_string()
            }
            MocktalkError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MocktalkError>;
