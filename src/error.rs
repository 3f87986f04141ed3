use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("not authenticated")]
    Unauthenticated,

    #[error("not a member of room {0}")]
    NotAMember(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

impl AppError {
    /// Wire-level error code reported to the acting client.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::NotAMember(_) => "not_a_member",
            AppError::RoomNotFound(_) => "room_not_found",
            AppError::InvalidEvent(_) => "invalid_event",
            AppError::Config(_) | AppError::StartServer(_) => "internal",
        }
    }
}
