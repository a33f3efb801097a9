use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViaToolError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no zone selected")]
    NoZoneSelected,

    #[error("{0} zones selected, expected exactly one")]
    AmbiguousZoneSelection(usize),

    #[error("no zone matches '{0}'")]
    ZoneNotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("net '{0}' not found in net list")]
    NetNotFound(String),

    #[error("{item}: {reason}")]
    ItemAccess { item: String, reason: String },
}

impl ViaToolError {
    /// Errors caused by what the user asked for rather than by the board or the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ViaToolError::NoZoneSelected
                | ViaToolError::AmbiguousZoneSelection(_)
                | ViaToolError::ZoneNotFound(_)
                | ViaToolError::InvalidParameters(_)
                | ViaToolError::NetNotFound(_)
        )
    }
}
