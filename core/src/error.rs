use thiserror::Error;

use crate::navmesh::GroupId;

/// Errors raised by the viewer core.
///
/// None of these are fatal to the viewer: callers log them and keep the previous state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No zone has been registered under this name.
    #[error("zone `{0}` is not registered")]
    UnknownZone(String),

    /// The zone exists but has no group with this id.
    #[error("zone `{zone}` has no group {group}")]
    UnknownGroup { zone: String, group: GroupId },

    /// Navigation or collision geometry could not be used.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Exhibit index outside the gallery.
    #[error("exhibit {index} out of range (gallery has {len})")]
    UnknownExhibit { index: usize, len: usize },

    /// Reading the configuration file failed.
    #[error("failed to read config `{path}`: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::ViewerConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
