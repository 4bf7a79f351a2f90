use serde::Serialize;

/// Kind of filesystem change reported to viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEventKind {
    Add,
    Change,
    Unlink,
    Error,
}

/// Messages pushed from the server to connected viewers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GatewayMessage {
    FileEvent {
        event: FileEventKind,
        filename: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl GatewayMessage {
    pub fn file_event(event: FileEventKind, filename: impl Into<String>) -> Self {
        Self::FileEvent {
            event,
            filename: filename.into(),
            message: None,
        }
    }

    pub fn watch_error(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileEvent {
            event: FileEventKind::Error,
            filename: filename.into(),
            message: Some(message.into()),
        }
    }
}
