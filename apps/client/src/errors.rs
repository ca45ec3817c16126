use thiserror::Error;

/// Failures talking to the prediction service.
///
/// Handlers never propagate these: each one is turned into a bot message in the
/// transcript. The `Display` text is what the user ends up reading.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status. `message` is the server's `error` field, if any.
    #[error("{}", describe_server_error(.status, .message))]
    Server { status: u16, message: Option<String> },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::MalformedResponse(e.to_string())
    }
}

fn describe_server_error(status: &u16, message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => format!("HTTP error! status: {status}"),
    }
}

/// Failures producing the downloadable report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}
