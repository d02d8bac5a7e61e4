use serde::Serialize;

/// How a failure should be presented by the embedding UI.
///
/// `Warning` covers stale-but-valid situations (the mirror is intact and a
/// retry by the user is reasonable); `Error` covers authoritative refusals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Failure taxonomy for every storefront operation.
///
/// No variant is ever swallowed: each operation returns its error to the
/// caller, and none of them crash the session object or trigger automatic
/// retries. Re-initiating a failed call is always an explicit user action.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a usable response: the connection failed,
    /// timed out, or the body did not decode as the expected envelope.
    /// The local mirror is stale but valid.
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered but refused the operation (`success: false`).
    /// The message is the server's own, carried verbatim for display.
    #[error("{0}")]
    Rejected(String),

    /// HTTP 401 from an admin endpoint. The redirect to the login entry
    /// point is the embedding UI's side effect, not this crate's.
    #[error("authentication required")]
    AuthRequired,

    /// Client-side input validation failed before any request was sent.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// A checkout call is already outstanding; the duplicate submission
    /// was suppressed locally without reaching the server.
    #[error("checkout already in progress")]
    CheckoutInProgress,

    /// A mutation for this product id is still awaiting its response.
    #[error("operation already in flight for product {0}")]
    MutationInFlight(i64),
}

impl StoreError {
    /// Severity tag surfaced alongside the message.
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::Network(_)
            | StoreError::CheckoutInProgress
            | StoreError::MutationInFlight(_) => Severity::Warning,
            StoreError::Rejected(_) | StoreError::AuthRequired | StoreError::Invalid(_) => {
                Severity::Error
            }
        }
    }

    /// Human-readable message for display.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            StoreError::AuthRequired
        } else {
            StoreError::Network(err.to_string())
        }
    }
}
