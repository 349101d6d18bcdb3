use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}
