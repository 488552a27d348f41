pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to '{url}' timed out{}", if *.offline { " (host appears offline)" } else { "" })]
    Timeout { url: String, offline: bool },

    #[error("host appears offline")]
    Offline,

    #[error("request to '{url}' failed: {source}")]
    WebRequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download from '{url}' failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("no space left on device while downloading '{url}'")]
    DiskFull { url: String },

    #[error("download cancelled")]
    Cancelled,
}
