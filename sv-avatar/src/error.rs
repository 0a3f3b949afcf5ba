use thiserror::Error;

/// Why a texture request was rejected.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unexpected {kind} size {width}x{height}")]
    UnexpectedSize {
        kind: &'static str,
        width: u32,
        height: u32,
    },
    #[error("texture worker failed: {0}")]
    Worker(String),
    #[error("failed to start texture runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("model was disposed before its texture arrived")]
    Released,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
