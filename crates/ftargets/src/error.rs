use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read constants file '{path}'")]
    ReadConstants {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse constants file '{path}'")]
    ParseConstants {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Constants file '{0}' must contain a JSON object")]
    ConstantsNotObject(PathBuf),

    #[error("Constant '{0}' is an object, which filters cannot compare against")]
    UnsupportedConstant(String),

    #[error("Invalid constant definition '{0}' (expected NAME=VALUE)")]
    InvalidDefine(String),

    #[error("Invalid filter: {0}")]
    Filter(#[from] filter_expr::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
