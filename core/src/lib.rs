// Herald Core Library
// Type-safe notification descriptors and self-releasing subscription tokens

pub mod center;
pub mod config;
pub mod descriptor;
pub mod envelope;
pub mod observe;
pub mod telemetry;
pub mod token;

// Export core types
pub use center::{BroadcastCenter, CenterStats, NotificationCenter, ObserverHandle, RawObserver};
pub use config::{CenterConfig, FailurePolicy};
pub use descriptor::{decode_key, decode_model, encode_model, NotificationDescriptor};
pub use envelope::{keys, Envelope, NotificationName};
pub use observe::ObserveExt;
pub use token::NotificationToken;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("Missing metadata key `{key}` on notification `{name}`")]
    MissingKey { name: NotificationName, key: String },

    #[error("Type mismatch decoding `{key}` on notification `{name}`: expected {expected}: {source}")]
    TypeMismatch {
        name: NotificationName,
        key: String,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Channel mismatch: descriptor expects `{expected}`, envelope is `{actual}`")]
    ChannelMismatch {
        expected: NotificationName,
        actual: NotificationName,
    },

    #[error("Encode error on notification `{name}`: {source}")]
    Encode {
        name: NotificationName,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, HeraldError>;
