use thiserror::Error;

/// RoboCom unified error type
#[derive(Error, Debug)]
pub enum ComError {
    #[error("setup error: {message}")]
    Setup { message: String },

    #[error("connection error: {message}")]
    Connection { message: String },

    #[error("communication error: {message}")]
    Communication { message: String },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Malformed-frame faults raised by the codec.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown message discriminant 0x{0:02x}")]
    UnknownDiscriminant(u8),

    #[error("frame truncated: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    #[error("text serialization failed: {0}")]
    Text(String),
}

pub type ComResult<T> = Result<T, ComError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ComError::Setup {
            message: "could not bind port 5544".to_string(),
        };
        assert!(err.to_string().contains("setup error"));
        assert!(err.to_string().contains("5544"));
    }

    #[test]
    fn test_protocol_error_conversion() {
        let err: ComError = ProtocolError::UnknownDiscriminant(0xab).into();
        assert!(err.to_string().contains("0xab"));
    }

    #[test]
    fn test_truncated_display() {
        let err = ProtocolError::Truncated { needed: 9, got: 4 };
        assert_eq!(err.to_string(), "frame truncated: needed 9 bytes, got 4");
    }
}
