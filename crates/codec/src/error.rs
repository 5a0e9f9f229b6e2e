/// Failure modes for the codec's fallible operations.
///
/// Every fallible function either succeeds fully or returns one of
/// these and leaves no allocation, refcount, or partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("serialized size would exceed the 32-bit size limit ({0} bytes)")]
    Overflow(u64),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}
