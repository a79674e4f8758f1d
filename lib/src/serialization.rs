//! Serialization of fitted parameters.
//!
//! Fitted components expose their learned state as a plain parameter struct
//! (vectors, scalars, node arrays) which is then encoded with `bincode`.
//! Nothing runtime-specific ever reaches the byte stream.

use crate::error::PipelineError;
use std::error::Error;
use std::path::Path;

/// A parameter representation that can be serialized to and from bytes.
///
/// Implementors should contain only plain data, never handles or caches.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Write `params` to `path` as bincode.
pub fn save_params<T, P>(params: &T, path: P) -> Result<(), PipelineError>
where
    T: SerializableParams<Error = bincode::Error>,
    P: AsRef<Path>,
{
    let bytes = params.to_bytes()?;
    std::fs::write(path.as_ref(), bytes).map_err(|e| {
        PipelineError::Io(format!("cannot write {}: {}", path.as_ref().display(), e))
    })
}

/// Read parameters previously written by [`save_params`].
pub fn load_params<T, P>(path: P) -> Result<T, PipelineError>
where
    T: SerializableParams<Error = bincode::Error>,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path.as_ref()).map_err(|e| {
        PipelineError::Io(format!("cannot read {}: {}", path.as_ref().display(), e))
    })?;
    Ok(T::from_bytes(&bytes)?)
}
