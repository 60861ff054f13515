//! Snapshot and restore of component state.

use crate::error::Error;

/// Trait implemented by components whose internal state can be
/// captured into a flat byte buffer and later restored from it.
///
/// The buffers are internal to the crate and carry no framing or
/// versioning, the embedder is expected to treat them as opaque.
pub trait StateComponent {
    fn state(&self) -> Result<Vec<u8>, Error>;
    fn set_state(&mut self, data: &[u8]) -> Result<(), Error>;
}
