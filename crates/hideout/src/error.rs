//! Unified error type for Hideout.

use hideout_protocol::ProtocolError;
use hideout_room::RoomError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum HideoutError {
    /// Encoding or decoding a notice failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A membership or room-availability error.
    #[error(transparent)]
    Room(#[from] RoomError),
}
