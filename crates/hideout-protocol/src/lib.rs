//! Shared vocabulary for Hideout.
//!
//! This crate defines what the room core and the layers around it agree on:
//!
//! - **Types** ([`UserId`], [`RoomId`], [`MapId`], [`Facing`], [`Notice`],
//!   [`Recipient`], etc.): identities, positions and the notifications a
//!   room sends to its occupants.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how the session layer turns
//!   notices into bytes before framing them for a connection.
//! - **Errors** ([`ProtocolError`]).
//!
//! The room core never looks inside an encoded notice. It hands typed
//! [`Notice`] values to a per-user channel and the outer layer decides how
//! they travel.
//!
//! ```text
//! Room core (Notice) → session layer (Codec → bytes) → transport
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Appearance, EventId, Facing, GameObject, MapId, Notice, Recipient, RoomId,
    Team, UserId,
};
