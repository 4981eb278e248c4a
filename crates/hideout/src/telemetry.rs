//! Log output setup.
//!
//! Every crate in the workspace emits `tracing` events with `room_id` and
//! `user_id` fields. This installs a formatting subscriber for them.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` applies, for
/// example `"info"` or `"hideout_room=debug,info"`. Calling this twice is
/// harmless: the second call keeps the first subscriber and returns
/// `false`.
pub fn init(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(default_directive, "telemetry initialised");
    }
    installed
}
