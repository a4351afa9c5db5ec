pub mod common;
pub mod configs;
pub mod engine;
pub mod playback;
pub mod protocol;
pub mod session;

pub use common::errors::EngineError;
pub use engine::{Engine, EngineHandle};
pub use playback::{PlaybackCore, PlaybackError, TrackRef, TransportState};
pub use protocol::events::PartyEvent;
