//! # Audio Module
//!
//! Per-guild playback state and the transport seam to the audio engine.
//!
//! ## Architecture
//!
//! ### [`session`] - Sessions
//! - One [`session::Session`] per guild, each behind its own lock
//! - Scratch store with the previous/current track and the notify message
//! - Skip votes, play-lock and disconnected flags
//!
//! ### [`error_counter`] - Error Escalation
//! - Consecutive TrackException/TrackStuck counting
//! - Quiet-window reset and early-exit signal
//!
//! ### [`engine`] - Playback Engine
//! - [`engine::PlaybackEngine`] trait used by the event reactor
//! - Songbird implementation on top of the builtin queue
//!
//! ### [`track`] / [`equalizer`]
//! - Typed track metadata and duration formatting
//! - Equalizer snapshot persisted across forced disconnects

pub mod engine;
pub mod equalizer;
pub mod error_counter;
pub mod session;
pub mod track;
