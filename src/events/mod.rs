//! # Events Module
//!
//! Reacts to playback lifecycle events coming from the audio engine.
//!
//! [`reactor::EventReactor`] receives one [`envelope::EventEnvelope`] per
//! engine event and drives the rest of the module:
//!
//! - [`notifier`] keeps a single live "Now Playing" message per guild and
//!   sends one-shot status embeds
//! - [`autoplay`] continues playback when the queue runs dry
//! - [`presence`] republishes the bot presence
//! - [`bus`] carries typed domain events to whoever listens
//!
//! Failures never leave the reactor; they end up in the log or in the
//! guild's notification channel.

pub mod autoplay;
pub mod bus;
pub mod envelope;
pub mod notifier;
pub mod presence;
pub mod reactor;

#[cfg(test)]
pub mod testing;
