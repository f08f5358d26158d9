//! # Real-Time Module
//!
//! Live result delivery for the facade.
//!
//! ## Architecture
//!
//! - **Listener** (store side): unbounded snapshot channel plus a release
//!   hook, see [`crate::client::Listener`]
//! - **Subscription** (caller side): cold, cancellable `Stream` wrapping a
//!   listener that is only opened on first poll

pub mod subscription;

pub use subscription::Subscription;
