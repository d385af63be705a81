//! Links connecting pipeline stages.
//!
//! ## Link Types
//!
//! - [`LocalLink`]: bounded single-producer/single-consumer channel (kanal)
//!   carrying items followed by one in-band end-of-stream [`Message::Eos`]
//! - [`oneshot()`]: single-value result handoff ([`ResultPromise`] /
//!   [`ResultFuture`]) from the last stage back to the caller

mod local;
mod oneshot;

pub use local::{LocalLink, LocalReceiver, LocalSender, Message};
pub use oneshot::{ResultFuture, ResultPromise, oneshot};
