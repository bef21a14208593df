//! # ril-client
//!
//! Host side of the RIL protocol spoken by Android radio modems.
//!
//! The crate encodes outbound requests, tracks them by serial number, and
//! routes inbound records either to the request they answer (solicited) or
//! to broadcast event channels (unsolicited). Device-specific deviations
//! from the baseline protocol are expressed as [`Quirk`]s.
//!
//! ## Architecture
//!
//! - **Wire** ([`codec`], [`protocol`]): length-prefixed parcels of
//!   little-endian primitives
//! - **Decoders** ([`decoder`]): one pure function per payload layout
//! - **Routing** ([`dispatch`], [`pending`]): serial correlation and event fan-out
//! - **Quirks** ([`quirks`]): per-kind overrides layered over the baseline
//!
//! ## Example
//!
//! ```ignore
//! use ril_client::{Command, QuirkChain, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> ril_client::Result<()> {
//!     let stream = tokio::net::UnixStream::connect("/dev/socket/rild").await?;
//!     let (reader, writer) = stream.into_split();
//!     let session = SessionBuilder::new()
//!         .quirks(QuirkChain::samsung_cdma_lte())
//!         .start(reader, writer);
//!
//!     let operator = session.submit(Command::Operator).await?;
//!     println!("{:?}", operator);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod pending;
pub mod protocol;
pub mod quirks;
pub mod writer;

mod session;

pub use config::{EnvProperties, PropertySource, StaticProperties};
pub use decoder::{DecodedResponse, Generic};
pub use dispatch::{Event, EventKind, EventReceiver};
pub use error::{RadioError, Result, RilError};
pub use protocol::{Command, DialParams, RequestKind, UnsolicitedKind, UusInfo};
pub use quirks::{Quirk, QuirkChain, QuirkContext};
pub use session::{Session, SessionBuilder};
pub use writer::WriterConfig;
