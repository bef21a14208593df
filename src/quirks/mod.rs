//! Device-specific interception of individual message kinds.
//!
//! A [`Quirk`] may claim a command before it reaches the wire, send it with
//! an alternate field layout, decode a response its own way, or drop a
//! decoded event. Every hook defaults to "not mine", so a quirk only
//! implements what it changes and everything else falls through to the
//! baseline pipeline.
//!
//! Quirks run in registration order inside a [`QuirkChain`]; the chain
//! restores the parcel cursor after each quirk that declines a payload.

mod chain;
mod dial;
mod operator;
mod registration;
mod signal_info;
mod unsupported;
mod vendor;

pub use chain::QuirkChain;
pub use dial::{ExtendedDial, DEFAULT_EMERGENCY_NUMBERS, ECC_LIST_PROPERTY};
pub use operator::{OperatorNameOverride, HOME_OPERATOR_ALPHA_PROPERTY};
pub use registration::RegistrationStateTrace;
pub use signal_info::SignalInfoToneFilter;
pub use unsupported::{UnsupportedCommands, RADIO_ACCESS_FAMILY_PROPERTY};
pub use vendor::VendorUnsolicited;

use crate::codec::{ParcelReader, ParcelWriter};
use crate::config::PropertySource;
use crate::decoder::DecodedResponse;
use crate::dispatch::Event;
use crate::error::Result;
use crate::protocol::{Command, RequestKind, UnsolicitedKind};

/// What a quirk may consult while handling a message.
#[derive(Clone, Copy)]
pub struct QuirkContext<'a> {
    pub properties: &'a dyn PropertySource,
}

impl<'a> QuirkContext<'a> {
    pub fn new(properties: &'a dyn PropertySource) -> Self {
        Self { properties }
    }
}

pub trait Quirk: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Answer `command` locally. `Some` means no wire traffic is sent.
    fn submit(
        &self,
        _command: &Command,
        _ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        None
    }

    /// Write an alternate body for `command` into `w` and return the
    /// request kind to send it under.
    ///
    /// Anything written to `w` is discarded when this returns `None`.
    fn encode(
        &self,
        _command: &Command,
        _w: &mut ParcelWriter,
        _ctx: QuirkContext<'_>,
    ) -> Option<RequestKind> {
        None
    }

    /// Decode a successful, non-empty solicited payload of `kind`.
    fn decode_solicited(
        &self,
        _kind: RequestKind,
        _r: &mut ParcelReader<'_>,
        _ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        None
    }

    /// Decode an unsolicited payload of `kind` into zero or more values.
    fn decode_unsolicited(
        &self,
        _kind: UnsolicitedKind,
        _r: &mut ParcelReader<'_>,
        _ctx: QuirkContext<'_>,
    ) -> Option<Result<Vec<DecodedResponse>>> {
        None
    }

    /// Return `false` to drop `event` before it is broadcast.
    fn filter_event(&self, _event: &Event) -> bool {
        true
    }
}
