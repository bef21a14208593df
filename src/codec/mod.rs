//! Codec module - primitive field encoding for record payloads.
//!
//! - [`ParcelWriter`] - appends integers, strings and byte arrays
//! - [`ParcelReader`] - reads them back from an explicit cursor
//!
//! Every request and response body is a sequence of these primitives in a
//! fixed order chosen by the message kind; no field carries its own type tag.

mod parcel;

pub use parcel::{ParcelReader, ParcelWriter, NULL_LENGTH};
