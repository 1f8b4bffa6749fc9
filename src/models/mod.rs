//! Data models for the Zendesk REST API.
//!
//! This module contains type definitions for the Zendesk endpoints the
//! handler uses: ticket creation, attachment uploads, user search, and the
//! common error envelope.

mod common;
mod ticket;
mod upload;
mod user;

pub use common::*;
pub use ticket::*;
pub use upload::*;
pub use user::*;

pub(crate) use common::deserialize_string_or_int;
