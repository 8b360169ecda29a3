//! View state kept in the URL.
//!
//! A view's state lives in one query parameter (`_a` by default) as O-Rison
//! text, so a copied link restores the view:
//!
//! ```text
//! /app/metrics?foo=bar&_a=sort%3Aasc%2Ctime%3A%28from%3Anow-15m%29
//!                         └─ sort:asc,time:(from:now-15m)
//! ```
//!
//! [`LocationStateCodec`] converts between state and [`Location`];
//! [`StateNavigator`] turns state updates into push/replace calls on a
//! [`History`].

mod codec;
mod error;
mod location;
mod navigator;
mod projection;

pub mod query;

pub use codec::{CodecOptions, LocationStateCodec, DEFAULT_STATE_KEY};
pub use error::LocationStateError;
pub use location::Location;
pub use navigator::{History, MemoryHistory, NavigationOutcome, StateNavigator};
pub use projection::{
    FnProjection, IdentityProjection, ProjectionError, SerdeProjection, StateProjection,
};
pub use query::{QueryError, QueryValues};

pub use url_state_rison as rison;
