use thiserror::Error;
use url_state_rison::RisonError;

use crate::projection::ProjectionError;
use crate::query::QueryError;

/// Failure of a [`LocationStateCodec`](crate::LocationStateCodec) operation.
///
/// Malformed fragments never surface here; they decode to an empty object.
#[derive(Debug, Error)]
pub enum LocationStateError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("location state: {0}")]
    Rison(#[from] RisonError),
    #[error("location state projection: {0}")]
    Projection(#[from] ProjectionError),
}
