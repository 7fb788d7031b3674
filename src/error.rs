//! Errors raised by the pool and its collaborators.

use crate::{scene::NodeId, util::BoxedError};
use std::io;
use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Error, Debug)]
pub enum PoolError {
    /// The factory could not build an object.
    #[error("factory failed to create an object: {0}")]
    Factory(#[source] BoxedError),

    /// An object was handed back to a pool that never produced it.
    #[error("{0:?} does not belong to this pool")]
    NotPooled(NodeId),

    /// A node id that the scene graph does not know about.
    #[error("{0:?} is not in the scene")]
    MissingNode(NodeId),

    /// Re-parenting would make a node its own ancestor.
    #[error("parenting {0:?} there would create a cycle")]
    ParentCycle(NodeId),

    #[error("invalid pool configuration: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
