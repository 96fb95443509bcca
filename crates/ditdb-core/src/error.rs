use thiserror::Error as ThisError;

use crate::{name::DnParseError, store::StoreError};

///
/// Error
///
/// Crate-level rollup of the module error enums, for callers who do not
/// care which layer a failure came from.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Dn(#[from] DnParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
