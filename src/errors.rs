use schema::SpeciesId;
use std::fmt;
use thiserror::Error;

/// Main error type for the Pokemon ownership engine
///
/// Every engine operation validates before it mutates, so an `Err` always means
/// the stored record was left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnershipError {
    /// No ownership record exists for the pair
    #[error("User {owner_id} does not own Pokemon #{species_id}")]
    NotOwned {
        owner_id: String,
        species_id: SpeciesId,
    },
    /// A catch was attempted on a pair that already has a record
    #[error("User {owner_id} already owns Pokemon #{species_id}")]
    AlreadyOwned {
        owner_id: String,
        species_id: SpeciesId,
    },
    /// The catalog has no species with this id
    #[error("Pokemon #{0} not found in catalog")]
    UnknownSpecies(SpeciesId),
    /// Battle attempted with no health left
    #[error("Pokemon #{species_id} must have health to battle")]
    Incapacitated { species_id: SpeciesId },
    /// Direct level-up attempted at the level cap
    #[error("Pokemon #{species_id} is already at maximum level {level}")]
    MaxLevelReached { species_id: SpeciesId, level: u32 },
    /// Malformed caller input
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The caller is not the owner it claims to act for
    #[error("Caller {caller} may not act on behalf of {owner_id}")]
    Forbidden { caller: String, owner_id: String },
    /// The persistence collaborator failed
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

/// Errors raised while validating request input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Training amount must be between {min} and {max}, got {amount}")]
    AmountOutOfRange { amount: u32, min: u32, max: u32 },
    #[error("Unknown training type: {0:?}")]
    UnknownTrainingKind(String),
    #[error("Nickname may be at most {max} characters, got {length}")]
    NicknameTooLong { length: usize, max: usize },
    #[error("{field} must be at least 1")]
    ZeroPagination { field: &'static str },
    #[error("Levels to add must be between 1 and {max}, got {levels}")]
    LevelsToAddOutOfRange { levels: u32, max: u32 },
}

/// Errors surfaced by ownership and catalog stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not serve the request
    #[error("Ownership store unavailable: {0}")]
    Unavailable(String),
    /// Unique constraint on `(owner_id, species_id)` rejected an insert
    #[error("Record for {owner_id} / #{species_id} already exists")]
    DuplicateKey {
        owner_id: String,
        species_id: SpeciesId,
    },
    /// `save` was called for a record that is not stored
    #[error("Record for {owner_id} / #{species_id} does not exist")]
    MissingRecord {
        owner_id: String,
        species_id: SpeciesId,
    },
    /// A snapshot could not be encoded, decoded, read or written
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Host-facing classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PreconditionFailed,
    BadRequest,
    Forbidden,
    Unavailable,
}

impl ErrorKind {
    /// HTTP status code conventionally used for this kind
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::PreconditionFailed => 412,
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::Unavailable => 503,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unavailable => "unavailable",
        };
        write!(f, "{}", name)
    }
}

impl OwnershipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OwnershipError::NotOwned { .. } | OwnershipError::UnknownSpecies(_) => {
                ErrorKind::NotFound
            }
            OwnershipError::AlreadyOwned { .. } => ErrorKind::Conflict,
            OwnershipError::Incapacitated { .. } | OwnershipError::MaxLevelReached { .. } => {
                ErrorKind::PreconditionFailed
            }
            OwnershipError::Validation(_) => ErrorKind::BadRequest,
            OwnershipError::Forbidden { .. } => ErrorKind::Forbidden,
            OwnershipError::StoreUnavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub(crate) fn not_owned(owner_id: &str, species_id: SpeciesId) -> Self {
        OwnershipError::NotOwned {
            owner_id: owner_id.to_string(),
            species_id,
        }
    }
}

/// Type alias for Results using OwnershipError
pub type OwnershipResult<T> = Result<T, OwnershipError>;

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;
