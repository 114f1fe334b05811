use thiserror::Error;

/// Failure raised by a `ClienteRepository` implementation.
///
/// `UniqueViolation` is the storage-level backstop for the duplicate checks
/// the service performs up front: the read-then-write sequence is not
/// atomic, so a concurrent writer can slip a colliding record in between.
/// The UNIQUE indexes on `cpf_cnpj` and `email` catch that race and the
/// service maps the violation back to the matching duplicate error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated on `{constraint}`")]
    UniqueViolation { constraint: String },
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Business failure of a customer directory operation. Messages are
/// user-visible; storage detail never travels past `Store`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClienteError {
    #[error("CPF/CNPJ já cadastrado")]
    DuplicateCpfCnpj,
    #[error("Email já cadastrado")]
    DuplicateEmail,
    #[error("Cliente não encontrado")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A single field-level structural violation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Aggregated structural validation failure; carries every violation found
/// in the payload, not just the first.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Dados inválidos")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}
