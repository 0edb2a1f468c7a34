use thiserror::Error;

/// Failures raised while turning one source page into a record.
///
/// `AnchorNotFound` is recoverable: optional fields fall back to an empty value.
/// `MissingField` aborts the single document it was raised for. The merge
/// variants reject pairing two records that do not describe the same creature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("anchor not found for `{field}`: {anchor}")]
    AnchorNotFound { field: &'static str, anchor: String },

    #[error("mandatory field `{field}` missing: {reason}")]
    MissingField { field: &'static str, reason: String },

    #[error("identity mismatch: english #{english} vs german #{german}")]
    IdentityMismatch { english: u32, german: u32 },

    #[error("cannot merge two {0} records")]
    LanguageMismatch(&'static str),
}

impl ExtractError {
    pub fn anchor(field: &'static str, anchor: impl ToString) -> Self {
        ExtractError::AnchorNotFound {
            field,
            anchor: anchor.to_string(),
        }
    }

    pub fn missing(field: &'static str, reason: impl Into<String>) -> Self {
        ExtractError::MissingField {
            field,
            reason: reason.into(),
        }
    }

    /// Semantic field the error refers to, for log context.
    pub fn field(&self) -> &'static str {
        match self {
            ExtractError::AnchorNotFound { field, .. } | ExtractError::MissingField { field, .. } => {
                field
            }
            ExtractError::IdentityMismatch { .. } | ExtractError::LanguageMismatch(_) => "identity",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
