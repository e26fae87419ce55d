use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("invalid input kind for {field}: {value:?} (expected one of {expected})")]
    InvalidInputKind {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ScoreError {
    pub fn invalid_kind(
        field: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidInputKind {
            field,
            value: value.into(),
            expected,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidInputKind { field, .. } => *field,
        }
    }
}
