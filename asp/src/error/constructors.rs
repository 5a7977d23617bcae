//! Constructors and conversions for `AspError`.

use std::path::Path;

use figment::Error as FigmentError;

use super::{AspError, CoercionError};

impl AspError {
    /// Construct a gathering error from a [`figment::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use asp::AspError;
    /// let e = AspError::gathering(figment::Error::from("boom"));
    /// assert!(matches!(e, AspError::Gathering(_)));
    /// ```
    #[must_use]
    pub fn gathering(source: FigmentError) -> Self {
        Self::Gathering(Box::new(source))
    }

    /// Construct an [`AspError::File`] for a configuration path.
    #[must_use]
    pub fn file(path: &Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// Attach the canonical key a coercion failure belongs to.
    #[must_use]
    pub fn coercion(key: impl Into<String>, source: CoercionError) -> Self {
        Self::Coercion {
            key: key.into(),
            source,
        }
    }
}

impl From<FigmentError> for AspError {
    fn from(e: FigmentError) -> Self {
        Self::Gathering(e.into())
    }
}

impl From<AspError> for FigmentError {
    /// Allow using `?` inside `figment::Jail` closures.
    fn from(e: AspError) -> Self {
        match e {
            AspError::Gathering(fe) => *fe,
            other => Self::from(other.to_string()),
        }
    }
}
