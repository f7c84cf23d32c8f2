//! Validated primitive types shared across the HealthTrends crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// A test code contained characters outside `A-Z`, `0-9`, `_` and `-`
    #[error("Test code contains invalid characters: {0}")]
    InvalidTestCode(String),
}

/// Trimmed text with at least one non-whitespace character.
///
/// Used for every free-text field the backend requires (patient id, test name, unit, profile
/// fields) so a blank form value is caught before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// `TextError::Empty` for blank input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The same text upper-cased, as the backend stores test codes.
    pub fn to_uppercase(&self) -> Self {
        Self(self.0.to_uppercase())
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A laboratory test code such as `HBA1C` or `GLUCOSE`.
///
/// Codes are stored upper-cased, matching how the catalog service normalises them on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestCode(String);

impl TestCode {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        let code = text.as_str().to_ascii_uppercase();
        let ok = code
            .bytes()
            .all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-'));
        if !ok {
            return Err(TextError::InvalidTestCode(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TestCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for TestCode {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for TestCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TestCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TestCode::new(&s).map_err(serde::de::Error::custom)
    }
}
