use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

/// A cross-reference identifier such as `@I5@` or `@F28@`.
///
/// A pointer is flanked by `@` and contains at least one character, none of
/// which is another `@`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(String);

impl Pointer {
    /// Creates a new `Pointer` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPointerError` if the string is not of the form `@id@`
    /// with a non-empty `id` free of `@` characters.
    pub fn new(s: String) -> Result<Self, InvalidPointerError> {
        let valid = s
            .strip_prefix('@')
            .and_then(|rest| rest.strip_suffix('@'))
            .is_some_and(|inner| !inner.is_empty() && !inner.contains('@'));

        if valid {
            Ok(Self(s))
        } else {
            Err(InvalidPointerError(s))
        }
    }

    /// Returns the string slice, including the flanking `@` characters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier between the flanking `@` characters.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0[1..self.0.len() - 1]
    }
}

impl TryFrom<String> for Pointer {
    type Error = InvalidPointerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Pointer {
    type Error = InvalidPointerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Pointer {
    type Err = InvalidPointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for Pointer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Pointer {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for Pointer {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a string is not a well-formed pointer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid pointer '{0}': must be of the form @id@ with no '@' inside the id")]
pub struct InvalidPointerError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("@I1@"; "individual")]
    #[test_case("@F28@"; "family")]
    #[test_case("@SUBM 1@"; "embedded space")]
    fn accepts_well_formed(input: &str) {
        let pointer = Pointer::try_from(input).unwrap();
        assert_eq!(pointer.as_str(), input);
    }

    #[test_case(""; "empty")]
    #[test_case("@@"; "empty id")]
    #[test_case("I1"; "no flanks")]
    #[test_case("@I1"; "missing closing")]
    #[test_case("@I@1@"; "embedded at")]
    fn rejects_malformed(input: &str) {
        assert_eq!(
            Pointer::try_from(input),
            Err(InvalidPointerError(input.to_string()))
        );
    }

    #[test]
    fn id_strips_flanks() {
        let pointer = Pointer::try_from("@I42@").unwrap();
        assert_eq!(pointer.id(), "I42");
    }
}
