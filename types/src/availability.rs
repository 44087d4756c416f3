//! "Too early" outcomes modelled as values rather than errors.

/// Result of a query whose answer may legitimately not exist yet.
///
/// Callers poll on `NotYetAvailable` without matching on error strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability<T> {
    Ready(T),
    /// The data is expected to appear later; the string says what is missing.
    NotYetAvailable(String),
}

impl<T> Availability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NotYetAvailable(_) => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.ready().unwrap_or(default)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Ready(value) => Availability::Ready(f(value)),
            Self::NotYetAvailable(reason) => Availability::NotYetAvailable(reason),
        }
    }
}
