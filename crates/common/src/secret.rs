//! Wrapper for credential material

use std::fmt;
use zeroize::Zeroize;

/// Sensitive string - redacted in Debug/Display/logs, zeroed on drop
pub struct Secret(String);

impl Secret {
    /// Wrap a sensitive value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let secret = Secret::new("hunter2");
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn secret_redacts_display() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.to_string(), "[REDACTED]");
    }

    #[test]
    fn secret_exposes_value() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn clone_carries_the_value() {
        let secret = Secret::new("hunter2");
        let copy = secret.clone();
        assert_eq!(copy.expose(), "hunter2");
    }
}
