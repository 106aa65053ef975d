//! Secure credential container with automatic memory zeroing.
//!
//! The target password is mandatory configuration; it is kept in a
//! `Zeroizing` container from the moment it is parsed until the connection
//! options are built, and never printed.

use zeroize::{Zeroize, Zeroizing};

/// Username and password for the target store.
///
/// # Example
///
/// ```rust
/// use dbferry_core::security::Credentials;
///
/// let creds = Credentials::new("postgres".to_string(), "secret".to_string());
/// assert_eq!(creds.username(), "postgres");
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exposes the password for building connection options only.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Checks if a non-empty password is present without exposing it.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), "testpass".to_string());
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), "testpass");
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_empty_password() {
        let creds = Credentials::new("testuser".to_string(), String::new());
        assert!(!creds.has_password());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("admin".to_string(), "hunter2".to_string());
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn test_credentials_clone() {
        let creds1 = Credentials::new("user".to_string(), "pass".to_string());
        let creds2 = creds1.clone();
        assert_eq!(creds1.username(), creds2.username());
        assert_eq!(creds1.has_password(), creds2.has_password());
    }
}
