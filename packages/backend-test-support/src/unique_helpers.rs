//! Unique test data helpers.
//!
//! Suites share process-wide stores, so every league, club and user a test
//! creates gets a ULID suffix.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique display name that passes the four-character minimum.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_name;
///
/// let name = unique_name("Club");
/// assert!(name.starts_with("Club "));
/// assert!(name.chars().count() >= 4);
/// ```
pub fn unique_name(prefix: &str) -> String {
    let ulid = Ulid::new().to_string();
    format!("{} {}", prefix, &ulid[ulid.len() - 6..])
}
