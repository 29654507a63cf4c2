//! Key layout of the persistent store.
//!
//! Global keys hold the credential table and the logged-in user. Everything
//! else is namespaced by the user's email.

use crate::user::User;

/// Map of email -> `StoredCredential`.
pub const USERS_KEY: &str = "users";

/// The `User` that is currently logged in, if any.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Ordered list of the user's contacts.
pub fn contacts_key(user: &User) -> String {
    format!("contacts_{}", user.email)
}

/// Map of contact id -> ordered message list.
pub fn messages_key(user: &User) -> String {
    format!("messages_{}", user.email)
}
