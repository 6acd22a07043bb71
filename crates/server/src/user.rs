//! The authenticated caller of a request.

/// Inserted in the request extensions by the auth middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}
