//! Authentication user types.

/// A request's verified identity. `user_id` has been re-resolved against
/// the user store, so the account existed when the request arrived.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}
