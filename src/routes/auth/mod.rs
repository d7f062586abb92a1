pub mod login;
pub mod me;
pub mod register;

pub use login::handle_login;
pub use me::handle_me;
pub use register::handle_register;

use serde::Serialize;

use crate::models::user::PublicUser;

/// Body returned by login and registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
    pub expires_in: i64,
}
