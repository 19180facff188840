/// Insert payload for the users table. The password hash travels
/// separately, as `models::user::AuthCredentials`.
#[derive(Debug, Clone)]
pub struct UserCreateRequest {
    pub name: String,
    pub email: String,
}
