/// A persisted user row. `id` is assigned by storage on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Data for creating a new user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Replacement values for an existing user; both fields are always written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
}
