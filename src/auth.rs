use crate::models::{StoreData, UserRecord};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Storage seam for user records. The JSON-file store is the one production
/// impl; tests can run the same authenticator against anything in-memory.
pub trait CredentialStore {
    fn find_user(&self, username: &str) -> Option<&UserRecord>;
    fn add_user(&mut self, record: UserRecord);
}

impl CredentialStore for StoreData {
    fn find_user(&self, username: &str) -> Option<&UserRecord> {
        // Case-sensitive on purpose: "Bob" and "bob" are distinct accounts.
        self.users.iter().find(|user| user.username == username)
    }

    fn add_user(&mut self, record: UserRecord) {
        self.users.push(record);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingFields,
    DuplicateUsername,
    InvalidCredentials,
    Hashing,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "Username and password are required",
            AuthError::DuplicateUsername => "Username already exists",
            // One message for every mismatch so a caller cannot probe which
            // field was wrong.
            AuthError::InvalidCredentials => "Invalid username or password",
            AuthError::Hashing => "Password hashing failed",
        }
    }
}

/// Appends a new user with a salted Argon2id hash. The username is trimmed
/// first; an exact-match duplicate is refused.
pub fn register(store: &mut impl CredentialStore, username: &str, password: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if store.find_user(username).is_some() {
        return Err(AuthError::DuplicateUsername);
    }
    let password_hash = hash_password(password)?;
    store.add_user(UserRecord {
        username: username.to_string(),
        password_hash,
    });
    Ok(username.to_string())
}

/// Succeeds iff the username matches a stored record exactly and the password
/// verifies against its hash.
pub fn login(store: &impl CredentialStore, username: &str, password: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    let user = store.find_user(username).ok_or(AuthError::InvalidCredentials)?;
    if verify_password(password, &user.password_hash) {
        Ok(username.to_string())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hashing)
}

/// An unparseable stored hash counts as a mismatch rather than an error;
/// verify_password is only reached with hashes this module wrote.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
