//! # User Store
//!
//! Identity creation, authentication, session tracking, profile mutation.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        User Store                                       │
//! │                                                                         │
//! │  sign_up ───────► validate ──► dup check ──► hash ──► persist ──► login│
//! │  login ─────────► resolve username/email ──► verify hash ──► session   │
//! │  login_simple ──► registered? login : auto-provision + login           │
//! │  logout ────────► clear session flags (deletes nothing)                │
//! │  update_user_info ──► full_name / address / phone only                 │
//! │                                                                         │
//! │  The registry is one persisted map: username → User.                   │
//! │  Username lookups are case-sensitive; email duplicate detection is     │
//! │  case-insensitive.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use bistro_core::validation::{
    validate_email, validate_full_name, validate_password, validate_phone, validate_username,
};
use bistro_core::{Role, User, ADDRESS_NOT_SET, LEGACY_LOGIN_PASSWORD};

use crate::error::{AuthError, KvError};
use crate::kv::{KvStore, KvStoreExt, StoreKey};
use crate::session::Session;

// =============================================================================
// Sign-Up Request
// =============================================================================

/// The fields collected by the registration form.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

// =============================================================================
// User Store
// =============================================================================

/// Identity and session store over key-value persistence.
///
/// Cheap to clone: both fields are shared handles.
#[derive(Clone)]
pub struct UserStore {
    kv: Arc<dyn KvStore>,
    session: Session,
}

impl UserStore {
    /// Creates a store over the given backend and session handle.
    pub fn new(kv: Arc<dyn KvStore>, session: Session) -> Self {
        UserStore { kv, session }
    }

    // =========================================================================
    // Registration & Authentication
    // =========================================================================

    /// Registers a new account and logs it in.
    ///
    /// All fields are validated before any state changes; a failed
    /// validation leaves the registry untouched, so the same username can be
    /// retried. Duplicate usernames compare case-sensitively, duplicate
    /// emails case-insensitively.
    pub fn sign_up(&self, req: SignUpRequest) -> Result<User, AuthError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_string();
        let full_name = req.full_name.trim().to_string();
        let phone = req.phone.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&req.password)?;
        validate_full_name(&full_name)?;
        validate_phone(&phone)?;

        let mut registry = self.load_registry()?;

        if registry.contains_key(&username) {
            return Err(AuthError::DuplicateUsername(username));
        }
        if registry
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&email))
        {
            return Err(AuthError::DuplicateEmail(email));
        }

        let user = User {
            username: username.clone(),
            email,
            password_hash: hash_password(&req.password)?,
            full_name,
            address: ADDRESS_NOT_SET.to_string(),
            phone,
            created_at: Utc::now(),
            verified: false,
            role: Role::Customer,
        };

        registry.insert(username.clone(), user.clone());
        self.save_registry(&registry)?;

        self.session.establish(&username);
        self.persist_session();

        info!(username = %username, "Account created");
        Ok(user)
    }

    /// Logs in with a username or email plus password.
    ///
    /// The identifier resolves to a username by exact match first, then by
    /// case-insensitive email.
    pub fn login(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        let identifier = identifier.trim();
        let registry = self.load_registry()?;

        let user = registry
            .get(identifier)
            .or_else(|| {
                registry
                    .values()
                    .find(|u| u.email.eq_ignore_ascii_case(identifier))
            })
            .cloned()
            .ok_or_else(|| AuthError::AccountNotFound(identifier.to_string()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::WrongPassword);
        }

        self.session.establish(&user.username);
        self.persist_session();

        info!(username = %user.username, "Logged in");
        Ok(user)
    }

    /// Legacy username-only login.
    ///
    /// A registered username logs in directly; an unknown one is
    /// auto-provisioned with empty contact fields and the fixed placeholder
    /// password. Fails only when persistence fails.
    pub fn login_simple(&self, username: &str) -> bool {
        let username = username.trim();
        if username.is_empty() {
            warn!("login_simple called with empty username; ignoring");
            return false;
        }

        let mut registry = match self.load_registry() {
            Ok(registry) => registry,
            Err(err) => {
                warn!(error = %err, "login_simple: registry unavailable");
                return false;
            }
        };

        if !registry.contains_key(username) {
            let hash = match hash_password(LEGACY_LOGIN_PASSWORD) {
                Ok(hash) => hash,
                Err(err) => {
                    warn!(error = %err, "login_simple: could not provision account");
                    return false;
                }
            };
            let user = User {
                username: username.to_string(),
                email: String::new(),
                password_hash: hash,
                full_name: username.to_string(),
                address: ADDRESS_NOT_SET.to_string(),
                phone: String::new(),
                created_at: Utc::now(),
                verified: false,
                role: Role::Customer,
            };
            registry.insert(username.to_string(), user);
            if let Err(err) = self.save_registry(&registry) {
                warn!(error = %err, "login_simple: could not persist account");
                return false;
            }
            info!(username = %username, "Auto-provisioned legacy account");
        }

        self.session.establish(username);
        self.persist_session();
        true
    }

    /// Clears the session flags. Deletes no data.
    pub fn logout(&self) {
        self.session.clear();
        self.persist_session();
        debug!("Logged out");
    }

    // =========================================================================
    // Session Queries
    // =========================================================================

    /// Whether anyone is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// The logged-in user's record, or `None` when logged out.
    pub fn current_user(&self) -> Option<User> {
        let username = self.session.current_username()?;
        match self.user(&username) {
            Some(user) => Some(user),
            None => {
                // Session invariant violated (registry cleared underneath us)
                warn!(username = %username, "Session names an unknown user");
                None
            }
        }
    }

    // =========================================================================
    // Profile Mutation
    // =========================================================================

    /// Updates the mutable profile fields of the logged-in user.
    ///
    /// Only `full_name`, `address` and `phone` may change; username, email
    /// and password are immutable after creation. Returns `false` (with a
    /// warning) on validation failure, missing session, or storage failure.
    pub fn update_user_info(&self, full_name: &str, address: &str, phone: &str) -> bool {
        let Some(username) = self.session.current_username() else {
            warn!("update_user_info without an active session; ignoring");
            return false;
        };

        let full_name = full_name.trim();
        let phone = phone.trim();
        if let Err(err) = validate_full_name(full_name).and_then(|()| validate_phone(phone)) {
            warn!(username = %username, error = %err, "update_user_info rejected");
            return false;
        }

        let mut registry = match self.load_registry() {
            Ok(registry) => registry,
            Err(err) => {
                warn!(error = %err, "update_user_info: registry unavailable");
                return false;
            }
        };

        let Some(user) = registry.get_mut(&username) else {
            warn!(username = %username, "update_user_info: user not found");
            return false;
        };

        user.full_name = full_name.to_string();
        user.address = address.trim().to_string();
        user.phone = phone.to_string();

        match self.save_registry(&registry) {
            Ok(()) => {
                debug!(username = %username, "Profile updated");
                true
            }
            Err(err) => {
                warn!(error = %err, "update_user_info: persist failed");
                false
            }
        }
    }

    // =========================================================================
    // Registry Queries
    // =========================================================================

    /// Looks up one user by exact username.
    pub fn user(&self, username: &str) -> Option<User> {
        match self.load_registry() {
            Ok(registry) => registry.get(username).cloned(),
            Err(err) => {
                warn!(error = %err, "user lookup: registry unavailable");
                None
            }
        }
    }

    /// All registered usernames, sorted. Feeds the bill store's cross-user
    /// aggregates.
    pub fn usernames(&self) -> Vec<String> {
        match self.load_registry() {
            Ok(registry) => registry.keys().cloned().collect(),
            Err(err) => {
                warn!(error = %err, "usernames: registry unavailable");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Persistence Helpers
    // =========================================================================

    fn load_registry(&self) -> Result<BTreeMap<String, User>, KvError> {
        Ok(self.kv.get(&StoreKey::Users)?.unwrap_or_default())
    }

    fn save_registry(&self, registry: &BTreeMap<String, User>) -> Result<(), KvError> {
        self.kv.put(&StoreKey::Users, registry)
    }

    /// Writes the session snapshot. Failure here is non-fatal: the in-memory
    /// session stays correct for this process, only restart restore suffers.
    fn persist_session(&self) {
        if let Err(err) = self.kv.put(&StoreKey::Session, &self.session.snapshot()) {
            warn!(error = %err, "Could not persist session snapshot");
        }
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Derives a one-way PHC hash for storage. Verification re-derives with the
/// embedded salt and compares; the plaintext is never stored.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hashing)
}

/// Checks a password against a stored PHC hash. An unparseable hash verifies
/// as false rather than erroring: the caller only cares whether login is
/// allowed.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("Stored password hash is unparseable");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
