//! Authentication seam. Credentials are checked by an `AuthProvider`; this
//! module only enforces the client-side policy and hands back a `Session`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceResult;
use crate::core::utils::write_atomic;
use crate::core::Session;
use crate::errors::{PlannerError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

pub trait AuthProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<()>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    fn sign_out(&self, session: &Session) -> Result<()>;
}

pub struct AuthService;

impl AuthService {
    pub fn sign_up(provider: &dyn AuthProvider, email: &str, password: &str) -> ServiceResult<()> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            warn!("sign up rejected: password too short");
            return Err(PlannerError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        provider.sign_up(&email, password)?;
        info!(email = %email, "signed up");
        Ok(())
    }

    pub fn sign_in(provider: &dyn AuthProvider, email: &str, password: &str) -> ServiceResult<Session> {
        let email = normalize_email(email)?;
        let session = provider.sign_in(&email, password)?;
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    pub fn sign_out(provider: &dyn AuthProvider, session: Session) -> ServiceResult<()> {
        provider.sign_out(&session)?;
        info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(PlannerError::InvalidInput("a valid email is required".into()));
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PlannerError::AuthError(format!("hash error: {err}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| PlannerError::AuthError(format!("stored hash unreadable: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user_id: String,
    password_hash: String,
}

/// Accounts keyed by normalized email.
type Accounts = BTreeMap<String, Account>;

fn register(accounts: &mut Accounts, email: &str, password: &str) -> Result<()> {
    if accounts.contains_key(email) {
        return Err(PlannerError::AuthError(format!("{email} is already registered")));
    }
    accounts.insert(
        email.to_string(),
        Account {
            user_id: Uuid::new_v4().to_string(),
            password_hash: hash_password(password)?,
        },
    );
    Ok(())
}

fn authenticate(accounts: &Accounts, email: &str, password: &str) -> Result<Session> {
    match accounts.get(email) {
        Some(account) if verify_password(password, &account.password_hash)? => {
            Ok(Session::new(account.user_id.clone(), email))
        }
        _ => Err(PlannerError::AuthError("invalid credentials".into())),
    }
}

/// Process-local provider for tests and offline use. Accounts live only as
/// long as the provider.
#[derive(Default)]
pub struct InMemoryAuth {
    accounts: Mutex<Accounts>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Accounts>> {
        self.accounts
            .lock()
            .map_err(|_| PlannerError::AuthError("account registry unavailable".into()))
    }
}

impl AuthProvider for InMemoryAuth {
    fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let mut accounts = self.lock()?;
        register(&mut accounts, email, password)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let accounts = self.lock()?;
        authenticate(&accounts, email, password)
    }

    fn sign_out(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    #[serde(default)]
    accounts: Accounts,
}

/// Account registry persisted as one JSON file holding argon2 hashes.
pub struct JsonAuth {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonAuth {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Accounts> {
        if !self.path.exists() {
            return Ok(Accounts::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let file: AccountFile = serde_json::from_str(&data)?;
        Ok(file.accounts)
    }
}

impl AuthProvider for JsonAuth {
    fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PlannerError::AuthError("account registry unavailable".into()))?;
        let mut accounts = self.load()?;
        register(&mut accounts, email, password)?;
        let json = serde_json::to_string_pretty(&AccountFile { accounts })?;
        write_atomic(&self.path, &json)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        authenticate(&self.load()?, email, password)
    }

    fn sign_out(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}
