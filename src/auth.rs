//! Authentication - operator credentials and the session lifecycle.
//!
//! Signing in or out replaces the current session and notifies every
//! observer; the top-level view is derived from the session alone.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use crate::{
    backend::Backend,
    entities::{Operator, operator, owner_profile},
    errors::{Error, Result},
    session::SessionContext,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

/// Which top-level view the console shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    /// Nobody is signed in
    SignIn,
    /// An operator is signed in
    Console,
}

/// Maps a session state to the view that should be on screen.
#[must_use]
pub const fn view_for(session: Option<&SessionContext>) -> AppView {
    match session {
        Some(_) => AppView::Console,
        None => AppView::SignIn,
    }
}

/// Details captured when a new school account is registered.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Sign-in email
    pub email: String,
    /// Plain-text password, only hashed before storage
    pub password: String,
    /// School name for the owner profile
    pub school_name: String,
    /// Contact number for the owner profile
    pub mobile_number: String,
}

/// Argon2 hash in PHC string form, with a fresh random salt.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Auth {
            message: format!("Failed to hash password: {e}"),
        })
}

/// Constant-time check of `password` against a stored PHC string.
fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|hash| {
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok()
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the operator credential and the owner profile of a new account.
#[instrument(skip(backend, registration), fields(email = %registration.email))]
pub async fn register_operator(
    backend: &Backend,
    registration: &Registration,
) -> Result<operator::Model> {
    let email = normalize_email(&registration.email);
    if !email.contains('@') {
        return Err(Error::validation("Please enter a valid email address."));
    }
    if registration.password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if registration.school_name.trim().is_empty() {
        return Err(Error::validation("School name is required."));
    }

    let uid = Uuid::new_v4().to_string();
    let txn = backend.connection().begin().await?;

    let operator = operator::ActiveModel {
        uid: Set(uid.clone()),
        email: Set(email),
        password_hash: Set(hash_password(&registration.password)?),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    owner_profile::ActiveModel {
        uid: Set(uid),
        school_name: Set(registration.school_name.trim().to_string()),
        principal_name: Set(None),
        mobile_number: Set(registration.mobile_number.trim().to_string()),
        school_image_url: Set(None),
        register_date: Set(Some(Utc::now().date_naive())),
        address: Set(None),
        website: Set(None),
        school_code: Set(None),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!("Registered operator {}", operator.uid);
    Ok(operator)
}

/// Holds the current session and broadcasts every change of it.
#[derive(Debug)]
pub struct AuthService {
    backend: Backend,
    session: watch::Sender<Option<SessionContext>>,
}

impl AuthService {
    /// Starts signed out.
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        let (session, _) = watch::channel(None);
        Self { backend, session }
    }

    /// Checks the credential pair and opens a session.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionContext> {
        let email = normalize_email(email);
        let operator = Operator::find()
            .filter(operator::Column::Email.eq(email.as_str()))
            .one(self.backend.connection())
            .await?;

        let Some(operator) = operator else {
            warn!("Sign-in for unknown email");
            return Err(Error::Auth {
                message: "Invalid login credentials".to_string(),
            });
        };
        if !verify_password(password, &operator.password_hash) {
            warn!("Sign-in with wrong password");
            return Err(Error::Auth {
                message: "Invalid login credentials".to_string(),
            });
        }

        let session = SessionContext::new(operator.uid, operator.email);
        self.session.send_replace(Some(session.clone()));
        info!("Signed in");
        Ok(session)
    }

    /// Clears the session; observers fall back to [`AppView::SignIn`].
    pub fn sign_out(&self) {
        if self.session.send_replace(None).is_some() {
            info!("Signed out");
        }
    }

    /// The current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<SessionContext> {
        self.session.borrow().clone()
    }

    /// The current session, or [`Error::NotSignedIn`].
    pub fn require(&self) -> Result<SessionContext> {
        self.current().ok_or(Error::NotSignedIn)
    }

    /// Observes session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionContext>> {
        self.session.subscribe()
    }

    /// The view the console should show right now.
    #[must_use]
    pub fn view(&self) -> AppView {
        view_for(self.session.borrow().as_ref())
    }
}
