//! Accounts: registration, login with lockout, and administration.

use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::error::{AppError, AppResult};
use crate::store::{NewUser, Page, UserStore, UserUpdate};
use common::model::organization::Organization;
use common::model::user::{Session, User, ROLE_ADMIN_EO, ROLE_FIELD_STAFF};
use common::requests::{LoginRequest, RegisterRequest, UpdateUserRequest};
use log::{info, warn};
use std::sync::Arc;

/// Failed logins tolerated before the account is locked.
pub const MAX_RETRY_ATTEMPTS: i64 = 3;

const USERNAME_TAKEN: &str = "username sudah terdaftar, silahkan menggunakan username lain";

#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl Accounts {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Accounts { users, tokens }
    }

    /// Self-registration of field staff.
    pub fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        self.create_with_role(request, ROLE_FIELD_STAFF)
    }

    /// Account created by an administrator for an event organizer.
    pub fn create(&self, request: &RegisterRequest) -> AppResult<User> {
        self.create_with_role(request, ROLE_ADMIN_EO)
    }

    fn create_with_role(&self, request: &RegisterRequest, role: &str) -> AppResult<User> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest(
                "username and password are required".to_string(),
            ));
        }
        if self.users.find_by_username(username)?.is_some() {
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let user = self.users.create(&NewUser {
            name: request.name.clone(),
            username: username.to_string(),
            password_hash: hash_password(&request.password)?,
            role: role.to_string(),
            organization_id: request.organization_id,
            province: request.province.clone(),
            regency: request.regency.clone(),
        })?;
        info!("Created {role} account '{}'", user.username);
        Ok(user)
    }

    pub fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        let user = self
            .users
            .find_by_username(request.username.trim())?
            .ok_or_else(|| AppError::not_found("user"))?;

        if user.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(locked());
        }

        if !verify_password(&request.password, &user.password)? {
            let attempts = user.retry_attempts + 1;
            self.users.set_retry_attempts(user.id, attempts)?;
            warn!("Failed login for '{}' ({attempts} attempts)", user.username);
            if attempts > MAX_RETRY_ATTEMPTS {
                return Err(locked());
            }
            return Err(AppError::Unauthorized("Password not matched".to_string()));
        }

        if user.retry_attempts != 0 {
            self.users.set_retry_attempts(user.id, 0)?;
        }
        let user = User {
            retry_attempts: 0,
            ..user
        };
        Ok(Session {
            token: self.tokens.issue(&user)?,
            user,
        })
    }

    pub fn list(&self, search: &str, page: Page) -> AppResult<(Vec<User>, i64)> {
        Ok((self.users.list(search, page)?, self.users.count(search)?))
    }

    pub fn get(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("user"))
    }

    /// Blank name and role keep the stored values; a blank password keeps the
    /// current one. Setting `retry_attempts` to zero unlocks the account.
    pub fn update(&self, id: i64, request: &UpdateUserRequest) -> AppResult<User> {
        let current = self.get(id)?;
        let password_hash = if request.password.is_empty() {
            None
        } else {
            Some(hash_password(&request.password)?)
        };
        let pick = |value: &str, stored: &str| {
            if value.trim().is_empty() {
                stored.to_string()
            } else {
                value.to_string()
            }
        };
        self.users.update(
            id,
            &UserUpdate {
                name: pick(&request.name, &current.name),
                role: pick(&request.role, &current.role),
                password_hash,
                retry_attempts: request.retry_attempts.unwrap_or(current.retry_attempts),
            },
        )
    }

    pub fn delete(&self, id: i64) -> AppResult<()> {
        self.users.soft_delete(id)
    }

    pub fn organizations(&self) -> AppResult<Vec<Organization>> {
        self.users.organizations()
    }
}

fn locked() -> AppError {
    AppError::TooManyAttempts(format!("You have retry {MAX_RETRY_ATTEMPTS} times"))
}
