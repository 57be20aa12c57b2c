//! Persistence/auth collaborator.
//!
//! The storefront core only needs a handful of request/response operations
//! from whatever backs it: insert an order, look orders up, flip a status,
//! resolve a user's role, and authenticate a session. `DeliveryBackend`
//! captures that contract; `DirectoryBackend` is the file-backed
//! implementation used by the CLI and tests, standing in for the hosted
//! service of a production deployment.

use crate::error::{AquaError, Result};
use crate::order::Order;
use crate::paths;
use crate::sanitize::{sanitize, DEFAULT_MAX_LEN};
use crate::types::{OrderStatus, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Session / credentials
// ---------------------------------------------------------------------------

/// Authenticated identity, as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username or email — the login form accepts either.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// DeliveryBackend
// ---------------------------------------------------------------------------

pub trait DeliveryBackend {
    fn insert_order(&self, order: &Order) -> Result<()>;
    fn order(&self, id: &str) -> Result<Order>;
    /// Orders visible to `user_id`, newest first; `None` is the admin view.
    fn orders_for(&self, user_id: Option<&str>) -> Result<Vec<Order>>;
    fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order>;
    fn user_role(&self, user_id: &str) -> Result<Role>;
    fn authenticate(&self, credentials: &Credentials) -> Result<Session>;
    fn register(&self, new_user: NewUser) -> Result<Session>;
}

// ---------------------------------------------------------------------------
// Stored user record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: String,
    email: String,
    username: String,
    name: String,
    role: Role,
    password: String,
    created_at: DateTime<Utc>,
}

impl StoredUser {
    fn session(&self) -> Session {
        Session {
            user_id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

// ---------------------------------------------------------------------------
// DirectoryBackend
// ---------------------------------------------------------------------------

/// Backend rooted at a project directory: orders and users live as yaml
/// manifests under `.aquaflow/`. Credentials are compared in the clear; this
/// is a local stand-in, not a hardened auth service.
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open an initialized project directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !paths::aquaflow_dir(&root).is_dir() {
            return Err(AquaError::NotInitialized);
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn users(&self) -> Result<Vec<StoredUser>> {
        let users_dir = self.root.join(paths::USERS_DIR);
        if !users_dir.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in std::fs::read_dir(&users_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                let data = std::fs::read_to_string(&path)?;
                let user: StoredUser = serde_yaml::from_str(&data)?;
                users.push(user);
            }
        }
        Ok(users)
    }

    fn save_user(&self, user: &StoredUser) -> Result<()> {
        let path = paths::user_path(&self.root, &user.username);
        let data = serde_yaml::to_string(user)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Seed the operator account for a fresh local store. Returns true if the
    /// account was created, false if it already existed.
    pub fn seed_admin(&self, username: &str, password: &str) -> Result<bool> {
        paths::validate_username(username)?;
        if paths::user_path(&self.root, username).exists() {
            return Ok(false);
        }
        let user = StoredUser {
            id: Uuid::new_v4().to_string(),
            email: format!("{username}@localhost"),
            username: username.to_string(),
            name: "Store Operator".to_string(),
            role: Role::Admin,
            password: password.to_string(),
            created_at: Utc::now(),
        };
        self.save_user(&user)?;
        Ok(true)
    }
}

impl DeliveryBackend for DirectoryBackend {
    fn insert_order(&self, order: &Order) -> Result<()> {
        paths::validate_order_id(&order.id)?;
        order.save(&self.root)
    }

    fn order(&self, id: &str) -> Result<Order> {
        Order::load(&self.root, id)
    }

    fn orders_for(&self, user_id: Option<&str>) -> Result<Vec<Order>> {
        let mut orders = Order::list(&self.root)?;
        if let Some(user_id) = user_id {
            orders.retain(|o| o.user_id == user_id);
        }
        Ok(orders)
    }

    fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        // Any status may be set directly; the lifecycle order is a display
        // concern, not a transition guard.
        let mut order = Order::load(&self.root, id)?;
        order.status = status;
        order.save(&self.root)?;
        tracing::info!(order = %id, status = %status, "order status updated");
        Ok(order)
    }

    fn user_role(&self, user_id: &str) -> Result<Role> {
        self.users()?
            .into_iter()
            .find(|u| u.id == user_id)
            .map(|u| u.role)
            .ok_or_else(|| AquaError::UserNotFound(user_id.to_string()))
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let identifier = sanitize(&credentials.identifier, DEFAULT_MAX_LEN);
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.username == identifier || u.email == identifier);
        // One opaque message for both unknown-user and wrong-password.
        match user {
            Some(u) if u.password == credentials.password => Ok(u.session()),
            _ => Err(AquaError::AuthFailed("invalid credentials".to_string())),
        }
    }

    fn register(&self, new_user: NewUser) -> Result<Session> {
        let email = sanitize(&new_user.email, DEFAULT_MAX_LEN);
        let username = sanitize(&new_user.username, 20);
        let name = sanitize(&new_user.name, 50);
        paths::validate_username(&username)?;

        if paths::user_path(&self.root, &username).exists() {
            return Err(AquaError::UserExists(username));
        }
        if self.users()?.iter().any(|u| u.email == email) {
            return Err(AquaError::UserExists(email));
        }

        let user = StoredUser {
            id: Uuid::new_v4().to_string(),
            email,
            username,
            name,
            role: Role::User,
            password: new_user.password,
            created_at: Utc::now(),
        };
        self.save_user(&user)?;
        tracing::info!(username = %user.username, "user registered");
        Ok(user.session())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
