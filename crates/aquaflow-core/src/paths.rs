use crate::error::{AquaError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const AQUAFLOW_DIR: &str = ".aquaflow";
pub const ORDERS_DIR: &str = ".aquaflow/orders";
pub const USERS_DIR: &str = ".aquaflow/users";

pub const CONFIG_FILE: &str = ".aquaflow/config.yaml";
pub const PRODUCTS_FILE: &str = ".aquaflow/products.yaml";
pub const ATTEMPTS_DB_FILE: &str = ".aquaflow/attempts.redb";
pub const LAST_ORDER_FILE: &str = ".aquaflow/last-order";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn aquaflow_dir(root: &Path) -> PathBuf {
    root.join(AQUAFLOW_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn products_path(root: &Path) -> PathBuf {
    root.join(PRODUCTS_FILE)
}

pub fn attempts_db_path(root: &Path) -> PathBuf {
    root.join(ATTEMPTS_DB_FILE)
}

pub fn last_order_path(root: &Path) -> PathBuf {
    root.join(LAST_ORDER_FILE)
}

pub fn order_path(root: &Path, id: &str) -> PathBuf {
    root.join(ORDERS_DIR).join(format!("{id}.yaml"))
}

pub fn user_path(root: &Path, username: &str) -> PathBuf {
    root.join(USERS_DIR).join(format!("{username}.yaml"))
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static ORDER_ID_RE: OnceLock<Regex> = OnceLock::new();

fn order_id_re() -> &'static Regex {
    ORDER_ID_RE.get_or_init(|| Regex::new(r"^ORD-[A-Z0-9]{9}$").unwrap())
}

pub fn validate_order_id(id: &str) -> Result<()> {
    if !order_id_re().is_match(id) {
        return Err(AquaError::InvalidOrderId(id.to_string()));
    }
    Ok(())
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_re() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]{2,19}$").unwrap())
}

/// Usernames double as on-disk file names, so the character set is restricted.
pub fn validate_username(username: &str) -> Result<()> {
    if !username_re().is_match(username) {
        return Err(AquaError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_order_ids() {
        for id in ["ORD-ABC123XYZ", "ORD-000000000", "ORD-ZZZZZZZZZ"] {
            validate_order_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_order_ids() {
        for id in [
            "",
            "ORD-",
            "ORD-abc123xyz",
            "ORD-ABC123XY",
            "ORD-ABC123XYZ0",
            "XYZ-ABC123XYZ",
            "ORD ABC123XYZ",
        ] {
            assert!(validate_order_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn valid_usernames() {
        for name in ["ravi", "admin", "user.42", "a-b_c"] {
            validate_username(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_usernames() {
        for name in ["", "ab", ".dot", "has space", "way-too-long-for-a-username", "a/b"] {
            assert!(validate_username(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/shop");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/shop/.aquaflow/config.yaml")
        );
        assert_eq!(
            order_path(root, "ORD-ABC123XYZ"),
            PathBuf::from("/tmp/shop/.aquaflow/orders/ORD-ABC123XYZ.yaml")
        );
        assert_eq!(
            user_path(root, "ravi"),
            PathBuf::from("/tmp/shop/.aquaflow/users/ravi.yaml")
        );
    }
}
