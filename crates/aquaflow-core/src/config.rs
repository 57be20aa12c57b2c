use crate::error::{AquaError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServiceInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// City named in the delivery-area rejection message.
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_service_name() -> String {
    "AquaFlow".to_string()
}

fn default_city() -> String {
    "Chennai".to_string()
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            city: default_city(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeliveryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Orders are accepted only for pincodes starting with this prefix.
    #[serde(default = "default_pincode_prefix")]
    pub pincode_prefix: String,
    #[serde(default = "default_pincode_len")]
    pub pincode_len: usize,
    #[serde(default = "default_phone_len")]
    pub phone_len: usize,
}

fn default_pincode_prefix() -> String {
    "600".to_string()
}

fn default_pincode_len() -> usize {
    6
}

fn default_phone_len() -> usize {
    10
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            pincode_prefix: default_pincode_prefix(),
            pincode_len: default_pincode_len(),
            phone_len: default_phone_len(),
        }
    }
}

// ---------------------------------------------------------------------------
// RateLimitSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Orders allowed per client within `order_window_ms`.
    #[serde(default = "default_order_limit")]
    pub order_limit: usize,
    #[serde(default = "default_order_window_ms")]
    pub order_window_ms: i64,
    /// Login/signup attempts allowed within `auth_window_ms`.
    #[serde(default = "default_auth_limit")]
    pub auth_limit: usize,
    #[serde(default = "default_auth_window_ms")]
    pub auth_window_ms: i64,
}

fn default_order_limit() -> usize {
    5
}

fn default_order_window_ms() -> i64 {
    600_000
}

fn default_auth_limit() -> usize {
    20
}

fn default_auth_window_ms() -> i64 {
    60_000
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            order_limit: default_order_limit(),
            order_window_ms: default_order_window_ms(),
            auth_limit: default_auth_limit(),
            auth_window_ms: default_auth_window_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServiceConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub service: ServiceInfo,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub limits: RateLimitSettings,
}

fn default_version() -> u32 {
    1
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self {
            version: 1,
            service: ServiceInfo::default(),
            delivery: DeliveryConfig::default(),
            limits: RateLimitSettings::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(AquaError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: ServiceConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.delivery.pincode_prefix.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "delivery.pincode_prefix is empty — every pincode would be accepted"
                    .to_string(),
            });
        } else if !self.delivery.pincode_prefix.chars().all(|c| c.is_ascii_digit()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "delivery.pincode_prefix '{}' contains non-digit characters",
                    self.delivery.pincode_prefix
                ),
            });
        } else if self.delivery.pincode_prefix.len() >= self.delivery.pincode_len {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "delivery.pincode_prefix '{}' is not shorter than pincode_len={}",
                    self.delivery.pincode_prefix, self.delivery.pincode_len
                ),
            });
        }

        if self.limits.order_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "limits.order_limit=0 rejects every order".to_string(),
            });
        }
        if self.limits.order_window_ms <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "limits.order_window_ms={} must be positive",
                    self.limits.order_window_ms
                ),
            });
        }
        if self.limits.auth_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "limits.auth_limit=0 locks out every login".to_string(),
            });
        }
        if self.limits.auth_window_ms <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "limits.auth_window_ms={} must be positive",
                    self.limits.auth_window_ms
                ),
            });
        }

        if self.delivery.phone_len != 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "delivery.phone_len={} (10-digit mobile numbers are the norm here)",
                    self.delivery.phone_len
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
