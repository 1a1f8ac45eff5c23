//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of open rooms at any time.
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { capacity: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        assert_eq!(RegistryConfig::default().capacity, 5);
    }
}
