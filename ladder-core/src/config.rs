//! Configuration types

use crate::error::{ConfigError, LadderError, LadderResult};
use crate::identity::Position;
use serde::{Deserialize, Serialize};

/// Configuration for reorder operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderConfig {
    /// Position assigned to the first record of an empty partition
    pub baseline_position: Position,
    /// Request parameter holding the record id
    pub id_param: String,
    /// Request parameter holding the move direction
    pub direction_param: String,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            baseline_position: 1,
            id_param: "id".to_string(),
            direction_param: "direction".to_string(),
        }
    }
}

impl ReorderConfig {
    /// Set the empty-partition baseline position.
    pub fn with_baseline_position(mut self, position: Position) -> Self {
        self.baseline_position = position;
        self
    }

    /// Set the record id parameter name.
    pub fn with_id_param(mut self, name: impl Into<String>) -> Self {
        self.id_param = name.into();
        self
    }

    /// Set the direction parameter name.
    pub fn with_direction_param(mut self, name: impl Into<String>) -> Self {
        self.direction_param = name.into();
        self
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(LadderError::Config) if invalid.
    ///
    /// Validates:
    /// - id_param is non-empty
    /// - direction_param is non-empty
    /// - the two parameter names differ
    pub fn validate(&self) -> LadderResult<()> {
        if self.id_param.is_empty() {
            return Err(LadderError::Config(ConfigError::InvalidValue {
                field: "id_param".to_string(),
                value: self.id_param.clone(),
                reason: "id_param must not be empty".to_string(),
            }));
        }

        if self.direction_param.is_empty() {
            return Err(LadderError::Config(ConfigError::InvalidValue {
                field: "direction_param".to_string(),
                value: self.direction_param.clone(),
                reason: "direction_param must not be empty".to_string(),
            }));
        }

        if self.id_param == self.direction_param {
            return Err(LadderError::Config(ConfigError::InvalidValue {
                field: "direction_param".to_string(),
                value: self.direction_param.clone(),
                reason: "direction_param must differ from id_param".to_string(),
            }));
        }

        Ok(())
    }
}
