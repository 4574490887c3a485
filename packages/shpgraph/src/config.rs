//! Translation settings
//!
//! `read_shp` / `write_shp` use `ShpConfig::default()`. The `_with` variants
//! accept an explicit config, built in code or loaded from YAML:
//!
//! ```rust
//! use shpgraph::ShpConfig;
//!
//! let config = ShpConfig::from_yaml_str("node_layer: stops\nwrite_attributes: false\n").unwrap();
//! assert_eq!(config.node_layer, "stops");
//! assert_eq!(config.edge_layer, "edges");
//! ```

use serde::{Deserialize, Serialize};

use crate::{Result, ShpError};

/// Widest DBF numeric column accepted
pub const MAX_NUMERIC_WIDTH: u8 = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShpConfig {
    /// Name of the point layer written
    pub node_layer: String,

    /// Name of the line-string layer written
    pub edge_layer: String,

    /// Write node/edge attributes as DBF fields
    pub write_attributes: bool,

    /// DBF numeric column width
    pub numeric_width: u8,

    /// DBF numeric decimal places
    pub numeric_decimals: u8,
}

impl Default for ShpConfig {
    fn default() -> Self {
        Self {
            node_layer: "nodes".to_string(),
            edge_layer: "edges".to_string(),
            write_attributes: true,
            numeric_width: 24,
            numeric_decimals: 15,
        }
    }
}

impl ShpConfig {
    pub fn node_layer(mut self, name: impl Into<String>) -> Self {
        self.node_layer = name.into();
        self
    }

    pub fn edge_layer(mut self, name: impl Into<String>) -> Self {
        self.edge_layer = name.into();
        self
    }

    pub fn write_attributes(mut self, enabled: bool) -> Self {
        self.write_attributes = enabled;
        self
    }

    pub fn numeric(mut self, width: u8, decimals: u8) -> Self {
        self.numeric_width = width;
        self.numeric_decimals = decimals;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ShpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_layer.trim().is_empty() || self.edge_layer.trim().is_empty() {
            return Err(ShpError::config("Layer names must not be empty"));
        }
        if self.node_layer == self.edge_layer {
            return Err(ShpError::config(format!(
                "Node and edge layers share the name '{}'",
                self.node_layer
            )));
        }
        if self.numeric_width == 0 || self.numeric_width > MAX_NUMERIC_WIDTH {
            return Err(ShpError::config(format!(
                "numeric_width {} not in 1..={}",
                self.numeric_width, MAX_NUMERIC_WIDTH
            )));
        }
        // one byte for the decimal point
        if self.numeric_decimals > 0 && self.numeric_decimals >= self.numeric_width - 1 {
            return Err(ShpError::config(format!(
                "numeric_decimals {} does not fit in width {}",
                self.numeric_decimals, self.numeric_width
            )));
        }
        Ok(())
    }
}
