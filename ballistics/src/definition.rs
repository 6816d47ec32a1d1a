use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{BallisticsError, Result};

// ============================================================================
// Projectile Definitions
// ============================================================================

// Immutable template for a primary projectile. Dimensions are in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDefinition {
    pub key: String,
    pub material: String,
    pub diameter_mm: f32,
    pub length_mm: f32,
    pub muzzle_velocity: f32, // meters per second
}

impl ProjectileDefinition {
    #[must_use]
    pub fn new(key: &str, material: &str, diameter_mm: f32, length_mm: f32, muzzle_velocity: f32) -> Self {
        Self {
            key: key.to_string(),
            material: material.to_string(),
            diameter_mm,
            length_mm,
            muzzle_velocity,
        }
    }

    #[must_use]
    pub fn diameter(&self) -> f32 {
        self.diameter_mm / 1000.0
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.length_mm / 1000.0
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            ("diameter_mm", self.diameter_mm),
            ("length_mm", self.length_mm),
            ("muzzle_velocity", self.muzzle_velocity),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(BallisticsError::InvalidDefinition {
                    key: self.key.clone(),
                    reason: format!("{field} must be a positive finite number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionTable {
    pub default: String,
    pub definitions: Vec<ProjectileDefinition>,
}

pub const DEFAULT_DEFINITION: &str = "AP_76mm";

// ============================================================================
// Definition Registry
// ============================================================================

#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    definitions: Vec<ProjectileDefinition>,
    by_key: HashMap<String, usize>,
    default: usize,
}

impl DefinitionRegistry {
    /// Built-in shells. Unknown keys resolve to `AP_76mm`.
    #[must_use]
    pub fn builtin() -> Self {
        let definitions = vec![
            ProjectileDefinition::new("AP_76mm", "HighCarbonSteel", 76.2, 355.0, 792.0),
            ProjectileDefinition::new("APCBC_75mm", "HighCarbonSteel", 75.0, 300.0, 770.0),
            ProjectileDefinition::new("HVAP_76mm", "Tungsten", 38.0, 180.0, 1036.0),
            ProjectileDefinition::new("APDS_57mm", "Tungsten", 30.0, 150.0, 1200.0),
            ProjectileDefinition::new("AP_37mm", "HighCarbonSteel", 37.0, 150.0, 880.0),
            ProjectileDefinition::new("Ball_12_7mm", "MildSteel", 12.7, 58.0, 890.0),
            ProjectileDefinition::new("Ball_7_62mm", "MildSteel", 7.62, 32.0, 850.0),
        ];

        let table = DefinitionTable {
            default: DEFAULT_DEFINITION.to_string(),
            definitions,
        };

        match Self::from_table(table) {
            Ok(registry) => registry,
            Err(err) => unreachable!("built-in definition table is invalid: {err}"),
        }
    }

    pub fn from_table(table: DefinitionTable) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(table.definitions.len());

        for (index, definition) in table.definitions.iter().enumerate() {
            definition.validate()?;
            if by_key.insert(definition.key.clone(), index).is_some() {
                return Err(BallisticsError::DuplicateKey(definition.key.clone()));
            }
        }

        let default = *by_key
            .get(&table.default)
            .ok_or_else(|| BallisticsError::DefinitionNotFound(table.default.clone()))?;

        info!("loaded {} projectile definitions", table.definitions.len());

        Ok(Self {
            definitions: table.definitions,
            by_key,
            default,
        })
    }

    pub fn get(&self, key: &str) -> Result<&ProjectileDefinition> {
        self.by_key
            .get(key)
            .map(|&index| &self.definitions[index])
            .ok_or_else(|| BallisticsError::DefinitionNotFound(key.to_string()))
    }

    #[must_use]
    pub fn get_or_default(&self, key: &str) -> &ProjectileDefinition {
        self.get(key).unwrap_or_else(|err| {
            let fallback = self.default_definition();
            warn!("{err}, falling back to {}", fallback.key);
            fallback
        })
    }

    #[must_use]
    pub fn default_definition(&self) -> &ProjectileDefinition {
        &self.definitions[self.default]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectileDefinition> {
        self.definitions.iter()
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimeters_convert_to_meters() {
        let definition = ProjectileDefinition::new("t", "MildSteel", 76.2, 355.0, 792.0);
        assert!((definition.diameter() - 0.0762).abs() < 1e-6);
        assert!((definition.length() - 0.355).abs() < 1e-6);
    }

    #[test]
    fn missing_definition_falls_back_to_default() {
        let registry = DefinitionRegistry::builtin();
        assert!(matches!(
            registry.get("Nope"),
            Err(BallisticsError::DefinitionNotFound(_))
        ));
        assert_eq!(registry.get_or_default("Nope").key, DEFAULT_DEFINITION);
    }

    #[test]
    fn zero_velocity_is_rejected() {
        let table = DefinitionTable {
            default: "dud".to_string(),
            definitions: vec![ProjectileDefinition::new("dud", "MildSteel", 10.0, 20.0, 0.0)],
        };
        assert!(matches!(
            DefinitionRegistry::from_table(table),
            Err(BallisticsError::InvalidDefinition { .. })
        ));
    }
}
