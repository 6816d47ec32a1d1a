use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{BallisticsError, Result};

// ============================================================================
// Material Data
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Metal,
    Ceramic,
    Composite,
    Polymer,
    Organic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub category: MaterialCategory,
    pub hardness: f32,          // Mohs-like scalar
    pub density: f32,           // kg/m^3
    pub impact_resistance: f32, // J/cm^2
}

impl Material {
    #[must_use]
    pub fn new(name: &str, category: MaterialCategory, hardness: f32, density: f32, impact_resistance: f32) -> Self {
        Self {
            name: name.to_string(),
            category,
            hardness,
            density,
            impact_resistance,
        }
    }

    // min(impactResistance / resistanceFactor / hardness, 1) * hardness * multiplier
    #[must_use]
    pub fn toughness_coefficient(&self, resistance_factor: f32, multiplier: f32) -> f32 {
        let brittleness = (self.impact_resistance / resistance_factor / self.hardness).min(1.0);
        brittleness * self.hardness * multiplier
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            ("hardness", self.hardness),
            ("density", self.density),
            ("impact_resistance", self.impact_resistance),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(BallisticsError::InvalidMaterial {
                    key: self.name.clone(),
                    reason: format!("{field} must be a positive finite number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

// Free-function form used by the resolver and tests.
#[must_use]
pub fn toughness_coefficient(material: &Material, resistance_factor: f32, multiplier: f32) -> f32 {
    material.toughness_coefficient(resistance_factor, multiplier)
}

// ============================================================================
// Material Registry
// ============================================================================

/// Index of a material inside a [`MaterialRegistry`]. Only the registry hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) u16);

/// Serialized form of a material table, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTable {
    pub default: String,
    pub materials: Vec<Material>,
}

pub const DEFAULT_MATERIAL: &str = "MildSteel";

#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
    default: MaterialId,
}

impl MaterialRegistry {
    /// Built-in table. Unknown keys resolve to `MildSteel`.
    #[must_use]
    pub fn builtin() -> Self {
        use MaterialCategory::*;

        let materials = vec![
            Material::new("MildSteel", Metal, 4.0, 7850.0, 100.0),
            Material::new("HighCarbonSteel", Metal, 6.5, 7800.0, 120.0),
            Material::new("RolledHomogeneousArmor", Metal, 5.5, 7850.0, 150.0),
            Material::new("Aluminium", Metal, 2.75, 2700.0, 40.0),
            Material::new("Titanium", Metal, 6.0, 4500.0, 90.0),
            Material::new("Tungsten", Metal, 7.5, 19300.0, 60.0),
            Material::new("Alumina", Ceramic, 9.0, 3950.0, 8.0),
            Material::new("SiliconCarbide", Ceramic, 9.5, 3210.0, 6.0),
            Material::new("Concrete", Ceramic, 5.0, 2400.0, 3.0),
            Material::new("Aramid", Composite, 3.0, 1440.0, 80.0),
            Material::new("Fiberglass", Composite, 3.5, 1900.0, 30.0),
            Material::new("Polyethylene", Polymer, 2.0, 950.0, 50.0),
            Material::new("Rubber", Polymer, 1.0, 1100.0, 70.0),
            Material::new("Wood", Organic, 2.5, 700.0, 15.0),
            Material::new("Sandbag", Organic, 2.0, 1600.0, 5.0),
        ];

        let table = MaterialTable {
            default: DEFAULT_MATERIAL.to_string(),
            materials,
        };

        match Self::from_table(table) {
            Ok(registry) => registry,
            Err(err) => unreachable!("built-in material table is invalid: {err}"),
        }
    }

    /// Validate a table and build the registry from it.
    pub fn from_table(table: MaterialTable) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(table.materials.len());

        for (index, material) in table.materials.iter().enumerate() {
            material.validate()?;
            let id = u16::try_from(index).map_err(|_| BallisticsError::InvalidMaterial {
                key: material.name.clone(),
                reason: "material table exceeds u16::MAX entries".to_string(),
            })?;
            if by_name.insert(material.name.clone(), MaterialId(id)).is_some() {
                return Err(BallisticsError::DuplicateKey(material.name.clone()));
            }
        }

        let default = *by_name
            .get(&table.default)
            .ok_or_else(|| BallisticsError::MaterialNotFound(table.default.clone()))?;

        info!(
            "loaded {} materials (default {})",
            table.materials.len(),
            table.default
        );

        Ok(Self {
            materials: table.materials,
            by_name,
            default,
        })
    }

    pub fn lookup(&self, key: &str) -> Result<MaterialId> {
        self.by_name
            .get(key)
            .copied()
            .ok_or_else(|| BallisticsError::MaterialNotFound(key.to_string()))
    }

    // Lookup that never fails: unknown keys fall back to the registry default.
    #[must_use]
    pub fn resolve(&self, key: &str) -> MaterialId {
        self.lookup(key).unwrap_or_else(|err| {
            warn!("{err}, falling back to {}", self.get(self.default).name);
            self.default
        })
    }

    #[must_use]
    pub fn get(&self, id: MaterialId) -> &Material {
        &self.materials[usize::from(id.0)]
    }

    #[must_use]
    pub const fn default_id(&self) -> MaterialId {
        self.default
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(index, material)| (MaterialId(index as u16), material))
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
