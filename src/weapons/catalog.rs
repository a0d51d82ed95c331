//! Weapon catalog - immutable weapon definitions keyed by identifier

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Identifier used when no prior weapon selection exists
pub const DEFAULT_WEAPON_ID: &str = "pistol";

/// Static weapon stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponDefinition {
    /// Catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// Minimum time between shots
    pub fire_interval_ms: u64,
    /// Damage per pellet
    pub damage_per_hit: f32,
    /// Independent damage instances per trigger pull
    #[serde(default = "default_pellet_count")]
    pub pellet_count: u32,
    /// Recoil added per shot
    #[serde(default)]
    pub recoil_impulse: f32,
    /// Magazine capacity
    pub max_ammo: u32,
    /// Pellet dispersion, 0 = perfectly accurate, 1 = widest cone
    #[serde(default)]
    pub spread_angle_fraction: f32,
    /// Area damage radius, `None` for direct-hit weapons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_radius: Option<f32>,
}

fn default_pellet_count() -> u32 {
    1
}

/// How a weapon's damage is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageModel {
    /// One hit per trigger pull
    Single,
    /// Several independent pellets per trigger pull
    Spread,
    /// Area damage at the impact point
    Splash,
}

impl WeaponDefinition {
    pub fn damage_model(&self) -> DamageModel {
        if self.splash_radius.is_some() {
            DamageModel::Splash
        } else if self.pellet_count > 1 {
            DamageModel::Spread
        } else {
            DamageModel::Single
        }
    }

    /// Check the invariants every catalog entry must hold
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidDefinition {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.is_empty() {
            return Err(invalid("empty identifier"));
        }
        if self.fire_interval_ms == 0 {
            return Err(invalid("fireIntervalMs must be positive"));
        }
        if !(self.damage_per_hit > 0.0) {
            return Err(invalid("damagePerHit must be positive"));
        }
        if self.max_ammo == 0 {
            return Err(invalid("maxAmmo must be positive"));
        }
        if self.pellet_count == 0 {
            return Err(invalid("pelletCount must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.spread_angle_fraction) {
            return Err(invalid("spreadAngleFraction must be within 0..1"));
        }
        if !(self.recoil_impulse >= 0.0) {
            return Err(invalid("recoilImpulse must not be negative"));
        }
        if let Some(radius) = self.splash_radius {
            if !(radius > 0.0) {
                return Err(invalid("splashRadius must be positive when set"));
            }
        }
        Ok(())
    }
}

/// Read-only weapon table, loaded once at startup
#[derive(Debug, Clone)]
pub struct WeaponCatalog {
    weapons: HashMap<String, Arc<WeaponDefinition>>,
    default_weapon: String,
}

impl WeaponCatalog {
    /// Build a catalog from definitions, validating each entry and the default id
    pub fn new(
        definitions: Vec<WeaponDefinition>,
        default_weapon: &str,
    ) -> Result<Self, CatalogError> {
        let mut weapons = HashMap::with_capacity(definitions.len());
        for def in definitions {
            def.validate()?;
            if weapons.contains_key(&def.id) {
                return Err(CatalogError::InvalidDefinition {
                    id: def.id,
                    reason: "duplicate identifier".to_string(),
                });
            }
            weapons.insert(def.id.clone(), Arc::new(def));
        }

        if !weapons.contains_key(default_weapon) {
            return Err(CatalogError::MissingDefault(default_weapon.to_string()));
        }

        info!(weapons = weapons.len(), default = default_weapon, "Weapon catalog loaded");

        Ok(Self {
            weapons,
            default_weapon: default_weapon.to_string(),
        })
    }

    /// The stock arsenal, checked like any other table
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_definitions(), DEFAULT_WEAPON_ID)
    }

    /// Parse a JSON array of weapon definitions
    pub fn from_json(json: &str, default_weapon: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<WeaponDefinition> = serde_json::from_str(json)?;
        Self::new(definitions, default_weapon)
    }

    /// Load a JSON weapon table from disk
    pub fn load(path: &Path, default_weapon: &str) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, default_weapon)
    }

    /// Look up a weapon definition
    pub fn lookup(&self, weapon_id: &str) -> Result<Arc<WeaponDefinition>, CatalogError> {
        self.weapons
            .get(weapon_id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownWeapon(weapon_id.to_string()))
    }

    pub fn contains(&self, weapon_id: &str) -> bool {
        self.weapons.contains_key(weapon_id)
    }

    /// Weapon used when no prior selection exists (always registered)
    pub fn default_weapon(&self) -> &str {
        &self.default_weapon
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.weapons.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

/// Stock weapon stats
fn builtin_definitions() -> Vec<WeaponDefinition> {
    vec![
        WeaponDefinition {
            id: "pistol".to_string(),
            name: "Pistol".to_string(),
            fire_interval_ms: 400,
            damage_per_hit: 15.0,
            pellet_count: 1,
            recoil_impulse: 0.1,
            max_ammo: 12,
            spread_angle_fraction: 0.02,
            splash_radius: None,
        },
        WeaponDefinition {
            id: "shotgun".to_string(),
            name: "Shotgun".to_string(),
            fire_interval_ms: 900,
            damage_per_hit: 7.0,
            pellet_count: 8,
            recoil_impulse: 0.45,
            max_ammo: 8,
            spread_angle_fraction: 0.3,
            splash_radius: None,
        },
        WeaponDefinition {
            id: "chaingun".to_string(),
            name: "Chaingun".to_string(),
            fire_interval_ms: 100,
            damage_per_hit: 10.0,
            pellet_count: 1,
            recoil_impulse: 0.06,
            max_ammo: 100,
            spread_angle_fraction: 0.08,
            splash_radius: None,
        },
        WeaponDefinition {
            id: "rocket_launcher".to_string(),
            name: "Rocket Launcher".to_string(),
            fire_interval_ms: 1_000,
            damage_per_hit: 80.0,
            pellet_count: 1,
            recoil_impulse: 0.6,
            max_ammo: 5,
            spread_angle_fraction: 0.0,
            splash_radius: Some(4.0),
        },
        WeaponDefinition {
            id: "plasma_rifle".to_string(),
            name: "Plasma Rifle".to_string(),
            fire_interval_ms: 120,
            damage_per_hit: 20.0,
            pellet_count: 1,
            recoil_impulse: 0.04,
            max_ammo: 50,
            spread_angle_fraction: 0.05,
            splash_radius: None,
        },
    ]
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Invalid weapon definition {id}: {reason}")]
    InvalidDefinition { id: String, reason: String },

    #[error("Default weapon {0} is not in the catalog")]
    MissingDefault(String),

    #[error("Failed to read weapon table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse weapon table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = WeaponCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 5);
        for id in catalog.ids() {
            catalog.lookup(id).unwrap().validate().unwrap();
        }
        assert!(catalog.contains(catalog.default_weapon()));
    }

    #[test]
    fn builtin_table_passes_the_same_checks_as_loaded_tables() {
        let definitions = builtin_definitions();
        for def in &definitions {
            def.validate().unwrap();
        }
        let catalog = WeaponCatalog::new(definitions, DEFAULT_WEAPON_ID).unwrap();
        assert_eq!(catalog.ids(), WeaponCatalog::builtin().unwrap().ids());
    }

    #[test]
    fn lookup_unknown_weapon_fails() {
        let catalog = WeaponCatalog::builtin().unwrap();
        let err = catalog.lookup("bfg").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownWeapon(id) if id == "bfg"));
    }

    #[test]
    fn damage_models_follow_optional_fields() {
        let catalog = WeaponCatalog::builtin().unwrap();
        assert_eq!(catalog.lookup("pistol").unwrap().damage_model(), DamageModel::Single);
        assert_eq!(catalog.lookup("shotgun").unwrap().damage_model(), DamageModel::Spread);
        assert_eq!(
            catalog.lookup("rocket_launcher").unwrap().damage_model(),
            DamageModel::Splash
        );
    }

    #[test]
    fn json_catalog_applies_defaults() {
        let json = r#"[
            {"id": "rail", "name": "Railgun", "fireIntervalMs": 1500,
             "damagePerHit": 100, "maxAmmo": 10},
            {"id": "nade", "name": "Grenade", "fireIntervalMs": 800,
             "damagePerHit": 60, "maxAmmo": 4, "splashRadius": 3.5}
        ]"#;
        let catalog = WeaponCatalog::from_json(json, "rail").unwrap();
        let rail = catalog.lookup("rail").unwrap();
        assert_eq!(rail.pellet_count, 1);
        assert_eq!(rail.spread_angle_fraction, 0.0);
        assert_eq!(catalog.lookup("nade").unwrap().splash_radius, Some(3.5));
        assert_eq!(catalog.default_weapon(), "rail");
    }

    #[test]
    fn json_catalog_rejects_zero_interval() {
        let json = r#"[{"id": "x", "name": "X", "fireIntervalMs": 0,
                        "damagePerHit": 1, "maxAmmo": 1}]"#;
        let err = WeaponCatalog::from_json(json, "x").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDefinition { .. }));
    }

    #[test]
    fn json_catalog_requires_default() {
        let json = r#"[{"id": "x", "name": "X", "fireIntervalMs": 10,
                        "damagePerHit": 1, "maxAmmo": 1}]"#;
        let err = WeaponCatalog::from_json(json, "pistol").unwrap_err();
        assert!(matches!(err, CatalogError::MissingDefault(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let pistol = WeaponCatalog::builtin().unwrap().lookup("pistol").unwrap();
        let err = WeaponCatalog::new(vec![(*pistol).clone(), (*pistol).clone()], "pistol")
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDefinition { reason, .. } if reason.contains("duplicate")));
    }

    #[test]
    fn spread_outside_unit_range_is_rejected() {
        let mut def = (*WeaponCatalog::builtin().unwrap().lookup("shotgun").unwrap()).clone();
        def.spread_angle_fraction = 1.5;
        assert!(def.validate().is_err());
    }
}
