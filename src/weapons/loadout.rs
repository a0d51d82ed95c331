//! Loadout - the weapons a player currently has equipped

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::catalog::{CatalogError, WeaponCatalog};
use super::controller::WeaponController;

/// Equipped weapon instances plus the active selection
pub struct Loadout {
    catalog: Arc<WeaponCatalog>,
    equipped: HashMap<String, WeaponController>,
    /// Equip order, used to pick a fallback when the active weapon is dropped
    order: Vec<String>,
    active: Option<String>,
    seed: u64,
}

impl Loadout {
    pub fn new(catalog: Arc<WeaponCatalog>, seed: u64) -> Self {
        Self {
            catalog,
            equipped: HashMap::new(),
            order: Vec::new(),
            active: None,
            seed,
        }
    }

    /// Loadout holding only the catalog default, selected
    pub fn with_default(catalog: Arc<WeaponCatalog>, seed: u64) -> Result<Self, CatalogError> {
        let default_id = catalog.default_weapon().to_string();
        let mut loadout = Self::new(catalog, seed);
        loadout.equip(&default_id)?;
        Ok(loadout)
    }

    /// Equip a weapon with fresh runtime state. Equipping twice keeps the
    /// existing instance. The first weapon equipped becomes active.
    pub fn equip(&mut self, weapon_id: &str) -> Result<(), CatalogError> {
        if self.equipped.contains_key(weapon_id) {
            return Ok(());
        }

        let definition = self.catalog.lookup(weapon_id)?;
        // Distinct spread stream per instance
        let seed = self.seed.wrapping_add(self.order.len() as u64);
        self.equipped
            .insert(weapon_id.to_string(), WeaponController::new(definition, seed));
        self.order.push(weapon_id.to_string());
        if self.active.is_none() {
            self.active = Some(weapon_id.to_string());
        }

        info!(weapon = weapon_id, "Weapon equipped");
        Ok(())
    }

    /// Drop a weapon and its runtime state
    pub fn unequip(&mut self, weapon_id: &str) -> Option<WeaponController> {
        let removed = self.equipped.remove(weapon_id)?;
        self.order.retain(|id| id != weapon_id);
        if self.active.as_deref() == Some(weapon_id) {
            self.active = self.order.first().cloned();
        }

        info!(weapon = weapon_id, "Weapon unequipped");
        Some(removed)
    }

    /// Switch the active weapon; unknown or unequipped ids fail
    pub fn select(&mut self, weapon_id: &str) -> Result<(), CatalogError> {
        if !self.equipped.contains_key(weapon_id) {
            return Err(CatalogError::UnknownWeapon(weapon_id.to_string()));
        }
        self.active = Some(weapon_id.to_string());
        Ok(())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&WeaponController> {
        self.active.as_ref().and_then(|id| self.equipped.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut WeaponController> {
        let id = self.active.as_ref()?;
        self.equipped.get_mut(id)
    }

    /// Weapon id in equip order at `slot`
    pub fn slot(&self, slot: usize) -> Option<&str> {
        self.order.get(slot).map(String::as_str)
    }

    /// Add ammo to an equipped weapon, returns rounds added
    pub fn resupply(&mut self, weapon_id: &str, amount: u32) -> Result<u32, CatalogError> {
        self.equipped
            .get_mut(weapon_id)
            .map(|weapon| weapon.resupply(amount))
            .ok_or_else(|| CatalogError::UnknownWeapon(weapon_id.to_string()))
    }

    /// Decay recoil on every equipped weapon
    pub fn decay_recoil(&mut self, delta_ms: u64) {
        for weapon in self.equipped.values_mut() {
            weapon.decay_recoil(delta_ms);
        }
    }

    pub fn len(&self) -> usize {
        self.equipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipped.is_empty()
    }
}
