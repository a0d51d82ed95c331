//! Weapon definitions, firing state machines and loadouts

pub mod catalog;
pub mod controller;
pub mod loadout;

pub use catalog::{CatalogError, DamageModel, WeaponCatalog, WeaponDefinition};
pub use controller::{
    Aim, FireEvent, FireOutcome, FireState, HitRequest, NotFiredReason, SplashRequest,
    WeaponController, WeaponRuntimeState,
};
pub use loadout::Loadout;
