//! Shared input state - one instance per process, handed to every consumer

use std::sync::Arc;

use parking_lot::RwLock;

use crate::weapons::Aim;

/// Control flags written by the input sampler each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub sprint: bool,
    /// Trigger held
    pub fire: bool,
    pub pointer_locked: bool,
    pub aim: Aim,
    /// Weapon slot requested by a number key, consumed by the game loop
    pub weapon_slot: Option<u8>,
}

/// Handle to the process-wide input state.
///
/// Clones share the same instance. `reset` rewrites fields in place, so a
/// handle taken before a reset observes the defaults afterwards. Each call
/// locks on its own; multi-field reads through separate calls are not atomic.
#[derive(Clone, Default)]
pub struct SharedGameState {
    inner: Arc<RwLock<InputState>>,
}

impl SharedGameState {
    /// Construct once at startup and pass clones to every consumer
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle to the same instance
    pub fn current(&self) -> SharedGameState {
        self.clone()
    }

    /// True when both handles point at the same instance
    pub fn ptr_eq(&self, other: &SharedGameState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the current flags
    pub fn snapshot(&self) -> InputState {
        *self.inner.read()
    }

    /// Mutate fields in place
    pub fn update<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }

    /// Take the pending weapon slot request, if any
    pub fn take_weapon_slot(&self) -> Option<u8> {
        self.inner.write().weapon_slot.take()
    }

    /// Restore every field to its default without replacing the instance
    pub fn reset(&self) {
        *self.inner.write() = InputState::default();
    }
}

impl std::fmt::Debug for SharedGameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedGameState")
            .field(&self.snapshot())
            .finish()
    }
}
