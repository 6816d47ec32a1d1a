use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::{BallisticsError, Result},
    projectile::ProjectileState,
};

// ============================================================================
// Recycle Pool
// ============================================================================

// Objects that can be reset to a blank state before going back into a pool.
pub trait Recycle: Default {
    fn recycle(&mut self);
}

/// Bounded free list of reusable objects.
///
/// `acquire` hands out a recycled object when one is available and allocates otherwise;
/// `release` keeps the object only while the free list is below capacity.
#[derive(Debug)]
pub struct Pool<T> {
    available: Vec<T>,
    capacity: usize,
    allocated: u64,
    reused: u64,
    discarded: u64,
}

impl<T: Recycle> Pool<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            available: Vec::with_capacity(capacity.min(1024)),
            capacity,
            allocated: 0,
            reused: 0,
            discarded: 0,
        }
    }

    pub fn acquire(&mut self) -> T {
        if let Some(item) = self.available.pop() {
            self.reused += 1;
            item
        } else {
            self.allocated += 1;
            T::default()
        }
    }

    pub fn release(&mut self, mut item: T) {
        if self.available.len() < self.capacity {
            item.recycle();
            self.available.push(item);
        } else {
            self.discarded += 1;
        }
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated,
            reused: self.reused,
            discarded: self.discarded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub allocated: u64,
    pub reused: u64,
    pub discarded: u64,
}

// ============================================================================
// Projectile Handles
// ============================================================================

/// Generational reference to a live projectile. Stale handles never alias a reused slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileHandle {
    index: u32,
    generation: u32,
}

impl ProjectileHandle {
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ProjectileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for ProjectileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Projectile Registry
// ============================================================================

struct Slot {
    generation: u32,
    state: Option<ProjectileState>,
}

/// Slot arena holding every live projectile, backed by a recycle pool of states.
pub struct ProjectileRegistry {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    pool: Pool<ProjectileState>,
    live: usize,
    max_live: usize,
}

impl ProjectileRegistry {
    #[must_use]
    pub fn new(max_live: usize, pool_capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            pool: Pool::new(pool_capacity),
            live: 0,
            max_live,
        }
    }

    /// Take a state from the pool (or allocate one), initialize it and place it in a slot.
    pub fn spawn(&mut self, init: impl FnOnce(&mut ProjectileState)) -> Result<ProjectileHandle> {
        if self.live >= self.max_live {
            return Err(BallisticsError::CapacityExceeded {
                live: self.live,
                cap: self.max_live,
            });
        }

        let mut state = self.pool.acquire();
        init(&mut state);

        // Most recently freed slot first
        let index = if let Some(index) = self.free_slots.pop() {
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                state: None,
            });
            (self.slots.len() - 1) as u32
        };

        let slot = &mut self.slots[index as usize];
        slot.state = Some(state);
        self.live += 1;

        Ok(ProjectileHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Remove the projectile and return its state to the pool.
    ///
    /// The state's trail is handed back to the caller, since it outlives the projectile.
    pub fn despawn(&mut self, handle: ProjectileHandle) -> Result<ProjectileState> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(BallisticsError::UnknownHandle(handle))?;
        let mut state = slot.state.take().ok_or(BallisticsError::UnknownHandle(handle))?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);
        self.live -= 1;

        let snapshot = ProjectileState {
            trail: state.trail.take(),
            ..state.clone()
        };
        self.pool.release(state);
        Ok(snapshot)
    }

    #[must_use]
    pub fn get(&self, handle: ProjectileHandle) -> Option<&ProjectileState> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.state.as_ref())
    }

    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut ProjectileState> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.state.as_mut())
    }

    #[must_use]
    pub fn contains(&self, handle: ProjectileHandle) -> bool {
        self.get(handle).is_some()
    }

    // Live handles in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<ProjectileHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state.is_some())
            .map(|(index, slot)| ProjectileHandle {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn max_live(&self) -> usize {
        self.max_live
    }

    #[must_use]
    pub fn pool_available(&self) -> usize {
        self.pool.available()
    }

    #[must_use]
    pub const fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
