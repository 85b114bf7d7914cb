use std::sync::Mutex;

use time::OffsetDateTime;

use crate::error::{StateError, StateResult};

/// Capacity of the client registry (§3, §6).
pub const CAPACITY: usize = 100;

/// A weak reference to a client slot: the slot index plus the generation
/// counter observed at the time the reference was taken. Resolved under
/// the registry's mutex at use time, never held across a suspension point
/// (§9 "Cyclic ownership").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub index: usize,
    pub generation: u64,
}

/// One occupied client record. `handle` is the transport-specific type the
/// server crate stores here (e.g. a cloned `TcpStream` used to shut down
/// the connection from another thread); `state` stays transport-agnostic
/// by being generic over it.
struct Occupied<H> {
    handle: H,
    peer_addr: String,
    connected_at: OffsetDateTime,
    last_activity: OffsetDateTime,
    generation: u64,
}

/// Fixed-capacity table of active client connections (§3 "Client record").
///
/// Invariant: at most one active record per transport handle; inactive
/// slots hold `None`. Each occupied slot carries a generation counter so
/// stale [`SlotHandle`]s (e.g. held by a job that outlives its client) are
/// detected rather than silently resolving to a reused slot.
pub struct ClientRegistry<H> {
    slots: Mutex<Vec<Option<Occupied<H>>>>,
}

impl<H> Default for ClientRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ClientRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(CAPACITY);
        slots.resize_with(CAPACITY, || None);
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Registers a newly accepted connection in the first free slot.
    ///
    /// # Errors
    /// Returns [`StateError::NoFreeClientSlot`] when all 100 slots are
    /// occupied; the caller replies `WARNING Maximum clients reached` and
    /// closes the connection without touching `active_connections` (§4.5).
    pub fn register(&self, handle: H, peer_addr: String) -> StateResult<SlotHandle> {
        let mut slots = self.slots.lock().expect("client registry mutex poisoned");
        let index = slots
            .iter()
            .position(Option::is_none)
            .ok_or(StateError::NoFreeClientSlot)?;
        let generation = slots[index]
            .as_ref()
            .map_or(0, |occupied| occupied.generation.wrapping_add(1));
        let now = OffsetDateTime::now_utc();
        slots[index] = Some(Occupied {
            handle,
            peer_addr,
            connected_at: now,
            last_activity: now,
            generation,
        });
        Ok(SlotHandle { index, generation })
    }

    /// Clears a slot, making it eligible for reuse. A stale `handle` (wrong
    /// generation) is silently ignored, matching "resolved under the
    /// clients mutex at use time" in §9.
    pub fn release(&self, handle: SlotHandle) {
        let mut slots = self.slots.lock().expect("client registry mutex poisoned");
        if let Some(slot) = slots.get_mut(handle.index).and_then(Option::as_mut) {
            if slot.generation == handle.generation {
                slots[handle.index] = None;
            }
        }
    }

    /// Updates the last-activity timestamp for a still-live slot.
    pub fn touch(&self, handle: SlotHandle) {
        let mut slots = self.slots.lock().expect("client registry mutex poisoned");
        if let Some(slot) = slots.get_mut(handle.index).and_then(Option::as_mut) {
            if slot.generation == handle.generation {
                slot.last_activity = OffsetDateTime::now_utc();
            }
        }
    }

    /// Number of currently occupied slots.
    #[must_use]
    pub fn active_count(&self) -> usize {
        let slots = self.slots.lock().expect("client registry mutex poisoned");
        slots.iter().filter(|s| s.is_some()).count()
    }

    /// Peer addresses of every slot whose string matches `ip`, used by
    /// `DISCONNECT_CLIENT` (§4.2).
    #[must_use]
    pub fn handles_matching_ip(&self, ip: &str) -> Vec<SlotHandle> {
        let slots = self.slots.lock().expect("client registry mutex poisoned");
        slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let slot = slot.as_ref()?;
                (slot.peer_addr == ip || slot.peer_addr.starts_with(&format!("{ip}:"))).then_some(SlotHandle {
                    index,
                    generation: slot.generation,
                })
            })
            .collect()
    }

    /// Runs `f` with the transport handle of every still-live slot, then
    /// clears the registry. Used by the supervisor at shutdown to close all
    /// active connections (§4.8).
    pub fn drain(&self, mut f: impl FnMut(&H)) {
        let mut slots = self.slots.lock().expect("client registry mutex poisoned");
        for slot in slots.iter() {
            if let Some(slot) = slot {
                f(&slot.handle);
            }
        }
        for slot in slots.iter_mut() {
            *slot = None;
        }
    }

    /// Borrows the transport handle of a still-live slot, if the generation
    /// still matches.
    pub fn with_handle<R>(&self, handle: SlotHandle, f: impl FnOnce(&H) -> R) -> Option<R> {
        let slots = self.slots.lock().expect("client registry mutex poisoned");
        slots
            .get(handle.index)
            .and_then(Option::as_ref)
            .filter(|slot| slot.generation == handle.generation)
            .map(|slot| f(&slot.handle))
    }

    #[must_use]
    pub fn connected_at(&self, handle: SlotHandle) -> Option<OffsetDateTime> {
        let slots = self.slots.lock().expect("client registry mutex poisoned");
        slots
            .get(handle.index)
            .and_then(Option::as_ref)
            .filter(|slot| slot.generation == handle.generation)
            .map(|slot| slot.connected_at)
    }
}
