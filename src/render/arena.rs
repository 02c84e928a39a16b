use crate::foundation::error::{StrataError, StrataResult};
use crate::surface::buffer::Surface;

/// Generation-checked handle to a surface slot in a [`SurfaceArena`].
///
/// Two tasks holding equal ids write into the same buffer. A handle whose
/// slot was released and reused no longer resolves.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct SurfaceId {
    index: u32,
    generation: u32,
}

impl SurfaceId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
enum SlotState {
    Free,
    Ready(Surface),
    /// Checked out for writing; the buffer comes back through `restore`.
    Taken,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    temporary: bool,
    state: SlotState,
}

/// Arena counters, mirrored into render stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub live: usize,
    pub allocated: u64,
    pub released: u64,
}

/// Owner of every surface a render touches.
///
/// Surfaces are either *temporary* (scratch the optimizer may alias or
/// overwrite) or *persistent* (caller-owned output and source images).
#[derive(Debug)]
pub struct SurfaceArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    max_pixels: usize,
    stats: ArenaStats,
}

impl Default for SurfaceArena {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceArena {
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Arena refusing allocations above `max_pixels` pixels.
    pub fn with_limit(max_pixels: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            max_pixels,
            stats: ArenaStats::default(),
        }
    }

    pub fn max_pixels(&self) -> usize {
        self.max_pixels
    }

    pub fn set_max_pixels(&mut self, max_pixels: usize) {
        self.max_pixels = max_pixels;
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Allocate a transparent `width x height` surface.
    pub fn alloc(&mut self, width: usize, height: usize, temporary: bool) -> StrataResult<SurfaceId> {
        let surface = Surface::with_limit(width, height, self.max_pixels)?;
        self.stats.allocated = self.stats.allocated.saturating_add(1);
        Ok(self.insert(surface, temporary))
    }

    /// Take ownership of an existing surface.
    pub fn insert(&mut self, surface: Surface, temporary: bool) -> SurfaceId {
        self.stats.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.temporary = temporary;
            slot.state = SlotState::Ready(surface);
            return SurfaceId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            temporary,
            state: SlotState::Ready(surface),
        });
        SurfaceId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: SurfaceId) -> StrataResult<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation && !matches!(s.state, SlotState::Free))
            .ok_or_else(|| StrataError::StaleSurface(id.to_string()))
    }

    fn slot_mut(&mut self, id: SurfaceId) -> StrataResult<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && !matches!(s.state, SlotState::Free))
            .ok_or_else(|| StrataError::StaleSurface(id.to_string()))
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.slot(id).is_ok()
    }

    pub fn get(&self, id: SurfaceId) -> StrataResult<&Surface> {
        match &self.slot(id)?.state {
            SlotState::Ready(s) => Ok(s),
            _ => Err(StrataError::execution(format!("surface {id} is busy"))),
        }
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> StrataResult<&mut Surface> {
        match &mut self.slot_mut(id)?.state {
            SlotState::Ready(s) => Ok(s),
            _ => Err(StrataError::execution(format!("surface {id} is busy"))),
        }
    }

    /// False for persistent and for stale handles.
    pub fn is_temporary(&self, id: SurfaceId) -> bool {
        self.slot(id).map(|s| s.temporary).unwrap_or(false)
    }

    /// Check a surface out for exclusive writing.
    pub fn take(&mut self, id: SurfaceId) -> StrataResult<Surface> {
        let slot = self.slot_mut(id)?;
        match std::mem::replace(&mut slot.state, SlotState::Taken) {
            SlotState::Ready(s) => Ok(s),
            other => {
                slot.state = other;
                Err(StrataError::execution(format!("surface {id} is busy")))
            }
        }
    }

    /// Return a surface checked out with [`SurfaceArena::take`].
    pub fn restore(&mut self, id: SurfaceId, surface: Surface) -> StrataResult<()> {
        let slot = self.slot_mut(id)?;
        if !matches!(slot.state, SlotState::Taken) {
            return Err(StrataError::execution(format!(
                "surface {id} was not checked out"
            )));
        }
        slot.state = SlotState::Ready(surface);
        Ok(())
    }

    /// Free the slot and hand back its surface. Every outstanding id for the
    /// slot becomes stale.
    pub fn release(&mut self, id: SurfaceId) -> StrataResult<Option<Surface>> {
        let slot = self.slot_mut(id)?;
        let state = std::mem::replace(&mut slot.state, SlotState::Free);
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.stats.live = self.stats.live.saturating_sub(1);
        self.stats.released = self.stats.released.saturating_add(1);
        Ok(match state {
            SlotState::Ready(s) => Some(s),
            _ => None,
        })
    }

    /// Remove the surface, leaving the slot free.
    pub fn remove(&mut self, id: SurfaceId) -> StrataResult<Surface> {
        self.get(id)?;
        self.release(id)?
            .ok_or_else(|| StrataError::execution(format!("surface {id} is busy")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/arena.rs"]
mod tests;
