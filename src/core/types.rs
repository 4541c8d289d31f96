//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for actors (arena index into the actor registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Synthetic source for world-level events (migration, collapse) that no
/// single actor caused.
pub const SYSTEM_ACTOR: ActorId = ActorId(u32::MAX);

/// Unique identifier for legacy records (arena index into the legacy arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegacyId(pub u32);

impl LegacyId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for settlement nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// World-age epoch for chronicle timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    Ancient,
    Middle,
    Recent,
}

/// Narrative game time carried by chronicle entries.
///
/// The chronicle never reads wall time; this timestamp is injected and
/// advanced by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTimestamp {
    pub era: Era,
    /// In-world year or major story arc, 1-indexed
    pub cycle: u32,
    /// In-world turn number within the cycle, 1-indexed
    pub tick: Tick,
}

impl GameTimestamp {
    pub fn new(era: Era, cycle: u32, tick: Tick) -> Self {
        Self { era, cycle, tick }
    }

    /// Return a new timestamp with tick incremented by 1
    pub fn advance_tick(&self) -> Self {
        Self { era: self.era, cycle: self.cycle, tick: self.tick + 1 }
    }
}

impl Default for GameTimestamp {
    fn default() -> Self {
        Self::new(Era::Recent, 1, 1)
    }
}

/// Integer grid position on the dungeon map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance between two grid positions
    pub fn distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_equality() {
        let a = ActorId(1);
        let b = ActorId(1);
        let c = ActorId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_actor_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<ActorId, &str> = HashMap::new();
        map.insert(ActorId(1), "hero");
        assert_eq!(map.get(&ActorId(1)), Some(&"hero"));
    }

    #[test]
    fn test_timestamp_advance() {
        let ts = GameTimestamp::new(Era::Recent, 1, 1);
        let next = ts.advance_tick();
        assert_eq!(next.tick, 2);
        assert_eq!(next.cycle, 1);
        assert_eq!(next.era, Era::Recent);
    }

    #[test]
    fn test_grid_distance_is_chebyshev() {
        let a = GridPos::new(0, 0);
        assert_eq!(a.distance(&GridPos::new(3, 1)), 3);
        assert_eq!(a.distance(&GridPos::new(2, 2)), 2);
        assert_eq!(a.distance(&GridPos::new(0, 0)), 0);
        assert_eq!(a.distance(&GridPos::new(-4, 2)), 4);
    }
}
