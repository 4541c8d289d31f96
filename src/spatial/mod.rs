//! Spatial positions and distance queries
//!
//! Conduction and retirement grief only need read access, expressed through
//! [`SpatialView`]. The engine's own [`GridMap`] is the reference
//! implementation; a host with its own map can provide another.

use ahash::AHashMap;

use crate::core::types::{ActorId, GridPos};

/// Read-only spatial queries. Distances are Chebyshev tiles.
pub trait SpatialView {
    fn position(&self, actor: ActorId) -> Option<GridPos>;

    fn distance(&self, a: ActorId, b: ActorId) -> Option<u32> {
        Some(self.position(a)?.distance(&self.position(b)?))
    }

    /// Actors within `range` tiles of `center`, excluding `center` itself.
    fn actors_within(&self, center: ActorId, range: u32) -> Vec<ActorId>;
}

/// Flat dungeon-floor grid keyed by actor.
#[derive(Debug, Default)]
pub struct GridMap {
    positions: AHashMap<ActorId, GridPos>,
}

impl GridMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, actor: ActorId, pos: GridPos) {
        self.positions.insert(actor, pos);
    }

    pub fn remove(&mut self, actor: ActorId) {
        self.positions.remove(&actor);
    }

    /// Shift an actor by a delta. Unplaced actors stay unplaced.
    pub fn shift(&mut self, actor: ActorId, dx: i32, dy: i32) {
        if let Some(pos) = self.positions.get_mut(&actor) {
            *pos = pos.offset(dx, dy);
        }
    }
}

impl SpatialView for GridMap {
    fn position(&self, actor: ActorId) -> Option<GridPos> {
        self.positions.get(&actor).copied()
    }

    fn actors_within(&self, center: ActorId, range: u32) -> Vec<ActorId> {
        let Some(origin) = self.position(center) else {
            return Vec::new();
        };
        let mut found: Vec<ActorId> = self
            .positions
            .iter()
            .filter(|(id, pos)| **id != center && origin.distance(pos) <= range)
            .map(|(id, _)| *id)
            .collect();
        // deterministic order for dispatch
        found.sort_by_key(|id| id.0);
        found
    }
}
