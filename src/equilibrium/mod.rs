//! Equilibrium: settlement vitality, migration, retirement into legend
//!
//! Vitality is a pure function of the living population and the chronicle's
//! recent death trend. It is computed on demand every time and stored
//! nowhere; there is no vitality field to go stale.

pub mod legacy;

pub use legacy::{LegacyArena, LegacyRecord, RetirementCause};

use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

use crate::actor::ActorRegistry;
use crate::chronicle::ChronicleReader;
use crate::core::config::EquilibriumConfig;
use crate::core::error::Result;
use crate::core::types::{ActorId, LegacyId, NodeId, Tick, SYSTEM_ACTOR};
use crate::events::{EventBus, EventEnvelope, EventKey};
use crate::social::SocialEngine;
use crate::spatial::{GridMap, SpatialView};
use crate::territory::TerritoryGraph;

pub const CAUSE_RETIREMENT_GRIEF: &str = "retirement_grief";

/// Vitality in [-1, 1] from population and death trend.
pub fn vitality_score(living: usize, recent_deaths: usize, config: &EquilibriumConfig) -> f64 {
    let baseline = config.vitality_baseline_population.max(1.0);
    let pop_term = ((living as f64 - baseline) / baseline).clamp(-1.0, 1.0);
    let trend_term = -(recent_deaths as f64 * config.death_trend_weight);
    (pop_term + trend_term).clamp(-1.0, 1.0)
}

/// Four even bands across the vitality range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalityBand {
    Collapsing,
    Declining,
    Stable,
    Flourishing,
}

/// Which way migration moves for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    Inbound,
    Outbound,
}

impl VitalityBand {
    pub fn from_score(score: f64) -> Self {
        if score < -0.5 {
            VitalityBand::Collapsing
        } else if score < 0.0 {
            VitalityBand::Declining
        } else if score < 0.5 {
            VitalityBand::Stable
        } else {
            VitalityBand::Flourishing
        }
    }

    /// Healthy settlements draw people in; failing ones push them out.
    pub fn direction(&self) -> MigrationDirection {
        match self {
            VitalityBand::Stable | VitalityBand::Flourishing => MigrationDirection::Inbound,
            VitalityBand::Declining | VitalityBand::Collapsing => MigrationDirection::Outbound,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalityBand::Collapsing => "collapsing",
            VitalityBand::Declining => "declining",
            VitalityBand::Stable => "stable",
            VitalityBand::Flourishing => "flourishing",
        }
    }
}

impl MigrationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationDirection::Inbound => "inbound",
            MigrationDirection::Outbound => "outbound",
        }
    }
}

pub struct EquilibriumEngine {
    config: EquilibriumConfig,
    bus: Rc<EventBus>,
    registry: Rc<RefCell<ActorRegistry>>,
    social: Rc<SocialEngine>,
    grid: Rc<RefCell<GridMap>>,
    reader: ChronicleReader,
    legacies: RefCell<LegacyArena>,
}

impl EquilibriumEngine {
    pub fn new(
        config: EquilibriumConfig,
        bus: Rc<EventBus>,
        registry: Rc<RefCell<ActorRegistry>>,
        social: Rc<SocialEngine>,
        grid: Rc<RefCell<GridMap>>,
        reader: ChronicleReader,
    ) -> Self {
        Self {
            config,
            bus,
            registry,
            social,
            grid,
            reader,
            legacies: RefCell::new(LegacyArena::new()),
        }
    }

    /// Derive a node's vitality right now. Never cached.
    pub fn vitality(&self, node: NodeId, now: Tick) -> Result<f64> {
        let living = self.registry.borrow().living_in_node(node);
        let cutoff = now.saturating_sub(self.config.trend_window);
        let recent_deaths = self.reader.deaths_since(cutoff)?;
        Ok(vitality_score(living, recent_deaths, &self.config))
    }

    /// Session-open equilibrium pass. Each populated node rolls once
    /// against the taper threshold `base_resistance + living * vitality`;
    /// a roll above it produces a migration event. Empty nodes are
    /// skipped entirely.
    pub fn run_session_open(
        &self,
        territory: &dyn TerritoryGraph,
        now: Tick,
        rng: &mut impl Rng,
    ) -> Result<Vec<NodeId>> {
        let mut migrated = Vec::new();
        for node_id in territory.node_ids() {
            let living = self.registry.borrow().living_in_node(node_id);
            if living == 0 {
                continue;
            }
            let vitality = self.vitality(node_id, now)?;
            let threshold = self.config.base_resistance + living as f64 * vitality;
            let roll = rng.gen_range(1..=100);
            if (roll as f64) <= threshold {
                continue;
            }
            let band = VitalityBand::from_score(vitality);
            let name = territory
                .node(node_id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| format!("node-{}", node_id.0));
            tracing::info!(node = %name, vitality, roll, band = band.as_str(), "migration");
            self.bus.emit(
                &EventEnvelope::new(EventKey::Migration, SYSTEM_ACTOR)
                    .with("node", node_id.0)
                    .with("settlement", name.as_str())
                    .with("direction", band.direction().as_str())
                    .with("band", band.as_str())
                    .with("vitality", vitality)
                    .with("roll", roll),
            )?;
            migrated.push(node_id);
        }
        Ok(migrated)
    }

    /// Retire an actor into legend.
    ///
    /// Fixed sequence: inscribe the retirement entry, create the legacy
    /// record with its back-link, flag the actor retired, leave the
    /// citation counter dormant, then deliver grief to adjacent actors.
    pub fn retire(&self, actor: ActorId, cause: RetirementCause) -> Result<LegacyId> {
        let name = self.registry.borrow().get(actor)?.name.clone();
        let social = self.social.component(actor);

        self.bus.emit(
            &EventEnvelope::new(EventKey::LegacyConverted, actor)
                .with("cause", cause.as_str())
                .with("final_reputation", social.reputation())
                .with("moral_weight", social.moral_weight()),
        )?;

        let legacy = self.legacies.borrow_mut().create(
            actor,
            &name,
            social.reputation(),
            social.moral_weight(),
            cause,
        );
        self.registry.borrow_mut().retire(actor, legacy)?;

        // mourners are read off the grid before the retiree leaves it
        let mourners =
            self.grid.borrow().actors_within(actor, self.config.retirement_grief_range);
        self.grid.borrow_mut().remove(actor);

        for mourner in mourners {
            let mut magnitude = self.config.retirement_grief_magnitude;
            if self.social.is_cooperative(mourner) {
                magnitude *= 2.0;
            }
            self.bus.emit(
                &EventEnvelope::new(EventKey::StressSpike, mourner)
                    .with("magnitude", magnitude)
                    .with("cause", CAUSE_RETIREMENT_GRIEF),
            )?;
        }
        tracing::info!(actor = %name, cause = cause.as_str(), ?legacy, "retired into legend");
        Ok(legacy)
    }

    pub fn legacy(&self, id: LegacyId) -> Option<LegacyRecord> {
        self.legacies.borrow().get(id).cloned()
    }

    pub fn legacy_count(&self) -> usize {
        self.legacies.borrow().len()
    }
}
