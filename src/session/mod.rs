//! Session facade: wires the bus, systems, and stores into one play loop
//!
//! Construction order matters for wildcard subscribers: the modifier
//! lifecycle registers before the inscriber so the chronicle sees expiry
//! events the moment they fire, and the inscriber registers last so every
//! other handler has already run when an event reaches the page.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use ahash::AHashSet;

use crate::abilities::{AbilityBook, TemplateBook};
use crate::actor::registry::ActorSpawn;
use crate::actor::{ActorRegistry, CombatStats};
use crate::chronicle::{ChronicleInscriber, ChronicleReader, TableScorer};
use crate::combat::{ActionResult, CombatResolver, ModifierLifecycle, RollMode};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{ActorId, GameTimestamp, GridPos, LegacyId, NodeId, SYSTEM_ACTOR};
use crate::economy::EconomySystem;
use crate::equilibrium::{EquilibriumEngine, RetirementCause};
use crate::events::{EventBus, EventEnvelope, EventKey};
use crate::social::{ConductionPropagator, SocialEngine};
use crate::spatial::{GridMap, SpatialView};
use crate::territory::TerritoryMap;

pub struct SimulationSession {
    bus: Rc<EventBus>,
    registry: Rc<RefCell<ActorRegistry>>,
    grid: Rc<RefCell<GridMap>>,
    territory: RefCell<TerritoryMap>,
    economy: Rc<EconomySystem>,
    resolver: CombatResolver,
    social: Rc<SocialEngine>,
    inscriber: Rc<ChronicleInscriber>,
    equilibrium: EquilibriumEngine,
    reader: ChronicleReader,
    rng: RefCell<ChaCha8Rng>,
    acted_this_round: RefCell<AHashSet<ActorId>>,
}

impl SimulationSession {
    pub fn new(
        config: EngineConfig,
        chronicle_path: &Path,
        abilities: AbilityBook,
        player_present: bool,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let bus = EventBus::new();
        let registry = Rc::new(RefCell::new(ActorRegistry::new()));
        let grid = Rc::new(RefCell::new(GridMap::new()));
        let abilities = Rc::new(abilities);

        let economy = Rc::new(EconomySystem::new(
            config.economy.clone(),
            Rc::clone(&bus),
            Rc::clone(&registry),
        ));
        let resolver = CombatResolver::new(
            config.combat.clone(),
            Rc::clone(&bus),
            Rc::clone(&registry),
            Rc::clone(&abilities),
            Rc::clone(&economy),
            Rc::clone(&grid),
        );

        // key-specific subscribers: apply spikes before conduction fans out
        let social = SocialEngine::attach(&bus, config.social.clone());
        ConductionPropagator::attach(
            &bus,
            config.conduction.clone(),
            Rc::clone(&grid) as Rc<RefCell<dyn SpatialView>>,
        );

        // wildcard subscribers: lifecycle first, inscriber last
        ModifierLifecycle::attach(&bus, Rc::clone(&registry));
        let inscriber = ChronicleInscriber::attach(
            &bus,
            Rc::clone(&registry),
            chronicle_path,
            GameTimestamp::default(),
            player_present,
            config.chronicle.clone(),
            Box::new(TableScorer),
        )?;

        let reader = ChronicleReader::new(chronicle_path);
        let equilibrium = EquilibriumEngine::new(
            config.equilibrium.clone(),
            Rc::clone(&bus),
            Rc::clone(&registry),
            Rc::clone(&social),
            Rc::clone(&grid),
            ChronicleReader::new(chronicle_path),
        );

        Ok(Self {
            bus,
            registry,
            grid,
            territory: RefCell::new(TerritoryMap::new()),
            economy,
            resolver,
            social,
            inscriber,
            equilibrium,
            reader,
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
            acted_this_round: RefCell::new(AHashSet::new()),
        })
    }

    pub fn spawn_actor(&self, spawn: ActorSpawn, pos: GridPos) -> ActorId {
        let id = self.registry.borrow_mut().spawn(spawn);
        self.grid.borrow_mut().place(id, pos);
        id
    }

    /// Spawn a stock actor from a loaded template.
    pub fn spawn_from_template(
        &self,
        templates: &TemplateBook,
        template_id: &str,
        pos: GridPos,
        node: Option<NodeId>,
    ) -> Result<ActorId> {
        let template = templates.get(template_id).ok_or_else(|| {
            EngineError::Config(format!("unknown actor template: {template_id}"))
        })?;
        Ok(self.spawn_actor(
            ActorSpawn {
                name: template.name.clone(),
                archetype: template.archetype.clone(),
                is_player: template.is_player,
                max_hp: template.hp,
                stats: CombatStats {
                    attack: template.attack,
                    defense: template.defense,
                    damage_bonus: template.damage_bonus,
                },
                speed: template.speed,
                node,
            },
            pos,
        ))
    }

    pub fn add_settlement(&self, node: NodeId, name: &str) {
        self.territory.borrow_mut().add_node(node, name);
    }

    pub fn connect_settlements(&self, a: NodeId, b: NodeId) {
        self.territory.borrow_mut().connect(a, b);
    }

    /// Open a session: inscribe the marker, run the bounded social
    /// catch-up, then the equilibrium pass. Returns the nodes that rolled
    /// a migration.
    pub fn open_session(&self) -> Result<Vec<NodeId>> {
        self.inscriber.open_session()?;
        self.social.catch_up();
        let now = self.inscriber.clock().tick;
        let territory = self.territory.borrow();
        self.equilibrium.run_session_open(&*territory, now, &mut *self.rng.borrow_mut())
    }

    pub fn close_session(&self) -> Result<()> {
        self.inscriber.close_session()?;
        Ok(())
    }

    /// One simulation tick: advance the chronicle clock, decay stress, and
    /// bank energy. Returns the actors that became turn-eligible.
    pub fn tick(&self) -> Vec<ActorId> {
        self.inscriber.advance_clock(1);
        self.social.decay_tick();
        self.economy.tick()
    }

    pub fn begin_turn(&self, actor: ActorId) -> Result<()> {
        self.economy.begin_turn(actor)
    }

    /// Submit an action for the acting actor.
    pub fn act(
        &self,
        source: ActorId,
        ability: &str,
        target: Option<ActorId>,
        mode: RollMode,
    ) -> Result<ActionResult> {
        self.resolver.execute(source, ability, target, mode, &mut *self.rng.borrow_mut())
    }

    /// End the actor's turn. When every active actor has had a turn, the
    /// round closes with `combat.round_ended`.
    pub fn end_turn(&self, actor: ActorId) -> Result<()> {
        self.economy.end_turn(actor)?;
        let active: AHashSet<ActorId> = self.registry.borrow().active_ids().into_iter().collect();
        let round_done = {
            let mut acted = self.acted_this_round.borrow_mut();
            acted.insert(actor);
            active.iter().all(|id| acted.contains(id))
        };
        if round_done {
            self.acted_this_round.borrow_mut().clear();
            self.bus.emit(&EventEnvelope::new(EventKey::RoundEnded, SYSTEM_ACTOR))?;
        }
        Ok(())
    }

    pub fn retire(&self, actor: ActorId, cause: RetirementCause) -> Result<LegacyId> {
        self.equilibrium.retire(actor, cause)
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn registry(&self) -> &Rc<RefCell<ActorRegistry>> {
        &self.registry
    }

    pub fn grid(&self) -> &Rc<RefCell<GridMap>> {
        &self.grid
    }

    pub fn social(&self) -> &Rc<SocialEngine> {
        &self.social
    }

    pub fn inscriber(&self) -> &Rc<ChronicleInscriber> {
        &self.inscriber
    }

    pub fn equilibrium(&self) -> &EquilibriumEngine {
        &self.equilibrium
    }

    pub fn chronicle(&self) -> &ChronicleReader {
        &self.reader
    }

    pub fn economy(&self) -> &Rc<EconomySystem> {
        &self.economy
    }
}
