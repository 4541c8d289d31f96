//! Stress conduction across the grid
//!
//! A stress spike radiates to actors within range at a distance-decayed
//! magnitude. Secondary spikes carry the `conduction` cause tag, which is
//! also how the propagator ignores its own output.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::ConductionConfig;
use crate::core::error::Result;
use crate::events::{EventBus, EventEnvelope, EventKey};
use crate::spatial::SpatialView;

pub const CAUSE_CONDUCTION: &str = "conduction";

/// Distance-decayed magnitude of a propagated spike.
pub fn conduction_magnitude(config: &ConductionConfig, original: f64, distance: u32) -> f64 {
    if config.coefficient <= 0.0 {
        return 0.0;
    }
    original * config.coefficient * config.attenuation.powi(distance as i32)
}

pub struct ConductionPropagator {
    config: ConductionConfig,
    bus: Rc<EventBus>,
    spatial: Rc<RefCell<dyn SpatialView>>,
}

impl ConductionPropagator {
    pub fn attach(
        bus: &Rc<EventBus>,
        config: ConductionConfig,
        spatial: Rc<RefCell<dyn SpatialView>>,
    ) -> Rc<Self> {
        let propagator = Rc::new(Self { config, bus: Rc::clone(bus), spatial });
        let handler = Rc::clone(&propagator);
        bus.subscribe(EventKey::StressSpike, Rc::new(move |e| handler.on_spike(e)));
        propagator
    }

    fn on_spike(&self, event: &EventEnvelope) -> Result<()> {
        if event.data.text("cause") == Some(CAUSE_CONDUCTION) {
            return Ok(());
        }
        if self.config.coefficient <= 0.0 {
            return Ok(());
        }
        let original = event.data.float("magnitude").unwrap_or(0.0);
        if original <= 0.0 {
            return Ok(());
        }
        let origin_cause = event.data.text("cause").unwrap_or("unknown").to_string();

        let neighbors: Vec<(crate::core::types::ActorId, u32)> = {
            let spatial = self.spatial.borrow();
            spatial
                .actors_within(event.source, self.config.range)
                .into_iter()
                .filter_map(|id| spatial.distance(event.source, id).map(|d| (id, d)))
                .collect()
        };

        for (neighbor, distance) in neighbors {
            let magnitude = conduction_magnitude(&self.config, original, distance);
            if magnitude <= 0.0 {
                continue;
            }
            tracing::trace!(?neighbor, distance, magnitude, "conducted");
            self.bus.emit(
                &EventEnvelope::new(EventKey::StressSpike, neighbor)
                    .with("magnitude", magnitude)
                    .with("cause", CAUSE_CONDUCTION)
                    .with("origin", origin_cause.as_str()),
            )?;
        }
        Ok(())
    }
}
