//! Social consequence propagation: stress, reputation, conduction

pub mod conduction;
pub mod state;

pub use conduction::{conduction_magnitude, ConductionPropagator};
pub use state::{SocialComponent, SocialEngine, ThresholdFlags};
