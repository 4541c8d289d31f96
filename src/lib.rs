//! Hollowdeep - Turn-Based Social-Ecology Simulation Core

pub mod abilities;
pub mod actor;
pub mod chronicle;
pub mod combat;
pub mod core;
pub mod economy;
pub mod equilibrium;
pub mod events;
pub mod session;
pub mod social;
pub mod spatial;
pub mod territory;
