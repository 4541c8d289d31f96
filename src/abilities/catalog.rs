//! Ability and actor-template catalogs loaded from TOML seed data

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::abilities::formula::DiceFormula;
use crate::actor::StatKind;
use crate::core::error::Result;
use crate::events::EventKey;

/// Who an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    SelfOnly,
    Ally,
    Enemy,
}

/// One effect in an ability's ordered effect list.
///
/// Abilities carry no behavior of their own; the resolver interprets these
/// descriptors in order. New ability content is data, not code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDef {
    Damage {
        formula: DiceFormula,
    },
    Heal {
        formula: DiceFormula,
    },
    ApplyModifier {
        name: String,
        stat: StatKind,
        value: i32,
        expires_on: Vec<EventKey>,
        #[serde(default = "default_max_triggers")]
        max_triggers: u32,
    },
    Reposition {
        dx: i32,
        dy: i32,
    },
}

fn default_max_triggers() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: String,
    pub name: String,
    pub ap_cost: u32,
    pub target: TargetType,
    #[serde(rename = "effect")]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Deserialize)]
struct AbilityFile {
    #[serde(rename = "ability")]
    abilities: Vec<AbilityDef>,
}

/// Loaded ability catalog, keyed by id.
#[derive(Debug, Default)]
pub struct AbilityBook {
    abilities: AHashMap<String, AbilityDef>,
}

impl AbilityBook {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: AbilityFile = toml::from_str(content)?;
        let mut abilities = AHashMap::new();
        for def in file.abilities {
            tracing::debug!(ability = %def.id, effects = def.effects.len(), "loaded");
            abilities.insert(def.id.clone(), def);
        }
        Ok(Self { abilities })
    }

    pub fn get(&self, id: &str) -> Option<&AbilityDef> {
        self.abilities.get(id)
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

/// Spawn template for a stock actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorTemplate {
    pub id: String,
    pub name: String,
    pub archetype: String,
    #[serde(default)]
    pub is_player: bool,
    pub hp: i32,
    pub speed: f64,
    pub attack: i32,
    pub defense: i32,
    pub damage_bonus: i32,
    pub abilities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(rename = "actor")]
    actors: Vec<ActorTemplate>,
}

#[derive(Debug, Default)]
pub struct TemplateBook {
    templates: AHashMap<String, ActorTemplate>,
}

impl TemplateBook {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: TemplateFile = toml::from_str(content)?;
        let mut templates = AHashMap::new();
        for def in file.actors {
            templates.insert(def.id.clone(), def);
        }
        Ok(Self { templates })
    }

    pub fn get(&self, id: &str) -> Option<&ActorTemplate> {
        self.templates.get(id)
    }
}
