//! Scenario files: actor classes, behaviors, profiles, placements and the map, loaded from YAML.
//!
//! A [`ScenarioFile`] is the raw document. [`ScenarioFile::resolve`] checks every cross
//! reference by name and produces a [`Scenario`] whose profiles share their behaviors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ai_behavior::{AiProfile, Behavior, Factions, Perception, WeaponInfo, DEFAULT_PREEMPT_INTERVAL};
use ai_nav::{FlowField, TileCoord, Vec2};
use ai_squad::SquadConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown actor class: {0}")]
    UnknownClass(String),

    #[error("Unknown behavior: {0}")]
    UnknownBehavior(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Unknown squad: {0}")]
    UnknownSquad(String),

    #[error("Actor {actor} targets actor {target}, which does not exist")]
    InvalidTarget { actor: usize, target: usize },

    #[error("Invalid flow field: {0}")]
    InvalidFlowField(String),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Scenario document as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub name: String,

    /// Seconds per tick
    #[serde(default = "default_dt")]
    pub dt: f32,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ticks `run` simulates unless overridden
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    pub flow_field: FlowFieldSpec,

    /// Weapons by name
    pub weapons: BTreeMap<String, WeaponSpec>,

    /// Actor classes by name
    pub classes: BTreeMap<String, ClassSpec>,

    /// Named behaviors; profiles refer to them by name
    pub behaviors: Vec<Behavior>,

    pub profiles: Vec<ProfileSpec>,

    pub squads: Vec<SquadConfig>,

    pub actors: Vec<ActorSpec>,
}

fn default_dt() -> f32 {
    0.1
}
fn default_seed() -> u64 {
    7
}
fn default_ticks() -> u64 {
    600
}

impl Default for ScenarioFile {
    fn default() -> Self {
        Self {
            name: String::new(),
            dt: default_dt(),
            seed: default_seed(),
            ticks: default_ticks(),
            flow_field: FlowFieldSpec::default(),
            weapons: BTreeMap::new(),
            classes: BTreeMap::new(),
            behaviors: Vec::new(),
            profiles: Vec::new(),
            squads: Vec::new(),
            actors: Vec::new(),
        }
    }
}

/// The map's flow field: explicit rows, or step distances to a set of origin tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowFieldSpec {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,

    #[serde(default = "default_extent")]
    pub width: u32,

    #[serde(default = "default_extent")]
    pub height: u32,

    /// `rows[y][x]`; takes precedence over `sources`
    pub rows: Option<Vec<Vec<u32>>>,

    /// Origin tiles of a radial field
    pub sources: Vec<TileCoord>,
}

fn default_tile_size() -> f32 {
    10.0
}
fn default_extent() -> u32 {
    64
}

impl Default for FlowFieldSpec {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            width: default_extent(),
            height: default_extent(),
            rows: None,
            sources: Vec::new(),
        }
    }
}

impl FlowFieldSpec {
    pub fn build(&self) -> Result<FlowField> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ScenarioError::InvalidFlowField(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }

        if let Some(rows) = &self.rows {
            if rows.is_empty() || rows[0].is_empty() {
                return Err(ScenarioError::InvalidFlowField("rows are empty".into()));
            }
            return FlowField::from_rows(rows, self.tile_size)
                .ok_or_else(|| ScenarioError::InvalidFlowField("rows differ in length".into()));
        }

        if self.width == 0 || self.height == 0 {
            return Err(ScenarioError::InvalidFlowField(format!(
                "empty field {}x{}",
                self.width, self.height
            )));
        }
        if self.sources.is_empty() {
            return Ok(FlowField::new(self.width, self.height, self.tile_size, 0));
        }
        Ok(FlowField::from_sources(
            self.width,
            self.height,
            self.tile_size,
            &self.sources,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    pub muzzle_speed: f32,
    /// `None` for unlimited
    pub ammo: Option<u32>,
    pub damage: f32,
    pub range: f32,
    #[serde(with = "ai_core::time::serde_secs")]
    pub cooldown: Duration,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            muzzle_speed: 200.0,
            ammo: None,
            damage: 10.0,
            range: 300.0,
            cooldown: Duration::from_millis(500),
        }
    }
}

impl WeaponSpec {
    pub fn info(&self, ammo: Option<u32>) -> WeaponInfo {
        WeaponInfo {
            muzzle_speed: self.muzzle_speed,
            ammo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSpec {
    pub radius: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Degrees per second
    pub turn_rate: f32,
    pub health: f32,
    pub factions: Factions,
    pub weapon: Option<String>,
    /// AI profile; classes without one are inert
    pub profile: Option<String>,
}

impl Default for ClassSpec {
    fn default() -> Self {
        Self {
            radius: 5.0,
            max_speed: 40.0,
            acceleration: 120.0,
            turn_rate: 360.0,
            health: 100.0,
            factions: Factions::ENEMY,
            weapon: None,
            profile: None,
        }
    }
}

/// An [`AiProfile`] whose behaviors are named rather than inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,

    #[serde(default)]
    pub preemptive: Vec<String>,

    #[serde(default)]
    pub defaults: Vec<String>,

    #[serde(default)]
    pub perception: Perception,

    #[serde(
        default = "default_preempt_interval",
        with = "ai_core::time::serde_secs"
    )]
    pub preempt_interval: Duration,
}

fn default_preempt_interval() -> Duration {
    DEFAULT_PREEMPT_INTERVAL
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub class: String,
    pub position: Vec2,

    /// Heading in degrees counter-clockwise from +X
    #[serde(default)]
    pub facing: f32,

    /// Squad name to join
    #[serde(default)]
    pub squad: Option<String>,

    #[serde(default)]
    pub leader: bool,

    /// Index into `actors` of the initial target
    #[serde(default)]
    pub target: Option<usize>,
}

/// A class with its profile resolved.
#[derive(Debug, Clone)]
pub struct ActorClass {
    pub name: String,
    pub spec: ClassSpec,
    pub profile: Option<Arc<AiProfile>>,
}

/// A validated scenario, ready to populate a world.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub dt: f32,
    pub seed: u64,
    pub ticks: u64,
    pub field: FlowField,
    pub weapons: BTreeMap<String, WeaponSpec>,
    pub classes: BTreeMap<String, ActorClass>,
    pub behaviors: BTreeMap<String, Arc<Behavior>>,
    pub squads: Vec<SquadConfig>,
    pub actors: Vec<ActorSpec>,
}

impl Scenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ScenarioFile = serde_yaml::from_str(content)?;
        file.resolve()
    }
}

impl ScenarioFile {
    pub fn resolve(self) -> Result<Scenario> {
        let field = self.flow_field.build()?;

        let behaviors: BTreeMap<String, Arc<Behavior>> = self
            .behaviors
            .into_iter()
            .map(|b| (b.name.clone(), Arc::new(b)))
            .collect();

        let mut profiles = BTreeMap::new();
        for spec in &self.profiles {
            let profile = resolve_profile(spec, &behaviors)?;
            profiles.insert(spec.name.clone(), Arc::new(profile));
        }

        let mut classes = BTreeMap::new();
        for (name, spec) in self.classes {
            if let Some(weapon) = &spec.weapon {
                if !self.weapons.contains_key(weapon) {
                    return Err(ScenarioError::UnknownWeapon(weapon.clone()));
                }
            }
            let profile = match &spec.profile {
                Some(profile) => Some(
                    profiles
                        .get(profile)
                        .cloned()
                        .ok_or_else(|| ScenarioError::UnknownProfile(profile.clone()))?,
                ),
                None => None,
            };
            classes.insert(name.clone(), ActorClass { name, spec, profile });
        }

        for squad in &self.squads {
            let templates = squad
                .leader_templates
                .iter()
                .chain(squad.unit_templates.iter().map(|t| &t.class));
            for class in templates {
                if !classes.contains_key(class) {
                    return Err(ScenarioError::UnknownClass(class.clone()));
                }
            }
        }

        for (index, actor) in self.actors.iter().enumerate() {
            if !classes.contains_key(&actor.class) {
                return Err(ScenarioError::UnknownClass(actor.class.clone()));
            }
            if let Some(squad) = &actor.squad {
                if !self.squads.iter().any(|s| &s.name == squad) {
                    return Err(ScenarioError::UnknownSquad(squad.clone()));
                }
            }
            if let Some(target) = actor.target {
                if target >= self.actors.len() {
                    return Err(ScenarioError::InvalidTarget {
                        actor: index,
                        target,
                    });
                }
            }
        }

        Ok(Scenario {
            name: self.name,
            dt: self.dt,
            seed: self.seed,
            ticks: self.ticks,
            field,
            weapons: self.weapons,
            classes,
            behaviors,
            squads: self.squads,
            actors: self.actors,
        })
    }
}

fn resolve_profile(
    spec: &ProfileSpec,
    behaviors: &BTreeMap<String, Arc<Behavior>>,
) -> Result<AiProfile> {
    let lookup = |name: &String| {
        behaviors
            .get(name)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownBehavior(name.clone()))
    };
    Ok(AiProfile {
        name: spec.name.clone(),
        preemptive: spec.preemptive.iter().map(lookup).collect::<Result<_>>()?,
        defaults: spec.defaults.iter().map(lookup).collect::<Result<_>>()?,
        perception: spec.perception,
        preempt_interval: spec.preempt_interval,
    })
}
