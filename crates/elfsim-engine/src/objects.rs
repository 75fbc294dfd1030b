//! Pooled world objects.
//!
//! Every instance the engine pools is a [`WorldObject`]: either an elf body
//! or a short-lived effect. One pool holds both kinds so that they share
//! the global capacity.

use elfsim_agents::ElfController;
use elfsim_pool::{Instantiator, Poolable};
use elfsim_types::{Archetype, ElfColor, InstanceId, Rotation, Vec3};

use crate::body::KinematicBody;

/// Archetype of the burst shown when an elf appears.
pub const SPAWN_EFFECT: &str = "fx.spawn";

/// Archetype of the burst shown when two elves destroy each other.
pub const EXPLOSION_EFFECT: &str = "fx.explosion";

/// Archetype of the flash shown when two same-color elves meet.
pub const COLLISION_EFFECT: &str = "fx.collision";

/// Visual effects the engine plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// An elf appeared.
    Spawn,
    /// Two elves exploded.
    Explosion,
    /// Two same-color elves met and asked for a bonus elf.
    Collision,
}

impl EffectKind {
    /// Archetype the effect is pooled under.
    pub fn archetype(self) -> Archetype {
        match self {
            Self::Spawn => Archetype::from(SPAWN_EFFECT),
            Self::Explosion => Archetype::from(EXPLOSION_EFFECT),
            Self::Collision => Archetype::from(COLLISION_EFFECT),
        }
    }
}

/// What a pooled object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// An elf body of one color.
    Elf(ElfColor),
    /// A visual effect.
    Effect(EffectKind),
}

impl ObjectKind {
    /// Parse an archetype name. Unknown names have no kind.
    pub fn from_archetype(archetype: &Archetype) -> Option<Self> {
        match archetype.as_str() {
            SPAWN_EFFECT => Some(Self::Effect(EffectKind::Spawn)),
            EXPLOSION_EFFECT => Some(Self::Effect(EffectKind::Explosion)),
            COLLISION_EFFECT => Some(Self::Effect(EffectKind::Collision)),
            name => {
                let color = name.strip_prefix("elf.")?;
                ElfColor::ALL
                    .into_iter()
                    .find(|c| c.to_string() == color)
                    .map(Self::Elf)
            }
        }
    }
}

/// Live elf state attached to an elf body while it is in play.
#[derive(Debug)]
pub struct ElfSlot {
    /// Lifecycle and wandering.
    pub controller: ElfController<KinematicBody>,
    /// Seconds left before the elf takes part in collisions.
    pub grace_remaining: f32,
}

/// A recyclable instance.
#[derive(Debug)]
pub struct WorldObject {
    id: InstanceId,
    kind: ObjectKind,
    active: bool,
    position: Vec3,
    /// Attached while the object is an elf in play.
    pub elf: Option<ElfSlot>,
}

impl WorldObject {
    /// Fresh inactive object of `kind`.
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: InstanceId::new(),
            kind,
            active: false,
            position: Vec3::ZERO,
            elf: None,
        }
    }

    /// What the object is.
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Position the object was last placed at, or the elf's current
    /// position while one is attached.
    pub fn position(&self) -> Vec3 {
        self.elf
            .as_ref()
            .map_or(self.position, |slot| slot.controller.position())
    }
}

impl Poolable for WorldObject {
    fn instance_id(&self) -> InstanceId {
        self.id
    }

    fn activate(&mut self, position: Vec3, _rotation: Rotation) {
        self.position = position;
        self.active = true;
    }

    fn deactivate(&mut self) {
        if let Some(slot) = self.elf.take() {
            self.position = slot.controller.position();
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Instantiator for every archetype the engine knows.
#[derive(Debug, Default)]
pub struct WorldFactory {
    created: u64,
}

impl WorldFactory {
    /// Number of objects ever created.
    pub const fn created(&self) -> u64 {
        self.created
    }
}

impl Instantiator for WorldFactory {
    type Instance = WorldObject;

    fn instantiate(&mut self, archetype: &Archetype) -> Option<WorldObject> {
        let kind = ObjectKind::from_archetype(archetype)?;
        self.created = self.created.saturating_add(1);
        Some(WorldObject::new(kind))
    }
}
