//! Shared domain types for the bundle test suite.
//!
//! A small game world: a hero carrying items, levels holding mobs, and a
//! renamed type with a legacy alias. Every identifier is prefixed with
//! `suite.` so these types never collide with unit-test registrations.

#![allow(dead_code)]

use keepsake::{add_alias, register, Bundlable, Bundle, BundleResult};
use serde::{Deserialize, Serialize};
use std::sync::Once;

static INIT_CLASSES: Once = Once::new();

/// Register every suite type and alias exactly once per test binary
pub fn ensure_registered() {
    INIT_CLASSES.call_once(|| {
        register::<Hero>();
        register::<Sword>();
        register::<Potion>();
        register::<Gold>();
        register::<Rat>();
        register::<Level>();
        register::<NewWidget>();
        register::<Bomb>();
        add_alias("suite.NewWidget", "suite.OldWidget");
        add_alias("suite.Gold", "suite.items.Coins");
    });
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotionKind {
    Healing,
    Strength,
    Toxic,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sword {
    pub level: i32,
    pub cursed: bool,
}

impl Bundlable for Sword {
    fn class_name(&self) -> &'static str {
        "suite.Sword"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("level", self.level);
        bundle.put("cursed", self.cursed);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.level = bundle.get_int("level");
        self.cursed = bundle.get_bool("cursed");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Potion {
    pub kind: PotionKind,
}

impl Default for Potion {
    fn default() -> Self {
        Self {
            kind: PotionKind::Healing,
        }
    }
}

impl Bundlable for Potion {
    fn class_name(&self) -> &'static str {
        "suite.Potion"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put_enum("kind", &self.kind);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.kind = bundle.get_enum("kind")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Gold {
    pub amount: i32,
}

impl Bundlable for Gold {
    fn class_name(&self) -> &'static str {
        "suite.Gold"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("amount", self.amount);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.amount = bundle.get_int("amount");
        Ok(())
    }
}

// ============================================================================
// Actors
// ============================================================================

#[derive(Debug, Default)]
pub struct Hero {
    pub name: String,
    pub hp: i32,
    pub experience: i64,
    pub weapon: Option<Sword>,
    pub inventory: Vec<Box<dyn Bundlable>>,
}

impl Bundlable for Hero {
    fn class_name(&self) -> &'static str {
        "suite.Hero"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("name", self.name.as_str());
        bundle.put("hp", self.hp);
        bundle.put("experience", self.experience);
        bundle.put_optional_object("weapon", self.weapon.as_ref().map(|w| w as &dyn Bundlable));
        bundle.put_collection("inventory", self.inventory.iter().map(|item| item.as_ref()));
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.name = bundle.get_string("name");
        self.hp = bundle.get_int("hp");
        self.experience = bundle.get_long("experience");
        self.weapon = bundle.get_object_as::<Sword>("weapon")?;
        self.inventory = bundle.get_collection("inventory")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Rat {
    pub hp: i32,
    pub pos: i32,
}

impl Bundlable for Rat {
    fn class_name(&self) -> &'static str {
        "suite.Rat"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("hp", self.hp);
        bundle.put("pos", self.pos);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.hp = bundle.get_int("hp");
        self.pos = bundle.get_int("pos");
        Ok(())
    }
}

/// A level: scalars, arrays and a mob collection
#[derive(Debug, Default)]
pub struct Level {
    pub depth: i32,
    pub visited: Vec<bool>,
    pub map: Vec<i32>,
    pub mobs: Vec<Rat>,
}

impl Bundlable for Level {
    fn class_name(&self) -> &'static str {
        "suite.Level"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("depth", self.depth);
        bundle.put("visited", self.visited.clone());
        bundle.put("map", self.map.as_slice());
        bundle.put_collection("mobs", self.mobs.iter().map(|m| m as &dyn Bundlable));
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.depth = bundle.get_int("depth");
        self.visited = bundle.get_bool_array("visited")?;
        self.map = bundle.get_int_array("map")?;
        self.mobs = bundle.get_collection_of::<Rat>("mobs")?;
        Ok(())
    }
}

// ============================================================================
// Renamed and special types
// ============================================================================

/// Current name of a type once stored as `suite.OldWidget`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewWidget {
    pub charge: i32,
}

impl Bundlable for NewWidget {
    fn class_name(&self) -> &'static str {
        "suite.NewWidget"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("charge", self.charge);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.charge = bundle.get_int("charge");
        Ok(())
    }
}

/// A buff that only exists attached to its owner
#[derive(Debug, Default)]
pub struct OwnedBuff {
    pub turns: i32,
}

impl Bundlable for OwnedBuff {
    fn class_name(&self) -> &'static str {
        "suite.Hero$OwnedBuff"
    }

    fn store_in_bundle(&self, bundle: &Bundle) {
        bundle.put("turns", self.turns);
    }

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        self.turns = bundle.get_int("turns");
        Ok(())
    }

    fn is_reconstructible(&self) -> bool {
        false
    }
}

/// Restore always fails, to check error propagation
#[derive(Debug, Default)]
pub struct Bomb;

impl Bundlable for Bomb {
    fn class_name(&self) -> &'static str {
        "suite.Bomb"
    }

    fn store_in_bundle(&self, _bundle: &Bundle) {}

    fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
        bundle.get_string_array("fuse").map(|_| ())
    }
}

/// Hero with one item of each kind
pub fn sample_hero() -> Hero {
    Hero {
        name: "Rogue".to_string(),
        hp: 18,
        experience: 4_000_000_000,
        weapon: Some(Sword {
            level: 2,
            cursed: false,
        }),
        inventory: vec![
            Box::new(Potion {
                kind: PotionKind::Strength,
            }),
            Box::new(Gold { amount: 57 }),
            Box::new(Sword {
                level: 0,
                cursed: true,
            }),
        ],
    }
}
