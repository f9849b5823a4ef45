//! Whole-save round trips through the stream codec

use crate::common::*;
use keepsake::{
    read_bundle, write_bundle, Bundlable, Bundle, BundleReader, BundleWriter, DocValue, Encoding,
    StreamConfig, CLASS_NAME_KEY,
};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn save_game() -> Bundle {
    ensure_registered();
    let save = Bundle::new();
    save.put("version", 3);
    save.put("seed", 8_123_456_789i64);
    save.put("challenge", "no_food");
    save.put("speed", 1.5f32);
    save.put("badges", vec![3, 7, 11]);
    save.put("names", vec!["Rogue", "Mage"]);
    save.put_object("hero", &sample_hero());
    save.put_object(
        "level",
        &Level {
            depth: 5,
            visited: vec![true, false, true],
            map: vec![0, 1, 1, 4],
            mobs: vec![Rat { hp: 4, pos: 10 }, Rat { hp: 2, pos: 11 }],
        },
    );

    let stats = Bundle::new();
    stats.put("kills", 31);
    stats.put("deepest", 5);
    save.put_bundle("stats", Some(&stats));
    save
}

fn assert_loaded_game(loaded: &Bundle) {
    assert_eq!(loaded.get_int("version"), 3);
    assert_eq!(loaded.get_long("seed"), 8_123_456_789);
    assert_eq!(loaded.get_string("challenge"), "no_food");
    assert_eq!(loaded.get_float("speed"), 1.5);
    assert_eq!(loaded.get_int_array("badges").unwrap(), vec![3, 7, 11]);
    assert_eq!(loaded.get_string_array("names").unwrap(), vec!["Rogue", "Mage"]);

    let stats = loaded.get_bundle("stats").unwrap();
    assert_eq!(stats.get_int("kills"), 31);

    let hero = loaded.get_object_as::<Hero>("hero").unwrap().unwrap();
    assert_eq!(hero.name, "Rogue");
    assert_eq!(hero.hp, 18);
    assert_eq!(hero.experience, 4_000_000_000);
    assert_eq!(hero.weapon, Some(Sword { level: 2, cursed: false }));
    assert_eq!(hero.inventory.len(), 3);
    assert_eq!(
        hero.inventory[0].downcast_ref::<Potion>(),
        Some(&Potion { kind: PotionKind::Strength })
    );
    assert_eq!(hero.inventory[1].downcast_ref::<Gold>(), Some(&Gold { amount: 57 }));
    assert_eq!(
        hero.inventory[2].downcast_ref::<Sword>(),
        Some(&Sword { level: 0, cursed: true })
    );

    let level = loaded.get_object_as::<Level>("level").unwrap().unwrap();
    assert_eq!(level.depth, 5);
    assert_eq!(level.visited, vec![true, false, true]);
    assert_eq!(level.map, vec![0, 1, 1, 4]);
    assert_eq!(level.mobs, vec![Rat { hp: 4, pos: 10 }, Rat { hp: 2, pos: 11 }]);
}

#[test]
fn compressed_round_trip() {
    let save = save_game();
    let mut bytes = Vec::new();
    write_bundle(&save, &mut bytes, true).unwrap();

    let loaded = read_bundle(&bytes[..]).unwrap();
    assert_loaded_game(&loaded);
    assert_eq!(loaded.to_value(), save.to_value());
}

#[test]
fn uncompressed_round_trip() {
    let save = save_game();
    let mut bytes = Vec::new();
    write_bundle(&save, &mut bytes, false).unwrap();

    let loaded = read_bundle(&bytes[..]).unwrap();
    assert_loaded_game(&loaded);
    assert_eq!(loaded.to_value(), save.to_value());
}

#[test]
fn reader_detects_encoding_without_being_told() {
    let save = save_game();
    let reader = BundleReader::default();

    for compressed in [true, false] {
        let mut bytes = Vec::new();
        write_bundle(&save, &mut bytes, compressed).unwrap();
        assert_eq!(Encoding::detect(&bytes).is_compressed(), compressed);
        assert_loaded_game(&reader.read_slice(&bytes).unwrap());
    }
}

#[test]
fn file_round_trip_with_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saves").join("game1.dat");
    let writer = BundleWriter::new(StreamConfig::default().with_compression_level(9));

    writer.write_to_file(&save_game(), &path).unwrap();
    assert_loaded_game(&BundleReader::default().read_file(&path).unwrap());
}

#[test]
fn stored_objects_carry_class_tag() {
    let save = save_game();
    let value = save.to_value();
    assert_eq!(value["hero"][CLASS_NAME_KEY], json!("suite.Hero"));
    assert_eq!(value["hero"]["weapon"][CLASS_NAME_KEY], json!("suite.Sword"));
    assert_eq!(
        value["hero"]["inventory"][1],
        json!({"__className": "suite.Gold", "amount": 57})
    );
}

#[test]
fn restored_objects_save_identically() {
    let save = save_game();
    let hero = save.get_object_as::<Hero>("hero").unwrap().unwrap();

    let again = Bundle::new();
    again.put_object("hero", &hero as &dyn Bundlable);
    assert_eq!(again.get_value("hero"), save.get_value("hero"));
}

// ============================================================================
// Property: any hero survives a save
// ============================================================================

fn item_from(kind: u8, n: i32) -> Box<dyn Bundlable> {
    const POTIONS: [PotionKind; 3] = [PotionKind::Healing, PotionKind::Strength, PotionKind::Toxic];
    match kind {
        0 => Box::new(Gold { amount: n }),
        1 => Box::new(Potion {
            kind: POTIONS[n.unsigned_abs() as usize % POTIONS.len()],
        }),
        _ => Box::new(Sword {
            level: n,
            cursed: n % 2 == 0,
        }),
    }
}

fn stored(object: &dyn Bundlable) -> Option<DocValue> {
    let bundle = Bundle::new();
    bundle.put_object("it", object);
    bundle.get_value("it")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_hero_survives_a_save(
        name in "\\PC{0,24}",
        hp in any::<i32>(),
        experience in any::<i64>(),
        weapon in proptest::option::of((any::<i32>(), any::<bool>())),
        inventory in prop::collection::vec((0u8..3, any::<i32>()), 0..6),
        compressed in any::<bool>(),
    ) {
        ensure_registered();
        let hero = Hero {
            name: name.clone(),
            hp,
            experience,
            weapon: weapon.map(|(level, cursed)| Sword { level, cursed }),
            inventory: inventory.iter().map(|&(kind, n)| item_from(kind, n)).collect(),
        };
        let save = Bundle::new();
        save.put_object("hero", &hero);

        let mut bytes = Vec::new();
        write_bundle(&save, &mut bytes, compressed).unwrap();
        let loaded = read_bundle(&bytes[..]).unwrap();
        prop_assert_eq!(loaded.to_value(), save.to_value());

        let restored = loaded.get_object_as::<Hero>("hero").unwrap().unwrap();
        prop_assert_eq!(&restored.name, &name);
        prop_assert_eq!(restored.hp, hp);
        prop_assert_eq!(restored.experience, experience);
        prop_assert_eq!(&restored.weapon, &hero.weapon);
        prop_assert_eq!(restored.inventory.len(), hero.inventory.len());
        for (got, want) in restored.inventory.iter().zip(&hero.inventory) {
            prop_assert_eq!(stored(got.as_ref()), stored(want.as_ref()));
        }
    }
}
