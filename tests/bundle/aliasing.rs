//! Legacy identifiers in old saves

use crate::common::*;
use keepsake::{read_bundle, write_bundle, Bundle, BundleError, CLASS_NAME_KEY};

fn legacy_save() -> Bundle {
    ensure_registered();
    read_bundle(&br#"{"widget":{"__className":"suite.OldWidget","charge":9}}"#[..]).unwrap()
}

#[test]
fn legacy_tag_reconstructs_current_type() {
    let save = legacy_save();
    let object = save.get_object("widget").unwrap().unwrap();
    assert_eq!(object.class_name(), "suite.NewWidget");
    assert_eq!(object.downcast_ref::<NewWidget>(), Some(&NewWidget { charge: 9 }));
}

#[test]
fn legacy_class_prefix_is_stripped() {
    ensure_registered();
    let save = read_bundle(&br#"{"widget":{"__className":"class suite.OldWidget"}}"#[..]).unwrap();
    let widget = save.get_object_as::<NewWidget>("widget").unwrap();
    assert_eq!(widget, Some(NewWidget { charge: 0 }));
}

#[test]
fn resave_records_current_identifier() {
    let save = legacy_save();
    let widget = save.get_object_as::<NewWidget>("widget").unwrap().unwrap();

    let resaved = Bundle::new();
    resaved.put_object("widget", &widget);

    let mut bytes = Vec::new();
    write_bundle(&resaved, &mut bytes, false).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.contains("suite.NewWidget"));
    assert!(!text.contains("suite.OldWidget"));
    assert_eq!(
        resaved.get_bundle("widget").unwrap().get_string(CLASS_NAME_KEY),
        "suite.NewWidget"
    );
}

#[test]
fn aliased_collection_elements_resolve() {
    ensure_registered();
    let save = read_bundle(
        &br#"{"loot":[
            {"__className":"suite.items.Coins","amount":3},
            {"__className":"suite.Gold","amount":4}
        ]}"#[..],
    )
    .unwrap();

    let loot = save.get_collection_of::<Gold>("loot").unwrap();
    assert_eq!(loot, vec![Gold { amount: 3 }, Gold { amount: 4 }]);
}

#[test]
fn aliased_class_names_resolve() {
    ensure_registered();
    let save = Bundle::new();
    save.put_class_name("recipe", "suite.OldWidget");
    save.put("recipes", vec!["suite.OldWidget", "suite.Gone", "class suite.Gold"]);

    assert_eq!(save.get_class("recipe").map(|c| c.name()), Some("suite.NewWidget"));
    let names: Vec<&str> = save
        .get_class_array("recipes")
        .unwrap()
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(names, vec!["suite.NewWidget", "suite.Gold"]);
}

#[test]
fn unknown_legacy_tag_fails_for_single_object() {
    ensure_registered();
    let save = read_bundle(&br#"{"widget":{"__className":"suite.AncientWidget"}}"#[..]).unwrap();
    assert_eq!(
        save.get_object("widget").unwrap_err(),
        BundleError::unresolvable_type("suite.AncientWidget")
    );
}
