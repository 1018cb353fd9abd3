//! Property resolution: source expressions, ignore, copy vs. translate,
//! slot access variants and runtime subtype selection.

use graft::{
    Accessors, FieldDef, Heap, ObjectId, Translator, TypeDef, TypeRegistry, Value, ValueType,
};
use rstest::rstest;

use crate::helpers::graph_assertions::{
    assert_field, assert_type, expect_ref, field_ref, list_items, map_entry,
};

fn contacts_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            TypeDef::new("ContactDto")
                .field(FieldDef::new("name", ValueType::Str))
                .field(FieldDef::new("city", ValueType::Str).expression("address.city"))
                .field(FieldDef::new("password", ValueType::Str).ignore())
                .field(FieldDef::new("score", ValueType::Float))
                .field(FieldDef::new("address", ValueType::object("Address")))
                .field(FieldDef::new("tags", ValueType::list(ValueType::Str))),
        )
        .with(TypeDef::new("Address").field(FieldDef::new("city", ValueType::Str)))
}

/// A `Contact` source and the handle of its `tags` list.
fn contact(heap: &mut Heap, address: Value) -> (ObjectId, Value) {
    let tags = heap.new_list(["a", "b"]);
    let id = heap.new_record(
        "Contact",
        [
            ("name", Value::from("Ada")),
            ("password", Value::from("hunter2")),
            ("score", Value::Int(7)),
            ("address", address),
            ("tags", Value::Ref(tags)),
        ],
    );
    (tags, Value::Ref(id))
}

// ============================================================================
// SOURCE EXPRESSIONS AND COPYING
// ============================================================================

#[test]
fn test_inferred_expression_and_dotted_path() {
    let translator = Translator::new(contacts_registry());
    let mut heap = Heap::new();
    let address = heap.new_record("Address", [("city", "London")]);
    let (_, source) = contact(&mut heap, Value::Ref(address));

    let dto = translator.translate(&mut heap, &source, "ContactDto").unwrap();
    let dto = expect_ref(&heap, &dto);

    assert_type(&heap, dto, "ContactDto");
    assert_field(&heap, dto, "name", "Ada");
    assert_field(&heap, dto, "city", "London");
    assert_field(&heap, dto, "score", Value::Int(7));
}

#[test]
fn test_null_intermediate_resolves_to_null() {
    let translator = Translator::new(contacts_registry());
    let mut heap = Heap::new();
    let (_, source) = contact(&mut heap, Value::Null);

    let dto = translator.translate(&mut heap, &source, "ContactDto").unwrap();
    let dto = expect_ref(&heap, &dto);
    assert_field(&heap, dto, "city", Value::Null);
    assert_field(&heap, dto, "address", Value::Null);
}

#[test]
fn test_ignored_property_is_never_written() {
    let translator = Translator::new(contacts_registry());
    let mut heap = Heap::new();
    let (_, source) = contact(&mut heap, Value::Null);

    let dto = translator.translate(&mut heap, &source, "ContactDto").unwrap();
    let dto = expect_ref(&heap, &dto);
    assert_field(&heap, dto, "password", Value::Null);
}

#[test]
fn test_untranslated_object_is_copied_by_reference() {
    let translator = Translator::new(contacts_registry());
    let mut heap = Heap::new();
    let address = heap.new_record("Address", [("city", "London")]);
    let (_, source) = contact(&mut heap, Value::Ref(address));

    let dto = translator.translate(&mut heap, &source, "ContactDto").unwrap();
    let dto = expect_ref(&heap, &dto);
    assert_eq!(field_ref(&heap, dto, "address"), address);
}

#[test]
fn test_scalar_list_is_copied_into_a_fresh_list() {
    let translator = Translator::new(contacts_registry());
    let mut heap = Heap::new();
    let (tags, source) = contact(&mut heap, Value::Null);

    let dto = translator.translate(&mut heap, &source, "ContactDto").unwrap();
    let dto = expect_ref(&heap, &dto);
    assert_ne!(field_ref(&heap, dto, "tags"), tags);
    assert_eq!(list_items(&heap, dto, "tags"), vec![Value::from("a"), Value::from("b")]);
}

// ============================================================================
// RUNTIME SUBTYPES
// ============================================================================

fn shapes_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(TypeDef::new("Shape").field(FieldDef::new("name", ValueType::Str)))
        .with(TypeDef::new("Circle").extends("Shape"))
        .with(TypeDef::new("UnitCircle").extends("Circle"))
        .with(
            TypeDef::new("ShapeDto")
                .field(FieldDef::new("name", ValueType::Str))
                .variant("Circle", "CircleDto")
                .variant("Shape", "Unrelated"),
        )
        .with(
            TypeDef::new("CircleDto")
                .extends("ShapeDto")
                .field(FieldDef::new("radius", ValueType::Float)),
        )
        .with(TypeDef::new("Unrelated"))
}

#[rstest]
#[case::exact_variant("Circle", "CircleDto")]
#[case::inherited_variant("UnitCircle", "CircleDto")]
#[case::non_subtype_variant_ignored("Shape", "ShapeDto")]
#[case::unregistered_source("Blob", "ShapeDto")]
fn test_runtime_subtype_selection(#[case] source_type: &str, #[case] expected: &str) {
    let translator = Translator::new(shapes_registry());
    let mut heap = Heap::new();
    let source = heap.new_record(
        source_type,
        [("name", Value::from("s")), ("radius", Value::Float(1.0))],
    );

    let dto = translator
        .translate(&mut heap, &Value::Ref(source), "ShapeDto")
        .unwrap();
    let dto = expect_ref(&heap, &dto);
    assert_type(&heap, dto, expected);
    assert_field(&heap, dto, "name", "s");
}

// ============================================================================
// SLOT VARIANTS
// ============================================================================

fn badge_registry() -> TypeRegistry {
    let upper = Accessors::new()
        .getter(|heap, id| Ok(heap.field(id, "raw").cloned().unwrap_or_default()))
        .setter(|heap, id, value| {
            let upper = match value {
                Value::Str(s) => Value::from(s.to_uppercase()),
                other => other,
            };
            heap.set_field(id, "raw", upper);
            Ok(())
        });
    TypeRegistry::new().with(
        TypeDef::new("Badge")
            .field(FieldDef::new("raw", ValueType::Str).ignore())
            .field(FieldDef::new("label", ValueType::Str).accessors(upper))
            .field(FieldDef::new("settings", ValueType::map(ValueType::Str, ValueType::Str)).ignore())
            .field(FieldDef::new("theme", ValueType::Str).map_entry("settings", "theme"))
            .field(FieldDef::new("coords", ValueType::list(ValueType::Int)).ignore())
            .field(FieldDef::new("x", ValueType::Int).element("coords", 0))
            .field(FieldDef::new("y", ValueType::Int).element("coords", 1)),
    )
}

fn badge(heap: &mut Heap) -> ObjectId {
    let settings = heap.new_map([("theme", "light"), ("font", "serif")]);
    let coords = heap.new_list([Value::Int(0)]);
    heap.new_record(
        "Badge",
        [
            ("raw", Value::Null),
            ("settings", Value::Ref(settings)),
            ("coords", Value::Ref(coords)),
        ],
    )
}

#[test]
fn test_accessor_map_entry_and_element_slots() {
    let translator = Translator::new(badge_registry());
    let mut heap = Heap::new();
    let target = badge(&mut heap);
    let source = heap.new_record(
        "BadgeForm",
        [
            ("label", Value::from("guest")),
            ("theme", Value::from("dark")),
            ("x", Value::Int(3)),
            ("y", Value::Int(4)),
        ],
    );

    translator.update(&mut heap, &Value::Ref(source), target).unwrap();

    assert_field(&heap, target, "raw", "GUEST");
    assert_eq!(map_entry(&heap, target, "settings", "theme"), Some(Value::from("dark")));
    assert_eq!(map_entry(&heap, target, "settings", "font"), Some(Value::from("serif")));
    assert_eq!(list_items(&heap, target, "coords"), vec![Value::Int(3), Value::Int(4)]);
}

#[test]
fn test_accessor_without_setter_fails_to_write() {
    let registry = TypeRegistry::new().with(
        TypeDef::new("Clock").field(
            FieldDef::new("now", ValueType::Int)
                .accessors(Accessors::new().getter(|_, _| Ok(Value::Int(0)))),
        ),
    );
    let translator = Translator::new(registry);
    let mut heap = Heap::new();
    let source = heap.new_record("Tick", [("now", 5i64)]);

    let err = translator
        .translate(&mut heap, &Value::Ref(source), "Clock")
        .unwrap_err();
    assert!(err.is_property_access());
    assert!(err.to_string().contains("no write capability"), "{err}");
}
