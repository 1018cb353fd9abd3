//! Type registries and source graphs used across the integration tests.

use graft::{ElementMatcher, FieldDef, Heap, ObjectId, TypeDef, TypeRegistry, Value, ValueType};

// ============================================================================
// KEYED VALUES (map updates)
// ============================================================================

fn keyed_value_type(name: &str) -> TypeDef {
    TypeDef::new(name)
        .field(FieldDef::new("id", ValueType::Int))
        .field(FieldDef::new("name", ValueType::Str))
}

fn values_field() -> FieldDef {
    FieldDef::new(
        "values",
        ValueType::map(ValueType::Str, ValueType::object("Value")),
    )
}

/// `ValueDto` sources and four map holders that differ only in how
/// `values` is configured.
pub fn map_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(keyed_value_type("Value"))
        .with(keyed_value_type("ValueDto"))
        .with(TypeDef::new("ValueMap").field(values_field().update(true)))
        .with(
            TypeDef::new("RetainingValueMap")
                .field(values_field().update(true).remove_orphans(false)),
        )
        .with(TypeDef::new("ReplacedValueMap").field(values_field()))
        .with(
            TypeDef::new("Labels").field(
                FieldDef::new("values", ValueType::map(ValueType::Str, ValueType::Str))
                    .update(true),
            ),
        )
}

pub fn keyed_value(heap: &mut Heap, type_name: &str, id: i64, name: &str) -> ObjectId {
    heap.new_record(type_name, [("id", Value::Int(id)), ("name", Value::from(name))])
}

/// A `type_name` record whose `values` map holds `entries` in order.
pub fn map_holder(heap: &mut Heap, type_name: &str, entries: &[(&str, Option<ObjectId>)]) -> ObjectId {
    let map = heap.new_map(entries.iter().map(|(key, value)| (*key, Value::from(*value))));
    heap.new_record(type_name, [("values", map)])
}

// ============================================================================
// PETS (factories and subtypes)
// ============================================================================

/// `Animal`/`Cat` sources, `AnimalDto`/`CatDto` destinations and owner types
/// whose `pet` slot goes through the `pets` factory.
pub fn pets_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(TypeDef::new("Animal").field(FieldDef::new("name", ValueType::Str)))
        .with(TypeDef::new("Cat").extends("Animal"))
        .with(TypeDef::new("AnimalDto").field(FieldDef::new("name", ValueType::Str)))
        .with(TypeDef::new("CatDto").extends("AnimalDto"))
        .with(TypeDef::new("PetOwner").field(FieldDef::new("pet", ValueType::object("Animal"))))
        .with(
            TypeDef::new("PetOwnerDto").field(
                FieldDef::new("pet", ValueType::object("AnimalDto"))
                    .translate(true)
                    .factory("pets"),
            ),
        )
        .with(
            TypeDef::new("PetOwnerCopy").field(
                FieldDef::new("pet", ValueType::object("Animal"))
                    .translate(false)
                    .factory("pets"),
            ),
        )
}

/// A `PetOwner` holding a fresh `animal_type` named `name`.
pub fn pet_owner(heap: &mut Heap, animal_type: &str, name: &str) -> (ObjectId, ObjectId) {
    let pet = heap.new_record(animal_type, [("name", name)]);
    let owner = heap.new_record("PetOwner", [("pet", pet)]);
    (owner, pet)
}

// ============================================================================
// PEOPLE (twin views, shared references)
// ============================================================================

/// Two views of one person that refer to each other, plus a team whose
/// lead and captain slots both translate to `PersonDto`.
pub fn people_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            TypeDef::new("PersonViews")
                .field(
                    FieldDef::new("details", ValueType::object("PersonDetails"))
                        .translate(true)
                        .expression("this"),
                )
                .field(
                    FieldDef::new("summary", ValueType::object("PersonSummary"))
                        .translate(true)
                        .expression("this"),
                ),
        )
        .with(
            TypeDef::new("PersonSummary")
                .field(FieldDef::new("name", ValueType::Str))
                .field(
                    FieldDef::new("details", ValueType::object("PersonDetails"))
                        .translate(true)
                        .expression("this"),
                ),
        )
        .with(
            TypeDef::new("PersonDetails")
                .field(
                    FieldDef::new("summary", ValueType::object("PersonSummary"))
                        .translate(true)
                        .expression("this"),
                )
                .field(FieldDef::new("name", ValueType::Str))
                .field(FieldDef::new("location", ValueType::Str)),
        )
        .with(
            TypeDef::new("PersonDto")
                .field(FieldDef::new("name", ValueType::Str))
                .field(
                    FieldDef::new("friend", ValueType::object("PersonDto"))
                        .translate(true),
                ),
        )
        .with(
            TypeDef::new("TeamDto")
                .field(FieldDef::new("lead", ValueType::object("PersonDto")).translate(true))
                .field(FieldDef::new("captain", ValueType::object("PersonDto")).translate(true))
                .field(FieldDef::new("members", ValueType::list(ValueType::object("PersonDto")))),
        )
}

pub fn person(heap: &mut Heap, name: &str, location: &str) -> ObjectId {
    heap.new_record(
        "Person",
        [
            ("name", Value::from(name)),
            ("location", Value::from(location)),
            ("friend", Value::Null),
        ],
    )
}

pub fn team(heap: &mut Heap, lead: ObjectId, captain: ObjectId, members: &[ObjectId]) -> ObjectId {
    let members = heap.new_list(members.iter().copied());
    heap.new_record(
        "Team",
        [
            ("lead", Value::Ref(lead)),
            ("captain", Value::Ref(captain)),
            ("members", Value::Ref(members)),
        ],
    )
}

// ============================================================================
// ORDERS (collection updates)
// ============================================================================

fn lines_field() -> FieldDef {
    FieldDef::new("lines", ValueType::list(ValueType::object("Line")))
}

/// Order lines matched by SKU, by position, or not updated at all.
pub fn orders_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            TypeDef::new("Line")
                .field(FieldDef::new("sku", ValueType::Str))
                .field(FieldDef::new("quantity", ValueType::Int)),
        )
        .with(
            TypeDef::new("Order").field(
                lines_field()
                    .update(true)
                    .matcher(ElementMatcher::by_id("code", "sku")),
            ),
        )
        .with(
            TypeDef::new("RetainingOrder").field(
                lines_field()
                    .update(true)
                    .remove_orphans(false)
                    .matcher(ElementMatcher::by_id("code", "sku")),
            ),
        )
        .with(TypeDef::new("PositionalOrder").field(lines_field().update(true)))
        .with(TypeDef::new("ReplacedOrder").field(lines_field()))
        .with(
            TypeDef::new("Tagged").field(
                FieldDef::new("tags", ValueType::list(ValueType::Str)).update(true),
            ),
        )
}

/// A source line; its identifier lives in `code`.
pub fn line_dto(heap: &mut Heap, code: &str, quantity: i64) -> ObjectId {
    heap.new_record(
        "LineDto",
        [
            ("sku", Value::from(code)),
            ("code", Value::from(code)),
            ("quantity", Value::Int(quantity)),
        ],
    )
}

pub fn line(heap: &mut Heap, sku: &str, quantity: i64) -> ObjectId {
    heap.new_record("Line", [("sku", Value::from(sku)), ("quantity", Value::Int(quantity))])
}

/// A `type_name` record whose `lines` list holds `lines` in order.
pub fn order(heap: &mut Heap, type_name: &str, lines: &[ObjectId]) -> ObjectId {
    let list = heap.new_list(lines.iter().copied());
    heap.new_record(type_name, [("lines", list)])
}

// ============================================================================
// NODES (cycles, depth)
// ============================================================================

pub fn nodes_registry() -> TypeRegistry {
    TypeRegistry::new().with(
        TypeDef::new("NodeDto")
            .field(FieldDef::new("label", ValueType::Str))
            .field(FieldDef::new("next", ValueType::object("NodeDto")).translate(true)),
    )
}

/// A chain of `labels.len()` nodes, each pointing at the following one.
/// Returns the nodes in chain order.
pub fn node_chain(heap: &mut Heap, labels: &[&str]) -> Vec<ObjectId> {
    let nodes: Vec<ObjectId> = labels
        .iter()
        .map(|label| heap.new_record("Node", [("label", Value::from(*label)), ("next", Value::Null)]))
        .collect();
    for pair in nodes.windows(2) {
        heap.set_field(pair[0], "next", Value::Ref(pair[1]));
    }
    nodes
}
