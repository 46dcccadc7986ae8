use recap_core::{AttrValue, Registry, Type, TypeKind};
use recap_schema::{from_value, to_value};
use serde_json::json;
use wasm_bindgen_test::*;

fn order_schema() -> serde_json::Value {
    json!({
        "alias": "Order",
        "type": "struct",
        "doc": "A customer order",
        "fields": [
            {"name": "id", "type": "uuid"},
            {"name": "placed_at", "type": "timestamp64", "timezone": "America/New_York"},
            {"name": "total", "type": "decimal128"},
            {"name": "status", "type": "enum", "symbols": ["PENDING", "SHIPPED", "DELIVERED"]},
            {"name": "items", "type": "list", "element_type": {
                "alias": "LineItem",
                "type": "struct",
                "fields": [
                    {"name": "sku", "type": "string", "max_length": 32, "variable": false},
                    {"name": "quantity", "type": "uint16"}
                ]
            }},
            {"name": "notes", "type": ["null", "string32"], "default": null},
            {"name": "tags", "type": "map", "key_type": "string32", "value_type": "string32"}
        ]
    })
}

#[wasm_bindgen_test(unsupported = test)]
fn parses_full_schema() {
    let registry = Registry::new();
    let order = from_value(&registry, &order_schema()).unwrap();

    let TypeKind::Struct { fields } = order.kind() else {
        panic!("expected struct, found {order}")
    };
    let names: Vec<_> = fields
        .iter()
        .filter_map(|f| f.extra_attrs().get("name").and_then(AttrValue::as_str))
        .collect();
    assert_eq!(
        names,
        vec!["id", "placed_at", "total", "status", "items", "notes", "tags"]
    );
    assert!(registry.contains("Order"));
    assert!(registry.contains("LineItem"));
}

#[wasm_bindgen_test(unsupported = test)]
fn resolves_full_schema() {
    let registry = Registry::new();
    let order = from_value(&registry, &order_schema()).unwrap();
    let resolved = registry.resolve_tree(&order).unwrap();

    let TypeKind::Struct { fields } = resolved.kind() else {
        panic!("expected struct, found {resolved}")
    };
    assert_eq!(
        fields[1],
        Type::int(64, true)
            .with_logical("Timestamp")
            .with_attr("unit", "millisecond")
            .with_attr("timezone", "America/New_York")
            .with_attr("name", "placed_at")
    );
    assert_eq!(fields[2].logical(), Some("Decimal"));
    assert_eq!(
        resolved.to_string(),
        "struct {id: string[36], placed_at: int64, total: bytes[16], \
         status: enum {PENDING, SHIPPED, DELIVERED}, \
         items: [struct {sku: string[32], quantity: uint16}], \
         notes: null | string(2147483648), \
         tags: {string(2147483648), string(2147483648)}}"
    );
}

#[wasm_bindgen_test(unsupported = test)]
fn round_trips_through_emitter() {
    let first = Registry::new();
    let order = from_value(&first, &order_schema()).unwrap();
    let emitted = to_value(&order);

    let second = Registry::new();
    assert_eq!(from_value(&second, &emitted), Ok(order));
}
