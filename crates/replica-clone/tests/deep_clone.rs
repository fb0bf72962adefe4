//! Deep clone integration tests
//!
//! Covers the kind-specific rules over realistic graphs:
//! - Identity: primitives and functions pass through, heap values are copied
//! - Topology: cycles and shared references map onto the copy
//! - Kinds: dates, patterns, sparse arrays, collections, buffers, errors

use std::sync::Arc;

use replica_clone::{CloneConfig, CloneMode, DeepCloner, clone, is_cloneable};
use replica_value::{
    ErrorKind, Intrinsics, PropertyAttributes, PropertyDescriptor, PropertyKey, Symbol,
    TypedArrayKind, Value, deep_equals, to_json,
};
use serde_json::json;

fn key(name: &str) -> PropertyKey {
    PropertyKey::from(name)
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_heap_values_are_copied() {
    let intrinsics = Intrinsics::new();
    let record = intrinsics.new_object();
    record.set("a", Value::int32(1));
    let set = intrinsics.new_set();
    set.add(Value::string("x"));
    let map = intrinsics.new_map();
    map.set(Value::string("k"), Value::boolean(true));

    let originals: Vec<Value> = vec![
        record.into(),
        intrinsics.array_from([Value::int32(1), Value::int32(2)]).into(),
        intrinsics.new_date(0.0).into(),
        intrinsics.new_regexp("a+b", "gi").into(),
        map.into(),
        set.into(),
        intrinsics.new_typed_array(TypedArrayKind::Int16, 4).unwrap().into(),
        intrinsics.new_error(ErrorKind::RangeError, "out of range").into(),
    ];

    for original in &originals {
        let copy = clone(original);
        assert!(!copy.ptr_eq(original), "{:?} was not copied", original);
        assert!(deep_equals(&copy, original), "{:?} differs from its copy", original);
        assert_eq!(copy.type_of(), original.type_of());
    }
}

#[test]
fn test_function_passes_through() {
    let intrinsics = Intrinsics::new();
    let f = Value::from(intrinsics.new_function("handler", |_| Ok(Value::int32(7))));

    let copy = clone(&f);
    assert!(copy.ptr_eq(&f));
    assert_eq!(copy.as_function().unwrap().call(&[]), Ok(Value::int32(7)));
}

#[test]
fn test_is_cloneable_is_shallow() {
    let intrinsics = Intrinsics::new();
    let f = Value::from(intrinsics.new_function("f", |_| Ok(Value::undefined())));
    let holder = intrinsics.array_from([f.clone()]);

    assert!(!is_cloneable(&f));
    assert!(is_cloneable(&Value::from(holder)));
    assert!(is_cloneable(&Value::null()));
    assert!(is_cloneable(&Value::from(intrinsics.new_weak_map())));
}

// ============================================================================
// Topology
// ============================================================================

#[test]
fn test_self_reference() {
    let intrinsics = Intrinsics::new();
    let a = intrinsics.new_object();
    a.set("self", Value::from(a.clone()));

    let copy = clone(&Value::from(a.clone()));
    let inner = copy.as_object().unwrap().get(&key("self")).unwrap();
    assert!(inner.ptr_eq(&copy));
    assert!(!inner.ptr_eq(&Value::from(a)));
}

#[test]
fn test_shared_reference() {
    let intrinsics = Intrinsics::new();
    let shared = intrinsics.new_object();
    let root = intrinsics.new_object();
    root.set("x", Value::from(shared.clone()));
    root.set("y", Value::from(shared.clone()));

    let copy = clone(&Value::from(root));
    let copy = copy.as_object().unwrap();
    let x = copy.get(&key("x")).unwrap();
    let y = copy.get(&key("y")).unwrap();
    assert!(x.ptr_eq(&y));
    assert!(!x.ptr_eq(&Value::from(shared)));
}

#[test]
fn test_cycle_through_collections() {
    let intrinsics = Intrinsics::new();
    let map = intrinsics.new_map();
    let list = intrinsics.new_array(0);
    list.push(Value::from(map.clone()));
    map.set(Value::string("list"), Value::from(list.clone()));

    let copy = clone(&Value::from(list));
    let copy_list = copy.as_array().unwrap();
    let copy_map = copy_list.get(0).unwrap();
    let back = copy_map.as_map().unwrap().get(&Value::string("list")).unwrap();
    assert!(back.ptr_eq(&copy));
}

#[test]
fn test_fresh_visited_set_per_call() {
    let intrinsics = Intrinsics::new();
    let obj = Value::from(intrinsics.new_object());

    let first = clone(&obj);
    let second = clone(&obj);
    assert!(!first.ptr_eq(&second));
}

// ============================================================================
// Kind rules
// ============================================================================

#[test]
fn test_date() {
    let intrinsics = Intrinsics::new();
    let date = intrinsics.parse_date("2023-01-01").unwrap();

    let copy = clone(&Value::from(date.clone()));
    let copy_date = copy.as_date().unwrap();
    assert!(!Arc::ptr_eq(copy_date, &date));
    assert_eq!(copy_date.time_value(), date.time_value());
    assert_eq!(copy_date.time_value(), 1_672_531_200_000.0);

    // Later changes to the source do not leak into the copy
    date.set_time(0.0);
    assert_eq!(copy_date.time_value(), 1_672_531_200_000.0);
}

#[test]
fn test_regexp() {
    let intrinsics = Intrinsics::new();
    let re = intrinsics.new_regexp("h(e)llo", "gi");
    re.set_last_index(3);

    let copy = clone(&Value::from(re.clone()));
    let copy_re = copy.as_regexp().unwrap();
    assert_eq!(copy_re.source, "h(e)llo");
    assert_eq!(copy_re.flags, "gi");
    assert_eq!(copy_re.last_index(), 0);
    assert_eq!(copy_re.is_match("HELLO"), Some(true));
}

#[test]
fn test_sparse_array() {
    let intrinsics = Intrinsics::new();
    let arr = intrinsics.new_array(3);
    arr.set(0, Value::int32(1));
    arr.set(2, Value::int32(3));

    let copy = clone(&Value::from(arr));
    let copy = copy.as_array().unwrap();
    assert_eq!(copy.len(), 3);
    assert!(!copy.has_index(1));
    assert_eq!(copy.get(1), None);
    assert_eq!(copy.get(2), Some(Value::int32(3)));
}

#[test]
fn test_array_extra_properties() {
    let intrinsics = Intrinsics::new();
    let arr = intrinsics.array_from([Value::int32(1)]);
    arr.object.set("label", Value::string("ones"));

    let copy = clone(&Value::from(arr));
    let copy = copy.as_array().unwrap();
    assert_eq!(copy.object.get(&key("label")), Some(Value::string("ones")));
}

#[test]
fn test_set_of_records() {
    let intrinsics = Intrinsics::new();
    let one = intrinsics.new_object();
    one.set("id", Value::int32(1));
    let two = intrinsics.new_object();
    two.set("id", Value::int32(2));
    let set = intrinsics.new_set();
    set.add(Value::from(one.clone()));
    set.add(Value::from(two.clone()));

    let copy = clone(&Value::from(set));
    let copy_set = copy.as_set().unwrap();
    assert_eq!(copy_set.size(), 2);

    let elements = copy_set.values();
    for (element, original) in elements.iter().zip([one, two]) {
        let original = Value::from(original);
        assert!(!element.ptr_eq(&original));
        assert!(deep_equals(element, &original));
    }
    assert_eq!(
        elements[1].as_object().unwrap().get(&key("id")),
        Some(Value::int32(2))
    );
}

#[test]
fn test_map_keys_and_values_are_cloned_in_order() {
    let intrinsics = Intrinsics::new();
    let key_obj = intrinsics.new_object();
    let value_obj = intrinsics.new_object();
    let map = intrinsics.new_map();
    map.set(Value::string("first"), Value::int32(1));
    map.set(Value::from(key_obj.clone()), Value::from(value_obj.clone()));
    map.set(Value::number(f64::NAN), Value::string("nan"));

    let copy = clone(&Value::from(map));
    let entries = copy.as_map().unwrap().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].0, Value::string("first"));

    let (cloned_key, cloned_value) = &entries[1];
    assert!(!cloned_key.ptr_eq(&Value::from(key_obj.clone())));
    assert!(!cloned_value.ptr_eq(&Value::from(value_obj)));

    // The original key no longer addresses the copy
    let copy_map = copy.as_map().unwrap();
    assert!(!copy_map.has(&Value::from(key_obj)));
    assert!(copy_map.has(cloned_key));
    assert_eq!(copy_map.get(&Value::number(f64::NAN)), Some(Value::string("nan")));
}

#[test]
fn test_typed_array_bytes() {
    let intrinsics = Intrinsics::new();
    let ta = intrinsics.new_typed_array(TypedArrayKind::Float64, 2).unwrap();
    ta.set(0, 1.5);
    ta.set(1, -2.25);

    let copy = clone(&Value::from(ta.clone()));
    let copy_ta = copy.as_typed_array().unwrap();
    assert_eq!(copy_ta.kind(), TypedArrayKind::Float64);
    assert_eq!(copy_ta.length(), 2);
    assert!(!Arc::ptr_eq(copy_ta.buffer(), ta.buffer()));
    assert_eq!(copy_ta.view_bytes(), ta.view_bytes());

    ta.set(0, 9.0);
    assert_eq!(copy_ta.get(0), Some(1.5));
}

#[test]
fn test_shared_buffer_stays_shared() {
    let intrinsics = Intrinsics::new();
    let buffer = intrinsics.new_array_buffer(16);
    let bytes = intrinsics
        .typed_array_over(buffer.clone(), TypedArrayKind::Uint8, 0, 16)
        .unwrap();
    let view = intrinsics.new_data_view(buffer.clone(), 8, None).unwrap();
    let root = intrinsics.new_object();
    root.set("bytes", Value::from(bytes));
    root.set("view", Value::from(view));
    root.set("buffer", Value::from(buffer.clone()));

    let copy = clone(&Value::from(root));
    let copy = copy.as_object().unwrap();
    let bytes = copy.get(&key("bytes")).unwrap();
    let view = copy.get(&key("view")).unwrap();
    let raw = copy.get(&key("buffer")).unwrap();
    let bytes = bytes.as_typed_array().unwrap();
    let view = view.as_data_view().unwrap();
    let raw = raw.as_array_buffer().unwrap();

    assert!(Arc::ptr_eq(bytes.buffer(), view.buffer()));
    assert!(Arc::ptr_eq(bytes.buffer(), raw));
    assert!(!Arc::ptr_eq(raw, &buffer));
    assert_eq!(view.byte_offset(), 8);
    assert_eq!(view.byte_length(), 8);

    view.set_uint8(0, 0xAB).unwrap();
    assert_eq!(bytes.get(8), Some(171.0));
    assert_eq!(buffer.to_bytes()[8], 0);
}

#[test]
fn test_view_cycle_through_buffer_properties() {
    let intrinsics = Intrinsics::new();
    let buffer = intrinsics.new_array_buffer(8);
    let view = intrinsics.new_data_view(buffer.clone(), 0, None).unwrap();
    let words = intrinsics
        .typed_array_over(buffer.clone(), TypedArrayKind::Uint16, 0, 4)
        .unwrap();
    buffer.object.set("view", Value::from(view.clone()));
    buffer.object.set("words", Value::from(words.clone()));
    view.set_uint8(1, 9).unwrap();

    let copy = clone(&Value::from(view));
    let copy_view = copy.as_data_view().unwrap();
    let copy_buffer = copy_view.buffer();
    assert!(!Arc::ptr_eq(copy_buffer, &buffer));

    let back = copy_buffer.object.get(&key("view")).unwrap();
    assert!(back.ptr_eq(&copy));

    // A sibling view hanging off the buffer shares the copied bytes
    let copy_words = copy_buffer.object.get(&key("words")).unwrap();
    let copy_words = copy_words.as_typed_array().unwrap();
    assert!(Arc::ptr_eq(copy_words.buffer(), copy_buffer));
    assert_eq!(copy_words.get(0), Some(2304.0));
}

#[test]
fn test_run_shared_with_dropped_sources() {
    let intrinsics = Intrinsics::new();
    let mut cloner = DeepCloner::new();

    let mut copies = Vec::new();
    for n in 0..64 {
        let record = intrinsics.new_object();
        record.set("n", Value::int32(n));
        copies.push(cloner.run_shared(&Value::from(record)).unwrap());
    }

    for (n, copy) in copies.iter().enumerate() {
        let field = copy.as_object().unwrap().get(&key("n"));
        assert_eq!(field, Some(Value::int32(n as i32)));
    }
    for pair in copies.windows(2) {
        assert!(!pair[0].ptr_eq(&pair[1]));
    }
}

#[test]
fn test_error_subclass() {
    let intrinsics = Intrinsics::new();
    let validation_proto = intrinsics.new_class_prototype(
        "ValidationError",
        Some(intrinsics.error_prototype(ErrorKind::Error)),
    );
    let err =
        intrinsics.new_error_with_prototype(&validation_proto, "ValidationError", "bad input");
    err.object.set("field", Value::string("email"));
    err.object.define_property(
        "secret",
        PropertyDescriptor::data_with_attrs(Value::int32(1), PropertyAttributes::hidden()),
    );

    let copy = clone(&Value::from(err.clone()));
    let copy_err = copy.as_error().unwrap();
    assert!(!Arc::ptr_eq(copy_err, &err));
    assert_eq!(copy_err.name, "ValidationError");
    assert_eq!(copy_err.message, "bad input");
    assert_eq!(copy_err.stack, err.stack);
    assert!(copy_err.object.inherits_from(&validation_proto));
    assert_eq!(copy_err.object.get(&key("field")), Some(Value::string("email")));
    // Only enumerable own properties are carried over
    assert!(!copy_err.object.has_own(&key("secret")));
}

#[test]
fn test_weak_collections_become_empty() {
    let intrinsics = Intrinsics::new();
    let target = Value::from(intrinsics.new_object());
    let wm = intrinsics.new_weak_map();
    wm.set(target.as_heap().unwrap(), Value::int32(1));
    let ws = intrinsics.new_weak_set();
    ws.add(target.as_heap().unwrap());

    let copy = clone(&Value::from(wm.clone()));
    let copy_wm = copy.as_weak_map().unwrap();
    assert!(!Arc::ptr_eq(copy_wm, &wm));
    assert!(!copy_wm.has(target.as_heap().unwrap()));
    assert!(copy_wm.object.same_prototype(&wm.object));

    let copy = clone(&Value::from(ws));
    assert!(!copy.as_weak_set().unwrap().has(target.as_heap().unwrap()));
}

#[test]
fn test_class_instance_keeps_prototype() {
    let intrinsics = Intrinsics::new();
    let point_proto = intrinsics.new_class_prototype("Point", None);
    let point = intrinsics.new_object_with_prototype(Some(point_proto.clone()));
    point.set("x", Value::int32(3));

    let copy = clone(&Value::from(point));
    let copy = copy.as_object().unwrap();
    assert!(Arc::ptr_eq(copy.prototype().unwrap(), &point_proto));
    assert_eq!(copy.get(&key("x")), Some(Value::int32(3)));
}

#[test]
fn test_hidden_and_symbol_properties() {
    let intrinsics = Intrinsics::new();
    let tag = Symbol::new(Some("tag"));
    let obj = intrinsics.new_object();
    obj.set(tag.clone(), Value::string("tagged"));
    obj.define_property(
        "internal",
        PropertyDescriptor::data_with_attrs(Value::int32(5), PropertyAttributes::frozen()),
    );

    let copy = clone(&Value::from(obj));
    let copy = copy.as_object().unwrap();
    assert_eq!(copy.get(&PropertyKey::from(tag)), Some(Value::string("tagged")));

    let internal = copy.get_own_property(&key("internal")).unwrap();
    assert_eq!(internal.value(), Some(&Value::int32(5)));
    assert!(!internal.is_enumerable());
    assert!(!internal.is_writable());
}

#[test]
fn test_accessors_are_kept_in_lenient_mode() {
    let intrinsics = Intrinsics::new();
    let getter = Value::from(intrinsics.new_function("get size", |_| Ok(Value::int32(3))));
    let obj = intrinsics.new_object();
    obj.define_property(
        "size",
        PropertyDescriptor::accessor(Some(getter.clone()), None, PropertyAttributes::data()),
    );

    let copy = clone(&Value::from(obj));
    match copy.as_object().unwrap().get_own_property(&key("size")) {
        Some(PropertyDescriptor::Accessor { get: Some(get), .. }) => assert!(get.ptr_eq(&getter)),
        other => panic!("expected an accessor, got {:?}", other),
    }
}

#[test]
fn test_json_data_round_trips() {
    let intrinsics = Intrinsics::new();
    let source = json!({
        "name": "replica",
        "tags": ["a", "b"],
        "nested": { "depth": 2, "empty": null },
        "ratio": 0.5
    });
    let value = intrinsics.value_from_json(&source);

    let copy = clone(&value);
    assert!(!copy.ptr_eq(&value));
    assert_eq!(to_json(&copy).unwrap(), Some(source));
}

#[test]
fn test_configured_cloner() {
    let config = CloneConfig::from_toml_str("mode = \"strict\"\nvisited_capacity = 4").unwrap();
    let mut cloner = DeepCloner::with_config(&config);
    assert_eq!(cloner.mode(), CloneMode::Strict);

    let intrinsics = Intrinsics::new();
    let shared = Value::from(intrinsics.new_object());
    let pair = intrinsics.array_from([shared.clone(), shared]);
    let copy = cloner.run(&Value::from(pair)).unwrap();
    assert_eq!(cloner.visited_count(), 2);

    let copy = copy.as_array().unwrap();
    assert!(copy.get(0).unwrap().ptr_eq(&copy.get(1).unwrap()));
}
