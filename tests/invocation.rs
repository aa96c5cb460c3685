//! Dispatch tests
//!
//! Drives the Finder fixture through a recording executor and checks the
//! exact script text sent for each kind of call, plus how results decode.

mod common;

use chrono::{TimeZone, Utc};
use common::{FINDER, finder, finder_with, told};
use tellscript::runtime::value::{EnumConstant, Rectangle};
use tellscript::{Id, ObjectRef, Reference, RuntimeConfig, ScriptError, TypeClass, Value};

fn window(handler: &tellscript::ObjectInvocationHandler, specifier: &str) -> tellscript::ObjectInvocationHandler {
    handler.handler(ObjectRef::new(
        "FinderWindow",
        Reference::object(specifier, Some(FINDER)),
    ))
}

#[test]
fn quit_is_wrapped_in_tell() {
    let (finder, stub) = finder();
    let result = finder.invoke("quit", &[], None).unwrap();
    assert_eq!(result, Value::Null);
    assert_eq!(
        stub.scripts(),
        vec!["tell application \"Finder\"\r\nquit\r\nend tell\r\n"]
    );
}

#[test]
fn property_getter_on_application_omits_of() {
    let (finder, stub) = finder();
    stub.reply("\"Finder\"");
    assert_eq!(finder.invoke("get_name", &[], None).unwrap(), Value::from("Finder"));
    assert_eq!(stub.last_script().unwrap(), told("return name"));

    stub.reply("true");
    assert_eq!(finder.invoke("is_frontmost", &[], None).unwrap(), Value::Boolean(true));
    assert_eq!(stub.last_script().unwrap(), told("return frontmost"));
}

#[test]
fn property_setter_encodes_value() {
    let (finder, stub) = finder();
    assert_eq!(
        finder.invoke("set_frontmost", &[Value::Boolean(false)], None).unwrap(),
        Value::Null
    );
    assert_eq!(stub.last_script().unwrap(), told("set frontmost to false"));

    let win = window(&finder, "Finder window id 3");
    let bounds = Rectangle {
        x: 10,
        y: 20,
        width: 300,
        height: 200,
    };
    win.invoke("set_bounds", &[Value::Rectangle(bounds)], None).unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("set bounds of Finder window id 3 to {10, 20, 310, 220}")
    );
}

#[test]
fn inherited_property_getter_uses_of_clause() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window id 3");
    stub.reply("{0, 0, 100, 200}");
    let bounds = win.invoke("get_bounds", &[], None).unwrap();
    assert_eq!(
        bounds,
        Value::Rectangle(Rectangle {
            x: 0,
            y: 0,
            width: 100,
            height: 200
        })
    );
    assert_eq!(stub.last_script().unwrap(), told("return bounds of Finder window id 3"));
}

#[test]
fn element_list_decodes_objects() {
    let (finder, stub) = finder();
    stub.reply(
        "{Finder window id 1 of application \"Finder\", Finder window id 2 of application \"Finder\"}",
    );
    let windows = finder.invoke("get_windows", &[], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return Finder windows"));

    let windows = windows.as_list().unwrap();
    assert_eq!(windows.len(), 2);
    let first = windows[0].as_object().unwrap();
    assert_eq!(first.interface, "FinderWindow");
    assert_eq!(
        first.reference,
        Reference::object("Finder window id 1 of application \"Finder\"", Some(FINDER))
    );
}

#[test]
fn element_list_with_filter() {
    let (finder, stub) = finder();
    finder
        .invoke("get_windows", &[Value::from("name is \"Docs\"")], None)
        .unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("return Finder windows where name is \"Docs\"")
    );

    finder.invoke("get_windows", &[Value::from("   ")], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return Finder windows"));

    finder.invoke("get_windows", &[Value::Null], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return Finder windows"));
}

#[test]
fn element_by_index_is_built_locally() {
    let (finder, stub) = finder();
    let first = finder.invoke("get_window", &[Value::from(0)], None).unwrap();
    assert_eq!(stub.executions(), 0);
    assert_eq!(
        first,
        Value::Object(ObjectRef::new(
            "FinderWindow",
            Reference::object("item 1 of Finder windows", Some(FINDER))
        ))
    );

    let win = window(&finder, "Finder window id 3");
    let nested = win.handler(first.as_object().unwrap().clone());
    stub.reply("\"Docs\"");
    nested.invoke("get_name", &[], None).unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("return name of item 1 of Finder windows")
    );
}

#[test]
fn element_by_index_round_trip_when_not_reducing() {
    let config = RuntimeConfig {
        reduce_script_executions: false,
        ..RuntimeConfig::default()
    };
    let (finder, stub) = finder_with(config);
    assert!(!finder.reduces_script_executions());
    stub.reply("Finder window id 7 of application \"Finder\"");
    let second = finder.invoke("get_window", &[Value::from(1)], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return item 2 of Finder windows"));
    assert_eq!(
        second.as_object().unwrap().reference.object_reference(),
        Some("Finder window id 7 of application \"Finder\"")
    );
}

#[test]
fn negative_index_is_rejected() {
    let (mut finder, stub) = finder();
    assert!(matches!(
        finder.invoke("get_window", &[Value::from(-1)], None),
        Err(ScriptError::IndexOutOfBounds(-1))
    ));
    finder.set_reduce_script_executions(false);
    assert!(matches!(
        finder.invoke("get_window", &[Value::from(-3)], None),
        Err(ScriptError::IndexOutOfBounds(-3))
    ));
    assert_eq!(stub.executions(), 0);
}

#[test]
fn largest_index_is_rejected() {
    let (finder, stub) = finder();
    assert!(matches!(
        finder.invoke("get_window", &[Value::Long(i64::MAX)], None),
        Err(ScriptError::IndexOutOfBounds(i64::MAX))
    ));
    let win = Value::Object(ObjectRef::new(
        "FinderWindow",
        Reference::object("Finder window id 3", Some(FINDER)),
    ));
    assert!(matches!(
        finder.invoke("set_window", &[Value::Long(i64::MAX), win], None),
        Err(ScriptError::IndexOutOfBounds(i64::MAX))
    ));

    let last = finder
        .invoke("get_window", &[Value::Long(i64::MAX - 1)], None)
        .unwrap();
    assert_eq!(
        last.as_object().unwrap().reference.object_reference(),
        Some(format!("item {} of Finder windows", i64::MAX).as_str())
    );
    assert_eq!(stub.executions(), 0);
}

#[test]
fn element_by_id_both_ways() {
    let (mut finder, stub) = finder();
    let by_id = finder
        .invoke("get_window_by_id", &[Value::Id(Id(42))], None)
        .unwrap();
    assert_eq!(
        by_id.as_object().unwrap().reference.object_reference(),
        Some("Finder window id 42")
    );
    assert_eq!(stub.executions(), 0);

    finder.set_reduce_script_executions(false);
    finder
        .invoke("get_window_by_id", &[Value::Id(Id(42))], None)
        .unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return Finder window id 42"));
}

#[test]
fn element_count() {
    let (finder, stub) = finder();
    stub.reply("3");
    assert_eq!(finder.invoke("count_windows", &[], None).unwrap(), Value::from(3));
    assert_eq!(stub.last_script().unwrap(), told("count Finder windows"));

    stub.reply("1");
    finder
        .invoke("count_windows", &[Value::from("name contains \"a\"")], None)
        .unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("count Finder windows where name contains \"a\"")
    );
}

#[test]
fn element_setter() {
    let (finder, stub) = finder();
    let win = Value::Object(ObjectRef::new(
        "FinderWindow",
        Reference::object("Finder window id 3 of application \"Finder\"", Some(FINDER)),
    ));
    finder.invoke("set_window", &[Value::from(0), win], None).unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("set item 1 of Finder windows to (Finder window id 3 of application \"Finder\")")
    );
}

#[test]
fn element_plural_comes_from_class() {
    let (finder, stub) = finder();
    finder.invoke("get_items", &[], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return items"));
}

#[test]
fn commands_skip_null_arguments() {
    let (finder, stub) = finder();
    let docs = Value::Reference(Reference::object("folder \"Documents\"", Some(FINDER)));
    finder.invoke("open", &[docs.clone(), Value::Null], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("open folder \"Documents\""));

    let desktop = Value::Reference(Reference::object("desktop", Some(FINDER)));
    stub.reply("folder \"Documents\" of desktop of application \"Finder\"");
    let copy = finder
        .invoke("duplicate", &[docs.clone(), desktop, Value::Boolean(true)], None)
        .unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("duplicate folder \"Documents\" to desktop replacing true")
    );
    assert!(copy.as_reference().is_some());

    finder.invoke("duplicate", &[docs, Value::Null, Value::Null], None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("duplicate folder \"Documents\""));
}

#[test]
fn command_with_text_argument_is_quoted() {
    let (finder, stub) = finder();
    stub.reply("false");
    let exists = finder
        .invoke("exists", &[Value::from("caf\u{e9}")], None)
        .unwrap();
    assert_eq!(exists, Value::Boolean(false));
    assert_eq!(
        stub.last_script().unwrap(),
        told("exists (\"caf\" & («data utf8c3a9» as Unicode text))")
    );
}

#[test]
fn command_rejects_extra_arguments() {
    let (finder, stub) = finder();
    assert!(matches!(
        finder.invoke("quit", &[Value::from(1)], None),
        Err(ScriptError::Arguments { .. })
    ));
    assert_eq!(stub.executions(), 0);
}

#[test]
fn make_uses_class_name() {
    let (finder, stub) = finder();
    stub.reply("folder \"untitled folder\" of desktop of application \"Finder\"");
    let made = finder
        .invoke("make", &[Value::Class("Folder".into())], None)
        .unwrap();
    assert_eq!(stub.last_script().unwrap(), told("make folder"));
    assert_eq!(made.as_object().unwrap().interface, "Folder");
}

#[test]
fn make_without_class_name_fails() {
    let (finder, stub) = finder();
    assert!(matches!(
        finder.invoke("make", &[Value::Class("Untitled".into())], None),
        Err(ScriptError::Config(_))
    ));
    assert_eq!(stub.executions(), 0);
}

#[test]
fn enumerations_decode_and_encode() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window 1");
    stub.reply("list view");
    let expected = Value::Enum(EnumConstant {
        enumeration: "ViewOptions".into(),
        name: "list view".into(),
        code: Some("lsvw".into()),
    });
    assert_eq!(win.invoke("get_current_view", &[], None).unwrap(), expected);

    stub.reply("«constant ****lsvw»");
    assert_eq!(win.invoke("get_current_view", &[], None).unwrap(), expected);

    win.invoke("set_current_view", &[expected], None).unwrap();
    assert_eq!(
        stub.last_script().unwrap(),
        told("set current view of Finder window 1 to list view")
    );
}

#[test]
fn dates_decode_from_utc_form() {
    let (finder, stub) = finder();
    let item = finder.handler(ObjectRef::new(
        "Item",
        Reference::object("item 1 of desktop", Some(FINDER)),
    ));
    stub.reply("2020-03-03T10:15:00Z");
    assert_eq!(
        item.invoke("get_modification_date", &[], None).unwrap(),
        Value::Date(Utc.with_ymd_and_hms(2020, 3, 3, 10, 15, 0).unwrap())
    );
}

#[test]
fn returned_type_class_is_interned() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window 1");
    stub.reply("«class brow»");
    let Value::TypeClass(tc) = win.invoke("get_class", &[], None).unwrap() else {
        panic!("expected a type class");
    };
    assert_eq!(tc.name(), Some("Finder window"));
    assert_eq!(tc.superclass().and_then(|s| s.name()), Some("window"));
}

#[test]
fn type_class_is_fetched_once() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window 1");
    stub.reply("Finder window");
    let tc = win.get_type_class(None).unwrap();
    assert_eq!(tc.code_text(), Some("«class brow»"));
    win.get_type_class(None).unwrap();
    assert_eq!(stub.scripts(), vec![told("return class of Finder window 1")]);

    assert!(win
        .is_instance_of(&TypeClass::from_reference("window", Some(FINDER)), None)
        .unwrap());
    assert!(win
        .is_instance_of(&TypeClass::from_reference("«class brow»", Some(FINDER)), None)
        .unwrap());
    assert!(!win
        .is_instance_of(&TypeClass::from_reference("item", Some(FINDER)), None)
        .unwrap());
    assert_eq!(stub.executions(), 1);
}

#[test]
fn get_properties_renames_and_decodes() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window 1");
    stub.reply("{class:Finder window, name:\"Docs\", index:1, bounds:{0, 0, 10, 20}, zoomed:false}");
    let properties = win.get_properties(None).unwrap();
    assert_eq!(stub.last_script().unwrap(), told("return properties of Finder window 1"));

    assert_eq!(properties["name"], Value::from("Docs"));
    assert_eq!(properties["index"], Value::from(1));
    assert_eq!(
        properties["bounds"],
        Value::Rectangle(Rectangle {
            x: 0,
            y: 0,
            width: 10,
            height: 20
        })
    );
    assert!(matches!(properties["class"], Value::TypeClass(_)));
    // undeclared keys keep their raw reference
    assert_eq!(
        properties["zoomed"].as_reference().unwrap().object_reference(),
        Some("false")
    );
}

#[test]
fn get_properties_by_chevron_keys() {
    let (finder, stub) = finder();
    let win = window(&finder, "Finder window 1");
    stub.reply("{«property pcls»:«class brow», «property pnam»:\"Docs\", «property pidx»:2}");
    let properties = win.get_properties(None).unwrap();
    assert_eq!(properties["name"], Value::from("Docs"));
    assert_eq!(properties["index"], Value::from(2));
}

#[test]
fn get_properties_of_record_literal() {
    let (finder, stub) = finder();
    let record = finder.handler(ObjectRef::new(
        "Item",
        Reference::object("{name:\"x\"}", Some(FINDER)),
    ));
    stub.reply("«class reco»");
    let properties = record.get_properties(None).unwrap();
    assert_eq!(stub.scripts(), vec![told("return class of {name:\"x\"}")]);
    assert_eq!(properties["name"], Value::from("x"));
}

#[test]
fn cast_reinterprets_reference() {
    let (finder, _) = finder();
    let win = window(&finder, "Finder window 1");
    let cast = win.cast(&tellscript::ValueType::Object("Window".into())).unwrap();
    assert_eq!(cast.as_object().unwrap().interface, "Window");
    assert_eq!(win.object_reference(), Some("Finder window 1"));
    assert_eq!(win.application_reference(), Some(FINDER));
    assert_eq!(win.to_string(), "[application \"Finder\"]: Finder window 1");
}

#[test]
fn execution_errors_carry_script() {
    let (finder, stub) = finder();
    stub.fail("execution error: Finder got an error: Can\\U2019t get window 9. (-1728)");
    match finder.invoke("get_name", &[], None) {
        Err(ScriptError::Execution(tellscript::ExecutionError::Script { diagnostic, script })) => {
            assert!(diagnostic.contains("Can\u{2019}t"));
            assert_eq!(script, told("return name"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
