//! Shared fixtures: a small Finder dictionary and a runtime on a stub executor

#![allow(dead_code)]

use std::sync::Arc;
use tellscript::{ApplicationDescriptor, ObjectInvocationHandler, Runtime, RuntimeConfig, StubExecutor};

pub const FINDER: &str = "application \"Finder\"";

/// Finder metadata as an interface generator would emit it
pub const FINDER_JSON: &str = r#"{
    "interface": "Finder",
    "classes": [
        {
            "interface": "Finder",
            "name": "application",
            "code": "capp",
            "methods": [
                {"name": "get_name", "kind": "property", "script_name": "name", "code": "pnam", "returns": "text"},
                {"name": "is_frontmost", "kind": "property", "script_name": "frontmost", "code": "pisf", "returns": "boolean"},
                {"name": "set_frontmost", "kind": "property", "script_name": "frontmost", "code": "pisf",
                 "parameters": [{"value_type": "boolean"}]},
                {"name": "get_windows", "kind": "element", "script_name": "Finder window", "script_type": "Finder window",
                 "parameters": [{"value_type": "text"}],
                 "returns": {"list": {"object": "FinderWindow"}}},
                {"name": "get_window", "kind": "element", "script_name": "Finder window", "script_type": "Finder window",
                 "parameters": [{"value_type": "integer"}],
                 "returns": {"object": "FinderWindow"}},
                {"name": "get_window_by_id", "kind": "element", "script_name": "Finder window", "script_type": "Finder window",
                 "parameters": [{"value_type": {"named": "id"}}],
                 "returns": {"object": "FinderWindow"}},
                {"name": "count_windows", "kind": "element", "script_name": "Finder window", "script_type": "Finder window",
                 "parameters": [{"value_type": "text"}],
                 "returns": "integer"},
                {"name": "set_window", "kind": "element", "script_name": "Finder window", "script_type": "Finder window",
                 "parameters": [{"value_type": "integer"}, {"value_type": {"object": "FinderWindow"}}]},
                {"name": "get_items", "kind": "element", "script_name": "item", "script_type": "item",
                 "returns": {"list": {"object": "Item"}}},
                {"name": "quit", "kind": "command", "script_name": "quit"},
                {"name": "open", "kind": "command", "script_name": "open",
                 "parameters": [{"value_type": "reference"}, {"keyword": "using", "value_type": "reference"}]},
                {"name": "duplicate", "kind": "command", "script_name": "duplicate",
                 "parameters": [{"value_type": "reference"}, {"keyword": "to", "value_type": "reference"},
                                {"keyword": "replacing", "value_type": "boolean"}],
                 "returns": "reference"},
                {"name": "exists", "kind": "command", "script_name": "exists",
                 "parameters": [{"value_type": "reference"}],
                 "returns": "boolean"},
                {"name": "make", "kind": "make", "parameters": [{"value_type": {"named": "class"}}], "returns": "reference"}
            ]
        },
        {
            "interface": "Window",
            "name": "window",
            "code": "cwin",
            "plural": "windows",
            "methods": [
                {"name": "get_name", "kind": "property", "script_name": "name", "code": "pnam", "returns": "text"},
                {"name": "get_index", "kind": "property", "script_name": "index", "code": "pidx", "returns": "integer"},
                {"name": "set_index", "kind": "property", "script_name": "index", "code": "pidx",
                 "parameters": [{"value_type": "integer"}]},
                {"name": "get_bounds", "kind": "property", "script_name": "bounds", "code": "pbnd", "returns": "rectangle"},
                {"name": "set_bounds", "kind": "property", "script_name": "bounds", "code": "pbnd",
                 "parameters": [{"value_type": "rectangle"}]},
                {"name": "get_class", "kind": "property", "script_name": "class", "code": "pcls", "returns": "type_class"}
            ]
        },
        {
            "interface": "FinderWindow",
            "name": "Finder window",
            "code": "brow",
            "plural": "Finder windows",
            "superclass": "Window",
            "methods": [
                {"name": "get_target", "kind": "property", "script_name": "target", "code": "fvtg", "returns": {"object": "Item"}},
                {"name": "get_current_view", "kind": "property", "script_name": "current view", "code": "pvew",
                 "returns": {"enumeration": "ViewOptions"}},
                {"name": "set_current_view", "kind": "property", "script_name": "current view", "code": "pvew",
                 "parameters": [{"value_type": {"enumeration": "ViewOptions"}}]}
            ]
        },
        {
            "interface": "Item",
            "name": "item",
            "code": "cobj",
            "plural": "items",
            "methods": [
                {"name": "get_name", "kind": "property", "script_name": "name", "code": "pnam", "returns": "text"},
                {"name": "set_name", "kind": "property", "script_name": "name", "code": "pnam",
                 "parameters": [{"value_type": "text"}]},
                {"name": "get_modification_date", "kind": "property", "script_name": "modification date", "code": "asmo",
                 "returns": "date"}
            ]
        },
        {
            "interface": "Folder",
            "name": "folder",
            "code": "cfol",
            "plural": "folders",
            "superclass": "Item"
        },
        {
            "interface": "Untitled",
            "code": "untl"
        }
    ],
    "enumerations": [
        {
            "name": "ViewOptions",
            "constants": [
                {"name": "IconView", "script_name": "icon view", "code": "icnv"},
                {"name": "ListView", "script_name": "list view", "code": "lsvw"},
                {"name": "ColumnView", "script_name": "column view", "code": "clvw"}
            ]
        }
    ]
}"#;

/// Runtime whose executor records scripts, with Finder registered
pub fn finder() -> (ObjectInvocationHandler, Arc<StubExecutor>) {
    finder_with(RuntimeConfig::default())
}

/// Same as [`finder`] with a custom configuration
pub fn finder_with(config: RuntimeConfig) -> (ObjectInvocationHandler, Arc<StubExecutor>) {
    tellscript::init_tracing();
    let stub = Arc::new(StubExecutor::new());
    let runtime = Runtime::with_executor(config, stub.clone());
    let descriptor = ApplicationDescriptor::from_json(FINDER_JSON).expect("fixture parses");
    let root = runtime
        .register_application(descriptor, "Finder")
        .expect("fixture registers");
    (root, stub)
}

/// `tell application "Finder"` around one unindented line
pub fn told(fragment: &str) -> String {
    format!("tell {FINDER}\r\n{fragment}\r\nend tell\r\n")
}
