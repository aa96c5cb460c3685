//! Method dispatch against application objects
//!
//! An [`ObjectInvocationHandler`] is bound to one [`ObjectRef`]. Calling
//! [`invoke`](ObjectInvocationHandler::invoke) looks up the method in the
//! application's descriptor table, builds the script fragment for its kind,
//! wraps it with the aspects, runs it (directly or through a [`Session`]) and
//! decodes the result into the declared return type.
//!
//! Fragment shapes, with `<of>` standing for ` of <object>` (or nothing for
//! the application itself):
//!
//! | call | fragment |
//! |------|----------|
//! | property getter | `return <name><of>` |
//! | property setter | `set <name><of> to <value>` |
//! | element list | `return <plural><of>[ where <filter>]` |
//! | element by index | `item <i+1> of <plural><of>` |
//! | element by id | `<type> id <n><of>` |
//! | element count | `count <plural><of>[ where <filter>]` |
//! | element setter | `set item <i+1> of <plural><of> to (<ref>)` |
//! | command | `<name> [<keyword>] <value> ...` |
//! | make | `make <class name>` |

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::Runtime;
use super::application::ApplicationModel;
use super::error::{Result, ScriptError};
use super::metadata::{MethodDescriptor, MethodKind};
use super::reference::{ObjectRef, Reference};
use super::session::Session;
use super::type_class::TypeClass;
use super::value::{Value, ValueType};

const CLASS_PROPERTY: &str = "«property pcls»";
const RECORD_CODE: &str = "reco";

/// Dispatcher bound to one object reference
pub struct ObjectInvocationHandler {
    runtime: Runtime,
    object: ObjectRef,
    reduce_script_executions: bool,
    type_class: OnceCell<TypeClass>,
}

impl ObjectInvocationHandler {
    /// Handler for `object`, taking execution reduction from the runtime config
    pub fn new(runtime: Runtime, object: ObjectRef) -> Self {
        let reduce_script_executions = runtime.config().reduce_script_executions;
        Self {
            runtime,
            object,
            reduce_script_executions,
            type_class: OnceCell::new(),
        }
    }

    /// Runtime this handler executes through
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Bound object
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// Underlying reference
    pub fn reference(&self) -> &Reference {
        &self.object.reference
    }

    /// Interface the object is driven through
    pub fn interface(&self) -> &str {
        &self.object.interface
    }

    /// Object part of the reference
    pub fn object_reference(&self) -> Option<&str> {
        self.object.reference.object_reference()
    }

    /// Application part of the reference
    pub fn application_reference(&self) -> Option<&str> {
        self.object.reference.application_reference()
    }

    /// Whether element lookups build references locally
    pub fn reduces_script_executions(&self) -> bool {
        self.reduce_script_executions
    }

    /// Build element-by-index and element-by-id references locally (`true`)
    /// or fetch them from the application (`false`)
    pub fn set_reduce_script_executions(&mut self, reduce: bool) {
        self.reduce_script_executions = reduce;
    }

    /// Handler for another object on the same runtime
    pub fn handler(&self, object: ObjectRef) -> ObjectInvocationHandler {
        self.runtime.handler(object)
    }

    /// Decode this reference as a different type
    pub fn cast(&self, target: &ValueType) -> Result<Value> {
        self.runtime.decode(target, &self.object.reference)
    }

    /// Invoke `method` with `args`, batching through `session` when given
    pub fn invoke(
        &self,
        method: &str,
        args: &[Value],
        session: Option<&mut Session>,
    ) -> Result<Value> {
        let model = self.model()?;
        let descriptor = model
            .method(&self.object.interface, method)
            .ok_or_else(|| ScriptError::UnknownMethod {
                interface: self.object.interface.clone(),
                method: method.to_string(),
            })?;
        let value = match descriptor.kind {
            MethodKind::Property => self.invoke_property(descriptor, args, session)?,
            MethodKind::Element => self.invoke_element(&model, descriptor, args, session)?,
            MethodKind::Command => self.invoke_command(descriptor, args, session)?,
            MethodKind::Make => self.invoke_make(descriptor, args, session)?,
        };
        Ok(match value {
            Value::TypeClass(tc) if tc.application_reference().is_some() => {
                Value::TypeClass(self.runtime.intern_type_class(tc))
            }
            other => other,
        })
    }

    fn model(&self) -> Result<Arc<ApplicationModel>> {
        self.runtime
            .applications()
            .resolve(self.application_reference(), &self.object.interface)
            .ok_or_else(|| {
                ScriptError::Config(format!(
                    "interface '{}' is not registered for {}",
                    self.object.interface,
                    self.application_reference().unwrap_or("any application")
                ))
            })
    }

    fn of_clause(&self) -> String {
        self.object.reference.of_clause()
    }

    fn invoke_property(
        &self,
        method: &MethodDescriptor,
        args: &[Value],
        session: Option<&mut Session>,
    ) -> Result<Value> {
        let name = script_name(method)?;
        if method.is_getter() {
            let fragment = format!("return {name}{}", self.of_clause());
            self.execute(&fragment, &method.returns, session)
        } else if method.name.starts_with("set") {
            let value = args.first().ok_or_else(|| arguments(method, "setter needs a value"))?;
            let fragment = format!(
                "set {name}{} to {}",
                self.of_clause(),
                self.runtime.encode(value)?
            );
            self.execute(&fragment, &method.returns, session)
        } else {
            Err(arguments(method, "property methods must start with get, is or set"))
        }
    }

    fn invoke_element(
        &self,
        model: &ApplicationModel,
        method: &MethodDescriptor,
        args: &[Value],
        session: Option<&mut Session>,
    ) -> Result<Value> {
        let parameter = method.parameters.first().map(|p| &p.value_type);
        if method.name.starts_with("get") {
            match (&method.returns, parameter) {
                (ValueType::List(element), None | Some(ValueType::Text)) => {
                    let fragment = format!(
                        "return {}{}{}",
                        self.plural(model, element, method),
                        self.of_clause(),
                        where_clause(method, args.first())?
                    );
                    self.execute(&fragment, &method.returns, session)
                }
                (returns, Some(ValueType::Integer | ValueType::Short | ValueType::Long)) => {
                    let item = item_number(method, args.first())?;
                    let specifier = format!(
                        "item {item} of {}{}",
                        self.plural(model, returns, method),
                        self.of_clause()
                    );
                    self.lookup(&specifier, returns, session)
                }
                (returns, Some(ValueType::Named(id))) if id == "id" => {
                    let id = match args.first() {
                        Some(Value::Id(id)) => *id,
                        _ => return Err(arguments(method, "expected an id")),
                    };
                    let specifier = format!("{} {id}{}", script_type(method)?, self.of_clause());
                    self.lookup(&specifier, returns, session)
                }
                _ => Err(arguments(method, "unsupported element getter signature")),
            }
        } else if method.name.starts_with("set") {
            let item = item_number(method, args.first())?;
            let target = args
                .get(1)
                .and_then(element_reference)
                .ok_or_else(|| arguments(method, "element setter needs a reference"))?;
            let element = method
                .parameters
                .get(1)
                .map(|p| p.value_type.clone())
                .unwrap_or(ValueType::Reference);
            let fragment = format!(
                "set item {item} of {}{} to ({target})",
                self.plural(model, &element, method),
                self.of_clause()
            );
            self.execute(&fragment, &method.returns, session)
        } else if method.name.starts_with("count") {
            let getter = counted_getter(model, &self.object.interface, method)?;
            let element = match &getter.returns {
                ValueType::List(element) => element.as_ref(),
                other => other,
            };
            let fragment = format!(
                "count {}{}{}",
                self.plural(model, element, getter),
                self.of_clause(),
                where_clause(method, args.first())?
            );
            self.execute(&fragment, &method.returns, session)
        } else {
            Err(arguments(method, "element methods must start with get, set or count"))
        }
    }

    /// Element by index or id: a local reference, or a round trip
    fn lookup(
        &self,
        specifier: &str,
        returns: &ValueType,
        session: Option<&mut Session>,
    ) -> Result<Value> {
        if self.reduce_script_executions {
            let reference = Reference::object(specifier, self.application_reference());
            self.runtime.decode(returns, &reference)
        } else {
            self.execute(&format!("return {specifier}"), returns, session)
        }
    }

    fn invoke_command(
        &self,
        method: &MethodDescriptor,
        args: &[Value],
        session: Option<&mut Session>,
    ) -> Result<Value> {
        if args.len() > method.parameters.len() {
            return Err(arguments(
                method,
                &format!(
                    "{} arguments given, {} declared",
                    args.len(),
                    method.parameters.len()
                ),
            ));
        }
        let mut words = vec![script_name(method)?.to_string()];
        for (arg, parameter) in args.iter().zip(&method.parameters) {
            // null arguments drop keyword and value alike
            if arg.is_null() {
                continue;
            }
            if let Some(keyword) = &parameter.keyword {
                words.push(keyword.clone());
            }
            words.push(self.runtime.encode(arg)?);
        }
        self.execute(&words.join(" "), &method.returns, session)
    }

    fn invoke_make(
        &self,
        method: &MethodDescriptor,
        args: &[Value],
        session: Option<&mut Session>,
    ) -> Result<Value> {
        let [Value::Class(interface)] = args else {
            return Err(arguments(method, "make takes exactly one interface"));
        };
        let class = self
            .runtime
            .applications()
            .class(self.application_reference(), interface)
            .and_then(|class| class.name)
            .ok_or_else(|| {
                ScriptError::Config(format!(
                    "make failed, interface '{interface}' declares no class name"
                ))
            })?;
        let returns = ValueType::Object(interface.clone());
        self.execute(&format!("make {class}"), &returns, session)
    }

    /// Properties of the object, keyed by accessor name and decoded to their
    /// declared types.
    ///
    /// Keys without a declared property are kept with their raw reference.
    pub fn get_properties(
        &self,
        mut session: Option<&mut Session>,
    ) -> Result<BTreeMap<String, Value>> {
        let record = if self.object.reference.is_record() {
            self.object.reference.clone()
        } else {
            let fragment = format!("return properties{}", self.of_clause());
            match self.execute(&fragment, &ValueType::Record, session.as_deref_mut())? {
                Value::Reference(reference) => reference,
                _ => return Ok(BTreeMap::new()),
            }
        };
        let raw = match self.runtime.decode(&ValueType::Map, &record)? {
            Value::Map(map) => map,
            _ => BTreeMap::new(),
        };

        let Ok(model) = self.model() else {
            tracing::warn!(
                "No metadata registered for {}, returning raw properties",
                self.object
            );
            return Ok(raw);
        };
        let type_class = self.record_type_class(&model, &raw, session)?;

        let mut properties = BTreeMap::new();
        for (key, value) in raw {
            match (model.property(&type_class, &key), value.as_reference()) {
                (Some(property), Some(reference)) => {
                    let decoded = self.runtime.decode(&property.value_type, reference)?;
                    properties.insert(property.rust_name.clone(), decoded);
                }
                _ => {
                    tracing::warn!("Failed to translate property named \"{}\"", key);
                    properties.insert(key, value);
                }
            }
        }
        Ok(properties)
    }

    fn record_type_class(
        &self,
        model: &ApplicationModel,
        record: &BTreeMap<String, Value>,
        session: Option<&mut Session>,
    ) -> Result<TypeClass> {
        let application = self.application_reference();
        let reported = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_reference)
                .and_then(Reference::object_reference)
                .map(str::trim)
        };
        if let Some(code) = reported(CLASS_PROPERTY) {
            let tc = TypeClass::new(None, Some(code), application, None);
            return Ok(self.runtime.intern_type_class(tc));
        }
        if let Some(name) = reported("class") {
            let tc = TypeClass::new(Some(name), None, application, None);
            return Ok(self.runtime.intern_type_class(tc));
        }
        let type_class = self.get_type_class(session)?;
        if type_class.code().is_some_and(|c| c.code() == RECORD_CODE) {
            return model
                .type_class(&self.object.interface)
                .map(|tc| (*tc).clone())
                .ok_or_else(|| {
                    ScriptError::Config(format!(
                        "failed to look up the class of interface '{}'",
                        self.object.interface
                    ))
                });
        }
        Ok(type_class)
    }

    /// Class of the object as reported by the application, fetched once.
    ///
    /// The fetch needs a result, so with a session it flushes the pending
    /// fragments along with it.
    pub fn get_type_class(&self, session: Option<&mut Session>) -> Result<TypeClass> {
        self.type_class
            .get_or_try_init(|| {
                let fragment = format!("return class{}", self.of_clause());
                match self.execute(&fragment, &ValueType::TypeClass, session)? {
                    Value::TypeClass(tc) => Ok(self.runtime.intern_type_class(tc)),
                    other => Err(ScriptError::Config(format!(
                        "{} reported no class: {other:?}",
                        self.object
                    ))),
                }
            })
            .cloned()
    }

    /// Whether the object is an instance of `type_class` or one of its subclasses
    pub fn is_instance_of(
        &self,
        type_class: &TypeClass,
        session: Option<&mut Session>,
    ) -> Result<bool> {
        let wanted = self.runtime.intern_type_class(type_class.clone());
        let actual = self.get_type_class(session)?;
        Ok(wanted.is_assignable_from(&actual))
    }

    /// Run a fragment and decode its result.
    ///
    /// Without a session the wrapped fragment runs at once. With a session,
    /// void calls (or every call, when return values are ignored) are only
    /// buffered; other calls flush the whole buffer and decode its result.
    fn execute(
        &self,
        fragment: &str,
        returns: &ValueType,
        session: Option<&mut Session>,
    ) -> Result<Value> {
        let application = self.application_reference();
        let result = match session {
            None => {
                let script = self.runtime.wrap(application, None, fragment);
                let result = self.runtime.run(&script, false)?;
                if returns.is_void() {
                    return Ok(Value::Null);
                }
                result
            }
            Some(session) => {
                let script = self.runtime.wrap(application, Some(&*session), fragment);
                session.add(&script);
                if returns.is_void() || session.ignores_return_values() {
                    return Ok(Value::Null);
                }
                session.flush()?
            }
        };
        self.runtime
            .decode(returns, &Reference::object(result, application))
    }
}

impl fmt::Display for ObjectInvocationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.object.fmt(f)
    }
}

impl fmt::Debug for ObjectInvocationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInvocationHandler")
            .field("object", &self.object)
            .field("reduce_script_executions", &self.reduce_script_executions)
            .finish()
    }
}

impl PartialEq for ObjectInvocationHandler {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl ObjectInvocationHandler {
    /// Plural used to address elements of `element`
    fn plural(&self, model: &ApplicationModel, element: &ValueType, method: &MethodDescriptor) -> String {
        let class = match element {
            ValueType::Object(interface) => model.class(interface),
            _ => None,
        };
        if let Some(plural) = class.and_then(|c| c.plural.clone()) {
            return plural;
        }
        let singular = class
            .and_then(|c| c.name.clone())
            .or_else(|| method.script_type.clone())
            .unwrap_or_else(|| "item".to_string());
        tracing::warn!(
            "Type {} does not have a defined plural, trying to simply add an 's'",
            element
        );
        format!("{singular}s")
    }
}

fn arguments(method: &MethodDescriptor, detail: &str) -> ScriptError {
    ScriptError::Arguments {
        method: method.name.clone(),
        detail: detail.to_string(),
    }
}

fn script_name(method: &MethodDescriptor) -> Result<&str> {
    method
        .script_name
        .as_deref()
        .ok_or_else(|| ScriptError::Config(format!("method '{}' declares no name", method.name)))
}

fn script_type(method: &MethodDescriptor) -> Result<&str> {
    method
        .script_type
        .as_deref()
        .ok_or_else(|| ScriptError::Config(format!("method '{}' declares no type", method.name)))
}

fn where_clause(method: &MethodDescriptor, filter: Option<&Value>) -> Result<String> {
    match filter {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Text(text)) if text.trim().is_empty() => Ok(String::new()),
        Some(Value::Text(text)) => Ok(format!(" where {text}")),
        Some(_) => Err(arguments(method, "filter must be script text")),
    }
}

/// 1-based item number for a 0-based index argument
fn item_number(method: &MethodDescriptor, arg: Option<&Value>) -> Result<i64> {
    let index = arg
        .and_then(Value::as_i64)
        .ok_or_else(|| arguments(method, "expected an index"))?;
    if index < 0 {
        return Err(ScriptError::IndexOutOfBounds(index));
    }
    index
        .checked_add(1)
        .ok_or(ScriptError::IndexOutOfBounds(index))
}

fn element_reference(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => object.reference.object_reference().map(str::to_string),
        Value::Reference(reference) => reference.object_reference().map(str::to_string),
        _ => None,
    }
}

/// `count_windows` counts what `get_windows` returns
fn counted_getter<'m>(
    model: &'m ApplicationModel,
    interface: &str,
    method: &MethodDescriptor,
) -> Result<&'m MethodDescriptor> {
    let rest = method.name.trim_start_matches("count");
    [format!("get{rest}"), format!("get_{}", rest.trim_start_matches('_'))]
        .iter()
        .find_map(|name| model.method(interface, name))
        .ok_or_else(|| arguments(method, "no matching element getter"))
}
