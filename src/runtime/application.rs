//! Registry of applications and their generated interfaces
//!
//! Registering an [`ApplicationDescriptor`] builds the static dispatch table
//! for that application: every class gets its [`TypeClass`] (linked to its
//! superclass), every interface gets a method table that includes inherited
//! methods, and every class gets a property index keyed by AppleScript name
//! and by `«property code»`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{Result, ScriptError};
use super::metadata::{
    ApplicationDescriptor, ClassDescriptor, EnumDescriptor, MethodDescriptor, PropertyDescriptor,
};
use super::type_class::TypeClass;

/// Dispatch tables for one registered application
#[derive(Debug)]
pub struct ApplicationModel {
    application_reference: String,
    descriptor: ApplicationDescriptor,
    type_classes: HashMap<String, Arc<TypeClass>>,
    methods: HashMap<(String, String), MethodDescriptor>,
    properties: HashMap<String, HashMap<String, PropertyDescriptor>>,
}

impl ApplicationModel {
    fn build(descriptor: ApplicationDescriptor, application_reference: &str) -> Result<Self> {
        if descriptor.class(&descriptor.interface).is_none() {
            return Err(ScriptError::Config(format!(
                "application interface '{}' is not among its declared classes",
                descriptor.interface
            )));
        }

        let mut type_classes = HashMap::new();
        for class in &descriptor.classes {
            type_class_for(&descriptor, application_reference, class, &mut type_classes, 0)?;
        }

        let mut methods = HashMap::new();
        let mut properties = HashMap::new();
        for class in &descriptor.classes {
            let mut class_properties = HashMap::new();
            for method in &class.methods {
                if let Some(property) = PropertyDescriptor::from_getter(method) {
                    if let Some(chevron) = property.chevron() {
                        class_properties.insert(chevron, property.clone());
                    }
                    class_properties.insert(property.script_name.clone(), property);
                }
            }
            properties.insert(class.interface.clone(), class_properties);

            // subclass declarations shadow inherited ones
            let mut current = Some(class);
            while let Some(declaring) = current {
                for method in &declaring.methods {
                    methods
                        .entry((class.interface.clone(), method.name.clone()))
                        .or_insert_with(|| method.clone());
                }
                current = declaring
                    .superclass
                    .as_deref()
                    .and_then(|s| descriptor.class(s));
            }
        }

        Ok(Self {
            application_reference: application_reference.to_string(),
            descriptor,
            type_classes,
            methods,
            properties,
        })
    }

    /// Application reference, e.g. `application "Finder"`
    pub fn application_reference(&self) -> &str {
        &self.application_reference
    }

    /// The descriptor this model was built from
    pub fn descriptor(&self) -> &ApplicationDescriptor {
        &self.descriptor
    }

    /// Class by interface name
    pub fn class(&self, interface: &str) -> Option<&ClassDescriptor> {
        self.descriptor.class(interface)
    }

    /// Type class of an interface
    pub fn type_class(&self, interface: &str) -> Option<Arc<TypeClass>> {
        self.type_classes.get(interface).cloned()
    }

    /// Method declared on an interface or inherited from a superclass
    pub fn method(&self, interface: &str, method: &str) -> Option<&MethodDescriptor> {
        self.methods.get(&(interface.to_string(), method.to_string()))
    }

    /// Enumeration by name
    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        self.descriptor.enumerations.iter().find(|e| e.name == name)
    }

    /// Interface whose type class matches `type_class` by name or code
    pub fn interface_for(&self, type_class: &TypeClass) -> Option<&str> {
        self.type_classes
            .iter()
            .find(|(_, tc)| same_class(tc, type_class))
            .map(|(interface, _)| interface.as_str())
    }

    /// Registered type class matching `type_class` by name or code
    pub fn declared_type_class(&self, type_class: &TypeClass) -> Option<Arc<TypeClass>> {
        self.type_classes
            .values()
            .find(|tc| same_class(tc, type_class))
            .cloned()
    }

    /// Property `key` of the class `type_class`, searching superclasses on a miss
    pub fn property(&self, type_class: &TypeClass, key: &str) -> Option<&PropertyDescriptor> {
        let Some(mut interface) = self.interface_for(type_class) else {
            tracing::warn!(
                "Type class {} of property {} is not declared in {}",
                type_class,
                key,
                self.descriptor.interface
            );
            return None;
        };
        loop {
            if let Some(property) = self.properties.get(interface).and_then(|p| p.get(key)) {
                return Some(property);
            }
            interface = self.class(interface)?.superclass.as_deref()?;
        }
    }
}

fn same_class(declared: &TypeClass, other: &TypeClass) -> bool {
    (declared.code_text().is_some() && declared.code_text() == other.code_text())
        || (declared.name().is_some() && declared.name() == other.name())
        || (declared.code_text().is_some() && declared.code_text() == other.name())
}

fn type_class_for(
    descriptor: &ApplicationDescriptor,
    application_reference: &str,
    class: &ClassDescriptor,
    built: &mut HashMap<String, Arc<TypeClass>>,
    depth: usize,
) -> Result<Arc<TypeClass>> {
    if let Some(existing) = built.get(&class.interface) {
        return Ok(Arc::clone(existing));
    }
    if depth > descriptor.classes.len() {
        return Err(ScriptError::Config(format!(
            "superclass chain of '{}' is cyclic",
            class.interface
        )));
    }
    let superclass = match class.superclass.as_deref() {
        Some(name) => {
            let parent = descriptor.class(name).ok_or_else(|| {
                ScriptError::Config(format!(
                    "superclass '{name}' of '{}' is not declared",
                    class.interface
                ))
            })?;
            Some(type_class_for(
                descriptor,
                application_reference,
                parent,
                built,
                depth + 1,
            )?)
        }
        None => None,
    };
    let type_class = Arc::new(
        TypeClass::new(
            class.name.as_deref(),
            class.code_chevron().as_deref(),
            Some(application_reference),
            superclass,
        )
        .with_application_interface(descriptor.interface.clone()),
    );
    built.insert(class.interface.clone(), Arc::clone(&type_class));
    Ok(type_class)
}

/// All registered applications, keyed by application reference
#[derive(Debug, Default)]
pub struct ApplicationRegistry {
    applications: RwLock<HashMap<String, Arc<ApplicationModel>>>,
}

impl ApplicationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application; a second registration of the same reference is ignored
    pub fn register(
        &self,
        descriptor: ApplicationDescriptor,
        application_reference: &str,
    ) -> Result<Arc<ApplicationModel>> {
        if let Some(existing) = self.applications.read().get(application_reference) {
            return Ok(Arc::clone(existing));
        }
        let model = Arc::new(ApplicationModel::build(descriptor, application_reference)?);
        tracing::debug!(
            "Registered {} with {} classes as {}",
            model.descriptor.interface,
            model.descriptor.classes.len(),
            application_reference
        );
        let mut applications = self.applications.write();
        Ok(Arc::clone(
            applications
                .entry(application_reference.to_string())
                .or_insert(model),
        ))
    }

    /// Model registered for an application reference
    pub fn get(&self, application_reference: &str) -> Option<Arc<ApplicationModel>> {
        self.applications.read().get(application_reference).cloned()
    }

    /// Model for `application` that declares `interface`, falling back to any
    /// registered application declaring it
    pub fn resolve(
        &self,
        application: Option<&str>,
        interface: &str,
    ) -> Option<Arc<ApplicationModel>> {
        let applications = self.applications.read();
        application
            .and_then(|a| applications.get(a))
            .filter(|model| model.class(interface).is_some())
            .or_else(|| {
                applications
                    .values()
                    .find(|model| model.class(interface).is_some())
            })
            .cloned()
    }

    /// Whether `interface` is declared for `application` (or anywhere)
    pub fn has_interface(&self, application: Option<&str>, interface: &str) -> bool {
        self.resolve(application, interface).is_some()
    }

    /// Class descriptor for an interface
    pub fn class(&self, application: Option<&str>, interface: &str) -> Option<ClassDescriptor> {
        self.resolve(application, interface)
            .and_then(|model| model.class(interface).cloned())
    }

    /// Enumeration by name, preferring `application`
    pub fn enumeration(&self, application: Option<&str>, name: &str) -> Option<EnumDescriptor> {
        let applications = self.applications.read();
        application
            .and_then(|a| applications.get(a))
            .and_then(|model| model.enumeration(name))
            .or_else(|| {
                applications
                    .values()
                    .find_map(|model| model.enumeration(name))
            })
            .cloned()
    }

    /// Replace a reported type class with the declared one of its application.
    ///
    /// Classes that are not declared come back unchanged, with a warning when
    /// the application itself is known.
    pub fn intern(&self, type_class: TypeClass) -> TypeClass {
        let Some(application) = type_class.application_reference() else {
            return type_class;
        };
        match self.get(application) {
            Some(model) => match model.declared_type_class(&type_class) {
                Some(declared) => (*declared).clone(),
                None => {
                    tracing::warn!(
                        "TypeClass {} is not declared in {}",
                        type_class,
                        model.descriptor.interface
                    );
                    type_class
                }
            },
            None => {
                tracing::warn!(
                    "No application interface registered for {}",
                    application
                );
                type_class
            }
        }
    }
}
