// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin marker trait and registry.
//!
//! Any type implementing [`Plugin`] (plus `Default`) can be described by a
//! [`PluginType`] and recorded in a [`PluginRegistry`]. The registry is an
//! ordinary value owned by whoever composes the application; it is filled by
//! explicit `register` calls, usually made by a
//! [`PluginLoader`](crate::service::PluginLoader) while it walks a plugin
//! directory.

use std::any::{type_name, Any, TypeId};
use std::fmt;

/// The marker capability every plugin implements.
///
/// The core places no behavioral requirements on plugins beyond a name; the
/// host application downcasts through [`Plugin::as_any`] or defines its own
/// extension traits.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::plugin::{Plugin, PluginRegistry};
///
/// #[derive(Default)]
/// struct SomePlugin;
///
/// impl Plugin for SomePlugin {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
///
/// let mut registry = PluginRegistry::new();
/// assert!(registry.register::<SomePlugin>());
/// assert!(!registry.register::<SomePlugin>());
/// assert_eq!(registry.len(), 1);
/// ```
pub trait Plugin: Any + Send + Sync {
    /// Returns the plugin's name. Defaults to the type name.
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Returns `self` as `Any`, for downcasting to the concrete plugin type.
    fn as_any(&self) -> &dyn Any;
}

fn construct<T: Plugin + Default>() -> Box<dyn Plugin> {
    Box::new(T::default())
}

/// A discovered plugin type: its identity plus a way to build an instance.
#[derive(Clone, Copy)]
pub struct PluginType {
    id: TypeId,
    name: &'static str,
    constructor: fn() -> Box<dyn Plugin>,
}

impl PluginType {
    /// Describes the plugin type `T`.
    pub fn of<T: Plugin + Default>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            constructor: construct::<T>,
        }
    }

    /// Returns the identity of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified name of the described type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a default instance of the described type.
    pub fn instantiate(&self) -> Box<dyn Plugin> {
        (self.constructor)()
    }

    /// Whether this describes `T`.
    pub fn is<T: Plugin>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for PluginType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PluginType {}

impl fmt::Debug for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PluginType").field(&self.name).finish()
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An ordered set of plugin types, unique by type identity.
///
/// Types keep the order in which they were first registered.
///
/// The registry does no locking of its own. Discovery is expected to run once,
/// from a single thread, while the application starts up.
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginType>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`. Returns `false` if it was already registered.
    pub fn register<T: Plugin + Default>(&mut self) -> bool {
        self.register_type(PluginType::of::<T>())
    }

    /// Registers a described type. Returns `false` if it was already registered.
    pub fn register_type(&mut self, plugin: PluginType) -> bool {
        if self.plugins.contains(&plugin) {
            tracing::trace!("Plugin '{}' already registered", plugin);
            return false;
        }
        tracing::debug!("Registered plugin '{}'", plugin);
        self.plugins.push(plugin);
        true
    }

    /// Returns the registered types in first-registered order.
    pub fn plugins(&self) -> &[PluginType] {
        &self.plugins
    }

    /// Whether `T` is registered.
    pub fn contains<T: Plugin>(&self) -> bool {
        self.plugins.iter().any(PluginType::is::<T>)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Forgets every registered type.
    pub fn clear(&mut self) {
        self.plugins.clear();
    }

    /// Builds one default instance of every registered type, in order.
    pub fn instantiate_all(&self) -> Vec<Box<dyn Plugin>> {
        self.plugins.iter().map(PluginType::instantiate).collect()
    }

    /// Iterates over the registered types.
    pub fn iter(&self) -> std::slice::Iter<'_, PluginType> {
        self.plugins.iter()
    }
}

impl<'a> IntoIterator for &'a PluginRegistry {
    type Item = &'a PluginType;
    type IntoIter = std::slice::Iter<'a, PluginType>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.iter()
    }
}
