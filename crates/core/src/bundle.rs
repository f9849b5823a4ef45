//! Bundle: keyed, hierarchical view over a document tree
//!
//! A [`Bundle`] wraps one object node of a [`DocValue`] tree and offers typed
//! get/put operations on its keys. It is the unit of save and restore: a game
//! writes its whole world into one root bundle, each entity into a nested one.
//!
//! ## Shared views
//!
//! Every bundle holds the tree's root behind an `Arc<Mutex<_>>` plus the
//! [`DocPath`] of the node it views. Nested bundles returned by
//! [`get_bundle`](Bundle::get_bundle) and friends share the root, so writes
//! through a nested view show up in the parent and vice versa. Cloning a
//! `Bundle` makes another view of the same node, not a copy.
//!
//! If the parent later removes or replaces the node a view points at, the view
//! is detached: reads see an empty object and writes are dropped. This holds
//! even when a new node is put at the same key or array index; the tree keeps
//! a clock tick per replaced container and each view remembers the tick it was
//! created at.
//!
//! ## Read policy
//!
//! | Accessor | Absent key | Wrong shape |
//! |----------|------------|-------------|
//! | `get_bool`/`get_int`/`get_long`/`get_float`/`get_string` | default | default |
//! | `get_bundle`, `get_class` | `None` | `None` |
//! | `get_object` | `Ok(None)` | `Ok(None)` |
//! | `get_*_array`, `get_bundle_array`, `get_collection` | `MissingKey` | `TypeMismatch` |
//! | `get_enum` | `MissingKey` | `EnumParse` |
//!
//! Single objects whose type tag cannot be resolved fail with
//! `UnresolvableType`. Collections drop such elements and keep the rest.

use crate::bundlable::Bundlable;
use crate::class::{self, BundlableClass};
use crate::document::{
    coerce_bool, coerce_f64, coerce_i32, coerce_i64, coerce_string, get_at_path,
    get_at_path_mut, value_type_name, DocPath, DocValue, PathSegment,
};
use crate::error::{BundleError, BundleResult};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reserved key recording the concrete type of a stored object
///
/// Written and read only by the object store/reconstruct path.
pub const CLASS_NAME_KEY: &str = "__className";

/// Key under which a top-level array is wrapped when a stream is read
pub const DEFAULT_KEY: &str = "key";

/// Shared state behind every view of one tree
///
/// `replaced` records, per container node, the clock tick at which a parent
/// last overwrote or removed it. A view created before that tick is detached.
#[derive(Default)]
struct Tree {
    doc: DocValue,
    clock: u64,
    replaced: HashMap<Vec<PathSegment>, u64>,
}

impl Tree {
    fn from_doc(doc: DocValue) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    fn is_current(&self, path: &DocPath, epoch: u64) -> bool {
        if path.is_empty() {
            return true;
        }
        let segments = path.segments();
        (1..=segments.len()).all(|n| {
            self.replaced
                .get(&segments[..n])
                .map_or(true, |&tick| tick <= epoch)
        })
    }

    fn node(&self, path: &DocPath, epoch: u64) -> Option<&Map<String, Value>> {
        if !self.is_current(path, epoch) {
            return None;
        }
        get_at_path(&self.doc, path).and_then(Value::as_object)
    }

    fn node_mut(&mut self, path: &DocPath, epoch: u64) -> Option<&mut Map<String, Value>> {
        if !self.is_current(path, epoch) {
            return None;
        }
        get_at_path_mut(&mut self.doc, path).and_then(Value::as_object_mut)
    }

    /// Insert (`Some`) or remove (`None`) one key of the node at `path`
    ///
    /// Returns `None` if the node is detached, else the previous value.
    fn set_field(
        &mut self,
        path: &DocPath,
        epoch: u64,
        key: &str,
        value: Option<Value>,
    ) -> Option<Option<Value>> {
        let obj = self.node_mut(path, epoch)?;
        let previous = match value {
            Some(value) => obj.insert(key.to_string(), value),
            None => obj.remove(key),
        };

        if matches!(previous, Some(Value::Object(_) | Value::Array(_))) {
            let mut child = path.segments().to_vec();
            child.push(PathSegment::Key(key.to_string()));
            self.clock += 1;
            // Older marks below the child are shadowed by the new one
            self.replaced
                .retain(|p, _| !(p.len() > child.len() && p.starts_with(&child)));
            self.replaced.insert(child, self.clock);
        }
        Some(previous)
    }
}

/// A mutable view over one object node of a shared document tree
#[derive(Clone)]
pub struct Bundle {
    tree: Arc<Mutex<Tree>>,
    path: DocPath,
    epoch: u64,
}

impl Bundle {
    /// Create an empty bundle with its own tree
    pub fn new() -> Self {
        Self::from_object(Map::new())
    }

    fn from_object(obj: Map<String, Value>) -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::from_doc(DocValue::from_value(Value::Object(
                obj,
            ))))),
            path: DocPath::root(),
            epoch: 0,
        }
    }

    /// Wrap an existing value, which must be an object
    pub fn from_value(value: DocValue) -> BundleResult<Self> {
        match value.into_inner() {
            Value::Object(obj) => Ok(Self::from_object(obj)),
            other => Err(BundleError::NotAnObject {
                found: value_type_name(&other),
            }),
        }
    }

    /// Deep copy of the viewed node
    pub fn to_value(&self) -> DocValue {
        self.read(|obj| {
            DocValue::from_value(Value::Object(obj.cloned().unwrap_or_default()))
        })
    }

    /// Path of the viewed node from the tree root
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Check whether two bundles view the same tree
    pub fn shares_tree_with(&self, other: &Bundle) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }

    /// Check whether the viewed node is still part of the tree
    ///
    /// A view detaches once its parent removes or replaces the node, even if
    /// a new node later appears at the same path.
    pub fn is_attached(&self) -> bool {
        self.read(|obj| obj.is_some())
    }

    // =========================================================================
    // Node access
    // =========================================================================

    fn read<R>(&self, f: impl FnOnce(Option<&Map<String, Value>>) -> R) -> R {
        let tree = self.tree.lock();
        f(tree.node(&self.path, self.epoch))
    }

    fn field<R>(&self, key: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        self.read(|obj| f(obj.and_then(|o| o.get(key))))
    }

    fn set_field(&self, key: &str, value: Option<Value>) -> Option<Value> {
        let mut tree = self.tree.lock();
        match tree.set_field(&self.path, self.epoch, key, value) {
            Some(previous) => previous,
            None => {
                warn!(path = %self.path, key, "Write through detached bundle view dropped");
                None
            }
        }
    }

    fn insert(&self, key: &str, value: Value) {
        self.set_field(key, Some(value));
    }

    fn child(&self, tree: &Tree, segments: impl IntoIterator<Item = PathSegment>) -> Bundle {
        let mut path = self.path.segments().to_vec();
        path.extend(segments);
        Bundle {
            tree: Arc::clone(&self.tree),
            path: DocPath::from_segments(path),
            epoch: tree.clock,
        }
    }

    /// Take the viewed node out of a bundle nobody else will read
    fn into_node(self) -> Value {
        let mut tree = self.tree.lock();
        get_at_path_mut(&mut tree.doc, &self.path)
            .map(std::mem::take)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Check whether `key` is present and not null
    pub fn contains(&self, key: &str) -> bool {
        self.field(key, |v| matches!(v, Some(v) if !v.is_null()))
    }

    /// Remove `key`, returning whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.set_field(key, None).is_some()
    }

    /// All keys of the viewed node, including reserved ones
    pub fn keys(&self) -> Vec<String> {
        self.read(|obj| obj.map(|o| o.keys().cloned().collect()).unwrap_or_default())
    }

    /// Check whether the viewed node has no keys
    pub fn is_empty(&self) -> bool {
        self.read(|obj| obj.map_or(true, Map::is_empty))
    }

    /// Raw copy of the value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<DocValue> {
        self.field(key, |v| v.cloned().map(DocValue::from_value))
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// Store any value convertible into the document model
    ///
    /// Covers booleans, integers, floats, strings, `Option` (where `None`
    /// stores a document null) and vectors or slices of those (arrays).
    pub fn put(&self, key: &str, value: impl Into<DocValue>) {
        self.insert(key, value.into().into_inner());
    }

    /// Boolean at `key`, or `false`
    pub fn get_bool(&self, key: &str) -> bool {
        self.field(key, |v| v.and_then(coerce_bool)).unwrap_or(false)
    }

    /// 32-bit integer at `key`, or `0`
    pub fn get_int(&self, key: &str) -> i32 {
        self.field(key, |v| v.and_then(coerce_i32)).unwrap_or(0)
    }

    /// 64-bit integer at `key`, or `0`
    pub fn get_long(&self, key: &str) -> i64 {
        self.field(key, |v| v.and_then(coerce_i64)).unwrap_or(0)
    }

    /// Float at `key`, or `0.0`
    pub fn get_float(&self, key: &str) -> f32 {
        self.get_double(key) as f32
    }

    /// Double at `key`, or `0.0`
    pub fn get_double(&self, key: &str) -> f64 {
        self.field(key, |v| v.and_then(coerce_f64)).unwrap_or(0.0)
    }

    /// String at `key`, or `""`
    pub fn get_string(&self, key: &str) -> String {
        self.field(key, |v| v.and_then(coerce_string)).unwrap_or_default()
    }

    // =========================================================================
    // Enumerations
    // =========================================================================

    /// Store an enumeration member by name
    ///
    /// Unit variants serialize as their name. A value that cannot be
    /// serialized is stored as null and logged.
    pub fn put_enum<E: Serialize>(&self, key: &str, value: &E) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode enum value");
                Value::Null
            }
        };
        self.insert(key, value);
    }

    /// Parse the enumeration member stored at `key`
    pub fn get_enum<E: DeserializeOwned>(&self, key: &str) -> BundleResult<E> {
        let stored = self
            .field(key, |v| v.filter(|v| !v.is_null()).cloned())
            .ok_or_else(|| BundleError::missing_key(key))?;
        let text = coerce_string(&stored).unwrap_or_default();
        serde_json::from_value(stored).map_err(|e| BundleError::EnumParse {
            key: key.to_string(),
            value: text,
            reason: e.to_string(),
        })
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    fn get_array<T>(
        &self,
        key: &str,
        expected: &'static str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> BundleResult<Vec<T>> {
        self.field(key, |value| match value {
            None | Some(Value::Null) => Err(BundleError::missing_key(key)),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    convert(item).ok_or_else(|| {
                        BundleError::type_mismatch(
                            format!("{}[{}]", key, i),
                            expected,
                            value_type_name(item),
                        )
                    })
                })
                .collect(),
            Some(other) => Err(BundleError::type_mismatch(key, "array", value_type_name(other))),
        })
    }

    /// Integer array at `key`
    pub fn get_int_array(&self, key: &str) -> BundleResult<Vec<i32>> {
        self.get_array(key, "number", coerce_i32)
    }

    /// Long integer array at `key`
    pub fn get_long_array(&self, key: &str) -> BundleResult<Vec<i64>> {
        self.get_array(key, "number", coerce_i64)
    }

    /// Float array at `key`
    ///
    /// Elements that are not numbers read as `0.0`.
    pub fn get_float_array(&self, key: &str) -> BundleResult<Vec<f32>> {
        self.get_array(key, "number", |v| Some(coerce_f64(v).unwrap_or(0.0) as f32))
    }

    /// Boolean array at `key`
    pub fn get_bool_array(&self, key: &str) -> BundleResult<Vec<bool>> {
        self.get_array(key, "boolean", coerce_bool)
    }

    /// String array at `key`
    pub fn get_string_array(&self, key: &str) -> BundleResult<Vec<String>> {
        self.get_array(key, "string", coerce_string)
    }

    // =========================================================================
    // Nested bundles
    // =========================================================================

    /// View of the object stored at `key`, sharing this bundle's tree
    pub fn get_bundle(&self, key: &str) -> Option<Bundle> {
        let tree = self.tree.lock();
        let field = tree.node(&self.path, self.epoch).and_then(|o| o.get(key));
        matches!(field, Some(Value::Object(_)))
            .then(|| self.child(&tree, [PathSegment::Key(key.to_string())]))
    }

    /// Store a copy of another bundle's node at `key`
    ///
    /// `None` stores a document null.
    pub fn put_bundle(&self, key: &str, bundle: Option<&Bundle>) {
        let value = bundle.map_or(Value::Null, |b| b.to_value().into_inner());
        self.insert(key, value);
    }

    /// Views of every object in the array at `key`
    pub fn get_bundle_array(&self, key: &str) -> BundleResult<Vec<Bundle>> {
        let tree = self.tree.lock();
        let field = tree.node(&self.path, self.epoch).and_then(|o| o.get(key));
        let len = match field {
            None | Some(Value::Null) => Err(BundleError::missing_key(key)),
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_object() {
                        return Err(BundleError::type_mismatch(
                            format!("{}[{}]", key, i),
                            "object",
                            value_type_name(item),
                        ));
                    }
                }
                Ok(items.len())
            }
            Some(other) => Err(BundleError::type_mismatch(key, "array", value_type_name(other))),
        }?;

        Ok((0..len)
            .map(|i| {
                self.child(&tree, [PathSegment::Key(key.to_string()), PathSegment::Index(i)])
            })
            .collect())
    }

    /// Store copies of several bundles as an array at `key`
    pub fn put_bundle_array(&self, key: &str, bundles: &[Bundle]) {
        let items: Vec<Value> = bundles.iter().map(|b| b.to_value().into_inner()).collect();
        self.insert(key, Value::Array(items));
    }

    // =========================================================================
    // Polymorphic objects
    // =========================================================================

    /// Store an object together with its type tag
    ///
    /// Objects that are not [reconstructible](Bundlable::is_reconstructible)
    /// are skipped and `key` is left absent.
    pub fn put_object(&self, key: &str, object: &dyn Bundlable) {
        self.put_optional_object(key, Some(object));
    }

    /// Store an object, or a document null when there is none
    pub fn put_optional_object(&self, key: &str, object: Option<&dyn Bundlable>) {
        let node = match object {
            Some(object) => store_object(object),
            None => Some(Value::Null),
        };
        self.set_field(key, node);
    }

    /// Rebuild the object stored at `key`
    ///
    /// Returns `Ok(None)` when nothing is stored. Fails when the stored type
    /// cannot be resolved or the object's own restore fails.
    pub fn get_object(&self, key: &str) -> BundleResult<Option<Box<dyn Bundlable>>> {
        match self.get_bundle(key) {
            Some(nested) => nested.reconstruct().map(Some),
            None => Ok(None),
        }
    }

    /// Rebuild the object stored at `key` as a concrete type
    pub fn get_object_as<T: Bundlable>(&self, key: &str) -> BundleResult<Option<T>> {
        let Some(object) = self.get_object(key)? else {
            return Ok(None);
        };
        let found = object.class_name();
        object
            .downcast::<T>()
            .map(|boxed| Some(*boxed))
            .ok_or_else(|| BundleError::type_mismatch(key, std::any::type_name::<T>(), found))
    }

    fn resolve_type(&self) -> BundleResult<BundlableClass> {
        let tag = self.get_string(CLASS_NAME_KEY);
        class::resolve_class(&tag)
            .ok_or_else(|| BundleError::unresolvable_type(class::resolve_class_name(&tag)))
    }

    fn reconstruct(&self) -> BundleResult<Box<dyn Bundlable>> {
        let class = self.resolve_type()?;
        let mut instance = class.instantiate();
        instance.restore_from_bundle(self)?;
        Ok(instance)
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Store a sequence of objects, each tagged with its own type
    ///
    /// Objects that are not reconstructible are left out.
    pub fn put_collection<'a, I>(&self, key: &str, items: I)
    where
        I: IntoIterator<Item = &'a dyn Bundlable>,
    {
        let nodes: Vec<Value> = items.into_iter().filter_map(store_object).collect();
        self.insert(key, Value::Array(nodes));
    }

    /// Rebuild the sequence stored at `key`
    ///
    /// Elements whose type cannot be resolved are dropped so that removing a
    /// type never makes a whole save unreadable. Any other failure aborts.
    pub fn get_collection(&self, key: &str) -> BundleResult<Vec<Box<dyn Bundlable>>> {
        let elements = self.get_bundle_array(key)?;
        let mut objects = Vec::with_capacity(elements.len());

        for element in elements {
            let class = match element.resolve_type() {
                Ok(class) => class,
                Err(BundleError::UnresolvableType { name }) => {
                    warn!(key, class = %name, "Dropping collection element of unknown type");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let mut instance = class.instantiate();
            instance.restore_from_bundle(&element)?;
            objects.push(instance);
        }

        Ok(objects)
    }

    /// Rebuild the sequence stored at `key`, keeping elements of type `T`
    pub fn get_collection_of<T: Bundlable>(&self, key: &str) -> BundleResult<Vec<T>> {
        Ok(self
            .get_collection(key)?
            .into_iter()
            .filter_map(|object| object.downcast::<T>().map(|boxed| *boxed))
            .collect())
    }

    // =========================================================================
    // Class identifiers
    // =========================================================================

    /// Store a class identifier, or clear `key` when there is none
    pub fn put_class(&self, key: &str, class: Option<&BundlableClass>) {
        match class {
            Some(class) => self.put(key, class.name()),
            None => {
                self.set_field(key, None);
            }
        }
    }

    /// Store a raw class identifier
    pub fn put_class_name(&self, key: &str, name: &str) {
        self.put(key, name);
    }

    /// Resolve the class identifier stored at `key`
    ///
    /// Returns `None` if nothing is stored or the identifier is unknown.
    pub fn get_class(&self, key: &str) -> Option<BundlableClass> {
        class::resolve_class(&self.get_string(key))
    }

    /// Store several class identifiers as an array
    pub fn put_class_array(&self, key: &str, classes: &[BundlableClass]) {
        let names: Vec<&str> = classes.iter().map(BundlableClass::name).collect();
        self.put(key, names);
    }

    /// Resolve the class identifiers stored at `key`
    ///
    /// Unknown identifiers are dropped.
    pub fn get_class_array(&self, key: &str) -> BundleResult<Vec<BundlableClass>> {
        Ok(self
            .get_string_array(key)?
            .into_iter()
            .filter_map(|name| {
                let class = class::resolve_class(&name);
                if class.is_none() {
                    warn!(key, class = %name, "Dropping unknown class identifier");
                }
                class
            })
            .collect())
    }
}

/// Serialize an object into a tagged node, or `None` if it must be skipped
fn store_object(object: &dyn Bundlable) -> Option<Value> {
    if !object.is_reconstructible() {
        debug!(class = object.class_name(), "Skipping object that cannot be reconstructed");
        return None;
    }
    let bundle = Bundle::new();
    object.store_in_bundle(&bundle);
    bundle.put(CLASS_NAME_KEY, object.class_name());
    Some(bundle.into_node())
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact JSON of the viewed node
impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("path", &self.path.to_string())
            .field("data", &self.to_value())
            .finish()
    }
}
