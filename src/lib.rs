//! Keepsake - polymorphic object-graph persistence
//!
//! Keepsake saves a tree of heterogeneous domain objects into a
//! self-describing document, rebuilds the original types from it without the
//! caller naming them, and keeps old saves loadable after types are renamed
//! or removed.
//!
//! # Quick Start
//!
//! ```
//! use keepsake::{read_bundle, register, write_bundle, Bundlable, Bundle, BundleResult};
//!
//! #[derive(Default)]
//! struct Hero {
//!     hp: i32,
//! }
//!
//! impl Bundlable for Hero {
//!     fn class_name(&self) -> &'static str {
//!         "actors.Hero"
//!     }
//!
//!     fn store_in_bundle(&self, bundle: &Bundle) {
//!         bundle.put("hp", self.hp);
//!     }
//!
//!     fn restore_from_bundle(&mut self, bundle: &Bundle) -> BundleResult<()> {
//!         self.hp = bundle.get_int("hp");
//!         Ok(())
//!     }
//! }
//!
//! register::<Hero>();
//!
//! let save = Bundle::new();
//! save.put_object("hero", &Hero { hp: 20 });
//!
//! let mut bytes = Vec::new();
//! write_bundle(&save, &mut bytes, true)?;
//!
//! let loaded = read_bundle(&bytes[..])?;
//! let hero = loaded.get_object_as::<Hero>("hero")?.unwrap();
//! assert_eq!(hero.hp, 20);
//! # Ok::<(), keepsake::StreamError>(())
//! ```
//!
//! # Architecture
//!
//! - `keepsake-core`: document model, [`Bundle`], [`Bundlable`], class and
//!   alias registries
//! - `keepsake-durability`: gzip-detecting stream codec and its config

// Re-export the public API from the member crates
pub use keepsake_core::{alias, bundlable, bundle, class, document};
pub use keepsake_core::{
    add_alias, add_class_alias, alias_count, class_for_name, register, register_class,
    registered_classes, resolve_class, AsAny, Bundlable, BundlableClass, BundlableFactory, Bundle,
    BundleError, BundleResult, DocPath, DocPathError, DocValue, PathSegment, CLASS_NAME_KEY,
    DEFAULT_KEY,
};
pub use keepsake_durability::{compression, config, reader, writer};
pub use keepsake_durability::{
    read_bundle, write_bundle, BundleReader, BundleWriter, Encoding, StreamConfig, StreamError,
    StreamResult, CONFIG_FILE_NAME, GZIP_MAGIC,
};
