//! Dynamic library loading with shared handles and id-addressed objects.
//!
//! `dylib_link` loads native plugin libraries on demand and hands out the
//! objects they provide. Callers work purely in object **ids**: a registry
//! maps every id to a library path, and the cache loads each path at most
//! once, so any number of ids can share one loaded library. Extracted objects
//! are tracked per library by weak reference, which keeps repeated requests
//! for an id returning the same instance for exactly as long as anyone still
//! holds it.
//!
//! # Core Concepts
//!
//! - [`LibraryCache`]: The front door. Resolves ids through its registry,
//!   loads libraries once, keys them by resolved path, and releases them
//!   safely on request.
//!
//! - [`LibraryRegistry`]: Maps an object id to a [`RegistryEntry`], the
//!   library path plus the extraction source for that id. [`StaticRegistry`]
//!   is the in-memory implementation and rejects duplicate ids.
//!
//! - [`Library`]: One dynamic library, loaded at most once per lifetime, with
//!   a weak cache of every object extracted from it. Usually reached through
//!   the cache, but usable on its own.
//!
//! - [`LibraryObject`]: The marker trait plugin objects implement. Objects
//!   travel as [`SharedObject`] (`Arc<dyn LibraryObject>`) and come back to
//!   their concrete type with [`downcast_object`].
//!
//! - [`ObjectSource`]: How an object leaves its library. Either the standard
//!   entry point ([`ENTRY_POINT_NAME`]) or a [`Decorator`] that adapts a
//!   library exporting plain symbols.
//!
//! - [`LoaderBackend`]: The seam to the platform loader. [`DylibBackend`] is
//!   the real one; tests substitute their own.
//!
//! # Loading and Caching
//!
//! ```no_run
//! use std::sync::Arc ;
//! use dylib_link::{ LibraryCache, ObjectSource, RegistryEntry, StaticRegistry };
//!
//! // Two ids, one library file. Entries name the path and the extraction
//! // source; the ids themselves are free-form strings.
//! let registry = StaticRegistry::new()
//!     .with_entry( "logger", RegistryEntry::new( "plugins/libcore.so", ObjectSource::EntryPoint ))
//!     .with_entry( "metrics", RegistryEntry::new( "plugins/libcore.so", ObjectSource::EntryPoint ));
//!
//! let cache = LibraryCache::new( Arc::new( registry ));
//!
//! // Both resolve to the same path, so this opens `libcore.so` exactly once.
//! let logger = cache.get_object( "logger" )?;
//! let metrics = cache.get_object( "metrics" )?;
//!
//! // While the first instance is held, requests for its id return it again.
//! let logger_again = cache.get_object( "logger" )?;
//! assert!( Arc::ptr_eq( &logger, &logger_again ));
//! # Ok::<(), dylib_link::CacheError>(())
//! ```
//!
//! # Writing a Plugin Library
//!
//! A plugin is a `cdylib` crate exporting one entry point under
//! [`ENTRY_POINT_NAME`]. [`export_library_object!`] writes the extern
//! boilerplate; the crate only supplies a resolver from id to object:
//!
//! ```
//! use std::sync::Arc ;
//! use dylib_link::{ LibraryObject, SharedObject };
//!
//! struct Logger ;
//! struct Metrics ;
//! impl LibraryObject for Logger {}
//! impl LibraryObject for Metrics {}
//!
//! fn resolve( id: &str ) -> Option<SharedObject> {
//!     match id {
//!         "logger" => Some( Arc::new( Logger )),
//!         "metrics" => Some( Arc::new( Metrics )),
//!         _ => None,
//!     }
//! }
//!
//! dylib_link::export_library_object!( resolve );
//! ```
//!
//! A resolver returning a fresh `Arc` each call still behaves like a
//! singleton from the host's point of view while the previous instance is
//! held, because extraction only runs after a weak-cache miss. A resolver
//! that clones one shared `Arc` makes the object a singleton outright.
//!
//! # Decorators
//!
//! Libraries that predate the entry-point convention export plain functions
//! instead. Registering them with [`ObjectSource::Decorated`] hands symbol
//! resolution to a [`Decorator`], and the decorator itself becomes the
//! extracted object:
//!
//! ```no_run
//! use std::sync::Arc ;
//!
//! use parking_lot::Mutex ;
//!
//! use dylib_link::{ downcast_object, Decorator, LibraryCache, LibraryObject, LoadedLibrary,
//!     ObjectId, ObjectSource, RegistryEntry, StaticRegistry, SymbolError
//! };
//!
//! type GetVersionFn = unsafe extern "C" fn() -> u32 ;
//!
//! #[derive( Default )]
//! struct VersionApi { get_version: Mutex<Option<GetVersionFn>> }
//! impl LibraryObject for VersionApi {}
//!
//! impl Decorator for VersionApi {
//!     fn decorate( &self, _id: &ObjectId, library: &dyn LoadedLibrary ) -> Result<(), SymbolError> {
//!         let address = library.symbol( "GetVersion" )?;
//!         // SAFETY: the library exports `GetVersion` with this signature.
//!         let function = unsafe { std::mem::transmute::<*const (), GetVersionFn>( address.as_ptr() ) };
//!         *self.get_version.lock() = Some( function );
//!         Ok(())
//!     }
//! }
//!
//! impl VersionApi {
//!     fn version( &self ) -> u32 {
//!         let function = self.get_version.lock().expect( "decorated before use" );
//!         // SAFETY: the pointer stays valid while the library is loaded.
//!         unsafe { function() }
//!     }
//! }
//!
//! let registry = StaticRegistry::new().with_entry( "vendor-api", RegistryEntry::new(
//!     "plugins/libvendor.so",
//!     ObjectSource::Decorated( Arc::new( VersionApi::default() )),
//! ));
//! let cache = LibraryCache::new( Arc::new( registry ));
//!
//! let object = cache.get_object( "vendor-api" )?;
//! let api = downcast_object::<VersionApi>( &object ).expect( "registered as VersionApi" );
//! println!( "vendor library version {}", api.version() );
//! # Ok::<(), dylib_link::CacheError>(())
//! ```
//!
//! # Unloading
//!
//! Unloading a library invalidates every pointer into it, so
//! [`LibraryCache::release_library`] refuses while other handles to the
//! library exist, and reports (rather than errors) when there is nothing to
//! unload:
//!
//! ```no_run
//! use std::sync::Arc ;
//! use dylib_link::{ CacheError, LibraryCache, ObjectSource, RegistryEntry, ReleaseStatus,
//!     StaticRegistry
//! };
//!
//! let registry = StaticRegistry::new()
//!     .with_entry( "worker", RegistryEntry::new( "plugins/libworker.so", ObjectSource::EntryPoint ));
//! let cache = LibraryCache::new( Arc::new( registry ));
//!
//! let library = cache.get_library( "worker" )?;
//!
//! // The handle above still references the library; releasing is refused.
//! assert!( matches!( cache.release_library( "worker" ), Err( CacheError::StillReferenced( _ ))));
//!
//! drop( library );
//! assert_eq!( cache.release_library( "worker" )?, ReleaseStatus::Released );
//! # Ok::<(), dylib_link::CacheError>(())
//! ```
//!
//! Extracted objects do not block a release: references held from inside the
//! library itself are indistinguishable from external ones, and refusing on
//! them could pin a library forever. A release over live objects is logged at
//! warn level and proceeds. Callers who need stronger guarantees check
//! [`Library::reference_count`] before releasing.
//!
//! # Thread Safety
//!
//! Every public type is `Send + Sync`. The cache guards its path map with one
//! lock and each [`Library`] guards its state with another; extraction calls
//! into the library (the entry point or a decorator) run under the handle's
//! lock. During extraction a library must not request objects from itself;
//! requests into other libraries, including loading them through the same
//! cache, are fine.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber: info for
//! loads, unloads and releases, warn for unloads over live references and for
//! failures swallowed by `Drop`, debug for cache hits.

mod abi ;
mod cache ;
mod decorator ;
mod library ;
mod loader ;
mod object ;
mod registry ;

pub use abi::{ EntryStatus, GetDllObjectFn, ENTRY_POINT_NAME };
pub use cache::{ CacheError, LibraryCache, ReleaseStatus };
pub use decorator::{ Decorator, ObjectSource };
pub use library::{ InitStatus, Library, LibraryError, UninitStatus };
pub use loader::{ AdapterError, CloseError, DylibBackend, LoadedLibrary, LoaderBackend,
    OpenError, SymbolAddress, SymbolError
};
pub use object::{ downcast_object, LibraryObject, ObjectId, SharedObject, WeakObject };
pub use registry::{ LibraryRegistry, RegistryEntry, RegistryError, StaticRegistry };
