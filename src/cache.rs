//! The id-keyed front door: resolve, load once, extract, release.
//!
//! A [`LibraryCache`] owns every loaded library in a process (or subsystem).
//! Callers work purely in object ids; the cache resolves them through its
//! [`LibraryRegistry`]( crate::LibraryRegistry ), keys loaded libraries by
//! resolved path so ids sharing a path share one [`Library`], and loads each
//! path at most once for as long as it stays cached.
//!
//! Releasing is the guarded counterpart to the permissive per-handle unload:
//! [`release_library`]( LibraryCache::release_library ) refuses while other
//! `Arc<Library>` clones are live, because unloading under a caller still
//! using the handle would invalidate its function pointers.

use std::collections::HashMap ;
use std::path::PathBuf ;
use std::sync::Arc ;

use parking_lot::Mutex ;
use thiserror::Error ;
use tracing::{ debug, info };

use crate::decorator::ObjectSource ;
use crate::library::{ Library, LibraryError };
use crate::loader::{ DylibBackend, LoaderBackend };
use crate::object::{ ObjectId, SharedObject };
use crate::registry::{ LibraryRegistry, RegistryError };



/// Outcome of a successful [`LibraryCache::release_library`] call.
#[derive( Clone, Copy, Debug, Eq, PartialEq )]
pub enum ReleaseStatus {
    /// This call unloaded the library and dropped it from the cache.
    Released,
    /// The id is known but its library was not loaded; nothing was done.
    NotLoaded,
}

/// Errors from cache operations.
#[derive( Debug, Error )]
pub enum CacheError {
    /// The id could not be resolved, or a registration clashed.
    #[error( transparent )] Registry( #[from] RegistryError ),
    /// Loading the library or extracting the object failed.
    #[error( transparent )] Library( #[from] LibraryError ),
    /// The library is still referenced outside the cache and was not unloaded.
    #[error( "Release Not Allowed: {0:?} is still referenced" )] StillReferenced( PathBuf ),
}

/// Loads libraries on demand and caches them by resolved path.
///
/// The cache is fully thread safe; see the [module docs]( self ) for the
/// sharing and release semantics and the [crate docs]( crate ) for a worked
/// example.
pub struct LibraryCache {
    registry: Arc<dyn LibraryRegistry>,
    backend: Arc<dyn LoaderBackend>,
    loaded: Mutex<HashMap<PathBuf, Arc<Library>>>,
}

impl LibraryCache {

    /// Creates an empty cache resolving ids through `registry` and loading
    /// with the platform loader.
    pub fn new( registry: Arc<dyn LibraryRegistry> ) -> Self {
        Self {
            registry,
            backend: Arc::new( DylibBackend ),
            loaded: Mutex::new( HashMap::new() ),
        }
    }

    /// Replaces the platform loader, mainly to inject a mock in tests.
    #[must_use]
    pub fn with_backend( mut self, backend: Arc<dyn LoaderBackend> ) -> Self {
        self.backend = backend;
        self
    }

    /// Returns the loaded library providing `id`, loading it on first use.
    ///
    /// Two ids resolving to the same path return clones of the same
    /// [`Library`].
    ///
    /// # Errors
    /// [`CacheError::Registry`] when `id` is unknown, or
    /// [`CacheError::Library`] when the library cannot be loaded. A failed
    /// load is not cached; the next call retries from scratch.
    pub fn get_library( &self, id: &str ) -> Result<Arc<Library>, CacheError> {
        let ( library, _ ) = self.lookup( id )?;
        Ok( library )
    }

    /// Returns the object registered under `id`, loading its library on first
    /// use.
    ///
    /// While the returned object (or any earlier clone of it) is alive, every
    /// call with an id mapping to the same object returns that same instance.
    ///
    /// # Errors
    /// Everything [`get_library`]( Self::get_library ) can report, plus the
    /// extraction failures of [`Library::get_object`].
    pub fn get_object( &self, id: &str ) -> Result<SharedObject, CacheError> {
        let ( library, source ) = self.lookup( id )?;
        Ok( library.get_object( &ObjectId::from( id ), &source )? )
    }

    /// Unloads the library providing `id` and drops it from the cache, if
    /// nothing else is using it.
    ///
    /// # Errors
    /// - [`CacheError::Registry`] when `id` is unknown. An id that resolves
    ///   but is simply not loaded is not an error; that returns
    ///   [`ReleaseStatus::NotLoaded`].
    /// - [`CacheError::StillReferenced`] when `Arc<Library>` clones exist
    ///   outside the cache. Drop them and release again.
    /// - [`CacheError::Library`] when closing fails; the entry stays cached
    ///   and a repeated release removes it.
    pub fn release_library( &self, id: &str ) -> Result<ReleaseStatus, CacheError> {
        let entry = self.registry.resolve( id )?;
        let loaded = &mut *self.loaded.lock();
        let Some( library ) = loaded.get( entry.path() ) else {
            debug!( "Library {:?} for {} is not loaded; nothing to release", entry.path(), id );
            return Ok( ReleaseStatus::NotLoaded );
        };
        if Arc::strong_count( library ) > 1 {
            return Err( CacheError::StillReferenced( entry.path().to_path_buf() ) );
        }
        library.uninitialize()?;
        loaded.remove( entry.path() );
        info!( "Released library {:?} for {}", entry.path(), id );
        Ok( ReleaseStatus::Released )
    }

    fn lookup( &self, id: &str ) -> Result<( Arc<Library>, ObjectSource ), CacheError> {
        let entry = self.registry.resolve( id )?;
        // The lock is held across the load: concurrent requests for one path
        // cannot both open it.
        let loaded = &mut *self.loaded.lock();
        if let Some( library ) = loaded.get( entry.path() ) {
            debug!( "Reusing loaded library {:?} for {}", entry.path(), id );
            return Ok(( Arc::clone( library ), entry.source().clone() ));
        }
        let library = Arc::new( Library::new( entry.path(), Arc::clone( &self.backend ) ) );
        library.initialize()?;
        loaded.insert( entry.path().to_path_buf(), Arc::clone( &library ));
        info!( "Cached library {:?} for {}", entry.path(), id );
        Ok(( library, entry.source().clone() ))
    }

}

impl std::fmt::Debug for LibraryCache {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        let loaded = self.loaded.lock();
        let paths: Vec<&PathBuf> = loaded.keys().collect();
        f.debug_struct( "LibraryCache" )
            .field( "loaded", &paths )
            .finish_non_exhaustive()
    }
}
