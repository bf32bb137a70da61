//! Resolution of object ids to the libraries that provide them.
//!
//! The cache itself never knows where libraries live; a [`LibraryRegistry`]
//! turns an object id into a [`RegistryEntry`] naming the library path and
//! the extraction source for that id. Any number of ids may resolve to the
//! same path, which is how several objects end up sharing one loaded library.
//!
//! [`StaticRegistry`] is the plain in-memory implementation: entries are
//! registered up front and duplicate ids are rejected. Implement
//! [`LibraryRegistry`] directly for registries backed by configuration files
//! or discovery.

use std::collections::HashMap ;
use std::collections::hash_map::Entry ;
use std::path::{ Path, PathBuf };

use thiserror::Error ;

use crate::decorator::ObjectSource ;
use crate::object::ObjectId ;



/// Errors resolving or registering object ids.
#[derive( Debug, Error )]
pub enum RegistryError {
    /// No entry is registered under this id.
    #[error( "Unknown Id: {0}" )] UnknownId( ObjectId ),
    /// An entry is already registered under this id.
    #[error( "Duplicate Id: {0}" )] DuplicateId( ObjectId ),
}

/// Where one object id comes from: a library path plus the extraction source.
#[derive( Clone, Debug )]
pub struct RegistryEntry {
    path: PathBuf,
    source: ObjectSource,
}

impl RegistryEntry {

    pub fn new( path: impl Into<PathBuf>, source: ObjectSource ) -> Self {
        Self { path: path.into(), source }
    }

    /// The library file providing the object.
    #[inline]
    pub fn path( &self ) -> &Path { &self.path }

    /// How the object is extracted from the library.
    #[inline]
    pub fn source( &self ) -> &ObjectSource { &self.source }

}

/// Maps object ids to the library entries providing them.
///
/// Resolution must be stable: the same id resolves to the same path and
/// source for as long as a cache uses the registry, since the cache keys its
/// loaded libraries by resolved path.
pub trait LibraryRegistry: Send + Sync {

    /// Resolves `id` to its library entry.
    ///
    /// # Errors
    /// [`RegistryError::UnknownId`] when nothing is registered under `id`.
    fn resolve( &self, id: &str ) -> Result<RegistryEntry, RegistryError>;

}

/// An in-memory registry populated up front.
///
/// # Example
///
/// ```
/// use dylib_link::{ ObjectSource, RegistryEntry, StaticRegistry };
///
/// let mut registry = StaticRegistry::new();
/// registry.register( "logger", RegistryEntry::new( "plugins/logging.so", ObjectSource::EntryPoint ) )?;
/// registry.register( "metrics", RegistryEntry::new( "plugins/logging.so", ObjectSource::EntryPoint ) )?;
/// assert_eq!( registry.len(), 2 );
/// # Ok::<(), dylib_link::RegistryError>(())
/// ```
#[derive( Debug, Default )]
pub struct StaticRegistry {
    entries: HashMap<ObjectId, RegistryEntry>,
}

impl StaticRegistry {

    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Registers `entry` under `id`.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateId`] when `id` is already registered; the
    /// existing entry is kept.
    pub fn register( &mut self, id: impl Into<ObjectId>, entry: RegistryEntry ) -> Result<(), RegistryError> {
        match self.entries.entry( id.into() ) {
            Entry::Occupied( occupied ) => Err( RegistryError::DuplicateId( occupied.key().clone() ) ),
            Entry::Vacant( vacant ) => {
                vacant.insert( entry );
                Ok(())
            }
        }
    }

    /// Builder form of [`register`]( Self::register ).
    ///
    /// # Panics
    /// When `id` is already registered.
    #[must_use]
    pub fn with_entry( mut self, id: impl Into<ObjectId>, entry: RegistryEntry ) -> Self {
        match self.register( id, entry ) {
            Ok(()) => self,
            Err( error ) => panic!( "{}", error ),
        }
    }

    pub fn len( &self ) -> usize {
        self.entries.len()
    }

    pub fn is_empty( &self ) -> bool {
        self.entries.is_empty()
    }

}

impl LibraryRegistry for StaticRegistry {
    fn resolve( &self, id: &str ) -> Result<RegistryEntry, RegistryError> {
        self.entries.get( id ).cloned().ok_or_else( || RegistryError::UnknownId( id.into() ) )
    }
}
