//! The per-library handle: load at most once, extract objects, unload safely.
//!
//! A [`Library`] owns one dynamic library for its whole loaded lifetime. It
//! opens the file on the first [`initialize`]( Library::initialize ) and never
//! again until the library is unloaded, resolves the entry point lazily on the
//! first entry-point extraction, and keeps a weak reference to every object it
//! has handed out so repeated requests for the same id return the same
//! instance while callers still hold it. Weak tracking means the handle never
//! keeps an object alive by itself; it only remembers identity.
//!
//! Unloading is deliberately permissive: objects produced by the library may
//! be referenced from inside the library itself, and such references are
//! indistinguishable from external ones, so [`uninitialize`](
//! Library::uninitialize ) warns about live references and proceeds rather
//! than refusing forever. The outer cache is the place for stricter release
//! policies.

use std::collections::HashMap ;
use std::ffi::CString ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;

use parking_lot::Mutex ;
use thiserror::Error ;
use tracing::{ debug, info, warn };

use crate::abi::{ EntryStatus, GetDllObjectFn, ENTRY_POINT_NAME };
use crate::decorator::ObjectSource ;
use crate::loader::{ AdapterError, CloseError, LoadedLibrary, LoaderBackend, OpenError, SymbolError };
use crate::object::{ ObjectId, SharedObject, WeakObject };



/// Outcome of a successful [`Library::initialize`] call.
#[derive( Clone, Copy, Debug, Eq, PartialEq )]
pub enum InitStatus {
    /// This call loaded the library.
    Initialized,
    /// The library was already loaded; nothing was done.
    AlreadyInitialized,
}

/// Outcome of a successful [`Library::uninitialize`] call.
#[derive( Clone, Copy, Debug, Eq, PartialEq )]
pub enum UninitStatus {
    /// This call unloaded the library.
    Uninitialized,
    /// The library was not loaded; nothing was done.
    NotInitialized,
}

/// Errors from loading a library or extracting its objects.
#[derive( Debug, Error )]
pub enum LibraryError {
    /// The operation needs a loaded library and this one is not.
    #[error( "Library Not Initialized" )] NotInitialized,
    /// The backend could not construct an adapter for the library.
    #[error( "Adapter Allocation Failed" )] Allocation,
    /// Opening the library file failed.
    #[error( transparent )] Open( #[from] OpenError ),
    /// A required symbol is missing from the library.
    #[error( transparent )] Symbol( #[from] SymbolError ),
    /// The library loaded but does not provide an object under this id.
    #[error( "Object Not Found: {0}" )] ObjectNotFound( ObjectId ),
    /// The entry point reported a failure or returned nothing for this id.
    #[error( "Object Extraction Failed: {0}" )] ExtractionFailed( ObjectId ),
    /// Closing the library failed; the handle is left unloaded regardless.
    #[error( transparent )] Close( #[from] CloseError ),
}

impl From<AdapterError> for LibraryError {
    fn from( error: AdapterError ) -> Self {
        match error {
            AdapterError::Allocation => Self::Allocation,
            AdapterError::Open( error ) => Self::Open( error ),
        }
    }
}

/// Everything that changes over a load/unload cycle, behind one lock.
struct LibraryState {
    adapter: Option<Box<dyn LoadedLibrary>>,
    entry_point: Option<GetDllObjectFn>,
    objects: HashMap<ObjectId, WeakObject>,
}

impl LibraryState {
    fn uninitialize( &mut self, path: &Path ) -> Result<UninitStatus, LibraryError> {
        let Some( adapter ) = self.adapter.take() else {
            return Ok( UninitStatus::NotInitialized );
        };
        let live = live_references( &self.objects );
        if live > 0 {
            // References held from inside the library are indistinguishable
            // from external ones; refusing here could pin the library forever.
            warn!( "Unloading library {:?} with {} live object reference(s)", path, live );
        }
        self.objects.clear();
        self.entry_point = None;
        adapter.close()?;
        info!( "Unloaded library {:?}", path );
        Ok( UninitStatus::Uninitialized )
    }
}

/// A handle to one dynamic library and the objects extracted from it.
///
/// All methods take `&self`; the mutable state lives behind an internal lock,
/// so a `Library` can be shared freely in an [`Arc`]. See the
/// [module docs]( self ) for the load-once and weak-tracking semantics.
pub struct Library {
    path: PathBuf,
    backend: Arc<dyn LoaderBackend>,
    state: Mutex<LibraryState>,
}

impl Library {

    /// Creates an unloaded handle for the library at `path`.
    ///
    /// Nothing touches the filesystem until [`initialize`]( Self::initialize ).
    pub fn new( path: impl Into<PathBuf>, backend: Arc<dyn LoaderBackend> ) -> Self {
        Self {
            path: path.into(),
            backend,
            state: Mutex::new( LibraryState {
                adapter: None,
                entry_point: None,
                objects: HashMap::new(),
            }),
        }
    }

    /// The path this handle loads from.
    #[inline]
    pub fn path( &self ) -> &Path { &self.path }

    /// Whether the library is currently loaded.
    pub fn is_initialized( &self ) -> bool {
        self.state.lock().adapter.is_some()
    }

    /// Loads the library, or reports that it already is.
    ///
    /// The underlying file is opened at most once per loaded lifetime: a
    /// second call returns [`InitStatus::AlreadyInitialized`] without touching
    /// the backend.
    ///
    /// # Errors
    /// [`LibraryError::Allocation`] or [`LibraryError::Open`] when the backend
    /// cannot load the file; the handle stays unloaded and a later retry
    /// starts from scratch.
    pub fn initialize( &self ) -> Result<InitStatus, LibraryError> {
        let state = &mut *self.state.lock();
        if state.adapter.is_some() {
            debug!( "Library {:?} is already initialized", self.path );
            return Ok( InitStatus::AlreadyInitialized );
        }
        state.adapter = Some( self.backend.open( &self.path )? );
        info!( "Loaded library {:?}", self.path );
        Ok( InitStatus::Initialized )
    }

    /// Unloads the library, or reports that it was not loaded.
    ///
    /// Live object references are logged at warn level and do not block the
    /// unload; using such an object afterwards is undefined behaviour, which
    /// is why [`LibraryCache::release_library`](
    /// crate::LibraryCache::release_library ) gates its unloads on the
    /// handle's reference count.
    ///
    /// # Errors
    /// [`LibraryError::Close`] when the platform refuses to release the
    /// handle. The handle still ends up unloaded: the object cache and entry
    /// point are gone, and the next [`initialize`]( Self::initialize ) loads
    /// the file anew.
    pub fn uninitialize( &self ) -> Result<UninitStatus, LibraryError> {
        self.state.lock().uninitialize( &self.path )
    }

    /// Extracts the object for `id`, reusing the live instance when one is
    /// still held.
    ///
    /// A weak-cache hit returns the existing instance without consulting the
    /// library at all. On a miss the object is produced according to `source`
    /// and a weak reference to it is recorded; the record expires by itself
    /// when the last caller drops the object, after which the next request
    /// produces a fresh instance.
    ///
    /// # Errors
    /// - [`LibraryError::NotInitialized`] when the library is not loaded.
    /// - [`LibraryError::Symbol`] when the entry point, or a symbol the
    ///   decorator needs, is missing.
    /// - [`LibraryError::ObjectNotFound`] when the entry point does not know
    ///   `id`.
    /// - [`LibraryError::ExtractionFailed`] when the entry point fails, or
    ///   reports success without producing an object.
    ///
    /// A failure caches nothing; the library itself stays loaded.
    pub fn get_object( &self, id: &ObjectId, source: &ObjectSource ) -> Result<SharedObject, LibraryError> {
        let state = &mut *self.state.lock();
        let Some( adapter ) = state.adapter.as_deref() else {
            return Err( LibraryError::NotInitialized );
        };
        if let Some( object ) = state.objects.get( id ).and_then( WeakObject::upgrade ) {
            debug!( "Reusing live object {} from {:?}", id, self.path );
            return Ok( object );
        }
        let object: SharedObject = match source {
            ObjectSource::Decorated( decorator ) => {
                decorator.decorate( id, adapter )?;
                decorator.clone()
            }
            ObjectSource::EntryPoint => {
                let entry_point = match state.entry_point {
                    Some( entry_point ) => entry_point,
                    None => {
                        let address = adapter.symbol( ENTRY_POINT_NAME )?;
                        // SAFETY: exporters of ENTRY_POINT_NAME define it with
                        // exactly the GetDllObjectFn signature.
                        let entry_point = unsafe {
                            std::mem::transmute::<*const (), GetDllObjectFn>( address.as_ptr() )
                        };
                        state.entry_point = Some( entry_point );
                        entry_point
                    }
                };
                extract( entry_point, id )?
            }
        };
        state.objects.insert( id.clone(), Arc::downgrade( &object ));
        debug!( "Extracted object {} from {:?}", id, self.path );
        Ok( object )
    }

    /// Total strong count over every object this handle has handed out.
    ///
    /// Expired weak records contribute zero. The count includes references
    /// held anywhere, not only by direct callers of
    /// [`get_object`]( Self::get_object ).
    pub fn reference_count( &self ) -> usize {
        live_references( &self.state.lock().objects )
    }

}

impl Drop for Library {
    fn drop( &mut self ) {
        if let Err( error ) = self.state.get_mut().uninitialize( &self.path ) {
            warn!( "Failed to unload library {:?} on drop: {}", self.path, error );
        }
    }
}

impl std::fmt::Debug for Library {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct( "Library" )
            .field( "path", &self.path )
            .field( "initialized", &state.adapter.is_some() )
            .field( "tracked_objects", &state.objects.len() )
            .finish_non_exhaustive()
    }
}

/// Calls the entry point for `id` and maps its status to a result.
fn extract( entry_point: GetDllObjectFn, id: &ObjectId ) -> Result<SharedObject, LibraryError> {
    let Ok( name ) = CString::new( id.as_str() ) else {
        // An id with an interior NUL cannot cross the C boundary.
        return Err( LibraryError::ExtractionFailed( id.clone() ) );
    };
    let mut slot: Option<SharedObject> = None;
    // SAFETY: `name` and `slot` outlive the call, and the entry point only
    // writes an object into `slot`.
    let status = unsafe { entry_point( name.as_ptr(), &mut slot ) };
    match status {
        EntryStatus::Success => slot.ok_or_else( || LibraryError::ExtractionFailed( id.clone() ) ),
        EntryStatus::NotFound => Err( LibraryError::ObjectNotFound( id.clone() ) ),
        EntryStatus::Failed => Err( LibraryError::ExtractionFailed( id.clone() ) ),
    }
}

fn live_references( objects: &HashMap<ObjectId, WeakObject> ) -> usize {
    objects.values().map( WeakObject::strong_count ).sum()
}
