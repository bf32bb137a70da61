//! The dynamic-loader boundary and its platform implementation.
//!
//! The core talks to the platform loader through two object-safe traits:
//! [`LoaderBackend`] constructs one adapter per library, and [`LoadedLibrary`]
//! is that adapter - a single open OS handle that resolves symbols to raw
//! addresses and eventually closes. [`DylibBackend`] is the production backend
//! over `libloading`; tests substitute programmable implementations.

use std::os::raw::c_void ;
use std::path::{ Path, PathBuf };

use thiserror::Error ;
use tracing::debug ;



/// Raw address of a symbol resolved from a loaded library.
///
/// An address is only meaningful while the library it came from stays loaded;
/// callers transmute it to the concrete `extern "C"` signature they expect and
/// carry the proof of that signature themselves.
#[derive( Clone, Copy, Debug, Eq, PartialEq )]
pub struct SymbolAddress( *const () );

impl SymbolAddress {

    /// Wraps a raw symbol address.
    pub fn new( address: *const () ) -> Self { Self( address )}

    /// Returns the raw address.
    #[inline] pub fn as_ptr( self ) -> *const () { self.0 }

}

// SAFETY: an address is a plain number until dereferenced; every dereference
// site carries its own unsafe block and requires the originating library to
// still be loaded.
unsafe impl Send for SymbolAddress {}
unsafe impl Sync for SymbolAddress {}

/// Errors opening a dynamic library.
///
/// Platform loader diagnostics collapse into this three-way split so callers
/// can react without parsing platform-specific strings.
#[derive( Debug, Error )]
pub enum OpenError {
    /// No file exists at the resolved path.
    #[error( "Library Not Found: {0:?}" )] NotFound( PathBuf ),
    /// The file exists but the process may not map it.
    #[error( "Permission Denied: {0:?}" )] PermissionDenied( PathBuf ),
    /// The loader rejected the file: wrong image format, missing dependencies,
    /// or a truncated library.
    #[error( "Invalid Library Format: {0:?}: {1}" )] InvalidFormat( PathBuf, String ),
}

/// Error resolving a named symbol from a loaded library.
#[derive( Debug, Error )]
pub enum SymbolError {
    /// The library exports no symbol under this name.
    #[error( "Symbol Not Found: {0}" )] NotFound( String ),
}

/// Error closing a loaded library.
#[derive( Debug, Error )]
pub enum CloseError {
    /// The platform loader refused to release the handle.
    #[error( "Library Busy: {0}" )] Busy( String ),
}

/// Errors constructing an adapter and opening its library.
#[derive( Debug, Error )]
pub enum AdapterError {
    /// The backend could not construct an adapter for the library.
    #[error( "Adapter Allocation Failed" )] Allocation,
    /// The underlying open failed.
    #[error( transparent )] Open( #[from] OpenError ),
}

/// Constructs adapters for loading dynamic libraries.
///
/// One adapter owns exactly one OS load handle. The production backend is
/// [`DylibBackend`]; a [`LibraryCache`]( crate::LibraryCache ) accepts any
/// implementation through
/// [`with_backend`]( crate::LibraryCache::with_backend ), which is also the
/// seam tests use to drive the core without touching the platform loader.
pub trait LoaderBackend: Send + Sync {

    /// Constructs an adapter and opens the library at `path` through it.
    ///
    /// # Errors
    /// [`AdapterError::Allocation`] if no adapter can be constructed, and
    /// [`AdapterError::Open`] if the platform loader rejects the library.
    fn open( &self, path: &Path ) -> Result<Box<dyn LoadedLibrary>, AdapterError>;

}

/// One loaded dynamic library, held open for the adapter's lifetime.
pub trait LoadedLibrary: Send + Sync {

    /// Resolves the address of an exported symbol by name.
    ///
    /// # Errors
    /// [`SymbolError::NotFound`] if the library exports no such symbol.
    fn symbol( &self, name: &str ) -> Result<SymbolAddress, SymbolError>;

    /// Closes the library, invalidating every address resolved from it.
    ///
    /// # Errors
    /// [`CloseError::Busy`] if the platform loader refuses the release.
    fn close( self: Box<Self> ) -> Result<(), CloseError>;

}

/// Loader backend over the platform dynamic loader (`dlopen` on Unix,
/// `LoadLibraryW` on Windows).
#[derive( Clone, Copy, Debug, Default )]
pub struct DylibBackend ;

impl LoaderBackend for DylibBackend {
    fn open( &self, path: &Path ) -> Result<Box<dyn LoadedLibrary>, AdapterError> {
        if !path.exists() {
            return Err( OpenError::NotFound( path.to_path_buf() ).into() );
        }
        // SAFETY: opening a library runs its platform initialisation routines;
        // the caller vouches for the file by registering its path.
        let library = unsafe { libloading::Library::new( path ) }
            .map_err(| error | classify_open_error( path, &error ))?;
        debug!( "Opened library {:?}", path );
        Ok( Box::new( DylibHandle { library, path: path.to_path_buf() }))
    }
}

/// The loader reports open failures as strings. The existence check in
/// [`DylibBackend::open`] already separated `NotFound`, so what remains is
/// either a permissions problem or a file the loader cannot map.
fn classify_open_error( path: &Path, error: &libloading::Error ) -> OpenError {
    let detail = error.to_string();
    let lowered = detail.to_lowercase();
    match lowered.contains( "permission denied" )
        || lowered.contains( "operation not permitted" )
        || lowered.contains( "access is denied" )
    {
        true => OpenError::PermissionDenied( path.to_path_buf() ),
        false => OpenError::InvalidFormat( path.to_path_buf(), detail ),
    }
}

struct DylibHandle {
    library: libloading::Library,
    path: PathBuf,
}

impl LoadedLibrary for DylibHandle {

    fn symbol( &self, name: &str ) -> Result<SymbolAddress, SymbolError> {
        // SAFETY: the symbol is surfaced as a raw address only; the dereference
        // happens at the caller under its own signature assertion.
        let address = unsafe { self.library.get::<*mut c_void>( name.as_bytes() ) }
            .map_err(| _ | SymbolError::NotFound( name.to_string() ))?;
        Ok( SymbolAddress::new( *address as *const () ))
    }

    fn close( self: Box<Self> ) -> Result<(), CloseError> {
        let this = *self ;
        debug!( "Closing library {:?}", this.path );
        this.library.close().map_err(| error | CloseError::Busy( error.to_string() ))
    }

}
