//! Decorators: object extraction for libraries without the standard entry point.
//!
//! Some libraries export plain functions instead of
//! [`ENTRY_POINT_NAME`]( crate::ENTRY_POINT_NAME ) - typically C libraries
//! never written for this loading layer. A [`Decorator`] bridges the gap: it
//! resolves whatever symbols it needs from the loaded library and exposes them
//! behind an ordinary object interface. [`ObjectSource`] is the per-id choice
//! between the two extraction paths, carried by the registry.

use std::sync::Arc ;

use crate::loader::{ LoadedLibrary, SymbolError };
use crate::object::{ LibraryObject, ObjectId };



/// Builds a usable object out of a library that exports plain symbols.
///
/// [`decorate`]( Self::decorate ) receives the loaded library and resolves the
/// symbols it needs, storing them in the decorator itself: the decorator
/// instance doubles as the produced object, which is why [`LibraryObject`] is a
/// supertrait. The per-library cache then tracks it exactly like an entry-point
/// result, and the caller recovers the concrete decorator type with
/// [`downcast_object`]( crate::downcast_object ).
///
/// A decorator is bound to exactly one registry id and must not carry state
/// across distinct libraries.
///
/// # Example
///
/// ```
/// use parking_lot::Mutex ;
/// use dylib_link::{ Decorator, LibraryObject, LoadedLibrary, ObjectId, SymbolError };
///
/// type GetVersionFn = unsafe extern "C" fn() -> u32 ;
///
/// #[derive( Default )]
/// struct VersionReader {
///     get_version: Mutex<Option<GetVersionFn>>,
/// }
/// impl LibraryObject for VersionReader {}
///
/// impl Decorator for VersionReader {
///     fn decorate( &self, _id: &ObjectId, library: &dyn LoadedLibrary ) -> Result<(), SymbolError> {
///         let address = library.symbol( "GetVersion" )?;
///         // SAFETY: the library exports `GetVersion` with exactly this signature.
///         let function = unsafe {
///             std::mem::transmute::<*const (), GetVersionFn>( address.as_ptr() )
///         };
///         *self.get_version.lock() = Some( function );
///         Ok(())
///     }
/// }
/// ```
pub trait Decorator: LibraryObject {

    /// Wires this decorator to `library`, typically by resolving named symbols.
    ///
    /// Runs whenever an extraction misses the object cache: on first use, and
    /// again after the library is unloaded and reloaded. Implementations must
    /// overwrite previously resolved symbols on each call, since addresses
    /// from an earlier load are invalid. A failed call leaves nothing cached,
    /// so the next request decorates afresh.
    ///
    /// # Errors
    /// Whatever [`SymbolError`] the symbol resolution produced.
    fn decorate( &self, id: &ObjectId, library: &dyn LoadedLibrary ) -> Result<(), SymbolError>;

}

/// How objects for a registry id are produced from their library.
#[derive( Clone )]
pub enum ObjectSource {
    /// Resolve [`ENTRY_POINT_NAME`]( crate::ENTRY_POINT_NAME ) and call it
    /// with the id.
    EntryPoint,
    /// Let the decorator resolve its own symbols; the decorator itself becomes
    /// the object.
    Decorated( Arc<dyn Decorator> ),
}

impl std::fmt::Debug for ObjectSource {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        match self {
            Self::EntryPoint => f.write_str( "EntryPoint" ),
            Self::Decorated( _ ) => f.write_str( "Decorated" ),
        }
    }
}
