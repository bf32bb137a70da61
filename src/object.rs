//! Object identifiers and the shared-object model.
//!
//! Objects extracted from a dynamic library are opaque to the loading core: all
//! the core needs is "this came out of a library" plus shared ownership. Callers
//! hold [`SharedObject`] strong references; each [`Library`]( crate::Library )
//! tracks its extracted objects through [`WeakObject`] entries only, so an
//! object's lifetime belongs entirely to its callers.

use std::any::Any ;
use std::borrow::Borrow ;
use std::sync::{ Arc, Weak };



/// Opaque identifier for an object extractable from a dynamic library.
///
/// Ids are plain strings (GUID-like literals in the typical registry) and are
/// never interpreted by the core; equality and hashing are all that matters.
/// The `Borrow<str>` impl lets maps keyed by `ObjectId` answer `&str` lookups
/// without allocating.
#[derive( Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd )]
pub struct ObjectId( String );

impl ObjectId {

    /// Creates a new object identifier.
    pub fn new( id: impl Into<String> ) -> Self { Self( id.into() )}

    /// Returns the identifier as a string slice.
    #[inline] pub fn as_str( &self ) -> &str { &self.0 }

}

impl std::fmt::Display for ObjectId {
    fn fmt( &self, f: &mut std::fmt::Formatter ) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt( &self.0, f )
    }
}

impl From<&str> for ObjectId {
    fn from( id: &str ) -> Self { Self( id.to_string() )}
}

impl From<String> for ObjectId {
    fn from( id: String ) -> Self { Self( id )}
}

impl Borrow<str> for ObjectId {
    fn borrow( &self ) -> &str { &self.0 }
}

impl AsRef<str> for ObjectId {
    fn as_ref( &self ) -> &str { &self.0 }
}

/// Marker capability for anything extractable from a dynamic library.
///
/// The core never looks past this bound; concrete types are recovered by the
/// caller through [`downcast_object`]. `Any` enables that recovery, and
/// `Send + Sync` because objects are shared across threads as [`SharedObject`]s.
///
/// Plugin-side types opt in explicitly:
///
/// ```
/// use dylib_link::LibraryObject ;
///
/// struct RenderService { backend_name: String }
/// impl LibraryObject for RenderService {}
/// ```
pub trait LibraryObject: Any + Send + Sync {}

/// Shared-ownership handle to an extracted object.
pub type SharedObject = Arc<dyn LibraryObject>;

/// Non-owning observer handle used by the per-library object cache.
pub type WeakObject = Weak<dyn LibraryObject>;

/// Recovers the concrete type behind a [`SharedObject`].
///
/// Returns `None` when the object is not a `T`. This is the checked counterpart
/// of casting at the call site: a library and its consumer agree on the concrete
/// type per id, and this helper makes that agreement explicit.
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use dylib_link::{ downcast_object, LibraryObject, SharedObject };
///
/// struct Counter { start: i32 }
/// impl LibraryObject for Counter {}
///
/// struct Logger ;
/// impl LibraryObject for Logger {}
///
/// let object: SharedObject = Arc::new( Counter { start: 7 });
///
/// let counter = downcast_object::<Counter>( &object ).expect( "id maps to a Counter" );
/// assert_eq!( counter.start, 7 );
/// assert!( downcast_object::<Logger>( &object ).is_none() );
/// ```
pub fn downcast_object<T: LibraryObject>( object: &SharedObject ) -> Option<Arc<T>> {
    let object: Arc<dyn Any + Send + Sync> = object.clone();
    object.downcast().ok()
}
