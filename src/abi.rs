//! The standard entry-point contract between the host and plugin libraries.
//!
//! A library that is not object-decorated must export one function named
//! [`ENTRY_POINT_NAME`] with the [`GetDllObjectFn`] signature. The host
//! resolves it lazily, caches its address per library, and calls it once per
//! object id; results are then de-duplicated through the per-library weak
//! cache. Plugin crates export the function with [`export_library_object!`]
//! rather than writing the extern boilerplate by hand.
//!
//! # ABI
//!
//! The signature passes an `Arc`-based [`SharedObject`] by out-parameter, which
//! is a Rust-to-Rust contract: host and plugins must be built with the same
//! compiler and a compatible version of this crate. Plugins built differently
//! belong behind a decorator over plain C symbols instead.

use std::os::raw::c_char ;

use crate::object::SharedObject ;



/// Name of the exported entry-point symbol.
pub const ENTRY_POINT_NAME: &str = "GetDllObject";

/// Signature of the standard entry point.
///
/// `out` points at `None` on entry and must be written only when the call
/// returns [`EntryStatus::Success`]. The id is NUL-terminated UTF-8.
pub type GetDllObjectFn =
    unsafe extern "C" fn( id: *const c_char, out: *mut Option<SharedObject> ) -> EntryStatus ;

/// Result code returned by a library's entry point.
#[derive( Clone, Copy, Debug, Eq, PartialEq )]
#[repr( i32 )]
pub enum EntryStatus {
    /// The object was written to `out`.
    Success = 0,
    /// The library exports no object under the requested id.
    NotFound = 1,
    /// The library failed to produce the object.
    Failed = 2,
}

/// Exports the standard [`ENTRY_POINT_NAME`] entry point from a plugin crate.
///
/// The argument is a resolver `fn( &str ) -> Option<SharedObject>`; the macro
/// wraps it in the C-ABI signature the host resolves by name. Returning `None`
/// maps to [`EntryStatus::NotFound`]. The resolver must not panic - the entry
/// point is called across an `extern "C"` boundary.
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use dylib_link::{ LibraryObject, SharedObject };
///
/// struct Greeter ;
/// impl LibraryObject for Greeter {}
///
/// fn resolve( id: &str ) -> Option<SharedObject> {
///     match id {
///         "{B62D9AC5-2355-4C2C-9FB9-05E709A9F3D7}" => Some( Arc::new( Greeter )),
///         _ => None,
///     }
/// }
///
/// dylib_link::export_library_object!( resolve );
/// ```
#[macro_export]
macro_rules! export_library_object {
    ( $resolver:expr ) => {
        /// Standard object-extraction entry point, resolved by name at load time.
        #[no_mangle]
        pub unsafe extern "C" fn GetDllObject(
            id: *const ::std::os::raw::c_char,
            out: *mut ::std::option::Option<$crate::SharedObject>,
        ) -> $crate::EntryStatus {
            let resolver: fn( &str ) -> ::std::option::Option<$crate::SharedObject> = $resolver ;
            // SAFETY: the host passes a NUL-terminated id and a valid out slot
            // that outlives the call.
            let id = unsafe { ::std::ffi::CStr::from_ptr( id ) };
            let Ok( id ) = id.to_str() else { return $crate::EntryStatus::NotFound };
            match resolver( id ) {
                Some( object ) => {
                    unsafe { *out = Some( object ); }
                    $crate::EntryStatus::Success
                }
                None => $crate::EntryStatus::NotFound,
            }
        }
    };
}
