use std::sync::Arc ;

use dylib_link::{ CacheError, LibraryCache, LibraryError, ObjectSource, RegistryEntry,
    StaticRegistry, ENTRY_POINT_NAME
};

use crate::fixture_objects::{ entry_point_address, RECOVERY_ID, UNKNOWN_OBJECT_ID };
use crate::mock_backend::{ MockBackend, MockLibrary };

const LIBRARY_PATH: &str = "mock/libpartial.so" ;

#[test]
fn object_object_not_found() {

    let registry = StaticRegistry::new()
        .with_entry( UNKNOWN_OBJECT_ID, RegistryEntry::new( LIBRARY_PATH, ObjectSource::EntryPoint ))
        .with_entry( RECOVERY_ID, RegistryEntry::new( LIBRARY_PATH, ObjectSource::EntryPoint ));
    let backend = Arc::new( MockBackend::new().with_library(
        LIBRARY_PATH,
        MockLibrary::new().with_symbol( ENTRY_POINT_NAME, entry_point_address() ),
    ));
    let cache = LibraryCache::new( Arc::new( registry )).with_backend( backend.clone() );

    // The library loads, but its entry point does not know this id.
    match cache.get_object( UNKNOWN_OBJECT_ID ) {
        Err( CacheError::Library( LibraryError::ObjectNotFound( id ))) =>
            assert_eq!( id.as_str(), UNKNOWN_OBJECT_ID ),
        Err( other ) => panic!( "Expected ObjectNotFound, got {:?}", other ),
        Ok( _ ) => panic!( "Expected ObjectNotFound, got an object" ),
    }

    // The failed extraction left the library loaded and usable.
    assert!( cache.get_library( UNKNOWN_OBJECT_ID ).unwrap().is_initialized() );
    let _object = cache.get_object( RECOVERY_ID ).unwrap();
    assert_eq!( backend.open_count( LIBRARY_PATH ), 1 );

}
