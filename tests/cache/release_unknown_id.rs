use std::sync::Arc ;

use dylib_link::{ CacheError, LibraryCache, RegistryError, StaticRegistry };

#[test]
fn cache_release_unknown_id() {

    let cache = LibraryCache::new( Arc::new( StaticRegistry::new() ));

    // An unresolvable id is a hard error, unlike a known-but-unloaded one.
    match cache.release_library( "no.such.id" ) {
        Err( CacheError::Registry( RegistryError::UnknownId( id ))) => assert_eq!( id.as_str(), "no.such.id" ),
        other => panic!( "Expected UnknownId, got {:?}", other ),
    }

}
