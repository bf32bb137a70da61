use std::sync::Arc ;

use dylib_link::{ Library, ObjectId, ObjectSource, ENTRY_POINT_NAME };

use crate::fixture_objects::{ entry_point_address, SERVICE_ID_ALIAS, SERVICE_ID_PRIMARY };
use crate::mock_backend::{ MockBackend, MockLibrary };

const LIBRARY_PATH: &str = "mock/libsingleton.so" ;

#[test]
fn object_entry_point_singleton() {

    let backend = Arc::new( MockBackend::new().with_library(
        LIBRARY_PATH,
        MockLibrary::new().with_symbol( ENTRY_POINT_NAME, entry_point_address() ),
    ));
    let library = Library::new( LIBRARY_PATH, backend );
    library.initialize().unwrap();

    let primary = library
        .get_object( &ObjectId::from( SERVICE_ID_PRIMARY ), &ObjectSource::EntryPoint )
        .unwrap();
    let alias = library
        .get_object( &ObjectId::from( SERVICE_ID_ALIAS ), &ObjectSource::EntryPoint )
        .unwrap();

    // Two distinct ids extract the same underlying instance.
    assert!( Arc::ptr_eq( &primary, &alias ));

}
