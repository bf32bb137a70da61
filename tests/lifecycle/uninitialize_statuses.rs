use std::sync::Arc ;

use dylib_link::{ InitStatus, Library, UninitStatus };

use crate::mock_backend::{ MockBackend, MockLibrary };

const LIBRARY_PATH: &str = "mock/libstatuses.so" ;

#[test]
fn lifecycle_uninitialize_statuses() {

    let backend = Arc::new( MockBackend::new().with_library( LIBRARY_PATH, MockLibrary::new() ));
    let library = Library::new( LIBRARY_PATH, backend.clone() );

    assert_eq!( library.initialize().unwrap(), InitStatus::Initialized );
    assert_eq!( library.uninitialize().unwrap(), UninitStatus::Uninitialized );
    assert!( !library.is_initialized() );

    // Nothing left to unload the second time.
    assert_eq!( library.uninitialize().unwrap(), UninitStatus::NotInitialized );

    // The handle is reusable after an unload.
    assert_eq!( library.initialize().unwrap(), InitStatus::Initialized );
    assert_eq!( backend.open_count( LIBRARY_PATH ), 2 );
    assert_eq!( backend.close_count(), 1 );

}
