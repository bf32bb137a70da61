use std::os::raw::c_char ;
use std::sync::Arc ;

use dylib_link::{ EntryStatus, GetDllObjectFn, Library, LibraryError, ObjectId, ObjectSource,
    SharedObject, SymbolAddress, ENTRY_POINT_NAME
};

use crate::mock_backend::{ MockBackend, MockLibrary };

const FAILING_PATH: &str = "mock/libfailing.so" ;
const EMPTY_PATH: &str = "mock/libempty.so" ;

unsafe extern "C" fn failing_entry( _id: *const c_char, _out: *mut Option<SharedObject> ) -> EntryStatus {
    EntryStatus::Failed
}

unsafe extern "C" fn empty_handed_entry( _id: *const c_char, _out: *mut Option<SharedObject> ) -> EntryStatus {
    EntryStatus::Success
}

fn entry_address( entry: GetDllObjectFn ) -> SymbolAddress {
    SymbolAddress::new( entry as *const () )
}

#[test]
fn object_extraction_failed() {

    let backend = Arc::new( MockBackend::new()
        .with_library( FAILING_PATH, MockLibrary::new()
            .with_symbol( ENTRY_POINT_NAME, entry_address( failing_entry )))
        .with_library( EMPTY_PATH, MockLibrary::new()
            .with_symbol( ENTRY_POINT_NAME, entry_address( empty_handed_entry ))));
    let id = ObjectId::from( "fixture.refused" );

    // The entry point reports failure outright.
    let library = Library::new( FAILING_PATH, backend.clone() );
    library.initialize().unwrap();
    match library.get_object( &id, &ObjectSource::EntryPoint ) {
        Err( LibraryError::ExtractionFailed( failed )) => assert_eq!( failed, id ),
        Err( other ) => panic!( "Expected ExtractionFailed, got {:?}", other ),
        Ok( _ ) => panic!( "Expected ExtractionFailed, got an object" ),
    }

    // An id with an interior NUL never reaches the entry point.
    let nul_id = ObjectId::from( "fixture\0refused" );
    match library.get_object( &nul_id, &ObjectSource::EntryPoint ) {
        Err( LibraryError::ExtractionFailed( failed )) => assert_eq!( failed, nul_id ),
        Err( other ) => panic!( "Expected ExtractionFailed, got {:?}", other ),
        Ok( _ ) => panic!( "Expected ExtractionFailed, got an object" ),
    }

    // The failures cached nothing and left the library loaded.
    assert!( library.is_initialized() );
    assert_eq!( library.reference_count(), 0 );

    // Success without an object written into the slot is a failure too.
    let library = Library::new( EMPTY_PATH, backend.clone() );
    library.initialize().unwrap();
    match library.get_object( &id, &ObjectSource::EntryPoint ) {
        Err( LibraryError::ExtractionFailed( failed )) => assert_eq!( failed, id ),
        Err( other ) => panic!( "Expected ExtractionFailed, got {:?}", other ),
        Ok( _ ) => panic!( "Expected ExtractionFailed, got an object" ),
    }
    assert!( library.is_initialized() );

}
