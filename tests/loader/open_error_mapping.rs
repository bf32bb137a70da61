use std::io::Write ;
use std::path::Path ;

use dylib_link::{ AdapterError, DylibBackend, LoaderBackend, OpenError };

#[test]
fn loader_open_error_mapping() {

    let backend = DylibBackend ;

    let path = Path::new( "/nonexistent/libmissing.so" );
    match backend.open( path ) {
        Err( AdapterError::Open( OpenError::NotFound( reported ))) => {
            assert_eq!( reported, path );
        }
        Err( other ) => panic!( "Expected a not-found error, got {other:?}" ),
        Ok( _ ) => panic!( "Expected a not-found error, got a loaded library" ),
    }

    // A readable file that is not a shared library is rejected as malformed.
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all( b"this is not a shared library" ).unwrap();
    file.flush().unwrap();

    match backend.open( file.path() ) {
        Err( AdapterError::Open( OpenError::InvalidFormat( reported, _reason ))) => {
            assert_eq!( reported, file.path() );
        }
        Err( other ) => panic!( "Expected an invalid format error, got {other:?}" ),
        Ok( _ ) => panic!( "Expected an invalid format error, got a loaded library" ),
    }

}
