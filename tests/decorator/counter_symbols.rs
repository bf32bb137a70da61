use std::sync::Arc ;

use dylib_link::{ downcast_object, LibraryCache, ObjectSource, RegistryEntry, StaticRegistry };

use crate::counter_library::{ counter_symbols, reset_counter, CounterDecorator };
use crate::mock_backend::{ MockBackend, MockLibrary };

const COUNTER_ID: &str = "fixture.counter" ;
const LIBRARY_PATH: &str = "mock/libcounter.so" ;

#[test]
fn decorator_counter_symbols() {

    reset_counter();

    let mut mock = MockLibrary::new();
    for ( name, address ) in counter_symbols() {
        mock = mock.with_symbol( name, address );
    }
    let backend = Arc::new( MockBackend::new().with_library( LIBRARY_PATH, mock ));
    let registry = StaticRegistry::new().with_entry( COUNTER_ID, RegistryEntry::new(
        LIBRARY_PATH,
        ObjectSource::Decorated( Arc::new( CounterDecorator::default() )),
    ));
    let cache = LibraryCache::new( Arc::new( registry )).with_backend( backend );

    let object = cache.get_object( COUNTER_ID ).unwrap();
    let counter = downcast_object::<CounterDecorator>( &object ).expect( "Registered as CounterDecorator" );

    assert_eq!( counter.increment(), 1 );
    assert_eq!( counter.increment(), 2 );
    assert_eq!( counter.value(), 2 );
    assert_eq!( counter.decrement(), 1 );
    assert_eq!( counter.decrement(), 0 );
    assert_eq!( counter.value(), 0 );

    // Repeated requests return the decorated instance itself.
    let object_again = cache.get_object( COUNTER_ID ).unwrap();
    assert!( Arc::ptr_eq( &object, &object_again ));

}
