#[allow( dead_code )]
mod fixture_objects {

    use std::collections::HashMap ;
    use std::sync::Arc ;

    use once_cell::sync::Lazy ;
    use parking_lot::Mutex ;

    use dylib_link::{ GetDllObjectFn, LibraryObject, SharedObject, SymbolAddress };

    /// Ids the entry point below resolves. The two service ids share one
    /// singleton instance; the rest get a fresh instance per extraction.
    pub const SERVICE_ID_PRIMARY: &str = "fixture.service.primary" ;
    pub const SERVICE_ID_ALIAS: &str = "fixture.service.alias" ;
    pub const WORKER_ID: &str = "fixture.worker" ;
    pub const GADGET_ID: &str = "fixture.gadget" ;
    pub const RECOVERY_ID: &str = "fixture.recovery" ;
    /// Registered in test registries but unknown to the entry point.
    pub const UNKNOWN_OBJECT_ID: &str = "fixture.unknown" ;

    pub struct FixtureService ;
    impl LibraryObject for FixtureService {}

    pub struct FixtureWorker ;
    impl LibraryObject for FixtureWorker {}

    static SERVICE: Lazy<SharedObject> = Lazy::new(|| Arc::new( FixtureService ));
    static EXTRACTIONS: Lazy<Mutex<HashMap<String, usize>>> = Lazy::new(|| Mutex::new( HashMap::new() ));

    /// How many times the entry point has been called for `id` in this test
    /// binary. Scenarios asserting on this must use an id no other scenario
    /// in the same binary touches.
    pub fn extraction_count( id: &str ) -> usize {
        EXTRACTIONS.lock().get( id ).copied().unwrap_or( 0 )
    }

    fn resolve( id: &str ) -> Option<SharedObject> {
        *EXTRACTIONS.lock().entry( id.to_string() ).or_insert( 0 ) += 1;
        match id {
            SERVICE_ID_PRIMARY | SERVICE_ID_ALIAS => Some( Arc::clone( &*SERVICE )),
            WORKER_ID | GADGET_ID | RECOVERY_ID => Some( Arc::new( FixtureWorker )),
            _ => None,
        }
    }

    dylib_link::export_library_object!( resolve );

    /// Address of the entry point above, for injecting into mock libraries.
    pub fn entry_point_address() -> SymbolAddress {
        SymbolAddress::new( GetDllObject as GetDllObjectFn as *const () )
    }

}
