use std::sync::Arc ;

use crate::fixtures ;

#[test]
fn cache_pinning_returns_identical_artifacts() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "app" );
	let base = registry.add_unit( "base", "base" );
	base.define( "common.Clock", fixtures::ORDINARY ).unwrap();
	registry.add_dependency( &"app", &"base" ).unwrap();

	let first = app.resolve( "common.Clock" ).unwrap();
	let second = app.resolve( "common.Clock" ).unwrap();
	assert!( Arc::ptr_eq( &first, &second ));
	assert!( app.is_resolved( "common.Clock" ));

}

#[test]
fn cache_pinning_survives_graph_changes() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "app" );
	let fresh = registry.add_unit( "fresh", "fresh" );
	let library = registry.add_unit( "library", "library" );
	let shared = registry.add_unit( "shared", "shared" );

	let from_library = library.define( "shared.Thing", fixtures::ORDINARY ).unwrap();
	let from_shared = shared.define( "shared.Thing", fixtures::ORDINARY ).unwrap();

	registry.add_dependency( &"app", &"library" ).unwrap();
	let pinned = app.resolve( "shared.Thing" ).unwrap();
	assert!( Arc::ptr_eq( &pinned, &from_library ));

	// `shared` now owns the prefix, but `app` keeps what it resolved first.
	registry.add_dependency( &"app", &"shared" ).unwrap();
	assert!( Arc::ptr_eq( &app.resolve( "shared.Thing" ).unwrap(), &from_library ));

	registry.add_dependency( &"fresh", &"library" ).unwrap();
	registry.add_dependency( &"fresh", &"shared" ).unwrap();
	assert!( Arc::ptr_eq( &fresh.resolve( "shared.Thing" ).unwrap(), &from_shared ));

}
