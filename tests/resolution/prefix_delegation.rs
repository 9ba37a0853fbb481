use std::sync::Arc ;

use crate::fixtures ;

#[test]
fn prefix_delegation_routes_to_unit_named_after_prefix() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "acme/app" );
	let greeter = registry.add_unit( "greeter", "acme/greeter" );
	let other = registry.add_unit( "other", "acme/other" );

	other.define( "acme.greeter.Greeter", fixtures::ORDINARY ).unwrap();
	let expected = greeter.define( "acme.greeter.Greeter", fixtures::ORDINARY ).unwrap();

	// `other` is searched first as a plain dependency, but the prefix binding wins.
	registry.add_dependency( &"app", &"other" ).unwrap();
	registry.add_dependency( &"app", &"greeter" ).unwrap();

	let resolved = app.resolve( "acme.greeter.Greeter" ).unwrap();
	assert!( Arc::ptr_eq( &expected, &resolved ));
	assert_eq!( resolved.owner_name(), "acme.greeter" );

}

#[test]
fn prefix_delegation_uses_longest_bound_prefix() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "app" );
	let outer = registry.add_unit( "outer", "acme" );
	let inner = registry.add_unit( "inner", "acme/greeter" );

	outer.define( "acme.greeter.impl.Greeter", fixtures::ORDINARY ).unwrap();
	let expected = inner.define( "acme.greeter.impl.Greeter", fixtures::ORDINARY ).unwrap();

	registry.add_dependency( &"app", &"outer" ).unwrap();
	registry.add_dependency( &"app", &"inner" ).unwrap();

	let resolved = app.resolve( "acme.greeter.impl.Greeter" ).unwrap();
	assert!( Arc::ptr_eq( &expected, &resolved ));

}

#[test]
fn prefix_delegation_falls_back_to_other_dependencies() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "app" );
	registry.add_unit( "greeter", "acme/greeter" );
	let shim = registry.add_unit( "shim", "shim" );

	let expected = shim.define( "acme.greeter.Legacy", fixtures::ORDINARY ).unwrap();

	registry.add_dependency( &"app", &"greeter" ).unwrap();
	registry.add_dependency( &"app", &"shim" ).unwrap();

	let resolved = app.resolve( "acme.greeter.Legacy" ).unwrap();
	assert!( Arc::ptr_eq( &expected, &resolved ));

}

#[test]
fn prefix_delegation_within_dependency() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "app" );
	registry.add_unit( "library", "library" );
	let greeter = registry.add_unit( "greeter", "acme/greeter" );
	let expected = greeter.define( "acme.greeter.Greeter", fixtures::ORDINARY ).unwrap();

	// Declared after `app` took its snapshot, so only `library` knows the prefix.
	registry.add_dependency( &"app", &"library" ).unwrap();
	registry.add_dependency( &"library", &"greeter" ).unwrap();
	assert_eq!( app.dependencies().len(), 1 );

	let resolved = app.resolve( "acme.greeter.Greeter" ).unwrap();
	assert!( Arc::ptr_eq( &expected, &resolved ));

}
