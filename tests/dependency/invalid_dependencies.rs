use unit_link::RegistryError ;

use crate::fixtures ;

#[test]
fn invalid_dependencies_self_dependency_is_ignored() {

	let registry = fixtures::registry();
	let unit = registry.add_unit( "a", "a" );

	registry.add_dependency( &"a", &"a" ).unwrap();
	assert!( unit.dependencies().is_empty() );

}

#[test]
fn invalid_dependencies_unknown_units() {

	let registry = fixtures::registry();
	let unit = registry.add_unit( "a", "a" );

	match registry.add_dependency( &"a", &"missing" ) {
		Err( RegistryError::UnknownUnit( "missing" )) => {}
		value => panic!( "Expected UnknownUnit, found: {:#?}", value ),
	}
	match registry.add_dependency( &"missing", &"a" ) {
		Err( RegistryError::UnknownUnit( "missing" )) => {}
		value => panic!( "Expected UnknownUnit, found: {:#?}", value ),
	}
	assert!( unit.dependencies().is_empty() );

}

#[test]
fn invalid_dependencies_duplicate_unit_id_keeps_first() {

	let registry = fixtures::registry();
	let first = registry.add_unit( "a", "first" );
	let second = registry.add_unit( "a", "second" );

	assert!( std::sync::Arc::ptr_eq( &first, &second ));
	assert_eq!( second.name(), "first" );

}
