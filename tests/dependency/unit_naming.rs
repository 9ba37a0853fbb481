use unit_link::normalize_unit_name ;

use crate::fixtures ;

#[test]
fn unit_naming_normalizes_coordinates() {
	assert_eq!( normalize_unit_name( "info.smart_tools:core-pack/1.0" ), "info.smart_tools.core_pack.1.0" );
	assert_eq!( normalize_unit_name( "acme/greeter" ), "acme.greeter" );
	assert_eq!( normalize_unit_name( "plain" ), "plain" );
}

#[test]
fn unit_naming_binds_unit_under_its_own_name() {

	let registry = fixtures::registry();
	let app = registry.add_unit( "app", "acme:greeter-app" );
	assert_eq!( app.name(), "acme.greeter_app" );

	let artifact = app.define( "acme.greeter_app.Main", fixtures::ORDINARY ).unwrap();
	assert!( std::sync::Arc::ptr_eq( &artifact, &app.resolve( "acme.greeter_app.Main" ).unwrap() ));

}
