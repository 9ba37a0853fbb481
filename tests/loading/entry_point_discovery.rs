use std::sync::Arc ;

use crate::fixtures::{ self, Recorder };

#[test]
fn entry_point_discovery_calls_back_once_per_entry_point() {

	let dir = tempfile::tempdir().unwrap();
	let bundle = fixtures::write_bundle( dir.path(), "greeter.zip", &[
		( "acme/greeter/Plugin.wasm", fixtures::ENTRY_POINT ),
		( "acme/greeter/Helper.wasm", fixtures::ORDINARY ),
		( "acme/greeter/model/Message.wasm", fixtures::ORDINARY ),
	]);

	let registry = fixtures::registry();
	let unit = registry.add_unit( "greeter", "acme/greeter" );

	let mut created = Vec::new();
	let mut loader = registry.loader( &"greeter", | artifact | {
		created.push( Arc::clone( artifact ));
		Ok(())
	}, Recorder::default() ).unwrap();

	let entry_points = assert_no_warnings!( loader.load( &bundle )).unwrap();
	let visitor = loader.into_visitor();

	assert_eq!( entry_points, 1 );
	assert_eq!( created.len(), 1 );
	assert_eq!( created[0].name(), "acme.greeter.Plugin" );
	assert!( created[0].is_entry_point() );

	assert_eq!( visitor.succeeded, [( bundle.clone(), 1 )]);
	assert!( visitor.failed.is_empty(), "Unexpected failures: {:?}", visitor.failed );

	for name in [ "acme.greeter.Helper", "acme.greeter.model.Message" ] {
		match unit.resolve( name ) {
			Ok( artifact ) if !artifact.is_entry_point() => assert_eq!( artifact.owner_name(), "acme.greeter" ),
			value => panic!( "Expected ordinary artifact {name}, found: {:#?}", value ),
		}
	}
	assert!( Arc::ptr_eq( &created[0], &unit.resolve( "acme.greeter.Plugin" ).unwrap() ));

}

#[test]
fn entry_point_discovery_with_custom_export() {

	let dir = tempfile::tempdir().unwrap();
	let bundle = fixtures::write_bundle( dir.path(), "greeter.zip", &[
		( "acme/greeter/Plugin.wasm", fixtures::ENTRY_POINT ),
	]);

	fixtures::init_tracing();
	let config = unit_link::LoaderConfig::from_toml_str( r#"entry_point_export = "acme:other/entry""# ).unwrap();
	let registry = unit_link::UnitRegistry::new( unit_link::Engine::default(), config );
	registry.add_unit( "greeter", "acme/greeter" );

	let mut loader = registry.loader( &"greeter", | _ | Ok(()), unit_link::NoopVisitor ).unwrap();
	assert_eq!( loader.load( &bundle ).unwrap(), 0 );

}

#[test]
fn entry_point_discovery_reloading_keeps_artifacts() {

	let dir = tempfile::tempdir().unwrap();
	let bundle = fixtures::write_bundle( dir.path(), "greeter.zip", &[
		( "acme/greeter/Plugin.wasm", fixtures::ENTRY_POINT ),
	]);

	let registry = fixtures::registry();
	let unit = registry.add_unit( "greeter", "acme/greeter" );

	let mut created = Vec::new();
	let mut loader = registry.loader( &"greeter", | artifact | {
		created.push( Arc::clone( artifact ));
		Ok(())
	}, unit_link::NoopVisitor ).unwrap();
	loader.load( &bundle ).unwrap();
	loader.load( &bundle ).unwrap();
	drop( loader );

	assert_eq!( created.len(), 2 );
	assert!( Arc::ptr_eq( &created[0], &created[1] ));
	assert_eq!( unit.search_path().len(), 1 );

}
