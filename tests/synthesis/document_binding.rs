use std::sync::Arc ;
use serde_json::json ;
use unit_link::{ Descriptor, Document, FieldName, MethodSignature, NamingConfig, ObjectDocument, ProxyError, ProxyType, Synthesizer, ValueType };

fn user_type() -> Arc<ProxyType> {
	Synthesizer::new( &NamingConfig::default() ).unwrap()
		.synthesize( &Descriptor::new( "acme.IUser", [
			MethodSignature::getter( "getAge", ValueType::Int ),
			MethodSignature::setter( "setAge", ValueType::Int ),
		]))
		.unwrap()
}

#[test]
fn document_binding_requires_init() {

	let proxy = user_type().instantiate();

	match proxy.get::<i64>( "getAge" ) {
		Err( ProxyError::Uninitialised ) => {}
		value => panic!( "Expected Uninitialised, found: {:#?}", value ),
	}
	match proxy.extract() {
		Err( ProxyError::Uninitialised ) => {}
		value => panic!( "Expected Uninitialised, found: {:#?}", value ),
	}

}

#[test]
fn document_binding_init_only_once() {

	let proxy = user_type().instantiate();
	proxy.init( Arc::new( ObjectDocument::new() )).unwrap();

	match proxy.init( Arc::new( ObjectDocument::new() )) {
		Err( ProxyError::AlreadyInitialised ) => {}
		value => panic!( "Expected AlreadyInitialised, found: {:#?}", value ),
	}

}

#[test]
fn document_binding_extract_returns_same_document() {

	let proxy = user_type().instantiate();
	let document: Arc<dyn Document> = Arc::new( ObjectDocument::new() );
	proxy.init( Arc::clone( &document )).unwrap();

	let extracted = proxy.extract().unwrap();
	assert!( Arc::ptr_eq( &extracted, &document ));

	proxy.set( "setAge", 7 ).unwrap();
	assert_eq!( extracted.get( &FieldName::new( "age" ).unwrap() ), Some( json!( 7 )));

}

#[test]
fn document_binding_shared_between_proxies() {

	let proxy_type = user_type();
	let document = Arc::new( ObjectDocument::from_value( json!({ "age": 40, "extra": "kept" })).unwrap() );

	let reader = proxy_type.instantiate();
	let writer = proxy_type.instantiate();
	reader.init( document.clone() ).unwrap();
	writer.init( document.clone() ).unwrap();

	assert_eq!( reader.get::<i64>( "getAge" ).unwrap(), 40 );
	writer.set( "setAge", 41 ).unwrap();
	assert_eq!( reader.get::<i64>( "getAge" ).unwrap(), 41 );
	assert_eq!( document.to_value(), json!({ "age": 41, "extra": "kept" }));

}

#[test]
fn document_binding_unknown_method() {

	let proxy = user_type().instantiate();
	proxy.init( Arc::new( ObjectDocument::new() )).unwrap();

	match proxy.invoke( "getName", &[] ) {
		Err( ProxyError::UnknownMethod( method )) => assert_eq!( method, "getName" ),
		value => panic!( "Expected UnknownMethod, found: {:#?}", value ),
	}

}

#[test]
fn document_binding_field_names() {

	assert!( FieldName::new( "first name" ).is_ok() );
	assert!( FieldName::new( "имя" ).is_ok() );
	assert!( FieldName::new( "a/b.c:d{0}[1]" ).is_ok() );
	assert!( FieldName::new( "" ).is_err() );
	assert!( FieldName::new( "tab\there" ).is_err() );
	assert!( FieldName::try_from( "quote\"" ).is_err() );

	assert!( ObjectDocument::from_value( json!([ 1, 2 ])).is_none() );

}
