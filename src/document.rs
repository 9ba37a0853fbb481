//! Generic key/value documents backing synthesized proxies.

use once_cell::sync::Lazy ;
use parking_lot::RwLock ;
use regex::Regex ;
use serde_json::{ Map, Value };
use thiserror::Error ;



static VALID_FIELD_NAME: Lazy<Regex> = Lazy::new(|| {
	Regex::new( r"^[\w\-+=|!@#$%^&*:/., {}()\[\]]+$" ).expect( "field name pattern is valid" )
});

/// The name is empty or contains characters outside the accepted set.
#[derive( Debug, Error )]
#[error( "Invalid field name: {0:?}" )]
pub struct InvalidFieldName( pub String );

/// A validated document field identifier.
///
/// Accepts word characters (including non-latin letters), spaces and the punctuation
/// `- + = | ! @ # $ % ^ & * : / . , { } ( ) [ ]`.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct FieldName( String );

impl FieldName {

	/// # Errors
	/// Returns [`InvalidFieldName`] if `name` is empty or contains unsupported characters.
	pub fn new( name: impl Into<String> ) -> Result<Self, InvalidFieldName> {
		let name = name.into();
		match VALID_FIELD_NAME.is_match( &name ) {
			true => Ok( Self( name )),
			false => Err( InvalidFieldName( name )),
		}
	}

	#[inline] pub fn as_str( &self ) -> &str { &self.0 }

}

impl std::fmt::Display for FieldName {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { f.write_str( &self.0 ) }
}

impl AsRef<str> for FieldName {
	fn as_ref( &self ) -> &str { &self.0 }
}

impl TryFrom<&str> for FieldName {
	type Error = InvalidFieldName ;
	fn try_from( name: &str ) -> Result<Self, Self::Error> { Self::new( name ) }
}

/// A dynamically typed key/value document.
///
/// Implementations use interior mutability since a document is shared between the
/// proxy bound to it and whoever extracts it.
pub trait Document: Send + Sync + std::fmt::Debug {

	/// The value stored under `field`, if any.
	fn get( &self, field: &FieldName ) -> Option<Value> ;

	/// Stores `value` under `field`, replacing any previous value.
	fn set( &self, field: &FieldName, value: Value );

	/// The length of the list stored under `field`, or `None` if it is absent or not a list.
	fn list_len( &self, field: &FieldName ) -> Option<usize> {
		self.get( field ).and_then(| value | value.as_array().map( Vec::len ))
	}

}

/// A [`Document`] backed by a JSON object.
#[derive( Debug, Default )]
pub struct ObjectDocument {
	fields: RwLock<Map<String, Value>>,
}

impl ObjectDocument {

	pub fn new() -> Self { Self::default() }

	/// Wraps a JSON object. Returns `None` for any other kind of value.
	pub fn from_value( value: Value ) -> Option<Self> {
		match value {
			Value::Object( fields ) => Some( Self { fields: RwLock::new( fields ) }),
			_ => None,
		}
	}

	/// A snapshot of the document as a JSON object.
	pub fn to_value( &self ) -> Value { Value::Object( self.fields.read().clone() ) }

}

impl Document for ObjectDocument {

	fn get( &self, field: &FieldName ) -> Option<Value> {
		self.fields.read().get( field.as_str() ).cloned()
	}

	fn set( &self, field: &FieldName, value: Value ) {
		self.fields.write().insert( field.as_str().to_string(), value );
	}

	fn list_len( &self, field: &FieldName ) -> Option<usize> {
		self.fields.read().get( field.as_str() ).and_then( Value::as_array ).map( Vec::len )
	}

}
