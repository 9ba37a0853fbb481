//! Descriptor interfaces: the accessor contracts proxies are synthesized from.
//!
//! Descriptors can be built in code or deserialized, e.g. from TOML:
//!
//! ```toml
//! name = "com.acme.IUserMessage"
//!
//! [[methods]]
//! name = "getName"
//! returns = "string"
//!
//! [[methods]]
//! name = "setName"
//! params = ["string"]
//! ```

use serde::Deserialize ;
use serde_json::Value ;



/// The declared type of an accessor parameter or return value.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize )]
#[serde( rename_all = "lowercase" )]
pub enum ValueType {
	Bool,
	Int,
	Float,
	String,
	List,
	/// Setter parameter converted into the document's list representation.
	Iterable,
	Document,
	Any,
}

impl ValueType {

	/// Primitive values can't be absent; reading a missing primitive is an error.
	#[inline] pub fn is_primitive( self ) -> bool {
		matches!( self, Self::Bool | Self::Int | Self::Float )
	}

	/// Converts `value` to this type, or returns `None` if it doesn't fit.
	///
	/// Integers widen to floats. `Null` is accepted for every non-primitive type.
	pub(crate) fn coerce( self, value: Value ) -> Option<Value> {
		match ( self, value ) {
			( Self::Any, value ) => Some( value ),
			( ty, Value::Null ) => ( !ty.is_primitive() ).then_some( Value::Null ),
			( Self::Bool, value @ Value::Bool( _ )) => Some( value ),
			( Self::Int, Value::Number( number )) if number.is_i64() || number.is_u64() => Some( Value::Number( number )),
			( Self::Float, Value::Number( number )) => number.as_f64().map( Value::from ),
			( Self::String, value @ Value::String( _ )) => Some( value ),
			( Self::List | Self::Iterable, value @ Value::Array( _ )) => Some( value ),
			( Self::Document, value @ Value::Object( _ )) => Some( value ),
			_ => None,
		}
	}

}

impl std::fmt::Display for ValueType {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let name = match self {
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::String => "string",
			Self::List => "list",
			Self::Iterable => "iterable",
			Self::Document => "document",
			Self::Any => "any",
		};
		f.write_str( name )
	}
}

/// One accessor method of a [`Descriptor`].
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
pub struct MethodSignature {
	pub name: String,
	#[serde( default )]
	pub params: Vec<ValueType>,
	#[serde( default )]
	pub returns: Option<ValueType>,
}

impl MethodSignature {

	pub fn new( name: impl Into<String>, params: impl IntoIterator<Item = ValueType>, returns: Option<ValueType> ) -> Self {
		Self { name: name.into(), params: params.into_iter().collect(), returns }
	}

	/// `name() -> returns`
	pub fn getter( name: impl Into<String>, returns: ValueType ) -> Self {
		Self::new( name, [], Some( returns ))
	}

	/// `name( index: int ) -> returns`, reading one element of a list field.
	pub fn indexed_getter( name: impl Into<String>, returns: ValueType ) -> Self {
		Self::new( name, [ ValueType::Int ], Some( returns ))
	}

	/// `name( value: param )`
	pub fn setter( name: impl Into<String>, param: ValueType ) -> Self {
		Self::new( name, [ param ], None )
	}

	/// `name() -> int`, the length of a list field.
	pub fn counter( name: impl Into<String> ) -> Self {
		Self::new( name, [], Some( ValueType::Int ))
	}

}

/// A named set of accessor signatures. The name is the cache key for synthesis.
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
pub struct Descriptor {
	pub name: String,
	#[serde( default )]
	pub methods: Vec<MethodSignature>,
}

impl Descriptor {

	pub fn new( name: impl Into<String>, methods: impl IntoIterator<Item = MethodSignature> ) -> Self {
		Self { name: name.into(), methods: methods.into_iter().collect() }
	}

	/// # Errors
	/// Returns the TOML error if `text` is not a valid descriptor.
	pub fn from_toml_str( text: &str ) -> Result<Self, toml::de::Error> {
		toml::from_str( text )
	}

}
