//! Synthesized proxy types and their instances.
//!
//! A [`ProxyType`] is a dispatch table from method names to [`Accessor`]s. A [`Proxy`]
//! is an instance of it bound to one [`Document`]; calling a method reads or writes
//! the field the accessor refers to.

use std::collections::HashMap ;
use std::sync::Arc ;
use itertools::Itertools ;
use once_cell::sync::OnceCell ;
use serde::de::DeserializeOwned ;
use serde_json::Value ;
use thiserror::Error ;

use crate::descriptor::ValueType ;
use crate::document::{ Document, FieldName };



/// Errors raised when calling a method on a [`Proxy`].
#[derive( Debug, Error )]
pub enum ProxyError {
	#[error( "Unknown method: {0}" )] UnknownMethod( String ),
	#[error( "Proxy is not bound to a document" )] Uninitialised,
	#[error( "Proxy is already bound to a document" )] AlreadyInitialised,
	/// Wrong number of arguments, or an argument of the wrong type.
	#[error( "Invalid arguments for method {0}" )] InvalidArguments( String ),
	#[error( "Field {field} does not hold a {expected} value" )]
	TypeMismatch { field: FieldName, expected: ValueType },
	/// A primitive or list field was read before being set.
	#[error( "Field {0} has no value" )] MissingValue( FieldName ),
	#[error( "Index {index} is out of bounds for field {field}" )]
	IndexOutOfBounds { field: FieldName, index: usize },
	#[error( "Conversion Error: {0}" )] Conversion( #[from] serde_json::Error ),
}

/// A document field shared by every accessor that refers to it.
#[derive( Debug, PartialEq, Eq )]
pub struct Field {
	name: FieldName,
}

impl Field {
	pub(crate) fn new( name: FieldName ) -> Self { Self { name }}
	#[inline] pub fn name( &self ) -> &FieldName { &self.name }
}

/// What a synthesized method does when called.
#[derive( Debug, Clone )]
pub enum Accessor {
	/// `() -> ty`
	Get { field: Arc<Field>, ty: ValueType },
	/// `( index ) -> ty`, reading one element of a list field.
	GetIndexed { field: Arc<Field>, ty: ValueType },
	/// `( ty )`
	Set { field: Arc<Field>, ty: ValueType },
	/// `( iterable )`, storing the argument as a list.
	SetList { field: Arc<Field> },
	/// `() -> int`, the length of a list field.
	Count { field: Arc<Field> },
}

impl Accessor {

	/// Number of arguments the accessor takes.
	#[inline] pub fn arity( &self ) -> usize {
		match self {
			Self::Get { .. } | Self::Count { .. } => 0,
			Self::GetIndexed { .. } | Self::Set { .. } | Self::SetList { .. } => 1,
		}
	}

	#[inline] pub fn field( &self ) -> &Arc<Field> {
		match self {
			Self::Get { field, .. }
			| Self::GetIndexed { field, .. }
			| Self::Set { field, .. }
			| Self::SetList { field }
			| Self::Count { field } => field,
		}
	}

}

/// A synthesized implementation of a descriptor interface.
///
/// Methods are dispatched by name and argument count, so a plain getter and an
/// indexed getter may share a name.
///
/// Produced by [`Synthesizer::synthesize`]( crate::Synthesizer::synthesize ) and shared
/// by every proxy instantiated from it.
#[derive( Debug )]
pub struct ProxyType {
	name: String,
	descriptor: String,
	fields: Vec<Arc<Field>>,
	methods: HashMap<String, Vec<Accessor>>,
}

impl ProxyType {

	pub(crate) fn new( name: String, descriptor: String, methods: HashMap<String, Vec<Accessor>> ) -> Self {
		let fields = methods.values()
			.flatten()
			.map(| accessor | Arc::clone( accessor.field() ))
			.unique_by(| field | Arc::as_ptr( field ))
			.sorted_by(| a, b | a.name().cmp( b.name() ))
			.collect();
		Self { name, descriptor, fields, methods }
	}

	/// Name of the synthesized type, derived from the configured template.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Name of the descriptor this type implements.
	#[inline] pub fn descriptor_name( &self ) -> &str { &self.descriptor }

	/// Every field the type's accessors refer to, sorted by name.
	#[inline] pub fn fields( &self ) -> &[Arc<Field>] { &self.fields }

	pub fn field( &self, name: &str ) -> Option<&Arc<Field>> {
		self.fields.iter().find(| field | field.name().as_str() == name )
	}

	/// The accessor called for `method` with `arity` arguments.
	pub fn accessor( &self, method: &str, arity: usize ) -> Option<&Accessor> {
		self.methods.get( method )?.iter().find(| accessor | accessor.arity() == arity )
	}

	/// Every accessor synthesized under `method`.
	pub fn overloads( &self, method: &str ) -> &[Accessor] {
		self.methods.get( method ).map( Vec::as_slice ).unwrap_or_default()
	}

	pub fn methods( &self ) -> impl Iterator<Item = &str> { self.methods.keys().map( String::as_str ) }

	/// Creates an unbound instance. Call [`Proxy::init`] before invoking accessors.
	pub fn instantiate( self: &Arc<Self> ) -> Proxy {
		Proxy { proxy_type: Arc::clone( self ), document: OnceCell::new() }
	}

}

/// An instance of a [`ProxyType`] bound to a backing [`Document`].
#[derive( Debug )]
pub struct Proxy {
	proxy_type: Arc<ProxyType>,
	document: OnceCell<Arc<dyn Document>>,
}

impl Proxy {

	#[inline] pub fn proxy_type( &self ) -> &Arc<ProxyType> { &self.proxy_type }

	/// Binds the proxy to `document`. The document is shared, not copied.
	///
	/// # Errors
	/// Returns [`ProxyError::AlreadyInitialised`] if the proxy is already bound.
	pub fn init( &self, document: Arc<dyn Document> ) -> Result<(), ProxyError> {
		self.document.set( document ).map_err(| _ | ProxyError::AlreadyInitialised )
	}

	/// The backing document, as passed to [`init`]( Self::init ).
	///
	/// # Errors
	/// Returns [`ProxyError::Uninitialised`] if the proxy is not bound yet.
	pub fn extract( &self ) -> Result<Arc<dyn Document>, ProxyError> {
		self.document().map( Arc::clone )
	}

	fn document( &self ) -> Result<&Arc<dyn Document>, ProxyError> {
		self.document.get().ok_or( ProxyError::Uninitialised )
	}

	/// Calls `method` with dynamically typed arguments. Setters return `Null`.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn invoke( &self, method: &str, args: &[Value] ) -> Result<Value, ProxyError> {

		let overloads = self.proxy_type.methods.get( method )
			.ok_or_else(|| ProxyError::UnknownMethod( method.to_string() ))?;
		let document = self.document()?;
		let invalid_arguments = || ProxyError::InvalidArguments( method.to_string() );
		let accessor = overloads.iter()
			.find(| accessor | accessor.arity() == args.len() )
			.ok_or_else( invalid_arguments )?;

		match ( accessor, args ) {
			( Accessor::Get { field, ty }, [] ) => read( field, *ty, document.get( field.name() )),
			( Accessor::GetIndexed { field, ty }, [ index ] ) => {
				let index = index.as_u64()
					.and_then(| index | usize::try_from( index ).ok())
					.ok_or_else( invalid_arguments )?;
				let element = match document.get( field.name() ) {
					Some( Value::Array( mut items )) if index < items.len() => Some( items.swap_remove( index )),
					Some( Value::Array( _ )) => return Err( ProxyError::IndexOutOfBounds { field: field.name().clone(), index }),
					None | Some( Value::Null ) => return Err( ProxyError::MissingValue( field.name().clone() )),
					Some( _ ) => return Err( ProxyError::TypeMismatch { field: field.name().clone(), expected: ValueType::List }),
				};
				read( field, *ty, element )
			}
			( Accessor::Set { field, ty }, [ value ] ) => {
				let value = ty.coerce( value.clone() ).ok_or_else( invalid_arguments )?;
				document.set( field.name(), value );
				Ok( Value::Null )
			}
			( Accessor::SetList { field }, [ value ] ) => {
				let list = ValueType::Iterable.coerce( value.clone() ).ok_or_else( invalid_arguments )?;
				document.set( field.name(), list );
				Ok( Value::Null )
			}
			( Accessor::Count { field }, [] ) => document.list_len( field.name() )
				.map( Value::from )
				.ok_or_else(|| ProxyError::MissingValue( field.name().clone() )),
			_ => Err( invalid_arguments() ),
		}

	}

	/// Calls a getter and deserializes the result.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn get<T: DeserializeOwned>( &self, method: &str ) -> Result<T, ProxyError> {
		Ok( serde_json::from_value( self.invoke( method, &[] )? )? )
	}

	/// Calls an indexed getter and deserializes the element.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn get_at<T: DeserializeOwned>( &self, method: &str, index: usize ) -> Result<T, ProxyError> {
		Ok( serde_json::from_value( self.invoke( method, &[ Value::from( index ) ])? )? )
	}

	/// Calls a setter.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn set( &self, method: &str, value: impl Into<Value> ) -> Result<(), ProxyError> {
		self.invoke( method, &[ value.into() ]).map( drop )
	}

	/// Calls a list setter with the collected items.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn set_iter<I>( &self, method: &str, values: I ) -> Result<(), ProxyError>
	where
		I: IntoIterator,
		I::Item: Into<Value>,
	{
		let list = Value::Array( values.into_iter().map( Into::into ).collect() );
		self.invoke( method, &[ list ]).map( drop )
	}

	/// Calls a counter.
	///
	/// # Errors
	/// See [`ProxyError`].
	pub fn count( &self, method: &str ) -> Result<usize, ProxyError> {
		self.get( method )
	}

}

/// Applies a getter's declared type to the stored value.
fn read( field: &Field, ty: ValueType, value: Option<Value> ) -> Result<Value, ProxyError> {
	match value {
		None | Some( Value::Null ) if ty.is_primitive() => Err( ProxyError::MissingValue( field.name().clone() )),
		None => Ok( Value::Null ),
		Some( value ) => ty.coerce( value )
			.ok_or_else(|| ProxyError::TypeMismatch { field: field.name().clone(), expected: ty }),
	}
}
