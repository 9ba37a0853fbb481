//! Proxy type synthesis from descriptor interfaces.

use std::collections::HashMap ;
use std::collections::hash_map::Entry ;
use std::sync::Arc ;
use dashmap::DashMap ;
use parking_lot::Mutex ;
use thiserror::Error ;
use tracing::{ debug, trace };

use crate::config::{ ConfigError, MethodKind, NamingConfig, NamingConventions };
use crate::descriptor::{ Descriptor, MethodSignature, ValueType };
use crate::document::{ FieldName, InvalidFieldName };
use crate::proxy::{ Accessor, Field, ProxyType };



/// Errors that prevent a proxy type from being synthesized.
///
/// A failed synthesis is not cached; a later request for the same descriptor tries again.
#[derive( Debug, Error )]
pub enum SynthesisError {
	#[error( "Invalid descriptor: {0}" )] InvalidDescriptor( String ),
	/// The method name matches none of the getter, setter or counter patterns.
	#[error( "Method {0} matches no accessor naming convention" )] UnrecognisedMethod( String ),
	/// The method name was recognised but its parameters or return type don't fit.
	#[error( "Method {method} does not have a valid {kind} signature" )]
	InvalidSignature { method: String, kind: MethodKind },
	/// Two methods share both name and argument count.
	#[error( "Duplicate method: {0}" )] DuplicateMethod( String ),
	#[error( "Method {method} derives an invalid field name: {source}" )]
	InvalidFieldName { method: String, source: InvalidFieldName },
}

/// Builds [`ProxyType`]s from [`Descriptor`]s and caches them by descriptor name.
///
/// Synthesis runs under a single lock; cache hits don't take it. A cached type is
/// returned as is, without checking that the descriptor passed in still has the
/// same methods as the one it was built from.
#[derive( Debug )]
pub struct Synthesizer {
	conventions: NamingConventions,
	cache: DashMap<String, Arc<ProxyType>>,
	lock: Mutex<()>,
}

impl Synthesizer {

	/// # Errors
	/// Returns [`ConfigError::Pattern`] if any naming pattern fails to compile.
	pub fn new( naming: &NamingConfig ) -> Result<Self, ConfigError> {
		Ok( Self {
			conventions: NamingConventions::compile( naming )?,
			cache: DashMap::new(),
			lock: Mutex::new(()),
		})
	}

	/// Returns the proxy type for `descriptor`, synthesizing it on first request.
	///
	/// # Errors
	/// Returns a [`SynthesisError`] if the descriptor has no name, a method matches no
	/// naming convention or has the wrong shape for its kind, or two methods share a name and
	/// argument count.
	pub fn synthesize( &self, descriptor: &Descriptor ) -> Result<Arc<ProxyType>, SynthesisError> {

		if let Some( cached ) = self.cached( &descriptor.name ) { return Ok( cached ) }

		let _guard = self.lock.lock();
		if let Some( cached ) = self.cached( &descriptor.name ) { return Ok( cached ) }

		debug!( descriptor = %descriptor.name, methods = descriptor.methods.len(), "synthesizing proxy type" );
		let proxy_type = Arc::new( self.build( descriptor )? );
		self.cache.insert( descriptor.name.clone(), Arc::clone( &proxy_type ));
		Ok( proxy_type )

	}

	/// The proxy type cached for a descriptor name, if one was synthesized.
	pub fn cached( &self, descriptor: &str ) -> Option<Arc<ProxyType>> {
		self.cache.get( descriptor ).map(| entry | Arc::clone( entry.value() ))
	}

	fn build( &self, descriptor: &Descriptor ) -> Result<ProxyType, SynthesisError> {

		if descriptor.name.trim().is_empty() {
			return Err( SynthesisError::InvalidDescriptor( "descriptor name is empty".to_string() ));
		}

		let mut fields = HashMap::new();
		let mut methods = HashMap::with_capacity( descriptor.methods.len() );
		for method in &descriptor.methods {
			let accessor = self.accessor( method, &mut fields )?;
			trace!( descriptor = %descriptor.name, method = %method.name, field = %accessor.field().name(), "synthesized accessor" );
			let overloads: &mut Vec<Accessor> = methods.entry( method.name.clone() ).or_default();
			if overloads.iter().any(| known | known.arity() == accessor.arity() ) {
				return Err( SynthesisError::DuplicateMethod( method.name.clone() ));
			}
			overloads.push( accessor );
		}

		Ok( ProxyType::new( self.conventions.type_name( &descriptor.name ), descriptor.name.clone(), methods ))

	}

	fn accessor(
		&self,
		method: &MethodSignature,
		fields: &mut HashMap<String, Arc<Field>>,
	) -> Result<Accessor, SynthesisError> {

		let kind = self.conventions.classify( &method.name )
			.ok_or_else(|| SynthesisError::UnrecognisedMethod( method.name.clone() ))?;

		let field = match fields.entry( self.conventions.field_name( &method.name )) {
			Entry::Occupied( entry ) => Arc::clone( entry.get() ),
			Entry::Vacant( entry ) => {
				let name = FieldName::new( entry.key().as_str() )
					.map_err(| source | SynthesisError::InvalidFieldName { method: method.name.clone(), source })?;
				Arc::clone( entry.insert( Arc::new( Field::new( name ))))
			}
		};

		match ( kind, method.params.as_slice(), method.returns ) {
			( MethodKind::Getter, [], Some( ty )) => Ok( Accessor::Get { field, ty }),
			( MethodKind::Getter, [ ValueType::Int ], Some( ty )) => Ok( Accessor::GetIndexed { field, ty }),
			( MethodKind::Setter, [ ValueType::Iterable ], None ) => Ok( Accessor::SetList { field }),
			( MethodKind::Setter, [ ty ], None ) => Ok( Accessor::Set { field, ty: *ty }),
			( MethodKind::Counter, [], Some( ValueType::Int )) => Ok( Accessor::Count { field }),
			_ => Err( SynthesisError::InvalidSignature { method: method.name.clone(), kind }),
		}

	}

}
