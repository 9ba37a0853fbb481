//! Namespace-delegating symbol resolution.
//!
//! [`Unit::resolve`] looks a fully qualified name up in this order:
//!
//! 1. the unit's resolution cache
//! 2. the unit's symbol map; a binding to another unit delegates the whole lookup to it
//! 3. the ancestor chain, starting at the unit's parent
//! 4. prefix peeling: the name is shortened one dot-delimited segment at a time until a
//! 	prefix is bound in the symbol map, and the full name is delegated to that unit
//! 5. every dependency in recorded order, skipping the unit already tried in step 4;
//! 	a dependency repeats steps 2, 3, 4 and 6 for itself, without consulting its
//! 	cache or its own dependencies
//! 6. the unit's own bundle contents
//!
//! Any success past step 1 is cached. The first cached artifact for a name is kept for
//! the lifetime of the unit even if the dependency graph changes afterwards.
//!
//! Dependency cycles are not detected. Declaring one makes resolution of names
//! bound in neither unit recurse without bound.

use std::sync::Arc ;
use thiserror::Error ;
use tracing::{ debug, trace };

use crate::materialize::MaterializeError ;
use crate::unit::{ Artifact, Unit };



/// Errors that occur when resolving a symbolic name.
#[derive( Debug, Error )]
pub enum ResolveError {
	/// No unit along the delegation chain could provide the name.
	#[error( "Symbol not found: {name}" )]
	NotFound { name: String },
	/// The name was found in a bundle but could not be compiled.
	#[error( "Materialization failed: {0}" )]
	Materialize( #[from] MaterializeError ),
	/// The name is already bound in the unit it was being defined in.
	#[error( "Symbol {name} is already defined in unit {unit}" )]
	AlreadyDefined { name: String, unit: String },
}

/// How much of a unit's delegation chain a lookup may use.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
enum Scope {
	/// Every step, reading and filling the unit's cache.
	Full,
	/// A lookup made on behalf of a dependent unit. Skips the unit's cache and its own
	/// dependencies. The result depends only on the graph, not on earlier resolutions.
	Dependency,
}

impl Unit {

	/// Resolves a fully qualified symbolic name through this unit's delegation chain.
	///
	/// # Errors
	/// Returns [`ResolveError::NotFound`] carrying `name` verbatim when nothing provides it,
	/// or [`ResolveError::Materialize`] when the providing bundle entry fails to compile.
	pub fn resolve( &self, name: &str ) -> Result<Arc<Artifact>, ResolveError> {
		match self.lookup( name, Scope::Full )? {
			Some( artifact ) => Ok( artifact ),
			None => {
				debug!( unit = %self.name(), symbol = name, "symbol not found" );
				Err( ResolveError::NotFound { name: name.to_string() })
			}
		}
	}

	fn lookup( &self, name: &str, scope: Scope ) -> Result<Option<Arc<Artifact>>, ResolveError> {
		match scope {
			Scope::Full => {
				if let Some( artifact ) = self.resolved.get( name ) {
					return Ok( Some( Arc::clone( artifact.value() )));
				}
				Ok( self.search( name, scope )?.map(| artifact | self.pin( name, artifact )))
			}
			Scope::Dependency => self.search( name, scope ),
		}
	}

	fn search( &self, name: &str, scope: Scope ) -> Result<Option<Arc<Artifact>>, ResolveError> {

		if let Some( artifact ) = self.lookup_bound( name )? {
			trace!( unit = %self.name(), symbol = name, "resolved through symbol map" );
			return Ok( Some( artifact ));
		}

		if let Some( parent ) = self.parent() {
			if let Some( artifact ) = parent.lookup( name, Scope::Full )? {
				trace!( unit = %self.name(), symbol = name, parent = %parent.name(), "resolved through ancestor" );
				return Ok( Some( artifact ));
			}
		}

		let prefix_owner = self.prefix_owner( name );
		if let Some( owner ) = prefix_owner.as_ref().filter(| owner | !self.is( owner )) {
			if let Some( artifact ) = owner.lookup( name, Scope::Full )? {
				trace!( unit = %self.name(), symbol = name, owner = %owner.name(), "resolved through prefix" );
				return Ok( Some( artifact ));
			}
		}

		if scope == Scope::Full {
			for dependency in self.dependencies() {
				if prefix_owner.as_ref().is_some_and(| owner | Arc::ptr_eq( owner, &dependency )) { continue }
				if let Some( artifact ) = dependency.lookup( name, Scope::Dependency )? {
					trace!( unit = %self.name(), symbol = name, dependency = %dependency.name(), "resolved through dependency" );
					return Ok( Some( artifact ));
				}
			}
		}

		self.find_own( name )

	}

	/// Step 2: an exact binding in the symbol map.
	fn lookup_bound( &self, name: &str ) -> Result<Option<Arc<Artifact>>, ResolveError> {
		let Some( owner ) = self.symbols.get( name ).and_then(| owner | owner.upgrade()) else {
			return Ok( None );
		};
		match self.is( &owner ) {
			true => self.find_own( name ),
			false => owner.lookup( name, Scope::Full ),
		}
	}

	/// The unit bound to the longest proper prefix of `name`, if any.
	fn prefix_owner( &self, name: &str ) -> Option<Arc<Unit>> {
		std::iter::successors( Some( name ), | current | current.rsplit_once( '.' ).map(|( prefix, _ )| prefix ))
			.skip( 1 )
			.find_map(| prefix | self.symbols.get( prefix ).and_then(| owner | owner.upgrade()))
	}

}
