//! The process-wide unit registry.
//!
//! A [`UnitRegistry`] is created once at startup and handed by reference to every
//! collaborator that registers units, declares dependencies or loads bundles. Units
//! are never removed; dropping the registry is the only teardown.

use std::fmt::Debug ;
use std::hash::Hash ;
use std::sync::Arc ;
use dashmap::DashMap ;
use parking_lot::RwLock ;
use pipe_trait::Pipe ;
use thiserror::Error ;
use tracing::debug ;
use wasmtime::Engine ;

use crate::config::LoaderConfig ;
use crate::loader::{ BundleLoader, CreationError, LoadVisitor };
use crate::materialize::Materializer ;
use crate::resolve::ResolveError ;
use crate::unit::{ Artifact, Unit };



/// Errors returned by [`UnitRegistry`] operations.
#[derive( Debug, Error )]
pub enum RegistryError<Id: Debug> {
	/// No unit is registered under this id.
	#[error( "Unknown unit: {0:?}" )] UnknownUnit( Id ),
	/// A unit had to fall back to the default unit but none was set.
	#[error( "No default unit has been set" )] NoDefaultUnit,
	/// Resolution through a registered unit failed.
	#[error( "Resolve Error: {0}" )] Resolve( #[from] ResolveError ),
}

/// Registry of every [`Unit`] in the process, keyed by an application-supplied id.
///
/// # Type Parameters
/// - `Id`: opaque unit identifier (e.g. `String`, `u64`, `Uuid`)
///
/// # Dependency order
/// [`add_dependency`]( Self::add_dependency ) copies the base unit's dependencies at
/// the time of the call, so a base should be finalized before it is depended upon.
/// Cyclic dependencies are not supported and are not detected.
pub struct UnitRegistry<Id> {
	units: DashMap<Id, Arc<Unit>>,
	default_unit: RwLock<Option<Id>>,
	materializer: Arc<Materializer>,
	config: LoaderConfig,
}

impl<Id> UnitRegistry<Id>
where
	Id: Eq + Hash + Clone + Debug,
{

	/// Creates an empty registry whose artifacts are compiled with `engine`.
	pub fn new( engine: Engine, config: LoaderConfig ) -> Self {
		let materializer = Materializer::new( engine, config.entry_point_export.clone() ).pipe( Arc::new );
		Self {
			units: DashMap::new(),
			default_unit: RwLock::new( None ),
			materializer,
			config,
		}
	}

	#[inline] pub fn config( &self ) -> &LoaderConfig { &self.config }

	#[inline] pub fn engine( &self ) -> &Engine { self.materializer.engine() }

	/// Registers a top-level unit named after `coordinate`.
	///
	/// If `id` is already registered the existing unit is returned unchanged.
	pub fn add_unit( &self, id: Id, coordinate: &str ) -> Arc<Unit> {
		self.insert_unit( id, coordinate, None )
	}

	/// Registers a unit whose ancestor chain starts at the unit registered as `parent`.
	///
	/// # Errors
	/// Returns [`RegistryError::UnknownUnit`] if `parent` is not registered.
	pub fn add_unit_within( &self, id: Id, coordinate: &str, parent: &Id ) -> Result<Arc<Unit>, RegistryError<Id>> {
		let parent = self.get( parent )?;
		Ok( self.insert_unit( id, coordinate, Some( parent )))
	}

	fn insert_unit( &self, id: Id, coordinate: &str, parent: Option<Arc<Unit>> ) -> Arc<Unit> {
		Arc::clone( &self.units
			.entry( id )
			.or_insert_with(|| {
				let unit = Unit::new( coordinate, parent, Arc::clone( &self.materializer ));
				debug!( unit = %unit.name(), "registered unit" );
				unit
			}))
	}

	/// The unit registered under `id`.
	pub fn unit( &self, id: &Id ) -> Option<Arc<Unit>> {
		self.units.get( id ).map(| unit | Arc::clone( unit.value() ))
	}

	fn get( &self, id: &Id ) -> Result<Arc<Unit>, RegistryError<Id>> {
		self.unit( id ).ok_or_else(|| RegistryError::UnknownUnit( id.clone() ))
	}

	/// Sets the unit that [`finalize`]( Self::finalize ) falls back to.
	pub fn set_default_unit( &self, id: Id ) {
		*self.default_unit.write() = Some( id );
	}

	/// The unit set through [`set_default_unit`]( Self::set_default_unit ), if registered.
	pub fn default_unit( &self ) -> Option<Arc<Unit>> {
		let id = self.default_unit.read().clone()?;
		self.unit( &id )
	}

	/// Makes `dependent` depend on `base` and on everything `base` currently depends on.
	/// The names of those units become bound in `dependent`'s symbol map.
	///
	/// Does nothing if `dependent` and `base` are the same id.
	///
	/// # Errors
	/// Returns [`RegistryError::UnknownUnit`] if either id is not registered.
	pub fn add_dependency( &self, dependent: &Id, base: &Id ) -> Result<(), RegistryError<Id>> {
		if dependent == base { return Ok(()) }
		let base = self.get( base )?;
		let dependent = self.get( dependent )?;
		debug!( dependent = %dependent.name(), base = %base.name(), "adding dependency" );
		dependent.add_dependency( &base );
		Ok(())
	}

	/// Gives a unit with no dependencies the default unit as its only dependency.
	/// Calling this more than once has no further effect.
	///
	/// # Errors
	/// Returns [`RegistryError::UnknownUnit`] if `id` is not registered and
	/// [`RegistryError::NoDefaultUnit`] if a fallback is needed but no default unit is set.
	pub fn finalize( &self, id: &Id ) -> Result<(), RegistryError<Id>> {
		let unit = self.get( id )?;
		if !unit.dependencies.read().is_empty() { return Ok(()) }
		let default = self.default_unit().ok_or( RegistryError::NoDefaultUnit )?;
		debug!( unit = %unit.name(), default = %default.name(), "finalizing with default unit" );
		unit.add_dependency( &default );
		Ok(())
	}

	/// Resolves `name` from the unit registered as `id`.
	///
	/// # Errors
	/// Returns [`RegistryError::UnknownUnit`] for an unregistered id and
	/// [`RegistryError::Resolve`] if resolution fails.
	pub fn resolve( &self, id: &Id, name: &str ) -> Result<Arc<Artifact>, RegistryError<Id>> {
		Ok( self.get( id )?.resolve( name )? )
	}

	/// Creates a [`BundleLoader`] that loads bundles into the unit registered as `id`,
	/// using the configured artifact extension.
	///
	/// # Errors
	/// Returns [`RegistryError::UnknownUnit`] if `id` is not registered.
	pub fn loader<C, V>( &self, id: &Id, creator: C, visitor: V ) -> Result<BundleLoader<C, V>, RegistryError<Id>>
	where
		C: FnMut( &Arc<Artifact> ) -> Result<(), CreationError>,
		V: LoadVisitor,
	{
		Ok( BundleLoader::new( self.get( id )?, self.config.artifact_extension.clone(), creator, visitor ))
	}

}

impl<Id: Debug> Debug for UnitRegistry<Id>
where
	Id: Eq + Hash,
{
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "UnitRegistry" )
			.field( "units", &self.units.len() )
			.field( "default_unit", &self.default_unit.read() )
			.field( "materializer", &self.materializer )
			.finish_non_exhaustive()
	}
}
