//! Units and the artifacts they own.
//!
//! A [`Unit`] is an isolated namespace for one loadable bundle. It owns a symbol
//! map (its own name plus the names of the units it depends on), an ordered list of
//! dependencies, the staged contents of its bundles and a resolution cache.
//! Units are created through a [`UnitRegistry`]( crate::UnitRegistry ) and live for
//! as long as the registry does; links between units are weak back-references.

use std::path::PathBuf ;
use std::sync::{ Arc, Weak };
use dashmap::DashMap ;
use itertools::Itertools ;
use once_cell::sync::OnceCell ;
use parking_lot::{ Mutex, RwLock };
use tracing::trace ;
use wasmtime::component::Component ;

use crate::materialize::Materializer ;
use crate::resolve::ResolveError ;



/// A materialized symbol: a compiled component bound to the unit that defined it.
///
/// Resolving the same name from the same unit always yields the same `Arc<Artifact>`.
pub struct Artifact {
	name: String,
	owner_name: String,
	owner: Weak<Unit>,
	component: Component,
	entry_point: bool,
}

impl Artifact {

	/// Fully qualified symbolic name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Name of the unit whose bundle defined this artifact.
	#[inline] pub fn owner_name( &self ) -> &str { &self.owner_name }

	/// The unit whose bundle defined this artifact.
	#[inline] pub fn owner( &self ) -> Option<Arc<Unit>> { self.owner.upgrade() }

	#[inline] pub fn component( &self ) -> &Component { &self.component }

	/// Whether the component exports the configured entry-point interface.
	#[inline] pub fn is_entry_point( &self ) -> bool { self.entry_point }

}

impl std::fmt::Debug for Artifact {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Artifact" )
			.field( "name", &self.name )
			.field( "owner", &self.owner_name )
			.field( "component", &"<Component>" )
			.field( "entry_point", &self.entry_point )
			.finish()
	}
}

/// Artifact bytes waiting to be compiled. The bytes are dropped once compilation succeeds.
struct StagedArtifact {
	bytes: Mutex<Option<Vec<u8>>>,
	artifact: OnceCell<Arc<Artifact>>,
}

/// An isolated namespace holding the symbol bindings of one loadable bundle.
pub struct Unit {
	name: String,
	parent: Option<Arc<Unit>>,
	this: Weak<Unit>,
	materializer: Arc<Materializer>,
	pub(crate) symbols: DashMap<String, Weak<Unit>>,
	pub(crate) dependencies: RwLock<Vec<Weak<Unit>>>,
	pub(crate) resolved: DashMap<String, Arc<Artifact>>,
	staged: DashMap<String, Arc<StagedArtifact>>,
	locations: RwLock<Vec<PathBuf>>,
}

/// Turns a packaging coordinate such as `com.acme/core-utils:1.0` into a unit name
/// (`com.acme.core_utils.1.0`).
pub fn normalize_unit_name( coordinate: &str ) -> String {
	coordinate
		.replace( ['/', ':'], "." )
		.replace( '-', "_" )
}

impl Unit {

	pub(crate) fn new(
		coordinate: &str,
		parent: Option<Arc<Unit>>,
		materializer: Arc<Materializer>,
	) -> Arc<Self> {
		let name = normalize_unit_name( coordinate );
		Arc::new_cyclic(| this | {
			let symbols = DashMap::new();
			symbols.insert( name.clone(), this.clone() );
			Self {
				name,
				parent,
				this: this.clone(),
				materializer,
				symbols,
				dependencies: RwLock::new( Vec::new() ),
				resolved: DashMap::new(),
				staged: DashMap::new(),
				locations: RwLock::new( Vec::new() ),
			}
		})
	}

	/// Normalized unit name. Also acts as the namespace prefix other units use to
	/// delegate resolution to this one.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// The enclosing unit, if this unit was created within another.
	#[inline] pub fn parent( &self ) -> Option<&Arc<Unit>> { self.parent.as_ref() }

	/// Direct and inherited dependencies in the order they were recorded.
	pub fn dependencies( &self ) -> Vec<Arc<Unit>> {
		self.dependencies.read().iter().filter_map( Weak::upgrade ).collect()
	}

	/// Whether `name` has already been resolved from this unit.
	pub fn is_resolved( &self, name: &str ) -> bool { self.resolved.contains_key( name ) }

	/// Locations of the bundles loaded into this unit.
	pub fn search_path( &self ) -> Vec<PathBuf> { self.locations.read().clone() }

	/// Bundle locations of this unit, its dependencies and every ancestor of those
	/// dependencies, without duplicates.
	pub fn search_path_with_dependencies( &self ) -> Vec<PathBuf> {
		let dependencies = self.dependencies();
		let ancestors = dependencies.iter()
			.flat_map(| dependency | std::iter::successors( dependency.parent().cloned(), | unit | unit.parent().cloned() ))
			.collect_vec();
		std::iter::once( self.search_path() )
			.chain( dependencies.iter().map(| unit | unit.search_path() ))
			.chain( ancestors.iter().map(| unit | unit.search_path() ))
			.flatten()
			.unique()
			.collect()
	}

	/// Compiles `bytes` and binds the result to `name` in this unit.
	///
	/// # Errors
	/// Returns [`ResolveError::AlreadyDefined`] if `name` is already staged or resolved
	/// here, or [`ResolveError::Materialize`] if the bytes don't compile.
	pub fn define( &self, name: &str, bytes: impl Into<Vec<u8>> ) -> Result<Arc<Artifact>, ResolveError> {
		if self.resolved.contains_key( name ) || !self.stage( name, bytes.into() ) {
			return Err( ResolveError::AlreadyDefined { name: name.to_string(), unit: self.name.clone() });
		}
		let artifact = self.find_own( name )?
			.ok_or_else(|| ResolveError::NotFound { name: name.to_string() })?;
		Ok( self.pin( name, artifact ))
	}

	/// Records the location of a bundle whose contents were staged into this unit.
	pub(crate) fn add_bundle_location( &self, location: PathBuf ) {
		let mut locations = self.locations.write();
		if !locations.contains( &location ) { locations.push( location ) }
	}

	/// Stages artifact bytes under `name`. Returns `false` if the name was already staged,
	/// in which case the earlier bytes are kept.
	pub(crate) fn stage( &self, name: &str, bytes: Vec<u8> ) -> bool {
		match self.staged.entry( name.to_string() ) {
			dashmap::mapref::entry::Entry::Occupied( _ ) => false,
			dashmap::mapref::entry::Entry::Vacant( entry ) => {
				entry.insert( Arc::new( StagedArtifact {
					bytes: Mutex::new( Some( bytes )),
					artifact: OnceCell::new(),
				}));
				true
			}
		}
	}

	/// Records `base` and everything `base` depends on as dependencies of this unit and
	/// binds their names in the symbol map. Depending on oneself is a no-op.
	pub(crate) fn add_dependency( &self, base: &Arc<Unit> ) {
		if self.is( base ) { return }
		let closure = std::iter::once( Arc::clone( base ))
			.chain( base.dependencies() )
			.filter(| unit | !self.is( unit ))
			.collect_vec();
		closure.iter().for_each(| unit | { self.symbols.insert( unit.name.clone(), Arc::downgrade( unit )); });
		let mut dependencies = self.dependencies.write();
		closure.iter().for_each(| unit | {
			if !dependencies.iter().any(| known | std::ptr::eq( known.as_ptr(), Arc::as_ptr( unit ))) {
				dependencies.push( Arc::downgrade( unit ));
			}
		});
	}

	/// Materializes `name` from this unit's own staged contents, compiling it at most once.
	pub(crate) fn find_own( &self, name: &str ) -> Result<Option<Arc<Artifact>>, ResolveError> {
		let Some( staged ) = self.staged.get( name ).map(| entry | Arc::clone( entry.value() )) else {
			return Ok( None );
		};
		staged.artifact
			.get_or_try_init(|| {
				let mut bytes = staged.bytes.lock();
				let data = bytes.as_deref().ok_or_else(|| ResolveError::NotFound { name: name.to_string() })?;
				let ( component, entry_point ) = self.materializer.materialize( name, data )?;
				*bytes = None ;
				trace!( unit = %self.name, artifact = name, entry_point, "materialized artifact" );
				Ok( Arc::new( Artifact {
					name: name.to_string(),
					owner_name: self.name.clone(),
					owner: self.this.clone(),
					component,
					entry_point,
				}))
			})
			.map(| artifact | Some( Arc::clone( artifact )))
	}

	/// Caches a resolution. The first artifact cached for a name wins.
	pub(crate) fn pin( &self, name: &str, artifact: Arc<Artifact> ) -> Arc<Artifact> {
		Arc::clone( &self.resolved.entry( name.to_string() ).or_insert( artifact ))
	}

	#[inline] pub(crate) fn is( &self, other: &Arc<Unit> ) -> bool { std::ptr::eq( self, Arc::as_ptr( other )) }

}

impl std::fmt::Debug for Unit {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Unit" )
			.field( "name", &self.name )
			.field( "parent", &self.parent.as_ref().map(| parent | parent.name.as_str() ))
			.field( "dependencies", &self.dependencies().iter().map(| unit | unit.name.clone() ).collect_vec() )
			.field( "resolved", &self.resolved.len() )
			.field( "staged", &self.staged.len() )
			.finish_non_exhaustive()
	}
}
