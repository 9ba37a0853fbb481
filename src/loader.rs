//! Bundle loading.
//!
//! A bundle is a zip archive of compiled artifacts. Entries are named by their
//! path-separated symbolic name plus the artifact extension, so
//! `com/acme/core/Greeter.wasm` provides `com.acme.core.Greeter`. Directory entries
//! and entries with any other suffix are ignored.
//!
//! Loading is best effort: when an entry fails, artifacts staged or resolved before
//! the failure stay bound to the unit.

use std::fs::File ;
use std::io::Read ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use pipe_trait::Pipe ;
use thiserror::Error ;
use tracing::{ debug, warn };
use zip::ZipArchive ;

use crate::resolve::ResolveError ;
use crate::unit::{ Artifact, Unit };



/// Error returned by an entry-point creation callback.
pub type CreationError = Box<dyn std::error::Error + Send + Sync>;

/// The underlying cause of a failed bundle load.
#[derive( Debug, Error )]
pub enum LoadFailure {
	/// The bundle file could not be opened or read.
	#[error( "Io Error: {0}" )] Io( #[from] std::io::Error ),
	/// The bundle is not a readable zip archive.
	#[error( "Archive Error: {0}" )] Archive( #[from] zip::result::ZipError ),
	/// An artifact entry's path does not form a valid symbolic name.
	#[error( "Invalid Entry Name: {0}" )] InvalidEntryName( String ),
	/// An artifact could not be resolved or compiled.
	#[error( "Resolve Error: {0}" )] Resolve( #[from] ResolveError ),
	/// The creation callback rejected an entry point.
	#[error( "Creation Error: {0}" )] Creation( CreationError ),
}

/// A bundle failed to load. The cause has already been reported to the [`LoadVisitor`].
#[derive( Debug, Error )]
#[error( "Failed to load bundle {}: {cause}", .bundle.display() )]
pub struct LoadError {
	pub bundle: PathBuf,
	#[source] pub cause: LoadFailure,
}

/// Receives the outcome of every [`BundleLoader::load`] call.
pub trait LoadVisitor {
	/// Called after every entry of `bundle` was loaded.
	fn loading_succeeded( &mut self, _bundle: &Path, _entry_points: usize ) {}
	/// Called once with the cause of a failure, before the failure is returned.
	fn loading_failed( &mut self, bundle: &Path, cause: &LoadFailure );
}

/// A [`LoadVisitor`] that ignores every outcome.
#[derive( Debug, Default, Clone, Copy )]
pub struct NoopVisitor ;

impl LoadVisitor for NoopVisitor {
	fn loading_failed( &mut self, _bundle: &Path, _cause: &LoadFailure ) {}
}

/// Loads bundles into a single [`Unit`] and hands every entry point found to a callback.
///
/// # Type Parameters
/// - `C`: creation callback invoked with each entry-point artifact
/// - `V`: [`LoadVisitor`] notified of each load's outcome
pub struct BundleLoader<C, V> {
	unit: Arc<Unit>,
	extension: String,
	creator: C,
	visitor: V,
}

impl<C, V> BundleLoader<C, V>
where
	C: FnMut( &Arc<Artifact> ) -> Result<(), CreationError>,
	V: LoadVisitor,
{

	pub fn new( unit: Arc<Unit>, extension: impl Into<String>, creator: C, visitor: V ) -> Self {
		Self { unit, extension: extension.into(), creator, visitor }
	}

	#[inline] pub fn unit( &self ) -> &Arc<Unit> { &self.unit }

	#[inline] pub fn visitor( &self ) -> &V { &self.visitor }

	#[inline] pub fn into_visitor( self ) -> V { self.visitor }

	/// Loads every artifact of `bundle` into the unit and calls the creation callback
	/// for each entry point, in archive order. Returns the number of entry points found.
	///
	/// Every artifact is staged before any is resolved, so artifacts may refer to
	/// each other regardless of their order in the archive.
	///
	/// # Errors
	/// Any failure is first passed to [`LoadVisitor::loading_failed`] and then returned
	/// as a [`LoadError`] wrapping the cause. Nothing is retried or rolled back.
	pub fn load( &mut self, bundle: impl AsRef<Path> ) -> Result<usize, LoadError> {
		let bundle = bundle.as_ref();
		match self.try_load( bundle ) {
			Ok( entry_points ) => {
				debug!( unit = %self.unit.name(), bundle = %bundle.display(), entry_points, "loaded bundle" );
				self.visitor.loading_succeeded( bundle, entry_points );
				Ok( entry_points )
			}
			Err( cause ) => {
				warn!( unit = %self.unit.name(), bundle = %bundle.display(), %cause, "bundle loading failed" );
				self.visitor.loading_failed( bundle, &cause );
				Err( LoadError { bundle: bundle.to_path_buf(), cause })
			}
		}
	}

	fn try_load( &mut self, bundle: &Path ) -> Result<usize, LoadFailure> {

		let mut archive = File::open( bundle )?.pipe( ZipArchive::new )?;
		bundle.canonicalize()?.pipe(| location | self.unit.add_bundle_location( location ));

		let names = ( 0..archive.len() )
			.map(| index | stage_entry( &self.unit, &self.extension, &mut archive, index ))
			.filter_map( Result::transpose )
			.collect::<Result<Vec<_>, _>>()?;

		let mut entry_points = 0 ;
		for name in names {
			let artifact = self.unit.resolve( &name )?;
			if artifact.is_entry_point() {
				( self.creator )( &artifact ).map_err( LoadFailure::Creation )?;
				entry_points += 1 ;
			}
		}
		Ok( entry_points )

	}

}

/// Stages one archive entry into `unit`, returning its symbolic name if it is an artifact.
fn stage_entry(
	unit: &Unit,
	extension: &str,
	archive: &mut ZipArchive<File>,
	index: usize,
) -> Result<Option<String>, LoadFailure> {
	let mut entry = archive.by_index( index )?;
	if entry.is_dir() { return Ok( None ) }
	let Some( stem ) = entry.name().strip_suffix( extension ) else { return Ok( None ) };
	let name = symbolic_name( stem ).ok_or_else(|| LoadFailure::InvalidEntryName( entry.name().to_string() ))?;
	// The declared size is untrusted; the buffer grows with what is actually read.
	let mut bytes = Vec::new();
	entry.read_to_end( &mut bytes )?;
	if !unit.stage( &name, bytes ) {
		debug!( unit = %unit.name(), artifact = %name, "artifact already staged, keeping earlier contents" );
	}
	Ok( Some( name ))
}

/// `com/acme/Greeter` -> `com.acme.Greeter`. Names with empty segments are rejected.
pub(crate) fn symbolic_name( entry_stem: &str ) -> Option<String> {
	let name = entry_stem.replace( ['/', '\\'], "." );
	match name.split( '.' ).any( str::is_empty ) {
		true => None,
		false => Some( name ),
	}
}
