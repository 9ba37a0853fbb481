use thiserror::Error ;
use wasmtime::Engine ;
use wasmtime::component::Component ;



/// Errors that occur while turning artifact bytes into a compiled component.
#[derive( Debug, Error )]
pub enum MaterializeError {
	/// The artifact is not a valid component (binary or text format).
	#[error( "Failed to compile artifact {name}: {error}" )]
	Compilation { name: String, error: wasmtime::Error },
}

/// Compiles artifact bytes and checks them for the entry-point capability.
///
/// Shared by every [`Unit`]( crate::Unit ) created through the same
/// [`UnitRegistry`]( crate::UnitRegistry ), so all artifacts are compiled
/// against one [`Engine`].
pub struct Materializer {
	engine: Engine,
	entry_point_export: String,
}

impl Materializer {

	pub fn new( engine: Engine, entry_point_export: impl Into<String> ) -> Self {
		Self { engine, entry_point_export: entry_point_export.into() }
	}

	#[inline] pub fn engine( &self ) -> &Engine { &self.engine }

	/// The export name that marks a component as an entry point.
	#[inline] pub fn entry_point_export( &self ) -> &str { &self.entry_point_export }

	/// Compiles `bytes` and reports whether the component exports the entry-point interface.
	///
	/// # Errors
	/// Returns [`MaterializeError::Compilation`] if `bytes` is not a valid component.
	pub(crate) fn materialize( &self, name: &str, bytes: &[u8] ) -> Result<( Component, bool ), MaterializeError> {
		let component = Component::new( &self.engine, bytes )
			.map_err(| error | MaterializeError::Compilation { name: name.to_string(), error })?;
		let entry_point = component.component_type()
			.exports( &self.engine )
			.any(|( export, _ )| export == self.entry_point_export );
		Ok(( component, entry_point ))
	}

}

impl std::fmt::Debug for Materializer {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Materializer" )
			.field( "engine", &"<Engine>" )
			.field( "entry_point_export", &self.entry_point_export )
			.finish()
	}
}
