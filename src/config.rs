//! Externally configurable surface of the loader.
//!
//! Everything here has a default, so an empty TOML document is a valid
//! configuration. The naming section is consumed by the
//! [`Synthesizer`]( crate::Synthesizer ) and is the only place where accessor
//! conventions can be changed.
//!
//! ```toml
//! artifact_extension = ".wasm"
//! entry_point_export = "smartactors:plugin/entry"
//!
//! [naming]
//! getter = "^(get|is)[A-Z0-9_]\\w*$"
//! type_name = "{package}.{name}Impl"
//! ```

use std::path::Path ;
use regex::Regex ;
use serde::Deserialize ;
use thiserror::Error ;



/// Errors raised while reading or compiling configuration.
#[derive( Debug, Error )]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error( "Io Error: {0}" )] Io( #[from] std::io::Error ),
	/// The configuration document is not valid TOML or has the wrong shape.
	#[error( "Toml Error: {0}" )] Toml( #[from] toml::de::Error ),
	/// One of the naming patterns is not a valid regular expression.
	#[error( "Invalid Pattern: {0}" )] Pattern( #[from] regex::Error ),
}

/// Settings shared by the [`UnitRegistry`]( crate::UnitRegistry ) and the bundle loaders it creates.
#[derive( Debug, Clone, Deserialize )]
#[serde( default )]
pub struct LoaderConfig {
	/// Suffix identifying compiled artifacts inside a bundle. Other entries are ignored.
	pub artifact_extension: String,
	/// Name of the component export that marks an artifact as an entry point.
	pub entry_point_export: String,
	/// Accessor naming conventions for proxy synthesis.
	pub naming: NamingConfig,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			artifact_extension: ".wasm".to_string(),
			entry_point_export: "smartactors:plugin/entry".to_string(),
			naming: NamingConfig::default(),
		}
	}
}

impl LoaderConfig {

	/// Parses a configuration from TOML text. Missing keys take their defaults.
	///
	/// # Errors
	/// Returns [`ConfigError::Toml`] if the text is not a valid configuration.
	pub fn from_toml_str( text: &str ) -> Result<Self, ConfigError> {
		Ok( toml::from_str( text )? )
	}

	/// Reads and parses a TOML configuration file.
	///
	/// # Errors
	/// Returns [`ConfigError::Io`] if the file can't be read and
	/// [`ConfigError::Toml`] if its contents are invalid.
	pub fn from_path( path: impl AsRef<Path> ) -> Result<Self, ConfigError> {
		Self::from_toml_str( &std::fs::read_to_string( path )? )
	}

}

/// Regular expressions and templates describing descriptor accessor names.
#[derive( Debug, Clone, Deserialize )]
#[serde( default )]
pub struct NamingConfig {
	/// Matches getter method names.
	pub getter: String,
	/// Matches setter method names.
	pub setter: String,
	/// Matches counter (list size) method names.
	pub counter: String,
	/// Matches the accessor prefix stripped when deriving a field name.
	pub method_to_field: String,
	/// Replacement for [`Self::method_to_field`] matches.
	pub method_to_field_replacement: String,
	/// Template for synthesized type names. `{package}` and `{name}` are substituted
	/// with the descriptor's package and simple name.
	pub type_name: String,
}

impl Default for NamingConfig {
	fn default() -> Self {
		Self {
			getter: r"^(get|is)[A-Z0-9_]\w*$".to_string(),
			setter: r"^set[A-Z0-9_]\w*$".to_string(),
			counter: r"^count[A-Z0-9_]\w*$".to_string(),
			method_to_field: r"^(get|is|set|count)".to_string(),
			method_to_field_replacement: String::new(),
			type_name: "{package}.{name}Impl".to_string(),
		}
	}
}

/// Accessor category recognised from a method name.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum MethodKind {
	/// Reads a field.
	Getter,
	/// Writes a field.
	Setter,
	/// Reports the size of a list field.
	Counter,
}

impl std::fmt::Display for MethodKind {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match self {
			Self::Getter => write!( f, "getter" ),
			Self::Setter => write!( f, "setter" ),
			Self::Counter => write!( f, "counter" ),
		}
	}
}

/// [`NamingConfig`] with its patterns compiled.
#[derive( Debug, Clone )]
pub(crate) struct NamingConventions {
	getter: Regex,
	setter: Regex,
	counter: Regex,
	method_to_field: Regex,
	replacement: String,
	type_name: String,
}

impl NamingConventions {

	pub(crate) fn compile( config: &NamingConfig ) -> Result<Self, ConfigError> {
		Ok( Self {
			getter: Regex::new( &config.getter )?,
			setter: Regex::new( &config.setter )?,
			counter: Regex::new( &config.counter )?,
			method_to_field: Regex::new( &config.method_to_field )?,
			replacement: config.method_to_field_replacement.clone(),
			type_name: config.type_name.clone(),
		})
	}

	/// Setters are checked first, then getters, then counters.
	pub(crate) fn classify( &self, method: &str ) -> Option<MethodKind> {
		if self.setter.is_match( method ) { Some( MethodKind::Setter ) }
		else if self.getter.is_match( method ) { Some( MethodKind::Getter ) }
		else if self.counter.is_match( method ) { Some( MethodKind::Counter ) }
		else { None }
	}

	/// `getFirstName` -> `firstName`
	pub(crate) fn field_name( &self, method: &str ) -> String {
		let stripped = self.method_to_field.replace( method, self.replacement.as_str() );
		let mut chars = stripped.chars();
		match chars.next() {
			Some( first ) => first.to_lowercase().chain( chars ).collect(),
			None => String::new(),
		}
	}

	pub(crate) fn type_name( &self, descriptor: &str ) -> String {
		let ( package, name ) = match descriptor.rsplit_once( '.' ) {
			Some(( package, name )) => ( package, name ),
			None => ( "", descriptor ),
		};
		let type_name = self.type_name
			.replace( "{package}", package )
			.replace( "{name}", name );
		type_name.trim_start_matches( '.' ).to_string()
	}

}
