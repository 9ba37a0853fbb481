//! Isolated namespaces, dependency-aware symbol resolution and bundle loading for
//! WebAssembly component plugins, plus runtime proxies over generic documents.
//!
//! # Core Concepts
//!
//! - [`Unit`]: An isolated namespace for one loadable bundle. A unit binds symbolic
//! 	names (fully qualified, dot-delimited) to compiled [`Artifact`]s and delegates
//! 	names it doesn't own to its ancestors and dependencies.
//!
//! - [`UnitRegistry`]: The process-wide registry of units keyed by an application
//! 	supplied id. It records dependencies between units and falls back to a default
//! 	unit for units that declare none.
//!
//! - [`BundleLoader`]: Reads a zip bundle of artifacts into a unit and hands every
//! 	**entry point** (an artifact exporting the configured interface) to a callback.
//!
//! - [`Synthesizer`]: Turns a [`Descriptor`] (a set of getter, setter and counter
//! 	signatures) into a cached [`ProxyType`] whose instances read and write the
//! 	fields of a shared [`Document`].
//!
//! # Resolution
//!
//! A name is looked up in the unit's cache, its symbol map, its ancestor chain, the
//! unit bound to the longest prefix of the name, each dependency and finally the
//! unit's own bundle contents. See [`Unit::resolve`] for the details. The first
//! successful resolution of a name from a unit is kept for the registry's lifetime.
//!
//! ```
//! use unit_link::{ Engine, LoaderConfig, UnitRegistry };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = UnitRegistry::new( Engine::default(), LoaderConfig::default() );
//!
//! // The default unit is what every unit without dependencies falls back to.
//! let core = registry.add_unit( "core", "smartactors/core" );
//! core.define( "smartactors.core.Logger", "(component)" )?;
//! registry.set_default_unit( "core" );
//!
//! let feature = registry.add_unit( "feature", "acme:greeter-feature" );
//! assert_eq!( feature.name(), "acme.greeter_feature" );
//! registry.finalize( &"feature" )?;
//!
//! let logger = registry.resolve( &"feature", "smartactors.core.Logger" )?;
//! assert_eq!( logger.owner_name(), "smartactors.core" );
//! # Ok(())
//! # }
//! ```
//!
//! # Proxies
//!
//! ```
//! use std::sync::Arc ;
//! use unit_link::{ Descriptor, MethodSignature, NamingConfig, ObjectDocument, Synthesizer, ValueType };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let synthesizer = Synthesizer::new( &NamingConfig::default() )?;
//! let proxy_type = synthesizer.synthesize( &Descriptor::new( "acme.IUser", [
//! 	MethodSignature::getter( "getAge", ValueType::Int ),
//! 	MethodSignature::setter( "setAge", ValueType::Int ),
//! ]))?;
//! assert_eq!( proxy_type.name(), "acme.IUserImpl" );
//!
//! let user = proxy_type.instantiate();
//! user.init( Arc::new( ObjectDocument::new() ))?;
//! user.set( "setAge", 42 )?;
//! assert_eq!( user.get::<i64>( "getAge" )?, 42 );
//! # Ok(())
//! # }
//! ```

mod config ;
mod descriptor ;
mod document ;
mod loader ;
mod materialize ;
mod proxy ;
mod registry ;
mod resolve ;
mod synthesizer ;
mod unit ;

#[doc( no_inline )]
pub use wasmtime::Engine ;
#[doc( no_inline )]
pub use wasmtime::component::Component ;
#[doc( no_inline )]
pub use serde_json::Value ;

pub use config::{ ConfigError, LoaderConfig, MethodKind, NamingConfig };
pub use descriptor::{ Descriptor, MethodSignature, ValueType };
pub use document::{ Document, FieldName, InvalidFieldName, ObjectDocument };
pub use loader::{ BundleLoader, CreationError, LoadError, LoadFailure, LoadVisitor, NoopVisitor };
pub use materialize::{ MaterializeError, Materializer };
pub use proxy::{ Accessor, Field, Proxy, ProxyError, ProxyType };
pub use registry::{ RegistryError, UnitRegistry };
pub use resolve::ResolveError ;
pub use synthesizer::{ Synthesizer, SynthesisError };
pub use unit::{ Artifact, Unit, normalize_unit_name };
