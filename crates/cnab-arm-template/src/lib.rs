//! CNAB bundle to ARM deployment template compiler.
//!
//! # Pipeline
//!
//! ```text
//! bundle.json
//!   1. Identity  ── BundleIdentity::resolve()     first docker invocation image
//!   2. Scaffold  ── ScaffoldBuilder::build()      storage, container group, logs output
//!   3. Bind      ── Binder::bind()                parameters, then credentials
//!   4. Serialize ── serialize::to_bytes()         compact or tab-indented
//! ```
//!
//! # Exposure modes
//!
//! - **Advanced**: every infrastructure setting is a template parameter.
//! - **Simplified**: settings with a computable value live in `variables`;
//!   only the service principal id and secret stay parameters. Bundle keys
//!   named after a variable (`cnab_<key>`) bind to it instead of declaring
//!   their own parameter.

pub mod binder;
pub mod error;
pub mod generator;
pub mod identity;
pub mod output;
pub mod scaffold;
pub mod serialize;
pub mod template;
pub mod types;

pub use binder::Binder;
pub use error::{CompileError, SettingKind};
pub use generator::TemplateGenerator;
pub use identity::{BundleIdentity, ImageReference};
pub use output::{OutputError, check_destination, write_template};
pub use scaffold::{AdvancedLayer, ExposureLayer, ScaffoldBuilder, SimplifiedLayer, layer_for};
pub use template::Template;
