//! Core types and configuration for cnab-arm.
//!
//! This crate defines the `bundle.json` model ([`Bundle`]), the
//! `cnab-arm.toml` schema ([`ConverterConfig`]), the environment-variable
//! name table shared with the worker container
//! ([`EnvironmentVariableNames`]), and shared error types.

pub mod bundle;
pub mod config;
pub mod env;
pub mod error;

pub use bundle::{
    Action, BUILTIN_ACTIONS, Bundle, CredentialSpec, Definition, InvocationImage, ParameterSpec,
    SchemaType,
};
pub use config::{CONFIG_FILE_NAME, ConverterConfig, DriverConfig, ExposureMode, GenerateConfig};
pub use env::{BindingKind, EnvironmentVariableNames};
pub use error::{Error, Result};
