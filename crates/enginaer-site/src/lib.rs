//! Site generation for enginaer.
//!
//! Loads templates, helpers, visitors and pages, runs the enricher pipeline,
//! and renders every page through its layout into in-memory artifacts.

pub mod config;
pub mod context;
pub mod enricher;
pub mod error;
pub mod fixer;
pub mod generator;
pub mod helpers;
pub mod menu;
pub mod registry;
pub mod template;

pub use config::{SiteConfig, BASE_URL_KEY};
pub use context::{TemplateData, CONTENT_KEY};
pub use enricher::{Enricher, EnricherDecl, EnricherPipeline};
pub use error::{Result, SiteError};
pub use fixer::{Fixer, FixerDecl, FixerRegistry};
pub use generator::{
    normalize_permalink, Artifact, GeneratorOptions, GeneratorState, SiteGenerator, SiteSources,
};
pub use helpers::{HelperSet, HelperTable};
pub use menu::{Menu, MenuBuilder, MenuChild, MenuEntry};
pub use registry::{NamedRegistry, PageRegistry, TemplateRegistry, VisitorRegistry};
pub use template::{Template, TemplateError, TemplateState, TEMPLATE_EXTENSION};
