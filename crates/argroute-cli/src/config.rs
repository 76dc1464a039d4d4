// File: src/config.rs
// Purpose: Route manifest parsing from TOML

use anyhow::{bail, Context, Result};
use argroute::{ConverterRegistry, RouteKind, RouteMetadata, RouteTable, RouteTableBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Route manifest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// Custom type names mapped to the built-in converter they reuse
    #[serde(default)]
    pub types: BTreeMap<String, String>,

    #[serde(default, rename = "route")]
    pub routes: Vec<RouteEntry>,
}

/// One `[[route]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub pattern: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub kind: RouteKind,

    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RouteEntry {
    pub fn metadata(&self) -> RouteMetadata {
        RouteMetadata {
            description: self.description.clone(),
            kind: self.kind,
            aliases: self.aliases.clone(),
        }
    }
}

impl Manifest {
    /// Load a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Built-in converters plus the manifest's `[types]` aliases
    pub fn registry(&self) -> Result<ConverterRegistry> {
        let mut registry = ConverterRegistry::new();
        for (name, target) in &self.types {
            if !registry.register_alias(name.as_str(), target) {
                bail!("Type '{}' refers to unknown converter '{}'", name, target);
            }
        }
        Ok(registry)
    }

    /// Compiles every route; fails on the first invalid pattern
    pub fn builder(&self) -> Result<RouteTableBuilder> {
        let mut builder = RouteTableBuilder::with_registry(self.registry()?);
        for (i, entry) in self.routes.iter().enumerate() {
            builder
                .route_with(&entry.pattern, entry.metadata())
                .with_context(|| format!("Route #{} is invalid", i + 1))?;
        }
        Ok(builder)
    }

    pub fn build_table(&self) -> Result<RouteTable> {
        Ok(self.builder()?.build())
    }
}
