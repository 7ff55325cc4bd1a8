//! YAML catalog of documented entities and section registrations.
//!
//! A catalog bundles everything an [`Annotator`] needs: extra sections to
//! register by shortcut, default sections to drop, and the entities with
//! their docstrings and schemas.
//!
//! # Example YAML
//!
//! ```yaml
//! sections:
//!   Options: items
//!   Caveats: text
//! unregister:
//!   - Todo
//! entities:
//!   - name: Process
//!     doc: |
//!       Base process
//!
//!       Envs:
//!           ncores (type=int): Number of cores
//!   - name: Sort
//!     base: Process
//!     doc: |
//!       Sort a file
//!
//!       Input:
//!           infile: The file to sort
//!     schema:
//!       input: infile:file
//!       output: outfile:file:{{in.infile | stem}}.sorted
//!       envs:
//!         ncores: 1
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use doc_annotate_core::OrderedMap;

use crate::entity::{Annotator, Entity};
use crate::error::Result;
use crate::registry::SectionRegistry;

/// Entities and section registrations loaded from YAML.
///
/// # Examples
///
/// ```
/// use doc_annotate::Catalog;
///
/// let catalog = Catalog::from_yaml_str(
///     "sections:\n  Options: items\nentities:\n  - name: A\n    doc: \"A summary\"\n",
/// )
/// .unwrap();
/// let mut annotator = catalog.into_annotator().unwrap();
/// assert!(annotator.registry().contains("Options"));
/// assert_eq!(annotator.annotate("A").unwrap().annotation.summary().unwrap().short, "A summary");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Extra sections: name to shortcut keyword.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub sections: OrderedMap<String>,
    /// Default sections to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unregister: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Catalog {
    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::AnnotateError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::AnnotateError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let catalog = serde_yaml::from_reader(reader)?;
        Ok(catalog)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the catalog as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::AnnotateError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::AnnotateError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Builds the section registry: the defaults, minus `unregister`, plus
    /// `sections`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidShortcut`](crate::AnnotateError::InvalidShortcut) for
    /// an unknown shortcut keyword.
    pub fn registry(&self) -> Result<SectionRegistry> {
        let mut registry = SectionRegistry::default();
        for name in &self.unregister {
            registry.unregister(name);
        }
        for (name, shortcut) in self.sections.iter() {
            registry.register_shortcut(name, shortcut)?;
        }
        Ok(registry)
    }

    /// Builds an annotator holding every entity of the catalog.
    pub fn into_annotator(self) -> Result<Annotator> {
        let mut annotator = Annotator::with_registry(self.registry()?);
        debug!(entities = self.entities.len(), "loading catalog entities");
        for entity in self.entities {
            annotator.add_entity(entity);
        }
        Ok(annotator)
    }
}
