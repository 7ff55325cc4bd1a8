//! Annotated entities and the memoizing annotator that resolves them.
//!
//! An [`Entity`] is anything with a docstring: a class, a process, a
//! function. Entities form single-inheritance chains through their `base`
//! name. [`Annotator::annotate`] parses an entity's docstring, merges it
//! onto its base's resolved annotation when documentation inheritance is
//! on, and caches the result per entity.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use doc_annotate_core::{Annotation, EntitySchema};

use crate::error::{AnnotateError, Result};
use crate::merge::merge_annotations;
use crate::parser::{AnnotationWarning, DocstringParser};
use crate::registry::SectionRegistry;

fn default_inherit_doc() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A documented entity.
///
/// # Examples
///
/// ```
/// use doc_annotate::Entity;
///
/// let entity = Entity::new("Sort")
///     .with_doc("Sort a file")
///     .with_base("Process");
/// assert!(entity.inherit_doc);
/// assert_eq!(entity.base.as_deref(), Some("Process"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Immediate base entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Raw docstring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Declared inputs, outputs, and parameter defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<EntitySchema>,
    /// Whether the annotation is merged onto the base's annotation.
    #[serde(default = "default_inherit_doc", skip_serializing_if = "is_true")]
    pub inherit_doc: bool,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            doc: None,
            schema: None,
            inherit_doc: true,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_inherit_doc(mut self, inherit_doc: bool) -> Self {
        self.inherit_doc = inherit_doc;
        self
    }
}

/// A resolved annotation and the warnings raised while parsing the entity's
/// own docstring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotated {
    pub annotation: Annotation,
    pub warnings: Vec<AnnotationWarning>,
}

/// Resolves and caches entity annotations.
///
/// Cached results are never refreshed on their own: after changing a
/// docstring or the registry, call [`invalidate`](Self::invalidate) or
/// [`clear_cache`](Self::clear_cache).
///
/// # Examples
///
/// ```
/// use doc_annotate::{Annotator, Entity};
///
/// let mut annotator = Annotator::new();
/// annotator.add_entity(Entity::new("Base").with_doc("Base summary\n\nArgs:\n    a: help a\n"));
/// annotator.add_entity(
///     Entity::new("Derived")
///         .with_base("Base")
///         .with_doc("Derived summary\n\nArgs:\n    b: help b\n"),
/// );
///
/// let resolved = annotator.annotate("Derived").unwrap();
/// let args = resolved.annotation.items("Args").unwrap();
/// assert_eq!(args.keys().collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(resolved.annotation.summary().unwrap().short, "Derived summary");
/// ```
#[derive(Debug, Default)]
pub struct Annotator {
    registry: SectionRegistry,
    entities: HashMap<String, Entity>,
    order: Vec<String>,
    cache: HashMap<String, Arc<Annotated>>,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: SectionRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Mutable access to the section registry.
    ///
    /// Already cached annotations keep the sections they were parsed with.
    pub fn registry_mut(&mut self) -> &mut SectionRegistry {
        &mut self.registry
    }

    /// Adds or replaces an entity, dropping its cached annotation.
    pub fn add_entity(&mut self, entity: Entity) -> Option<Entity> {
        let name = entity.name.clone();
        self.cache.remove(&name);
        let previous = self.entities.insert(name.clone(), entity);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Entity names in the order they were first added.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Turns documentation inheritance on or off for one entity and drops
    /// its cached annotation.
    pub fn set_inherit_doc(&mut self, name: &str, inherit_doc: bool) -> Result<()> {
        let entity = self
            .entities
            .get_mut(name)
            .ok_or_else(|| AnnotateError::UnknownEntity(name.to_string()))?;
        entity.inherit_doc = inherit_doc;
        self.cache.remove(name);
        Ok(())
    }

    /// Drops the cached annotation of one entity. Entities derived from it
    /// keep theirs.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Returns the resolved annotation of an entity, computing and caching
    /// it (and its bases) on first use.
    ///
    /// # Errors
    ///
    /// - [`UnknownEntity`](AnnotateError::UnknownEntity) if the entity or a
    ///   base it inherits from is not known.
    /// - [`InheritanceCycle`](AnnotateError::InheritanceCycle) if the base
    ///   chain loops.
    /// - [`MalformedAnnotation`](AnnotateError::MalformedAnnotation) if a
    ///   docstring on the chain cannot be parsed.
    pub fn annotate(&mut self, name: &str) -> Result<Arc<Annotated>> {
        let mut resolving = HashSet::new();
        self.resolve(name, &mut resolving)
    }

    /// Parses an entity's own docstring without consulting its base.
    /// Nothing is cached.
    pub fn annotate_own(&self, name: &str) -> Result<Annotated> {
        let entity = self
            .entities
            .get(name)
            .ok_or_else(|| AnnotateError::UnknownEntity(name.to_string()))?;
        self.parse_entity(entity)
    }

    fn resolve(&mut self, name: &str, resolving: &mut HashSet<String>) -> Result<Arc<Annotated>> {
        if let Some(cached) = self.cache.get(name) {
            debug!(entity = name, "annotation cache hit");
            return Ok(Arc::clone(cached));
        }
        if !resolving.insert(name.to_string()) {
            return Err(AnnotateError::InheritanceCycle(name.to_string()));
        }

        let own = self.annotate_own(name)?;
        let base = self
            .entities
            .get(name)
            .filter(|entity| entity.inherit_doc)
            .and_then(|entity| entity.base.clone());

        let resolved = match base {
            Some(base) => {
                debug!(entity = name, base = %base, "merging onto base annotation");
                let base = self.resolve(&base, resolving)?;
                Annotated {
                    annotation: merge_annotations(&base.annotation, &own.annotation, &self.registry),
                    warnings: own.warnings,
                }
            }
            None => own,
        };

        resolving.remove(name);
        let resolved = Arc::new(resolved);
        self.cache.insert(name.to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }

    fn parse_entity(&self, entity: &Entity) -> Result<Annotated> {
        let mut parser = DocstringParser::new(&self.registry, &entity.name)
            .with_schema(entity.schema.as_ref());
        let annotation = parser.parse(entity.doc.as_deref())?;
        Ok(Annotated {
            annotation,
            warnings: parser.into_warnings(),
        })
    }
}
