//! Reference resolution across one root document and the files it points to
//!
//! A `ReferenceResolver` is one resolution session: it owns the parsed roots
//! of every file it has read and a cache of resolved targets. Neither is
//! shared between sessions; create a new resolver per document.

mod dereference;
mod graph;
mod reference;


pub use dereference::{CircularPolicy, DereferenceOptions, dereference};
pub use graph::ReferenceGraph;
pub use reference::Reference;

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

use crate::document::{Document, Format, JsonPointer, PointerError, reference_of};
use crate::error::{ReferenceError, ReferenceErrorKind};

/// The document a node lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A root document that was never read from disk
    Inline,
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Inline => Ok(()),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A resolved location: document plus pointer into it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub source: Source,
    pub pointer: JsonPointer,
}

impl Target {
    pub fn root_of(source: Source) -> Self {
        Self {
            source,
            pointer: JsonPointer::root(),
        }
    }

    /// Normalized identifier, `<absolute file>#<pointer>`
    pub fn id(&self) -> String {
        format!("{}#{}", self.source, self.pointer)
    }
}

pub struct ReferenceResolver {
    root: Source,
    base_dir: PathBuf,
    documents: HashMap<Source, Value>,
    cache: HashMap<String, Target>,
}

impl ReferenceResolver {
    pub fn new(document: &Document) -> Self {
        let (root, base_dir) = match document.source() {
            Some(path) => {
                let path = normalize_path(path);
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (Source::File(path), dir)
            }
            None => (
                Source::Inline,
                std::env::current_dir()
                    .map(|dir| normalize_path(&dir))
                    .unwrap_or_default(),
            ),
        };

        let mut documents = HashMap::new();
        documents.insert(root.clone(), document.root().clone());

        Self {
            root,
            base_dir,
            documents,
            cache: HashMap::new(),
        }
    }

    /// Directory that relative file references in an inline root resolve against
    pub fn with_base_dir(mut self, dir: &Path) -> Self {
        if self.root == Source::Inline {
            self.base_dir = normalize_path(dir);
        }
        self
    }

    pub fn root_source(&self) -> &Source {
        &self.root
    }

    /// Number of parsed documents held by this session, the root included
    pub fn loaded_documents(&self) -> usize {
        self.documents.len()
    }

    /// Resolve `reference`, written at pointer `at` in document `from`, to its
    /// concrete target node. Errors name the occurrence as `<from>#<at>`.
    pub fn resolve(
        &mut self,
        reference: &str,
        from: &Source,
        at: &JsonPointer,
    ) -> Result<&Value, ReferenceError> {
        let occurrence = format!("{from}#{at}");
        let target = match self.locate(reference, from) {
            Ok(target) => target,
            Err(kind) => {
                return Err(ReferenceError {
                    reference: reference.to_string(),
                    at: occurrence,
                    kind,
                });
            }
        };
        self.walk(&target).map_err(|kind| ReferenceError {
            reference: reference.to_string(),
            at: occurrence,
            kind,
        })
    }

    /// Locate the concrete target of `reference`, following reference-to-reference
    /// aliases. Results are cached per normalized reference.
    pub fn locate(&mut self, reference: &str, from: &Source) -> Result<Target, ReferenceErrorKind> {
        let start = self.normalize(reference, from)?;
        let key = start.id();
        if let Some(hit) = self.cache.get(&key) {
            trace!("Cache hit for {key}");
            return Ok(hit.clone());
        }

        let mut chain = vec![key.clone()];
        let mut current = start;
        loop {
            self.ensure_loaded(&current.source)?;
            let node = self.walk(&current)?;
            let Some(next) = reference_of(node) else {
                break;
            };
            let next = next.to_string();
            let next = self.normalize(&next, &current.source)?;
            let id = next.id();
            let revisited = chain.contains(&id);
            chain.push(id);
            if revisited {
                return Err(ReferenceErrorKind::CircularReference { chain });
            }
            current = next;
        }

        debug!("Resolved {key} -> {}", current.id());
        self.cache.insert(key, current.clone());
        Ok(current)
    }

    /// Locate the node `reference` points at without following aliases
    pub fn locate_direct(
        &mut self,
        reference: &str,
        from: &Source,
    ) -> Result<Target, ReferenceErrorKind> {
        let target = self.normalize(reference, from)?;
        self.ensure_loaded(&target.source)?;
        self.walk(&target)?;
        Ok(target)
    }

    pub fn node(&self, target: &Target) -> Option<&Value> {
        self.walk(target).ok()
    }

    /// Spell `target` as a reference valid from the root document
    pub fn reference_from_root(&self, target: &Target) -> String {
        let fragment = target.pointer.to_string().replace('%', "%25");
        match &target.source {
            source if *source == self.root => format!("#{fragment}"),
            Source::File(path) => {
                let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
                format!("{}#{fragment}", relative.display())
            }
            Source::Inline => format!("#{fragment}"),
        }
    }

    fn normalize(&self, reference: &str, from: &Source) -> Result<Target, ReferenceErrorKind> {
        let parsed = Reference::parse(reference)?;
        let source = match parsed.file {
            None => from.clone(),
            Some(file) => {
                let base = match from {
                    Source::File(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
                    Source::Inline => self.base_dir.clone(),
                };
                Source::File(normalize_path(&base.join(file)))
            }
        };
        Ok(Target {
            source,
            pointer: parsed.pointer,
        })
    }

    fn ensure_loaded(&mut self, source: &Source) -> Result<(), ReferenceErrorKind> {
        if self.documents.contains_key(source) {
            return Ok(());
        }
        let Source::File(path) = source else {
            // the inline root is inserted at construction
            return Ok(());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            ReferenceErrorKind::ExternalFileUnreadable {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        let format = Format::detect(Some(path), &content);
        let root = format
            .parse(&content)
            .map_err(|e| ReferenceErrorKind::ExternalFileUnreadable {
                path: path.clone(),
                reason: format!("not valid {format}: {e}"),
            })?;

        debug!("Loaded external document {path:?}");
        self.documents.insert(source.clone(), root);
        Ok(())
    }

    fn walk(&self, target: &Target) -> Result<&Value, ReferenceErrorKind> {
        let document = self.documents.get(&target.source).ok_or_else(|| {
            ReferenceErrorKind::NotFound {
                document: self.describe(&target.source),
                pointer: target.pointer.to_string(),
            }
        })?;

        target.pointer.walk(document).map_err(|e| match e {
            PointerError::NotFound(_) => ReferenceErrorKind::NotFound {
                document: self.describe(&target.source),
                pointer: target.pointer.to_string(),
            },
            PointerError::Invalid(reason) => ReferenceErrorKind::InvalidPointer { reason },
        })
    }

    fn describe(&self, source: &Source) -> String {
        match source {
            Source::Inline => "the root document".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Absolute, canonical where the file exists; otherwise cleaned lexically
fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
