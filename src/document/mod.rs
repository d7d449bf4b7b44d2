//! In-memory API description documents with path-addressable nodes

mod format;
mod path;
mod pointer;

pub use format::Format;
pub use path::{NodePath, Segment};
pub use pointer::{JsonPointer, PointerError, escape};

use serde_json::Value;
use std::path::{Path, PathBuf};

/// HTTP methods that may appear as operations on a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Key marking a reference object
pub const REF_KEY: &str = "$ref";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
    source: Option<PathBuf>,
    format: Format,
}

/// One operation under `paths`, with the path item it belongs to
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub template: &'a str,
    pub method: &'static str,
    pub path_item: &'a Value,
    pub operation: &'a Value,
}

impl Operation<'_> {
    pub fn path(&self) -> NodePath {
        NodePath::root()
            .key("paths")
            .key(self.template)
            .key(self.method)
    }
}

impl Document {
    pub fn new(root: Value, format: Format) -> Self {
        Self {
            root,
            source: None,
            format,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Human readable name for messages
    pub fn location(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline document>".to_string())
    }

    /// Follow local `#/...` references until a concrete node is reached.
    ///
    /// External, broken or circular references are returned unchanged; the
    /// resolver reports those.
    pub fn follow<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut current = value;
        let mut seen: Vec<&str> = Vec::new();
        while let Some(reference) = reference_of(current) {
            let Some(fragment) = reference.strip_prefix('#') else {
                break;
            };
            if seen.contains(&reference) {
                break;
            }
            seen.push(reference);

            let target = urlencoding::decode(fragment)
                .ok()
                .and_then(|decoded| JsonPointer::parse(&decoded).ok())
                .and_then(|pointer| pointer.walk(&self.root).ok());
            match target {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    /// Every operation under `paths`, in document order
    pub fn operations(&self) -> Vec<Operation<'_>> {
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut operations = Vec::new();
        for (template, item) in paths {
            let path_item = self.follow(item);
            for method in HTTP_METHODS {
                if let Some(operation) = path_item.get(method) {
                    operations.push(Operation {
                        template,
                        method,
                        path_item,
                        operation: self.follow(operation),
                    });
                }
            }
        }
        operations
    }
}

/// The reference string when `value` is a reference object
pub fn reference_of(value: &Value) -> Option<&str> {
    value.as_object()?.get(REF_KEY)?.as_str()
}
