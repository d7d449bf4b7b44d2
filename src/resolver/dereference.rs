//! Replace every reference with a copy of its target
//!
//! The traversal is an explicit work list over pointers into the output tree.
//! Each work item carries the chain of targets expanded above it; a target
//! that reappears in its own chain is not expanded again, so the output stays
//! finite for self-referential schemas.

use serde_json::{Map, Value};
use std::rc::Rc;
use tracing::{debug, warn};

use super::{ReferenceResolver, Source, Target};
use crate::document::{Document, JsonPointer, REF_KEY, reference_of};
use crate::error::{ReferenceError, ReferenceErrorKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CircularPolicy {
    /// Expand once per chain, then keep the repeated occurrence as a `$ref`.
    /// Output of a cyclic document still holds references, so dereferencing it
    /// again expands one more level; only reference-free output is a fixed point.
    #[default]
    Preserve,
    /// Fail on the first cycle
    Error,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DereferenceOptions {
    pub circular: CircularPolicy,
}

/// Dereference `document` in a fresh resolution session
pub fn dereference(
    document: &Document,
    options: DereferenceOptions,
) -> Result<Document, ReferenceError> {
    let mut resolver = ReferenceResolver::new(document);
    let root = resolver.dereference(options)?;

    let dereferenced = Document::new(root, document.format());
    Ok(match document.source() {
        Some(path) => dereferenced.with_source(path),
        None => dereferenced,
    })
}

/// One target in the active expansion chain
struct ChainLink {
    id: String,
    parent: Option<Rc<ChainLink>>,
}

struct WorkItem {
    pointer: JsonPointer,
    source: Source,
    chain: Option<Rc<ChainLink>>,
}

fn chain_contains(chain: &Option<Rc<ChainLink>>, id: &str) -> bool {
    let mut link = chain.as_deref();
    while let Some(current) = link {
        if current.id == id {
            return true;
        }
        link = current.parent.as_deref();
    }
    false
}

/// Chain ids, outermost first
fn chain_ids(chain: &Option<Rc<ChainLink>>) -> Vec<String> {
    let mut ids = Vec::new();
    let mut link = chain.as_deref();
    while let Some(current) = link {
        ids.push(current.id.clone());
        link = current.parent.as_deref();
    }
    ids.reverse();
    ids
}

impl ReferenceResolver {
    /// Dereference the root document of this session. The source tree is
    /// copied; nothing the caller holds is modified.
    pub fn dereference(&mut self, options: DereferenceOptions) -> Result<Value, ReferenceError> {
        let root_source = self.root_source().clone();
        let mut output = self
            .node(&Target::root_of(root_source.clone()))
            .cloned()
            .unwrap_or(Value::Null);

        let mut work = vec![WorkItem {
            pointer: JsonPointer::root(),
            source: root_source.clone(),
            chain: None,
        }];
        let mut expansions = 0usize;

        while let Some(item) = work.pop() {
            let Ok(node) = item.pointer.walk_mut(&mut output) else {
                continue;
            };

            if let Some(raw) = reference_of(node) {
                let raw = raw.to_string();
                let at = format!("{root_source}#{}", item.pointer);
                let target = self
                    .locate(&raw, &item.source)
                    .map_err(|kind| ReferenceError {
                        reference: raw.clone(),
                        at: at.clone(),
                        kind,
                    })?;
                let id = target.id();

                if chain_contains(&item.chain, &id) {
                    match options.circular {
                        CircularPolicy::Preserve => {
                            debug!("Circular reference {id} kept unexpanded at {at}");
                            let mut kept = Map::new();
                            kept.insert(
                                REF_KEY.to_string(),
                                Value::String(self.reference_from_root(&target)),
                            );
                            *node = Value::Object(kept);
                            continue;
                        }
                        CircularPolicy::Error => {
                            let mut chain = chain_ids(&item.chain);
                            chain.push(id);
                            return Err(ReferenceError {
                                reference: raw,
                                at,
                                kind: ReferenceErrorKind::CircularReference { chain },
                            });
                        }
                    }
                }

                let Some(replacement) = self.node(&target).cloned() else {
                    warn!("Target {id} vanished from the session after resolving");
                    continue;
                };
                *node = replacement;
                expansions += 1;

                // revisit the same slot: its children now belong to the target document
                work.push(WorkItem {
                    pointer: item.pointer,
                    source: target.source,
                    chain: Some(Rc::new(ChainLink {
                        id,
                        parent: item.chain,
                    })),
                });
                continue;
            }

            // push in reverse so siblings are processed in document order
            match node {
                Value::Object(map) => {
                    for key in map.keys().rev() {
                        work.push(WorkItem {
                            pointer: item.pointer.child(key.clone()),
                            source: item.source.clone(),
                            chain: item.chain.clone(),
                        });
                    }
                }
                Value::Array(items) => {
                    for index in (0..items.len()).rev() {
                        work.push(WorkItem {
                            pointer: item.pointer.child(index.to_string()),
                            source: item.source.clone(),
                            chain: item.chain.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        debug!(
            "Dereferenced with {expansions} expansion(s) across {} document(s)",
            self.loaded_documents()
        );
        Ok(output)
    }
}
