//! In-memory schema tree.
//!
//! Nodes live in a [`SchemaArena`] and refer to their children by [`NodeId`]. References are kept
//! as URIs and resolved on every traversal, so the arena only ever holds a tree even when the
//! schema graph is cyclic.
use std::{borrow::Cow, sync::Arc};

use ahash::AHashMap;
use serde_json::Value;

use crate::{
    context::ValidationContext,
    draft::Draft,
    keywords::{if_::Conditional, ref_::Reference, BoxedValidator, KeywordKind},
    output::EvaluationResult,
    paths::LazyLocation,
};

/// Index of a node within its [`SchemaArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Default)]
pub(crate) struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

pub(crate) enum SchemaNode {
    Boolean(bool),
    Body(Box<Body>),
}

/// Subschemas held by a keyword, used to walk the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Subschemas<'a> {
    None,
    Single(NodeId),
    List(&'a [NodeId]),
    Map(&'a [(String, NodeId)]),
}

impl Subschemas<'_> {
    fn for_each(self, mut f: impl FnMut(NodeId)) {
        match self {
            Subschemas::None => {}
            Subschemas::Single(id) => f(id),
            Subschemas::List(ids) => ids.iter().copied().for_each(f),
            Subschemas::Map(entries) => entries.iter().for_each(|(_, id)| f(*id)),
        }
    }
}

/// A schema object with its compiled keywords.
pub(crate) struct Body {
    pub(crate) draft: Draft,
    pub(crate) keywords: Vec<(KeywordKind, BoxedValidator)>,
    pub(crate) conditional: Option<Conditional>,
    pub(crate) reference: Option<Reference>,
    pub(crate) dynamic_reference: Option<Reference>,
    pub(crate) anchor: Option<String>,
    pub(crate) dynamic_anchor: Option<String>,
    pub(crate) recursive_anchor: bool,
    pub(crate) defs: Vec<(String, NodeId)>,
    pub(crate) legacy_definitions: Vec<(String, NodeId)>,
    /// Object values of keywords that carry no validation meaning.
    pub(crate) unknown: Vec<(String, NodeId)>,
    pub(crate) resource: Option<Box<Resource>>,
}

/// Data owned by a body that is also a schema resource.
#[derive(Debug, Default)]
pub(crate) struct Resource {
    pub(crate) raw_id: Option<String>,
    pub(crate) base_uri: Arc<str>,
    pub(crate) anchors: AHashMap<String, NodeId>,
    pub(crate) dynamic_anchors: AHashMap<String, NodeId>,
}

impl Resource {
    pub(crate) fn new(raw_id: Option<String>) -> Resource {
        Resource {
            raw_id,
            ..Resource::default()
        }
    }
}

impl SchemaArena {
    pub(crate) fn push(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub(crate) fn body(&self, id: NodeId) -> Option<&Body> {
        match self.get(id) {
            SchemaNode::Body(body) => Some(body),
            SchemaNode::Boolean(_) => None,
        }
    }

    pub(crate) fn body_mut(&mut self, id: NodeId) -> Option<&mut Body> {
        match &mut self.nodes[id.0] {
            SchemaNode::Body(body) => Some(body),
            SchemaNode::Boolean(_) => None,
        }
    }

    pub(crate) fn resource(&self, id: NodeId) -> Option<&Resource> {
        self.body(id).and_then(|body| body.resource.as_deref())
    }

    pub(crate) fn resource_mut(&mut self, id: NodeId) -> Option<&mut Resource> {
        self.body_mut(id).and_then(|body| body.resource.as_deref_mut())
    }

    /// Base URI of the resource at `id`, if it is one.
    pub(crate) fn base_uri(&self, id: NodeId) -> Option<&Arc<str>> {
        self.resource(id).map(|resource| &resource.base_uri)
    }

    /// Follow JSON pointer tokens from `start`.
    ///
    /// Returns the innermost resource passed through along with the target node.
    pub(crate) fn descend(&self, start: NodeId, tokens: &[Cow<'_, str>]) -> Option<(NodeId, NodeId)> {
        let mut owner = start;
        let mut current = start;
        let mut tokens = tokens.iter();
        while let Some(token) = tokens.next() {
            let body = self.body(current)?;
            current = match body.subschemas(token)? {
                Subschemas::None => return None,
                Subschemas::Single(id) => id,
                Subschemas::List(ids) => {
                    let idx: usize = tokens.next()?.parse().ok()?;
                    *ids.get(idx)?
                }
                Subschemas::Map(entries) => {
                    let key = tokens.next()?;
                    find_entry(entries, key)?
                }
            };
            if self.resource(current).is_some() {
                owner = current;
            }
        }
        Some((owner, current))
    }
}

pub(crate) fn find_entry(entries: &[(String, NodeId)], key: &str) -> Option<NodeId> {
    entries
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, id)| *id)
}

impl Body {
    pub(crate) fn new(draft: Draft) -> Body {
        Body {
            draft,
            keywords: Vec::new(),
            conditional: None,
            reference: None,
            dynamic_reference: None,
            anchor: None,
            dynamic_anchor: None,
            recursive_anchor: false,
            defs: Vec::new(),
            legacy_definitions: Vec::new(),
            unknown: Vec::new(),
            resource: None,
        }
    }

    /// Subschemas reachable through the keyword `name`.
    pub(crate) fn subschemas(&self, name: &str) -> Option<Subschemas<'_>> {
        match name {
            "$defs" => Some(Subschemas::Map(&self.defs)),
            "definitions" => Some(Subschemas::Map(&self.legacy_definitions)),
            "if" | "then" | "else" => self
                .conditional
                .as_ref()
                .and_then(|conditional| conditional.branch(name))
                .map(Subschemas::Single),
            _ => match KeywordKind::from_name(name) {
                Some(kind) => self
                    .keywords
                    .iter()
                    .find(|(candidate, _)| *candidate == kind)
                    .map(|(_, keyword)| keyword.subschemas()),
                None => find_entry(&self.unknown, name).map(Subschemas::Single),
            },
        }
    }

    /// Every direct child node.
    pub(crate) fn children(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        for (_, keyword) in &self.keywords {
            keyword.subschemas().for_each(|id| children.push(id));
        }
        if let Some(conditional) = &self.conditional {
            children.extend(conditional.nodes());
        }
        for (_, id) in self
            .defs
            .iter()
            .chain(&self.legacy_definitions)
            .chain(&self.unknown)
        {
            children.push(*id);
        }
        children
    }

    /// Look up an entry of the local definitions table.
    pub(crate) fn definition(&self, name: &str) -> Option<NodeId> {
        find_entry(&self.defs, name).or_else(|| find_entry(&self.legacy_definitions, name))
    }

    pub(crate) fn evaluate<'s, 'i>(
        &'s self,
        id: NodeId,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if self.resource.is_some() {
            ctx.in_resource(id, |ctx| self.evaluate_keywords(instance, location, ctx))
        } else {
            self.evaluate_keywords(instance, location, ctx)
        }
    }

    fn evaluate_keywords<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        if let Some(reference) = &self.reference {
            let evaluation = reference.evaluate(instance, location, ctx)?;
            if collector.push(evaluation) {
                return Ok(collector.finish());
            }
        }
        for (kind, keyword) in &self.keywords {
            let evaluation =
                ctx.in_keyword(kind.as_str(), |ctx| keyword.evaluate(instance, location, ctx))?;
            if collector.push(evaluation) {
                return Ok(collector.finish());
            }
        }
        if let Some(conditional) = &self.conditional {
            if collector.push(conditional.evaluate(instance, location, ctx)?) {
                return Ok(collector.finish());
            }
        }
        if let Some(reference) = &self.dynamic_reference {
            collector.push(reference.evaluate(instance, location, ctx)?);
        }
        Ok(collector.finish())
    }
}
