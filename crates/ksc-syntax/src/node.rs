//! Node arena and node payloads.
//!
//! Nodes are appended bottom-up: children are created first and the parent
//! constructor links them back, so every node added as a child gets its
//! `parent` set exactly once.

use ksc_common::interner::Atom;
use smallvec::SmallVec;

/// Index of a node in a `NodeArena`.
///
/// Indices with the high bit set are *synthetic*: they name placeholder
/// expressions fabricated by the checker (fake calls, fake arguments) and
/// never resolve to a node in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: Self = Self(u32::MAX);

    const SYNTHETIC_BIT: u32 = 1 << 31;

    /// Largest `n` for which `synthetic(n)` is neither aliased nor `NONE`.
    pub const MAX_SYNTHETIC: u32 = !Self::SYNTHETIC_BIT - 1;

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    pub const fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Build the `n`th synthetic index.
    pub const fn synthetic(n: u32) -> Self {
        Self((n & !Self::SYNTHETIC_BIT) | Self::SYNTHETIC_BIT)
    }

    pub const fn is_synthetic(self) -> bool {
        !self.is_none() && self.0 & Self::SYNTHETIC_BIT != 0
    }

    /// `None` for `NodeIndex::NONE`.
    pub const fn into_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    NameReference,
    ThisExpression,
    Literal,
    Call,
    FunctionLiteralExpression,
    FunctionLiteral,
    MultiDeclaration,
    MultiDeclarationEntry,
    TypeReference,
    Block,
    FunctionDeclaration,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    Boolean,
    Character,
    String,
    Null,
}

/// How the call was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CallKind {
    /// `a.f(x)` or `f(x)`
    #[default]
    Normal,
    /// `a?.f(x)`
    Safe,
    /// `a f x`
    Infix,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
    /// Explicit receiver expression, `NodeIndex::NONE` when absent.
    pub receiver: NodeIndex,
    pub callee: Atom,
    pub arguments: Vec<NodeIndex>,
    pub call_kind: CallKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDeclarationData {
    pub entries: Vec<NodeIndex>,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeReferenceData {
    pub name: Atom,
    pub arguments: Vec<NodeIndex>,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    NameReference { name: Atom },
    ThisExpression,
    Literal { kind: LiteralKind, text: Atom },
    Call(CallData),
    /// `{ ... }` used as an expression; wraps exactly one `FunctionLiteral`.
    FunctionLiteralExpression { literal: NodeIndex },
    FunctionLiteral { statements: Vec<NodeIndex> },
    MultiDeclaration(MultiDeclarationData),
    /// `name` or `name: Type` inside `val (a, b: T) = ...`
    MultiDeclarationEntry { name: Atom, type_reference: NodeIndex },
    TypeReference(TypeReferenceData),
    Block { statements: Vec<NodeIndex> },
    FunctionDeclaration { name: Atom, body: NodeIndex },
}

impl NodeData {
    pub const fn kind(&self) -> NodeKind {
        match self {
            NodeData::NameReference { .. } => NodeKind::NameReference,
            NodeData::ThisExpression => NodeKind::ThisExpression,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::Call(_) => NodeKind::Call,
            NodeData::FunctionLiteralExpression { .. } => NodeKind::FunctionLiteralExpression,
            NodeData::FunctionLiteral { .. } => NodeKind::FunctionLiteral,
            NodeData::MultiDeclaration(_) => NodeKind::MultiDeclaration,
            NodeData::MultiDeclarationEntry { .. } => NodeKind::MultiDeclarationEntry,
            NodeData::TypeReference(_) => NodeKind::TypeReference,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeData::NameReference { .. }
            | NodeData::ThisExpression
            | NodeData::Literal { .. } => {}
            NodeData::Call(call) => {
                out.extend(call.receiver.into_option());
                out.extend(call.arguments.iter().copied());
            }
            NodeData::FunctionLiteralExpression { literal } => out.push(*literal),
            NodeData::FunctionLiteral { statements } | NodeData::Block { statements } => {
                out.extend(statements.iter().copied());
            }
            NodeData::MultiDeclaration(decl) => {
                out.extend(decl.entries.iter().copied());
                out.extend(decl.initializer.into_option());
            }
            NodeData::MultiDeclarationEntry { type_reference, .. } => {
                out.extend(type_reference.into_option());
            }
            NodeData::TypeReference(reference) => out.extend(reference.arguments.iter().copied()),
            NodeData::FunctionDeclaration { body, .. } => out.extend(body.into_option()),
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeIndex,
    pub pos: u32,
    pub end: u32,
}

impl Node {
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Append-only storage for syntax nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node without source position.
    pub fn add(&mut self, data: NodeData) -> NodeIndex {
        self.add_with_span(data, 0, 0)
    }

    /// Add a node and link its children back to it.
    pub fn add_with_span(&mut self, data: NodeData, pos: u32, end: u32) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        for child in data.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                debug_assert!(node.parent.is_none(), "node {child:?} already has a parent");
                node.parent = idx;
            }
        }
        self.nodes.push(Node {
            data,
            parent: NodeIndex::NONE,
            pos,
            end,
        });
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() || idx.is_synthetic() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    pub fn kind(&self, idx: NodeIndex) -> Option<NodeKind> {
        self.get(idx).map(Node::kind)
    }

    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map_or(NodeIndex::NONE, |node| node.parent)
    }

    pub fn children(&self, idx: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        self.get(idx)
            .map(|node| node.data.children())
            .unwrap_or_default()
    }

    /// `(pos, end - pos)` of a node, `(0, 0)` for synthetic nodes.
    pub fn span(&self, idx: NodeIndex) -> (u32, u32) {
        self.get(idx)
            .map_or((0, 0), |node| (node.pos, node.end.saturating_sub(node.pos)))
    }

    /// Whether `ancestor` encloses `node`. With `strict == false` a node is
    /// its own ancestor.
    pub fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex, strict: bool) -> bool {
        let mut current = if strict { self.parent(node) } else { node };
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = self.parent(current);
        }
        false
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    pub fn get_call(&self, idx: NodeIndex) -> Option<&CallData> {
        match &self.get(idx)?.data {
            NodeData::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn get_multi_declaration(&self, idx: NodeIndex) -> Option<&MultiDeclarationData> {
        match &self.get(idx)?.data {
            NodeData::MultiDeclaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn get_type_reference(&self, idx: NodeIndex) -> Option<&TypeReferenceData> {
        match &self.get(idx)?.data {
            NodeData::TypeReference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Name of a reference, entry or named declaration.
    pub fn name_of(&self, idx: NodeIndex) -> Option<Atom> {
        match &self.get(idx)?.data {
            NodeData::NameReference { name }
            | NodeData::MultiDeclarationEntry { name, .. }
            | NodeData::FunctionDeclaration { name, .. } => Some(*name),
            NodeData::Call(call) => Some(call.callee),
            _ => None,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn add_name_reference(&mut self, name: Atom) -> NodeIndex {
        self.add(NodeData::NameReference { name })
    }

    pub fn add_this(&mut self) -> NodeIndex {
        self.add(NodeData::ThisExpression)
    }

    pub fn add_literal(&mut self, kind: LiteralKind, text: Atom) -> NodeIndex {
        self.add(NodeData::Literal { kind, text })
    }

    pub fn add_call(
        &mut self,
        receiver: NodeIndex,
        callee: Atom,
        arguments: Vec<NodeIndex>,
        call_kind: CallKind,
    ) -> NodeIndex {
        self.add(NodeData::Call(CallData {
            receiver,
            callee,
            arguments,
            call_kind,
        }))
    }

    /// Add a `FunctionLiteral` and the expression wrapping it; returns
    /// `(expression, literal)`.
    pub fn add_function_literal(&mut self, statements: Vec<NodeIndex>) -> (NodeIndex, NodeIndex) {
        let literal = self.add(NodeData::FunctionLiteral { statements });
        let expression = self.add(NodeData::FunctionLiteralExpression { literal });
        (expression, literal)
    }

    pub fn add_type_reference(
        &mut self,
        name: Atom,
        arguments: Vec<NodeIndex>,
        nullable: bool,
    ) -> NodeIndex {
        self.add(NodeData::TypeReference(TypeReferenceData {
            name,
            arguments,
            nullable,
        }))
    }

    pub fn add_multi_declaration_entry(&mut self, name: Atom, type_reference: NodeIndex) -> NodeIndex {
        self.add(NodeData::MultiDeclarationEntry {
            name,
            type_reference,
        })
    }

    pub fn add_multi_declaration(&mut self, entries: Vec<NodeIndex>, initializer: NodeIndex) -> NodeIndex {
        self.add(NodeData::MultiDeclaration(MultiDeclarationData {
            entries,
            initializer,
        }))
    }

    pub fn add_block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::Block { statements })
    }

    pub fn add_function_declaration(&mut self, name: Atom, body: NodeIndex) -> NodeIndex {
        self.add(NodeData::FunctionDeclaration { name, body })
    }
}
