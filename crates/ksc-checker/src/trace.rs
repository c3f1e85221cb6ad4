//! Analysis trace: the transactional store of analysis results.
//!
//! Results are keyed by `(Slice, TraceKey)`. The root `BindingContext` owns
//! the committed entries of a compilation unit. Speculative work happens in
//! a `TemporaryTrace` layered over a parent trace: reads fall through to the
//! parent, writes stay in the local layer until `commit`/`commit_filtered`
//! merges them upward. Dropping a temporary trace discards it.
//!
//! A temporary trace holds `&mut` to its parent, so at most one speculative
//! layer can be writing over a given trace at any time.

use crate::capture::CaptureKind;
use crate::diagnostics::PendingDiagnostic;
use crate::resolved_call::ResolvedCall;
use indexmap::IndexMap;
use ksc_binder::DeclId;
use ksc_solver::TypeId;
use ksc_syntax::NodeIndex;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::trace;

/// Kind of fact stored in the trace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slice {
    /// Call node -> resolved call.
    ResolvedCall,
    /// Destructuring entry -> resolved `componentN` call.
    ComponentResolvedCall,
    /// Expression -> its type.
    ExpressionType,
    /// Reference expression -> declaration it resolves to.
    ReferenceTarget,
    /// Variable -> how it is captured by closures.
    CapturedInClosure,
    /// Declaring node -> variable declaration.
    Variable,
    /// Expression was analyzed.
    Processed,
}

/// How a second write to an existing key is treated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RewritePolicy {
    /// A different value is a `TraceError::ConflictingRecord`.
    Forbid,
    /// The larger value wins; values never go down.
    Monotonic,
    /// The newer value wins.
    Replace,
}

impl Slice {
    pub const fn rewrite_policy(self) -> RewritePolicy {
        match self {
            Slice::CapturedInClosure => RewritePolicy::Monotonic,
            Slice::ExpressionType | Slice::Processed => RewritePolicy::Replace,
            Slice::ResolvedCall
            | Slice::ComponentResolvedCall
            | Slice::ReferenceTarget
            | Slice::Variable => RewritePolicy::Forbid,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TraceKey {
    Node(NodeIndex),
    Decl(DeclId),
}

impl TraceKey {
    pub const fn node(self) -> Option<NodeIndex> {
        match self {
            TraceKey::Node(node) => Some(node),
            TraceKey::Decl(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceValue {
    ResolvedCall(Arc<ResolvedCall>),
    Type(TypeId),
    Decl(DeclId),
    Capture(CaptureKind),
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("conflicting record for {slice:?} at {key:?}")]
    ConflictingRecord { slice: Slice, key: TraceKey },
}

/// Read/write access to analysis results and the diagnostic sink.
pub trait BindingTrace {
    fn record(&mut self, slice: Slice, key: TraceKey, value: TraceValue) -> Result<(), TraceError>;

    /// Effective value, looking through to parent traces.
    fn get(&self, slice: Slice, key: TraceKey) -> Option<TraceValue>;

    fn report(&mut self, diagnostic: PendingDiagnostic);

    /// Whether any entry or diagnostic, here or in a parent, is keyed by
    /// `key`.
    fn has_entries_for(&self, key: TraceKey) -> bool;
}

/// Value a write would leave behind, or the conflict it causes.
fn resolve_write(
    slice: Slice,
    key: TraceKey,
    existing: Option<TraceValue>,
    value: TraceValue,
) -> Result<TraceValue, TraceError> {
    let Some(existing) = existing else {
        return Ok(value);
    };
    match slice.rewrite_policy() {
        RewritePolicy::Replace => Ok(value),
        RewritePolicy::Forbid if existing == value => Ok(value),
        RewritePolicy::Forbid => Err(TraceError::ConflictingRecord { slice, key }),
        RewritePolicy::Monotonic => match (&existing, &value) {
            (TraceValue::Capture(old), TraceValue::Capture(new)) => {
                Ok(TraceValue::Capture((*old).max(*new)))
            }
            _ if existing == value => Ok(value),
            _ => Err(TraceError::ConflictingRecord { slice, key }),
        },
    }
}

/// Entries and diagnostics of one trace level.
#[derive(Clone, Debug, Default)]
pub struct TraceLayer {
    entries: IndexMap<(Slice, TraceKey), TraceValue, FxBuildHasher>,
    diagnostics: Vec<PendingDiagnostic>,
}

impl TraceLayer {
    fn get(&self, slice: Slice, key: TraceKey) -> Option<&TraceValue> {
        self.entries.get(&(slice, key))
    }

    fn insert(&mut self, slice: Slice, key: TraceKey, value: TraceValue) {
        self.entries.insert((slice, key), value);
    }

    fn push_diagnostic(&mut self, diagnostic: PendingDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    fn has_entries_for(&self, key: TraceKey) -> bool {
        self.entries.keys().any(|&(_, k)| k == key)
            || key
                .node()
                .is_some_and(|node| self.diagnostics.iter().any(|d| d.node == node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Root trace of a compilation unit.
#[derive(Debug, Default)]
pub struct BindingContext {
    layer: TraceLayer,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[PendingDiagnostic] {
        &self.layer.diagnostics
    }

    pub fn len(&self) -> usize {
        self.layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    /// Number of entries keyed by `key`, across all slices.
    pub fn entries_keyed_by(&self, key: TraceKey) -> usize {
        self.layer.entries.keys().filter(|&&(_, k)| k == key).count()
    }
}

impl BindingTrace for BindingContext {
    fn record(&mut self, slice: Slice, key: TraceKey, value: TraceValue) -> Result<(), TraceError> {
        let existing = self.layer.get(slice, key).cloned();
        let value = resolve_write(slice, key, existing, value)?;
        self.layer.insert(slice, key, value);
        Ok(())
    }

    fn get(&self, slice: Slice, key: TraceKey) -> Option<TraceValue> {
        self.layer.get(slice, key).cloned()
    }

    fn report(&mut self, diagnostic: PendingDiagnostic) {
        self.layer.push_diagnostic(diagnostic);
    }

    fn has_entries_for(&self, key: TraceKey) -> bool {
        self.layer.has_entries_for(key)
    }
}

/// Speculative layer over a parent trace.
pub struct TemporaryTrace<'p> {
    parent: &'p mut dyn BindingTrace,
    layer: TraceLayer,
    debug_name: &'static str,
}

impl<'p> TemporaryTrace<'p> {
    pub fn new(parent: &'p mut dyn BindingTrace, debug_name: &'static str) -> Self {
        trace!(debug_name, "temporary trace opened");
        TemporaryTrace {
            parent,
            layer: TraceLayer::default(),
            debug_name,
        }
    }

    pub fn local_len(&self) -> usize {
        self.layer.len()
    }

    pub fn local_diagnostics(&self) -> &[PendingDiagnostic] {
        &self.layer.diagnostics
    }

    /// Merge everything into the parent.
    pub fn commit(self) -> Result<(), TraceError> {
        self.commit_filtered(|_, _| true, true)
    }

    /// Merge the entries `filter` accepts into the parent. Diagnostics are
    /// offered to the filter with no slice and are merged only when
    /// `commit_diagnostics` is set.
    pub fn commit_filtered(
        self,
        filter: impl Fn(Option<Slice>, TraceKey) -> bool,
        commit_diagnostics: bool,
    ) -> Result<(), TraceError> {
        let TemporaryTrace {
            parent,
            layer,
            debug_name,
        } = self;
        trace!(debug_name, entries = layer.len(), "temporary trace committed");
        for ((slice, key), value) in layer.entries {
            if filter(Some(slice), key) {
                parent.record(slice, key, value)?;
            }
        }
        if commit_diagnostics {
            for diagnostic in layer.diagnostics {
                if filter(None, TraceKey::Node(diagnostic.node)) {
                    parent.report(diagnostic);
                }
            }
        }
        Ok(())
    }

    /// Drop all local entries.
    pub fn discard(self) {
        trace!(
            debug_name = self.debug_name,
            entries = self.layer.len(),
            "temporary trace discarded"
        );
    }
}

impl BindingTrace for TemporaryTrace<'_> {
    fn record(&mut self, slice: Slice, key: TraceKey, value: TraceValue) -> Result<(), TraceError> {
        let existing = self.get(slice, key);
        let value = resolve_write(slice, key, existing, value)?;
        self.layer.insert(slice, key, value);
        Ok(())
    }

    fn get(&self, slice: Slice, key: TraceKey) -> Option<TraceValue> {
        match self.layer.get(slice, key) {
            Some(value) => Some(value.clone()),
            None => self.parent.get(slice, key),
        }
    }

    fn report(&mut self, diagnostic: PendingDiagnostic) {
        self.layer.push_diagnostic(diagnostic);
    }

    fn has_entries_for(&self, key: TraceKey) -> bool {
        self.layer.has_entries_for(key) || self.parent.has_entries_for(key)
    }
}

/// Typed accessors over `BindingTrace`.
pub trait BindingTraceExt: BindingTrace {
    fn resolved_call(&self, call: NodeIndex) -> Option<Arc<ResolvedCall>> {
        match self.get(Slice::ResolvedCall, TraceKey::Node(call))? {
            TraceValue::ResolvedCall(resolved) => Some(resolved),
            _ => None,
        }
    }

    fn component_resolved_call(&self, entry: NodeIndex) -> Option<Arc<ResolvedCall>> {
        match self.get(Slice::ComponentResolvedCall, TraceKey::Node(entry))? {
            TraceValue::ResolvedCall(resolved) => Some(resolved),
            _ => None,
        }
    }

    fn expression_type(&self, expression: NodeIndex) -> Option<TypeId> {
        match self.get(Slice::ExpressionType, TraceKey::Node(expression))? {
            TraceValue::Type(ty) => Some(ty),
            _ => None,
        }
    }

    fn reference_target(&self, reference: NodeIndex) -> Option<DeclId> {
        match self.get(Slice::ReferenceTarget, TraceKey::Node(reference))? {
            TraceValue::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    fn variable_at(&self, declaration: NodeIndex) -> Option<DeclId> {
        match self.get(Slice::Variable, TraceKey::Node(declaration))? {
            TraceValue::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    fn captured_in_closure(&self, variable: DeclId) -> Option<CaptureKind> {
        match self.get(Slice::CapturedInClosure, TraceKey::Decl(variable))? {
            TraceValue::Capture(kind) => Some(kind),
            _ => None,
        }
    }

    fn is_processed(&self, expression: NodeIndex) -> bool {
        self.get(Slice::Processed, TraceKey::Node(expression)).is_some()
    }

    fn record_expression_type(&mut self, expression: NodeIndex, ty: TypeId) -> Result<(), TraceError> {
        self.record(Slice::ExpressionType, TraceKey::Node(expression), TraceValue::Type(ty))
    }
}

impl<T: BindingTrace + ?Sized> BindingTraceExt for T {}
