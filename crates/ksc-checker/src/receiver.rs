//! Receivers and expected types.

use ksc_binder::DeclId;
use ksc_solver::TypeId;
use ksc_syntax::NodeIndex;

/// What a call is invoked on.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ReceiverValue {
    #[default]
    NoReceiver,
    /// An explicit receiver expression, `a` in `a.f()`.
    Expression { expression: NodeIndex, ty: TypeId },
    /// The implicit `this` of an enclosing class or extension.
    This { owner: DeclId, ty: TypeId },
    /// A class used as a receiver, after normalization of `this`.
    ClassReceiver { class: DeclId, ty: TypeId },
}

impl ReceiverValue {
    pub const fn exists(&self) -> bool {
        !matches!(self, ReceiverValue::NoReceiver)
    }

    pub const fn ty(&self) -> Option<TypeId> {
        match self {
            ReceiverValue::NoReceiver => None,
            ReceiverValue::Expression { ty, .. }
            | ReceiverValue::This { ty, .. }
            | ReceiverValue::ClassReceiver { ty, .. } => Some(*ty),
        }
    }

    pub const fn expression(&self) -> Option<NodeIndex> {
        match self {
            ReceiverValue::Expression { expression, .. } => Some(*expression),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ExpectedType {
    #[default]
    NoExpectedType,
    Type(TypeId),
}

impl ExpectedType {
    pub const fn as_type(self) -> Option<TypeId> {
        match self {
            ExpectedType::NoExpectedType => None,
            ExpectedType::Type(ty) => Some(ty),
        }
    }
}

impl From<Option<TypeId>> for ExpectedType {
    fn from(ty: Option<TypeId>) -> Self {
        ty.map_or(ExpectedType::NoExpectedType, ExpectedType::Type)
    }
}
