//! Members of the builtin classes that calls and the code generator rely
//! on: array access and size, string length, unary numeric operators and
//! `toString`.

use crate::declarations::CallableDescriptor;
use crate::state::BinderState;
use ksc_solver::{DefId, TypeId, TypeInterner};

const PRIMITIVE_ARRAYS: [(DefId, TypeId); 8] = [
    (DefId::BOOLEAN_ARRAY, TypeId::BOOLEAN),
    (DefId::CHAR_ARRAY, TypeId::CHAR),
    (DefId::BYTE_ARRAY, TypeId::BYTE),
    (DefId::SHORT_ARRAY, TypeId::SHORT),
    (DefId::INT_ARRAY, TypeId::INT),
    (DefId::LONG_ARRAY, TypeId::LONG),
    (DefId::FLOAT_ARRAY, TypeId::FLOAT),
    (DefId::DOUBLE_ARRAY, TypeId::DOUBLE),
];

/// `(class, receiver, result of unary plus/minus)`. Byte and Short widen.
const NUMBERS: [(DefId, TypeId, TypeId); 6] = [
    (DefId::BYTE, TypeId::BYTE, TypeId::INT),
    (DefId::SHORT, TypeId::SHORT, TypeId::INT),
    (DefId::INT, TypeId::INT, TypeId::INT),
    (DefId::LONG, TypeId::LONG, TypeId::LONG),
    (DefId::FLOAT, TypeId::FLOAT, TypeId::FLOAT),
    (DefId::DOUBLE, TypeId::DOUBLE, TypeId::DOUBLE),
];

impl BinderState {
    pub fn declare_builtin_members(&mut self, db: &TypeInterner) {
        let get = db.name("get");
        let size = db.name("size");
        let index = db.name("index");

        let array_t = db
            .class_info(DefId::ARRAY)
            .and_then(|info| info.type_params.first().copied());
        if let Some(t) = array_t {
            let element = db.type_param_type(t);
            let array = db.default_type(DefId::ARRAY);
            self.declare_builtin_member(
                DefId::ARRAY,
                CallableDescriptor::function(get, element)
                    .with_dispatch_receiver(array)
                    .with_type_params(vec![t])
                    .with_value_param(index, TypeId::INT),
            );
            self.declare_builtin_member(
                DefId::ARRAY,
                CallableDescriptor::property(size, TypeId::INT)
                    .with_dispatch_receiver(array)
                    .with_type_params(vec![t]),
            );
        }

        for (def, element) in PRIMITIVE_ARRAYS {
            let array = db.class_type(def, &[]);
            self.declare_builtin_member(
                def,
                CallableDescriptor::function(get, element)
                    .with_dispatch_receiver(array)
                    .with_value_param(index, TypeId::INT),
            );
            self.declare_builtin_member(
                def,
                CallableDescriptor::property(size, TypeId::INT).with_dispatch_receiver(array),
            );
        }

        self.declare_builtin_member(
            DefId::CHAR_SEQUENCE,
            CallableDescriptor::property(db.name("length"), TypeId::INT)
                .with_dispatch_receiver(TypeId::CHAR_SEQUENCE),
        );

        let plus = db.name("plus");
        let minus = db.name("minus");
        for (def, receiver, result) in NUMBERS {
            self.declare_builtin_member(def, CallableDescriptor::function(plus, result).with_dispatch_receiver(receiver));
            self.declare_builtin_member(def, CallableDescriptor::function(minus, result).with_dispatch_receiver(receiver));
        }

        self.declare_builtin_member(
            DefId::ANY,
            CallableDescriptor::function(db.name("toString"), TypeId::STRING)
                .with_dispatch_receiver(TypeId::ANY),
        );
    }
}
