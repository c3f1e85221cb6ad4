use super::*;

fn coerced(from: AsmType, to: AsmType) -> Vec<String> {
    let mut v = InstructionAdapter::new();
    coerce(&from, &to, &mut v);
    v.instructions().iter().map(ToString::to_string).collect()
}

#[test]
fn test_same_type_emits_nothing() {
    assert!(coerced(AsmType::Int, AsmType::Int).is_empty());
    assert!(coerced(AsmType::string(), AsmType::string()).is_empty());
}

#[test]
fn test_primitive_widening() {
    assert_eq!(coerced(AsmType::Int, AsmType::Long), vec!["I2L"]);
    assert_eq!(coerced(AsmType::Int, AsmType::Double), vec!["I2D"]);
    assert_eq!(coerced(AsmType::Float, AsmType::Double), vec!["F2D"]);
    // Sub-int types share the int representation.
    assert!(coerced(AsmType::Byte, AsmType::Int).is_empty());
}

#[test]
fn test_primitive_narrowing_goes_through_int() {
    assert_eq!(coerced(AsmType::Long, AsmType::Int), vec!["L2I"]);
    assert_eq!(coerced(AsmType::Double, AsmType::Byte), vec!["D2I", "I2B"]);
    assert_eq!(coerced(AsmType::Int, AsmType::Char), vec!["I2C"]);
}

#[test]
fn test_boxing_and_unboxing() {
    assert_eq!(
        coerced(AsmType::Int, AsmType::java_object()),
        vec!["INVOKESTATIC java/lang/Integer.valueOf (I)Ljava/lang/Integer;"]
    );
    assert_eq!(
        coerced(AsmType::object("java/lang/Integer"), AsmType::Int),
        vec!["INVOKEVIRTUAL java/lang/Number.intValue ()I"]
    );
    assert_eq!(
        coerced(AsmType::java_object(), AsmType::Long),
        vec![
            "CHECKCAST java/lang/Number",
            "INVOKEVIRTUAL java/lang/Number.longValue ()J"
        ]
    );
    assert_eq!(
        coerced(AsmType::java_object(), AsmType::Boolean),
        vec![
            "CHECKCAST java/lang/Boolean",
            "INVOKEVIRTUAL java/lang/Boolean.booleanValue ()Z"
        ]
    );
}

#[test]
fn test_reference_casts() {
    assert_eq!(
        coerced(AsmType::java_object(), AsmType::string()),
        vec!["CHECKCAST java/lang/String"]
    );
    assert!(coerced(AsmType::string(), AsmType::java_object()).is_empty());
    assert_eq!(
        coerced(AsmType::java_object(), AsmType::array_of(AsmType::Int)),
        vec!["CHECKCAST [I"]
    );
}

#[test]
fn test_void_coercions() {
    assert_eq!(coerced(AsmType::Long, AsmType::Void), vec!["POP2"]);
    assert_eq!(coerced(AsmType::string(), AsmType::Void), vec!["POP"]);
    assert_eq!(coerced(AsmType::Void, AsmType::Int), vec!["ICONST_0"]);
    assert_eq!(coerced(AsmType::Void, AsmType::string()), vec!["ACONST_NULL"]);
    assert_eq!(
        coerced(AsmType::Void, AsmType::object("kotlin/Unit")),
        vec!["GETSTATIC kotlin/Unit.INSTANCE : Lkotlin/Unit;"]
    );
}

#[test]
fn test_put_constant_and_local() {
    let mut v = InstructionAdapter::new();
    StackValue::Constant {
        value: Constant::Int(200),
        ty: AsmType::Int,
    }
    .put(&AsmType::Long, &mut v);
    StackValue::Local {
        slot: 3,
        ty: AsmType::string(),
    }
    .put(&AsmType::string(), &mut v);
    StackValue::None.put(&AsmType::Void, &mut v);
    assert_eq!(v.listing(), "SIPUSH 200\nI2L\nALOAD 3");
}

#[test]
fn test_constant_mnemonics() {
    let mut v = InstructionAdapter::new();
    v.iconst(-1);
    v.iconst(5);
    v.iconst(100);
    v.iconst(70_000);
    v.push(Constant::Long(1));
    v.push(Constant::Double(2.5));
    assert_eq!(
        v.mnemonics(),
        vec!["ICONST_M1", "ICONST_5", "BIPUSH", "LDC", "LCONST_1", "LDC"]
    );
}
