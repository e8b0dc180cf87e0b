use jcp_class_file::{AccessFlags, ClassFile, ClassFileError, CpInfo, Parser, Tag};

#[derive(Default)]
struct Bytes(Vec<u8>);
impl Bytes {
    fn u1(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }

    fn u2(&mut self, v: u16) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u4(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u8(&mut self, v: u64) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn utf8(&mut self, s: &str) -> &mut Self {
        self.u1(1).u2(s.len() as u16);
        self.0.extend_from_slice(s.as_bytes());
        self
    }
}

// my/MyClass extends java/lang/Object implements java/lang/Runnable
fn class_bytes() -> Vec<u8> {
    let mut b = Bytes::default();
    b.u4(0xCAFEBABE).u2(0).u2(52);

    b.u2(22)
        .utf8("my/MyClass") // 1
        .u1(7)
        .u2(1) // 2
        .utf8("java/lang/Object") // 3
        .u1(7)
        .u2(3) // 4
        .utf8("myField") // 5
        .utf8("I") // 6
        .utf8("<init>") // 7
        .utf8("()V") // 8
        .utf8("add") // 9
        .utf8("(I)F") // 10
        .utf8("Code") // 11
        .u1(5)
        .u8(1_234_567_890_123) // 12
        .u1(6)
        .u8(3.25f64.to_bits()) // 14
        .u1(12)
        .u2(7)
        .u2(8) // 16
        .u1(10)
        .u2(4)
        .u2(16) // 17
        .utf8("java/lang/Runnable") // 18
        .u1(7)
        .u2(18) // 19
        .u1(8)
        .u2(5) // 20
        .u1(4)
        .u4(2.5f32.to_bits()); // 21

    b.u2(0x0021).u2(2).u2(4);
    b.u2(1).u2(19);

    b.u2(1).u2(0x0012).u2(5).u2(6).u2(0);

    b.u2(2);
    b.u2(0x0001).u2(7).u2(8).u2(1);
    b.u2(11).u4(17);
    b.u2(1).u2(1).u4(5);
    b.u1(0x2a).u1(0xb7).u2(17).u1(0xb1);
    b.u2(0).u2(0);
    b.u2(0x0001).u2(9).u2(10).u2(0);

    b.u2(0);
    b.0
}

fn with_class_file(f: impl FnOnce(ClassFile)) {
    f(ClassFile::parse(&class_bytes()).unwrap());
}

#[test]
fn test_parse_consumes_the_whole_file() {
    let bytes = class_bytes();
    let mut parser = Parser::new(&bytes);
    parser.parse().unwrap();

    assert_eq!(bytes.len(), parser.position());
}

#[test]
fn test_version() {
    with_class_file(|class_file| assert_eq!((52, 0), class_file.version));
}

#[test]
fn test_super_class() {
    with_class_file(|class_file| {
        assert_eq!(Some("java/lang/Object"), class_file.super_class().unwrap())
    });
}

#[test]
fn test_class_name() {
    with_class_file(|class_file| assert_eq!("my/MyClass", class_file.class_name().unwrap()));
}

#[test]
fn test_class_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(
            AccessFlags::PUBLIC | AccessFlags::SUPER,
            class_file.access_flags
        )
    });
}

#[test]
fn test_interface_names() {
    with_class_file(|class_file| {
        assert_eq!(
            vec!["java/lang/Runnable"],
            class_file.interface_names().unwrap()
        )
    });
}

#[test]
fn test_field_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "myField",
            class_file.field_name(&class_file.fields[0]).unwrap()
        )
    });
}

#[test]
fn test_int_field_type() {
    with_class_file(|class_file| {
        assert_eq!(
            "I",
            class_file.field_descriptor(&class_file.fields[0]).unwrap()
        )
    });
}

#[test]
fn test_field_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(
            AccessFlags::FINAL | AccessFlags::PRIVATE,
            class_file.fields[0].access_flags
        )
    });
}

#[test]
fn test_constructor_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "<init>",
            class_file.method_name(&class_file.methods[0]).unwrap()
        )
    });
}

#[test]
fn test_constructor_code() {
    with_class_file(|class_file| {
        let code = class_file.methods[0]
            .attributes
            .code_attribute(&class_file.constant_pool)
            .unwrap()
            .unwrap();

        assert_eq!(1, code.max_stack);
        assert_eq!(vec![0x2a, 0xb7, 0x00, 0x11, 0xb1], code.code);
    });
}

#[test]
fn test_method_without_code() {
    with_class_file(|class_file| {
        assert!(class_file.methods[1]
            .attributes
            .code_attribute(&class_file.constant_pool)
            .unwrap()
            .is_none())
    });
}

#[test]
fn test_method_descriptor() {
    with_class_file(|class_file| {
        assert_eq!(
            "(I)F",
            class_file
                .method_descriptor(&class_file.methods[1])
                .unwrap()
        )
    });
}

#[test]
fn test_method_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(AccessFlags::PUBLIC, class_file.methods[1].access_flags)
    });
}

#[test]
fn test_wide_constants() {
    with_class_file(|class_file| {
        let cp = &class_file.constant_pool;

        assert_eq!(22, cp.count());
        assert_eq!(&CpInfo::Long(1_234_567_890_123), cp.get(12).unwrap());
        assert!(matches!(cp.get(13), Err(ClassFileError::InvalidIndex(13))));
        assert_eq!(&CpInfo::Double(3.25), cp.get(14).unwrap());
        assert!(cp.get(15).is_err());
        assert_eq!(&CpInfo::Float(2.5), cp.get(21).unwrap());
    });
}

#[test]
fn test_method_ref_chain() {
    with_class_file(|class_file| {
        let cp = &class_file.constant_pool;
        let CpInfo::MethodRef(method_ref) = cp.get(17).unwrap() else {
            panic!("expected a method ref");
        };
        let name_and_type = cp
            .require_name_and_type(method_ref.name_and_type_index)
            .unwrap();

        let class_info = cp.require_class(method_ref.class_index).unwrap();

        assert_eq!(3, class_info.name_index);
        assert_eq!("java/lang/Object", cp.require_utf8(class_info.name_index).unwrap());
        assert_eq!("<init>", cp.require_utf8(name_and_type.name_index).unwrap());
        assert_eq!("()V", cp.require_utf8(name_and_type.descriptor_index).unwrap());
    });
}

#[test]
fn test_class_name_requires_a_class_entry() {
    let mut bytes = class_bytes();
    // this_class -> the Utf8 at index 1
    let this_class_offset = bytes.len() - 61;
    assert_eq!([0x00, 0x02], bytes[this_class_offset..this_class_offset + 2]);
    bytes[this_class_offset + 1] = 0x01;

    let class_file = ClassFile::parse(&bytes).unwrap();
    assert!(matches!(
        class_file.class_name(),
        Err(ClassFileError::WrongTag {
            index: 1,
            expected: Tag::Class,
            found: Tag::Utf8
        })
    ));
}

#[test]
fn test_truncated_class_file() {
    let bytes = class_bytes();

    for len in [3, 9, 40, bytes.len() - 1] {
        assert!(matches!(
            ClassFile::parse(&bytes[..len]),
            Err(ClassFileError::OutOfBounds { .. })
        ));
    }
}

#[test]
fn test_four_byte_utf8_fails_the_load() {
    let mut bytes = class_bytes();
    // "my/MyClass" -> "my/\u{1F600}ass", same record length
    bytes[16..20].copy_from_slice(&[0xf0, 0x9f, 0x98, 0x80]);

    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(ClassFileError::MalformedUtf8 { index: 1 })
    ));
}

#[test]
fn test_unknown_constant_pool_tag() {
    let mut bytes = class_bytes();
    // tag of entry 2, after the header, the count and "my/MyClass"
    bytes[10 + 13] = 13;

    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(ClassFileError::UnknownTag { tag: 13, index: 2 })
    ));
}
