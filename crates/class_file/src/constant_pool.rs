use std::fmt;

use crate::{ClassFileError, Cursor, Result};

/// Fetches the entry at `$index` and unwraps it as the `$i` variant, failing with
/// [`ClassFileError::WrongTag`](crate::ClassFileError::WrongTag) otherwise.
#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Ok($crate::constant_pool::CpInfo::$i(n)) => Ok(n),
            Ok(c) => Err($crate::ClassFileError::WrongTag {
                index: $index,
                expected: $crate::constant_pool::Tag::$i,
                found: c.tag(),
            }),
            Err(e) => Err(e),
        }
    };
}

/// An immutable, 1-based table of decoded constant pool entries.
///
/// Slot 0 and the slot following every `Long` or `Double` are never populated.
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<Option<CpInfo>>,
}
impl ConstantPool {
    /// Decodes `count - 1` entries starting at the cursor position.
    ///
    /// `count` is the raw `constant_pool_count` from the class file. On success
    /// the cursor is left directly after the last record. The first malformed
    /// record aborts the whole decode.
    pub fn decode(r: &mut Cursor<'_>, count: u16) -> Result<Self> {
        let count = count as usize;
        let mut cp_infos = vec![None; count];

        let mut index = 1;
        while index < count {
            let cp_info = CpInfo::decode(r, index as u16)?;
            let slot_size = cp_info.slot_size();
            cp_infos[index] = Some(cp_info);

            index += slot_size;
        }

        Ok(Self { cp_infos })
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        self.cp_infos
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::InvalidIndex(index))
    }

    pub fn require_utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn require_class(&self, index: u16) -> Result<&ClassInfo> {
        matches_cp_info!(self, index, Class)
    }

    pub fn require_name_and_type(&self, index: u16) -> Result<&NameAndTypeInfo> {
        matches_cp_info!(self, index, NameAndType)
    }

    /// The declared `constant_pool_count`, including the reserved slot 0 and
    /// phantom slots. Not the number of entries.
    pub fn count(&self) -> usize {
        self.cp_infos.len()
    }

    /// True when no slot holds an entry, which is the case for a count of 0 or 1.
    pub fn is_empty(&self) -> bool {
        self.cp_infos.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.cp_infos.iter().enumerate(),
        }
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = (u16, &'a CpInfo);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Populated entries of a [`ConstantPool`] with their indices, in index order.
pub struct Iter<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Option<CpInfo>>>,
}
impl<'a> Iterator for Iter<'a> {
    type Item = (u16, &'a CpInfo);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .find_map(|(i, cp_info)| cp_info.as_ref().map(|c| (i as u16, c)))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Tag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Tag::Utf8),
            3 => Ok(Tag::Integer),
            4 => Ok(Tag::Float),
            5 => Ok(Tag::Long),
            6 => Ok(Tag::Double),
            7 => Ok(Tag::Class),
            8 => Ok(Tag::String),
            9 => Ok(Tag::FieldRef),
            10 => Ok(Tag::MethodRef),
            11 => Ok(Tag::InterfaceMethodRef),
            12 => Ok(Tag::NameAndType),
            _ => Err(value),
        }
    }
}

impl Tag {
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Utf8 => "Utf8",
            Tag::Integer => "Integer",
            Tag::Float => "Float",
            Tag::Long => "Long",
            Tag::Double => "Double",
            Tag::Class => "Class",
            Tag::String => "String",
            Tag::FieldRef => "Fieldref",
            Tag::MethodRef => "Methodref",
            Tag::InterfaceMethodRef => "InterfaceMethodref",
            Tag::NameAndType => "NameAndType",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String(StringInfo),
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
}
impl CpInfo {
    fn decode(r: &mut Cursor<'_>, index: u16) -> Result<Self> {
        let tag = r.read_u8()?;
        let tag = Tag::try_from(tag).map_err(|tag| ClassFileError::UnknownTag { tag, index })?;

        Ok(match tag {
            Tag::Utf8 => Self::decode_utf8(r, index)?,
            Tag::Integer => CpInfo::Integer(r.read_i32()?),
            Tag::Float => CpInfo::Float(f32::from_bits(r.read_u32()?)),
            Tag::Long => CpInfo::Long(r.read_i64()?),
            Tag::Double => CpInfo::Double(f64::from_bits(r.read_u64()?)),
            Tag::Class => CpInfo::Class(ClassInfo {
                name_index: r.read_u16()?,
            }),
            Tag::String => CpInfo::String(StringInfo {
                string_index: r.read_u16()?,
            }),
            Tag::FieldRef => CpInfo::FieldRef(RefInfo::decode(r)?),
            Tag::MethodRef => CpInfo::MethodRef(RefInfo::decode(r)?),
            Tag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(RefInfo::decode(r)?),
            Tag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
                name_index: r.read_u16()?,
                descriptor_index: r.read_u16()?,
            }),
        })
    }

    fn decode_utf8(r: &mut Cursor<'_>, index: u16) -> Result<Self> {
        let length = r.read_u16()?;
        let bytes = r.read_bytes(length as usize)?;

        decode_modified_utf8(bytes)
            .map(CpInfo::Utf8)
            .ok_or(ClassFileError::MalformedUtf8 { index })
    }

    pub fn tag(&self) -> Tag {
        match self {
            CpInfo::Utf8(_) => Tag::Utf8,
            CpInfo::Integer(_) => Tag::Integer,
            CpInfo::Float(_) => Tag::Float,
            CpInfo::Long(_) => Tag::Long,
            CpInfo::Double(_) => Tag::Double,
            CpInfo::Class(_) => Tag::Class,
            CpInfo::String(_) => Tag::String,
            CpInfo::FieldRef(_) => Tag::FieldRef,
            CpInfo::MethodRef(_) => Tag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => Tag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => Tag::NameAndType,
        }
    }

    /// Number of pool indices the entry occupies.
    pub fn slot_size(&self) -> usize {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    pub fn is_wide(&self) -> bool {
        self.is_long() || self.is_double()
    }

    pub fn is_utf8(&self) -> bool {
        self.tag() == Tag::Utf8
    }

    pub fn is_integer(&self) -> bool {
        self.tag() == Tag::Integer
    }

    pub fn is_float(&self) -> bool {
        self.tag() == Tag::Float
    }

    pub fn is_long(&self) -> bool {
        self.tag() == Tag::Long
    }

    pub fn is_double(&self) -> bool {
        self.tag() == Tag::Double
    }

    pub fn is_class(&self) -> bool {
        self.tag() == Tag::Class
    }

    pub fn is_string(&self) -> bool {
        self.tag() == Tag::String
    }

    pub fn is_field_ref(&self) -> bool {
        self.tag() == Tag::FieldRef
    }

    pub fn is_method_ref(&self) -> bool {
        self.tag() == Tag::MethodRef
    }

    pub fn is_interface_method_ref(&self) -> bool {
        self.tag() == Tag::InterfaceMethodRef
    }

    pub fn is_name_and_type(&self) -> bool {
        self.tag() == Tag::NameAndType
    }
}

impl fmt::Display for CpInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<18} ", self.tag())?;
        match self {
            CpInfo::Utf8(s) => write!(f, "{}", s),
            CpInfo::Integer(i) => write!(f, "{}", i),
            CpInfo::Float(v) => write!(f, "{}f", v),
            CpInfo::Long(l) => write!(f, "{}l", l),
            CpInfo::Double(d) => write!(f, "{}d", d),
            CpInfo::Class(ClassInfo { name_index }) => write!(f, "#{}", name_index),
            CpInfo::String(StringInfo { string_index }) => write!(f, "#{}", string_index),
            CpInfo::FieldRef(ref_info)
            | CpInfo::MethodRef(ref_info)
            | CpInfo::InterfaceMethodRef(ref_info) => write!(
                f,
                "#{}.#{}",
                ref_info.class_index, ref_info.name_and_type_index
            ),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index,
                descriptor_index,
            }) => write!(f, "#{}:#{}", name_index, descriptor_index),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}
impl RefInfo {
    fn decode(r: &mut Cursor<'_>) -> Result<Self> {
        let class_index = r.read_u16()?;
        let name_and_type_index = r.read_u16()?;

        Ok(Self {
            class_index,
            name_and_type_index,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Must index a Utf8 entry holding a binary class name in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StringInfo {
    pub string_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

// Class files encode strings as modified UTF-8: NUL is written as C0 80,
// supplementary characters as two three-byte surrogates, and no four-byte
// forms exist.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut bytes = bytes.iter().copied();
    while let Some(a) = bytes.next() {
        let unit = match a {
            0x01..=0x7f => a as u16,
            0xc0..=0xdf => {
                let b = continuation(bytes.next()?)?;
                let unit = (a as u16 & 0x1f) << 6 | b;
                // C0 80 is the only overlong form allowed
                if unit != 0 && unit < 0x80 {
                    return None;
                }
                unit
            }
            0xe0..=0xef => {
                let b = continuation(bytes.next()?)?;
                let c = continuation(bytes.next()?)?;
                let unit = (a as u16 & 0x0f) << 12 | b << 6 | c;
                if unit < 0x800 {
                    return None;
                }
                unit
            }
            _ => return None,
        };
        units.push(unit);
    }

    String::from_utf16(&units).ok()
}

fn continuation(byte: u8) -> Option<u16> {
    (byte & 0xc0 == 0x80).then(|| (byte & 0x3f) as u16)
}
