use std::fmt;

use crate::{parser::Parser, ConstantPool, Result};

/// A raw attribute; only its name is resolved, the payload is left undecoded.
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl Attribute {
    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<&'a str> {
        constant_pool.require_utf8(self.attribute_name_index)
    }
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Attribute(#{}, {} bytes)",
            self.attribute_name_index,
            self.info.len()
        )
    }
}

#[derive(Debug)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0.iter().find(|a| {
            a.name(constant_pool).map_or(false, |s| s == name)
        })
    }

    pub fn code_attribute(&self, constant_pool: &ConstantPool) -> Result<Option<CodeAttribute>> {
        self.find_by_name("Code", constant_pool)
            .map(|a| Parser::new(&a.info).parse_code_attribute())
            .transpose()
    }
}

#[derive(Debug)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
