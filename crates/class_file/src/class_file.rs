use crate::{
    attributes::Attributes, constant_pool::ClassInfo, matches_cp_info, parser::Parser, AccessFlags,
    ConstantPool, Result,
};

#[derive(Debug)]
pub struct ClassFile {
    /// `(major, minor)`
    pub version: (u16, u16),
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn super_class(&self) -> Result<Option<&str>> {
        // Only java/lang/Object has no direct superclass, and it is the only
        // class file with a zero super_class.
        if self.super_class == 0 {
            return Ok(None);
        }

        self.class_name_at(self.super_class).map(Some)
    }

    pub fn class_name(&self) -> Result<&str> {
        self.class_name_at(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.class_name_at(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.require_utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.require_utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.require_utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.require_utf8(method.descriptor_index)
    }

    // Class -> name_index -> Utf8
    fn class_name_at(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self.constant_pool, index, Class)?;

        self.constant_pool.require_utf8(*name_index)
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
