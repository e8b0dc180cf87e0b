use crate::{
    attributes::{Attributes, CodeAttribute, ExceptionTableEntry},
    class_file::{FieldInfo, MethodInfo},
};

use super::*;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

/// Decodes a class file from an in-memory buffer, one section after another.
pub struct Parser<'a> {
    r: Cursor<'a>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let this_class = self.r.read_u16()?;
        let super_class = self.r.read_u16()?;

        let interfaces_count = self.r.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.r.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.r.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.r.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes()?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.r.position()
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.r.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.r.read_u16()?;
        let major = self.r.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u16()?;

        ConstantPool::decode(&mut self.r, constant_pool_count)
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.r.read_u16()?;
        let attribute_length = self.r.read_u32()?;
        let info = self.r.read_bytes(attribute_length as usize)?.to_vec();

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self) -> Result<Attributes> {
        let attributes_count = self.r.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub fn parse_code_attribute(&mut self) -> Result<CodeAttribute> {
        let max_stack = self.r.read_u16()?;
        let max_locals = self.r.read_u16()?;
        let code_length = self.r.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?.to_vec();
        let exception_table_length = self.r.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes()?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.r.read_u16()?;
        let end_pc = self.r.read_u16()?;
        let handler_pc = self.r.read_u16()?;
        let catch_type = self.r.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }
}
