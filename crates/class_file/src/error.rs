use thiserror::Error;

use crate::constant_pool::Tag;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Read of {needed} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("Unknown cp info tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },
    #[error("Invalid constant pool index: {0}")]
    InvalidIndex(u16),
    #[error("Expected {expected} at constant pool index {index}, found {found}")]
    WrongTag { index: u16, expected: Tag, found: Tag },
    #[error("Malformed modified UTF-8 at constant pool index {index}")]
    MalformedUtf8 { index: u16 },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
}
