mod byte_source;
mod file_source;

pub use byte_source::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le, ByteSource,
};
pub use file_source::FileSource;
