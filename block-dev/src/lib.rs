//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 块编号从0开始，覆盖整个设备，块大小由驱动在创建时确定。
//! 驱动不做任何缓存，每次调用都直达底层存储。

use std::any::Any;
use std::fmt::Debug;
use std::io;

mod file;
mod ram;

pub use self::{file::BlockFile, ram::RamDisk};

/// 块设备驱动特质
pub trait BlockDevice: Debug + Send + Sync + Any {
    /// 一个块的字节量
    fn block_size(&self) -> usize;

    /// 读取整块。`buf`的长度必须等于块大小，读不满一块即报错。
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()>;

    /// 写入整块。`buf`的长度必须等于块大小，写不满一块即报错。
    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()>;
}

fn check_len(block_size: usize, buf_len: usize) -> io::Result<()> {
    if block_size == buf_len {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("buffer of {buf_len} bytes for a {block_size}-byte block"),
        ))
    }
}
