//! 卷的布局
//!
//! 超级块 | 分配表 | 目录 | 数据区
//!
//! 所有整数均为小端序。

mod dir_entry;
mod directory;
mod fat;
mod super_block;

use block_dev::BlockDevice;

pub use self::{
    dir_entry::{DirEntry, EntryFlag},
    directory::Directory,
    fat::{AllocTable, Chain, Link},
    super_block::SuperBlock,
};
use crate::{BlockId, Result};

/// 逐块读入一段连续区域
pub(crate) fn read_region(dev: &dyn BlockDevice, start: BlockId, blocks: u32) -> Result<Vec<u8>> {
    let block_size = dev.block_size();
    let mut bytes = vec![0; blocks as usize * block_size];
    for (i, buf) in bytes.chunks_exact_mut(block_size).enumerate() {
        dev.read_block(start.index() + i, buf)?;
    }
    Ok(bytes)
}

/// 逐块写回一段连续区域，`bytes`的长度必须是块大小的整数倍
pub(crate) fn write_region(dev: &dyn BlockDevice, start: BlockId, bytes: &[u8]) -> Result<()> {
    let block_size = dev.block_size();
    debug_assert_eq!(0, bytes.len() % block_size);
    for (i, buf) in bytes.chunks_exact(block_size).enumerate() {
        dev.write_block(start.index() + i, buf)?;
    }
    Ok(())
}
