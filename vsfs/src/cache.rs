//! # 元数据缓存层
//!
//! 超级块、分配表、目录在挂载时整体读入内存，卸载时整体写回。
//! 文件操作只改动这里的副本。

use block_dev::BlockDevice;

use crate::volume::{self, AllocTable, Directory, SuperBlock};
use crate::{BlockId, Result};

#[derive(Debug, Clone)]
pub struct MetadataCache {
    pub super_block: SuperBlock,
    pub fat: AllocTable,
    pub dir: Directory,
}

impl MetadataCache {
    /// 刚格式化的卷：分配表全空，目录全空
    pub fn empty(super_block: SuperBlock) -> Self {
        let fat = AllocTable::new(BlockId::new(super_block.data_start), super_block.fat_slots());
        let dir = Directory::new(super_block.dir_capacity());
        Self {
            super_block,
            fat,
            dir,
        }
    }

    /// 依次读入超级块、分配表、目录，任何一块读取失败都立即返回
    pub fn load(dev: &dyn BlockDevice) -> Result<Self> {
        let block_size = dev.block_size();

        let mut block = vec![0; block_size];
        dev.read_block(BlockId::SUPER.index(), &mut block)?;
        let super_block = SuperBlock::decode(&block)?;
        super_block.validate(block_size)?;

        let sb = &super_block;
        let fat_bytes = volume::read_region(dev, sb.fat_area().start, sb.fat_blocks)?;
        let fat = AllocTable::decode(sb.data_area().start, sb.fat_slots(), &fat_bytes);

        let dir_bytes = volume::read_region(dev, sb.dir_area().start, sb.dir_blocks)?;
        let dir = Directory::decode(&dir_bytes, sb.dir_capacity())?;

        Ok(Self {
            super_block,
            fat,
            dir,
        })
    }

    /// 依次写回超级块、分配表、目录
    pub fn store(&self, dev: &dyn BlockDevice) -> Result<()> {
        let block = self.super_block.encode(dev.block_size())?;
        dev.write_block(BlockId::SUPER.index(), &block)?;
        self.store_fat(dev)?;
        self.store_dir(dev)
    }

    pub fn store_fat(&self, dev: &dyn BlockDevice) -> Result<()> {
        let sb = &self.super_block;
        let mut bytes = vec![0; sb.fat_blocks as usize * dev.block_size()];
        self.fat.encode(&mut bytes);
        volume::write_region(dev, sb.fat_area().start, &bytes)
    }

    pub fn store_dir(&self, dev: &dyn BlockDevice) -> Result<()> {
        let sb = &self.super_block;
        let mut bytes = vec![0; sb.dir_blocks as usize * dev.block_size()];
        self.dir.encode(&mut bytes)?;
        volume::write_region(dev, sb.dir_area().start, &bytes)
    }
}
