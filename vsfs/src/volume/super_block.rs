use std::io::Cursor;
use std::ops::Range;

use binrw::{binrw, BinRead, BinWrite};

use crate::volume::DirEntry;
use crate::{BlockId, Error, Geometry, Result, MAX_DIR_ENTRIES};

/// 超级块：
/// - 记录卷的静态几何信息；
/// - 定位分配表、目录、数据区三段连续区域
#[binrw]
#[brw(little, magic = b"VSFS")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    /// 卷的字节数
    pub size: u32,
    pub block_size: u32,
    pub fat_start: u32,
    pub fat_blocks: u32,
    pub dir_start: u32,
    pub dir_blocks: u32,
    pub data_start: u32,
    pub data_blocks: u32,
}

impl SuperBlock {
    /// 魔数加上八个字段
    pub const SIZE: usize = 4 + 8 * 4;

    pub fn new(size: u64, geometry: &Geometry) -> Self {
        let block_size = geometry.block_size as u32;
        let total_blocks = (size / geometry.block_size as u64) as u32;

        let fat_start = 1;
        let dir_start = fat_start + geometry.fat_blocks;
        let data_start = dir_start + geometry.dir_blocks;

        Self {
            size: size as u32,
            block_size,
            fat_start,
            fat_blocks: geometry.fat_blocks,
            dir_start,
            dir_blocks: geometry.dir_blocks,
            data_start,
            data_blocks: total_blocks - 1 - geometry.fat_blocks - geometry.dir_blocks,
        }
    }

    pub fn decode(block: &[u8]) -> Result<Self> {
        match Self::read(&mut Cursor::new(block)) {
            Ok(sb) => Ok(sb),
            Err(binrw::Error::BadMagic { .. }) => Err(Error::InvalidSuperBlock),
            Err(e) => Err(e.into()),
        }
    }

    /// 编码为一整块，剩余部分填0
    pub fn encode(&self, block_size: usize) -> Result<Vec<u8>> {
        let mut block = vec![0; block_size];
        self.write(&mut Cursor::new(&mut block[..]))?;
        Ok(block)
    }

    /// 检查各区域的排布是否自洽
    pub fn validate(&self, block_size: usize) -> Result<()> {
        // 字段来自磁盘，求和可能溢出
        let valid = self.block_size as usize == block_size
            && self.size % self.block_size == 0
            && self.fat_start == 1
            && self.fat_blocks > 0
            && self.fat_start.checked_add(self.fat_blocks) == Some(self.dir_start)
            && self.dir_blocks > 0
            && self.dir_start.checked_add(self.dir_blocks) == Some(self.data_start)
            && self.data_start.checked_add(self.data_blocks) == Some(self.total_blocks());

        if valid {
            Ok(())
        } else {
            log::error!("inconsistent superblock {self:?}");
            Err(Error::InvalidSuperBlock)
        }
    }

    #[inline]
    pub fn total_blocks(&self) -> u32 {
        self.size / self.block_size
    }

    pub fn fat_area(&self) -> Range<BlockId> {
        let start = BlockId::new(self.fat_start);
        start..start + self.fat_blocks
    }

    pub fn dir_area(&self) -> Range<BlockId> {
        let start = BlockId::new(self.dir_start);
        start..start + self.dir_blocks
    }

    pub fn data_area(&self) -> Range<BlockId> {
        let start = BlockId::new(self.data_start);
        start..start + self.data_blocks
    }

    /// 分配表实际可用的条目数：
    /// 数据块数与分配表容量取小者
    pub fn fat_slots(&self) -> usize {
        let capacity = self.fat_blocks as usize * self.block_size as usize / 4;
        capacity.min(self.data_blocks as usize)
    }

    /// 目录项数量
    pub fn dir_capacity(&self) -> usize {
        let capacity = self.dir_blocks as usize * self.block_size as usize / DirEntry::SIZE;
        capacity.min(MAX_DIR_ENTRIES)
    }
}
