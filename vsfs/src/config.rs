use crate::{Error, Result};

/// 卷的几何参数
///
/// 分配表与目录的块数与卷大小无关，卷的其余部分都是数据区。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 一个块的字节量
    pub block_size: usize,
    /// 分配表占用块数
    pub fat_blocks: u32,
    /// 目录占用块数
    pub dir_blocks: u32,
    /// 卷大小为`2^m`字节，`m`的下限
    pub min_size_exp: u32,
    /// `m`的上限
    pub max_size_exp: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            block_size: 2048,
            fat_blocks: 32,
            dir_blocks: 8,
            min_size_exp: 18, // 256 KiB
            max_size_exp: 23, // 8 MiB
        }
    }
}

impl Geometry {
    pub fn validate(&self) -> Result<()> {
        if !self.block_size.is_power_of_two() || !(512..=65536).contains(&self.block_size) {
            return Err(Error::InvalidGeometry(
                "block size must be a power of two in 512..=65536",
            ));
        }
        if self.fat_blocks == 0 || self.dir_blocks == 0 {
            return Err(Error::InvalidGeometry(
                "allocation table and directory need at least one block each",
            ));
        }
        if self.min_size_exp > self.max_size_exp || self.max_size_exp > 31 {
            return Err(Error::InvalidGeometry("size exponent bounds are inconsistent"));
        }

        let min_blocks = (1u64 << self.min_size_exp) / self.block_size as u64;
        let meta_blocks = 1 + self.fat_blocks as u64 + self.dir_blocks as u64;
        if min_blocks <= meta_blocks {
            return Err(Error::InvalidGeometry(
                "smallest volume leaves no room for data blocks",
            ));
        }

        Ok(())
    }

    /// 校验`m`并返回卷的字节数
    pub fn volume_size(&self, m: u32) -> Result<u64> {
        if (self.min_size_exp..=self.max_size_exp).contains(&m) {
            Ok(1 << m)
        } else {
            Err(Error::InvalidSize(m))
        }
    }
}
