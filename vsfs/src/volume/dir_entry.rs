use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};
use enumflags2::{bitflags, BitFlags};

use crate::{BlockId, Error, Result};

/// 文件名最长字节数，不足的部分填0
pub const NAME_CAP: usize = 30;

/// 文件的元信息，磁盘上占128字节，未用部分填0
#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: [u8; NAME_CAP],

    /// 文件字节数
    size: u32,

    /// 首个数据块的绝对块号，0表示没有数据块
    start_block: u32,

    /// 读写游标，即文件内偏移
    cursor: u32,

    flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[bitflags]
#[repr(u8)]
pub enum EntryFlag {
    Used = 0b0000_0001,
}

impl DirEntry {
    /// 目录项大小恒为128字节
    pub const SIZE: usize = 128;

    /// 新建一个空文件的目录项，`name`须先经过[`DirEntry::check_name`]
    pub fn new(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut raw = [0; NAME_CAP];
        raw[..bytes.len()].copy_from_slice(bytes);

        Self {
            name: raw,
            flags: BitFlags::from_flag(EntryFlag::Used).bits(),
            ..Default::default()
        }
    }

    /// 文件名须非空、不含NUL，且不超过[`NAME_CAP`]字节
    pub fn check_name(name: &str) -> Result<()> {
        if name.is_empty() || name.len() > NAME_CAP || name.contains('\0') {
            Err(Error::InvalidName(name.to_owned()))
        } else {
            Ok(())
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    /// 编码至`slot`的开头，`slot`的其余部分保持不变
    pub fn encode(&self, slot: &mut [u8]) -> Result<()> {
        Ok(self.write(&mut Cursor::new(slot))?)
    }

    pub fn name_bytes(&self) -> &[u8] {
        let len = self.name.iter().position(|&c| c == 0).unwrap_or(NAME_CAP);
        &self.name[..len]
    }

    pub fn name(&self) -> &str {
        core::str::from_utf8(self.name_bytes()).unwrap_or_default()
    }

    #[inline]
    pub fn flags(&self) -> BitFlags<EntryFlag> {
        BitFlags::from_bits_truncate(self.flags)
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.flags().contains(EntryFlag::Used)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor as usize
    }

    pub fn start_block(&self) -> Option<BlockId> {
        (self.start_block != 0).then_some(BlockId::new(self.start_block))
    }

    pub fn set_start_block(&mut self, id: Option<BlockId>) {
        self.start_block = id.map_or(0, u32::from);
    }

    /// 文件大小受限于卷大小，不会超出`u32`
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor as u32;
    }

    pub fn resize(&mut self, size: usize) {
        self.size = size as u32;
    }
}
