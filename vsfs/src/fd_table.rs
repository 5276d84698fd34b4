//! # 文件描述符层
//!
//! 打开文件表把一个小整数（文件描述符）映射到目录项下标与访问模式。
//! 同一个文件同时至多占据一个槽位。

use derive_more::Display;

use crate::{Error, Result, MAX_OPEN_FILES};

/// 访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OpenMode {
    /// 只读，打开时游标归零
    #[display(fmt = "read")]
    Read,
    /// 只追加，打开时游标移至文件末尾；不可经由同一描述符读取
    #[display(fmt = "append")]
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFile {
    /// 目录项下标
    pub entry: usize,
    pub mode: OpenMode,
}

#[derive(Debug, Default)]
pub struct FdTable {
    slots: [Option<OpenFile>; MAX_OPEN_FILES],
}

impl FdTable {
    /// 占据第一个空闲槽位，返回文件描述符
    pub fn insert(&mut self, file: OpenFile) -> Result<usize> {
        let fd = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::TableFull)?;
        self.slots[fd] = Some(file);
        Ok(fd)
    }

    pub fn get(&self, fd: usize) -> Result<OpenFile> {
        self.slots
            .get(fd)
            .ok_or(Error::BadDescriptor(fd))?
            .ok_or(Error::NotOpen(fd))
    }

    pub fn remove(&mut self, fd: usize) -> Result<OpenFile> {
        self.slots
            .get_mut(fd)
            .ok_or(Error::BadDescriptor(fd))?
            .take()
            .ok_or(Error::NotOpen(fd))
    }

    /// 目录项是否已被打开
    pub fn is_open(&self, entry: usize) -> bool {
        self.slots.iter().flatten().any(|file| file.entry == entry)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}
