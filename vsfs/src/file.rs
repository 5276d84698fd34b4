//! # 文件操作层
//!
//! 把文件内的字节区间经由分配表链表翻译成对块设备的调用。
//! 块设备只能整块读写，跨越块内偏移的部分一律经过临时块缓冲。

use crate::fd_table::{OpenFile, OpenMode};
use crate::volume::DirEntry;
use crate::{Error, FileSystem, Result};

impl FileSystem {
    /// 在目录中创建空文件，目录区立即写回
    pub fn create(&mut self, name: &str) -> Result<()> {
        DirEntry::check_name(name)?;
        if self.meta.dir.find(name).is_some() {
            return Err(Error::AlreadyExists(name.to_owned()));
        }

        let index = self.meta.dir.find_free().ok_or(Error::DirectoryFull)?;
        *self.meta.dir.get_mut(index) = DirEntry::new(name);
        self.meta.store_dir(self.dev.as_ref())?;

        log::debug!("create {name:?} at entry {index}");
        Ok(())
    }

    /// 删除文件并归还其全部数据块，目录区立即写回
    pub fn delete(&mut self, name: &str) -> Result<()> {
        DirEntry::check_name(name)?;
        let index = self
            .meta
            .dir
            .find(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        if self.fd_table.is_open(index) {
            log::warn!("refuse to delete open file {name:?}");
            return Err(Error::Busy(name.to_owned()));
        }

        let freed = match self.meta.dir.get(index).start_block() {
            Some(head) => self.meta.fat.release(head)?,
            None => 0,
        };
        *self.meta.dir.get_mut(index) = DirEntry::default();
        self.meta.store_dir(self.dev.as_ref())?;

        log::debug!("delete {name:?}, {freed} blocks released");
        Ok(())
    }

    /// 打开文件，返回文件描述符。
    ///
    /// 游标仍记录在目录项中，但打开时会按模式重新定位：
    /// 读模式归零，追加模式移至文件末尾。
    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<usize> {
        DirEntry::check_name(name)?;
        let entry = self
            .meta
            .dir
            .find(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        if self.fd_table.is_open(entry) {
            return Err(Error::AlreadyOpen(name.to_owned()));
        }

        let fd = self.fd_table.insert(OpenFile { entry, mode })?;
        let dirent = self.meta.dir.get_mut(entry);
        let cursor = match mode {
            OpenMode::Read => 0,
            OpenMode::Append => dirent.size(),
        };
        dirent.set_cursor(cursor);

        log::debug!("open {name:?} for {mode} as fd {fd}");
        Ok(fd)
    }

    /// 释放文件描述符，不写回任何东西
    pub fn close(&mut self, fd: usize) -> Result<()> {
        self.fd_table.remove(fd)?;
        log::debug!("close fd {fd}");
        Ok(())
    }

    /// 文件字节数
    pub fn size(&self, fd: usize) -> Result<usize> {
        let file = self.fd_table.get(fd)?;
        Ok(self.meta.dir.get(file.entry).size())
    }

    /// 从游标处读取至多`buf.len()`字节，返回实际读取的字节数；
    /// 游标已在文件末尾时返回0。
    pub fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize> {
        let file = self.file(fd, OpenMode::Read)?;
        let block_size = self.block_size();

        let dirent = self.meta.dir.get(file.entry);
        let start = dirent.cursor();
        let len = buf.len().min(dirent.size().saturating_sub(start));
        if len == 0 {
            return Ok(0);
        }
        let end = start + len; // exclusive

        let n_skip = start / block_size;
        let n_take = end.div_ceil(block_size);
        let blocks = self.meta.fat.span(dirent.start_block(), n_skip..n_take)?;

        let mut block = vec![0; block_size];
        let mut cursor = start;
        for id in blocks {
            let offset = cursor % block_size;
            let done = cursor - start;
            let chunk = (block_size - offset).min(len - done);

            self.dev.read_block(id.index(), &mut block)?;
            buf[done..done + chunk].copy_from_slice(&block[offset..offset + chunk]);
            cursor += chunk;
        }
        debug_assert_eq!(cursor, end);

        self.meta.dir.get_mut(file.entry).set_cursor(cursor);
        Ok(len)
    }

    /// 在游标（即文件末尾）处追加`buf`，返回写入的字节数。
    ///
    /// 需要的新块在写入前一次性从分配表认领，不够时直接报错，文件不变。
    /// 写块中途失败时，已认领的块仍挂在链表上而大小不变，下次追加会复用它们。
    pub fn append(&mut self, fd: usize, buf: &[u8]) -> Result<usize> {
        let file = self.file(fd, OpenMode::Append)?;
        if buf.is_empty() {
            return Ok(0);
        }
        let block_size = self.block_size();

        let dirent = self.meta.dir.get(file.entry);
        let start = dirent.cursor();
        let end = start + buf.len(); // exclusive
        if u32::try_from(end).is_err() {
            return Err(Error::NoSpace);
        }

        // Expand
        let n_take = end.div_ceil(block_size);
        let head = self.meta.fat.grow(dirent.start_block(), n_take)?;
        self.meta.dir.get_mut(file.entry).set_start_block(head);

        let blocks = self.meta.fat.span(head, start / block_size..n_take)?;

        let mut block = vec![0; block_size];
        let mut cursor = start;
        for id in blocks {
            let offset = cursor % block_size;
            let done = cursor - start;
            let chunk = (block_size - offset).min(buf.len() - done);

            if offset > 0 {
                // 块内已有数据，先读后改
                self.dev.read_block(id.index(), &mut block)?;
            } else {
                block.fill(0);
            }
            block[offset..offset + chunk].copy_from_slice(&buf[done..done + chunk]);
            self.dev.write_block(id.index(), &block)?;
            cursor += chunk;
        }
        debug_assert_eq!(cursor, end);

        let dirent = self.meta.dir.get_mut(file.entry);
        dirent.set_cursor(end);
        dirent.resize(end);
        Ok(buf.len())
    }
}

impl FileSystem {
    /// 校验描述符已打开，且访问模式相符
    fn file(&self, fd: usize, mode: OpenMode) -> Result<OpenFile> {
        let file = self.fd_table.get(fd)?;
        if file.mode == mode {
            Ok(file)
        } else {
            Err(Error::WrongMode {
                fd,
                mode: file.mode,
            })
        }
    }
}
