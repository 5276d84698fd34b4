use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::{check_len, BlockDevice};

/// 以宿主机上的普通文件充当块设备
#[derive(Debug)]
pub struct BlockFile {
    inner: Mutex<File>,
    block_size: usize,
}

impl BlockFile {
    pub fn new(fd: File, block_size: usize) -> Self {
        Self {
            inner: Mutex::new(fd),
            block_size,
        }
    }

    /// 创建或截断`path`，并将其长度设为`len`字节。
    pub fn create(path: impl AsRef<Path>, len: u64, block_size: usize) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        fd.set_len(len)?;
        Ok(Self::new(fd, block_size))
    }

    /// 以读写方式打开已有的镜像。
    pub fn open(path: impl AsRef<Path>, block_size: usize) -> io::Result<Self> {
        let fd = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::new(fd, block_size))
    }

    /// 镜像文件的字节长度
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.lock()?.metadata()?.len())
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "block file lock poisoned"))
    }

    fn offset(&self, block_id: usize) -> u64 {
        (block_id * self.block_size) as u64
    }
}

impl BlockDevice for BlockFile {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        check_len(self.block_size, buf.len())?;
        let mut file = self.lock()?;
        file.seek(SeekFrom::Start(self.offset(block_id)))?;
        // 文件末尾之后的块读不满，视为设备错误
        file.read_exact(buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        check_len(self.block_size, buf.len())?;
        let mut file = self.lock()?;
        file.seek(SeekFrom::Start(self.offset(block_id)))?;
        file.write_all(buf)
    }
}
