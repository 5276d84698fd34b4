use std::io;
use std::sync::Mutex;

use crate::{check_len, BlockDevice};

/// 内存中的块设备，容量固定
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    block_size: usize,
}

impl RamDisk {
    pub fn new(len: usize, block_size: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; len]),
            block_size,
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().map_or(0, |data| data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn range(&self, block_id: usize, len: usize) -> io::Result<std::ops::Range<usize>> {
        let start = block_id * self.block_size;
        let end = start + self.block_size;
        if end > len {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("block {block_id} lies past the end of the disk"),
            ))
        } else {
            Ok(start..end)
        }
    }
}

impl BlockDevice for RamDisk {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        check_len(self.block_size, buf.len())?;
        let data = self
            .data
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "ram disk lock poisoned"))?;
        let range = self.range(block_id, data.len())?;
        buf.copy_from_slice(&data[range]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        check_len(self.block_size, buf.len())?;
        let mut data = self
            .data
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "ram disk lock poisoned"))?;
        let range = self.range(block_id, data.len())?;
        data[range].copy_from_slice(buf);
        Ok(())
    }
}
