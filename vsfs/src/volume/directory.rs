use crate::volume::DirEntry;
use crate::Result;

/// 平坦的目录表，目录区内连续存放[`DirEntry`]
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![DirEntry::default(); capacity],
        }
    }

    /// 从目录区的原始字节解码出前`capacity`个目录项
    pub fn decode(bytes: &[u8], capacity: usize) -> Result<Self> {
        let entries = bytes
            .chunks_exact(DirEntry::SIZE)
            .take(capacity)
            .map(DirEntry::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// 编码进整个目录区，多余的空间填0
    pub fn encode(&self, bytes: &mut [u8]) -> Result<()> {
        bytes.fill(0);
        for (entry, slot) in self.entries.iter().zip(bytes.chunks_exact_mut(DirEntry::SIZE)) {
            entry.encode(slot)?;
        }
        Ok(())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// 按名字精确查找使用中的目录项
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_used() && entry.name_bytes() == name.as_bytes())
    }

    /// 第一个空闲的目录项
    pub fn find_free(&self) -> Option<usize> {
        self.entries.iter().position(|entry| !entry.is_used())
    }

    #[inline]
    pub fn get(&self, index: usize) -> &DirEntry {
        &self.entries[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut DirEntry {
        &mut self.entries[index]
    }

    pub fn used(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter(|entry| entry.is_used())
    }
}
