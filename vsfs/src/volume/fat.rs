//! 分配表：每个数据块对应一个32位条目，
//! 同一文件的数据块经由条目串成单向链表。
//!
//! 第`i`个条目描述绝对块号为`data_start + i`的数据块，
//! 条目内存放的是链表上下一块的绝对块号。

use core::mem;
use core::ops::Range;

use crate::{BlockId, Error, Result};

/// 分配表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// 未分配
    Free,
    /// 已分配，且为链表上最后一块
    End,
    /// 已分配，指向下一块
    Next(BlockId),
}

impl Link {
    /// 全1：未分配。格式化时整个分配表都填此值
    pub const FREE: u32 = u32::MAX;
    /// 链表结尾
    pub const END: u32 = u32::MAX - 1;
}

impl From<u32> for Link {
    fn from(raw: u32) -> Self {
        match raw {
            Self::FREE => Self::Free,
            Self::END => Self::End,
            next => Self::Next(BlockId::new(next)),
        }
    }
}

impl From<Link> for u32 {
    fn from(link: Link) -> Self {
        match link {
            Link::Free => Link::FREE,
            Link::End => Link::END,
            Link::Next(id) => id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AllocTable {
    links: Vec<Link>,
    /// 数据区的起始块
    data_start: BlockId,
}

impl AllocTable {
    const ENTRY_SIZE: usize = mem::size_of::<u32>();

    /// 全部空闲的分配表
    pub fn new(data_start: BlockId, slots: usize) -> Self {
        Self {
            links: vec![Link::Free; slots],
            data_start,
        }
    }

    /// 从分配表区的原始字节解码出前`slots`个条目
    pub fn decode(data_start: BlockId, slots: usize, bytes: &[u8]) -> Self {
        let links = bytes
            .chunks_exact(Self::ENTRY_SIZE)
            .take(slots)
            .map(|raw| {
                let raw: [u8; Self::ENTRY_SIZE] = raw.try_into().unwrap_or([0xFF; 4]);
                Link::from(u32::from_le_bytes(raw))
            })
            .collect();
        Self { links, data_start }
    }

    /// 编码进整个分配表区，可用范围之外的条目一律为空闲
    pub fn encode(&self, bytes: &mut [u8]) {
        bytes.fill(0xFF);
        for (&link, raw) in self.links.iter().zip(bytes.chunks_exact_mut(Self::ENTRY_SIZE)) {
            raw.copy_from_slice(&u32::from(link).to_le_bytes());
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.links.iter().filter(|&&link| link == Link::Free).count()
    }

    pub fn link(&self, id: BlockId) -> Result<Link> {
        self.slot(id).map(|slot| self.links[slot])
    }

    /// 获取下一块的块号。
    /// 若`id`指向未分配块，则报错。
    /// `Ok(None)`表示`id`为链表上最后一块。
    pub fn next(&self, id: BlockId) -> Result<Option<BlockId>> {
        match self.link(id)? {
            Link::Free => Err(Error::BrokenChain(id.into())),
            Link::End => Ok(None),
            Link::Next(next) => Ok(Some(next)),
        }
    }

    /// 首次适配：认领第一个空闲块，并将其标为链尾。
    pub fn alloc(&mut self) -> Option<BlockId> {
        let slot = self.links.iter().position(|&link| link == Link::Free)?;
        self.links[slot] = Link::End;
        Some(self.data_start + slot as u32)
    }

    /// 将`next`接在链尾`prev`之后
    pub fn couple(&mut self, prev: BlockId, next: BlockId) -> Result<()> {
        let slot = self.slot(prev)?;
        if self.links[slot] != Link::End {
            return Err(Error::BrokenChain(prev.into()));
        }
        self.links[slot] = Link::Next(next);
        Ok(())
    }

    /// 以`head`为首的链表
    pub fn chain(&self, head: Option<BlockId>) -> Chain<'_> {
        Chain {
            fat: self,
            next: head,
            remaining: self.links.len(),
        }
    }

    /// 链表上第`range`个块，链表不够长即视为损坏
    pub fn span(&self, head: Option<BlockId>, range: Range<usize>) -> Result<Vec<BlockId>> {
        let mut blocks = Vec::with_capacity(range.len());
        let mut last = head;
        for (i, id) in self.chain(head).take(range.end).enumerate() {
            let id = id?;
            if i >= range.start {
                blocks.push(id);
            }
            last = Some(id);
        }

        if blocks.len() == range.len() {
            Ok(blocks)
        } else {
            let at = last.map_or(0, u32::from);
            log::error!("chain from {head:?} is shorter than {} blocks", range.end);
            Err(Error::BrokenChain(at))
        }
    }

    /// 将链表延长至`blocks`块，返回（可能是新的）链首。
    ///
    /// 空闲块不足时直接报错，不改动分配表。
    pub fn grow(&mut self, head: Option<BlockId>, blocks: usize) -> Result<Option<BlockId>> {
        let mut tail = None;
        let mut len = 0;
        for id in self.chain(head) {
            tail = Some(id?);
            len += 1;
        }

        let extra = blocks.saturating_sub(len);
        if extra > self.free_count() {
            return Err(Error::NoSpace);
        }

        let mut head = head;
        for _ in 0..extra {
            let id = self.alloc().ok_or(Error::NoSpace)?;
            match tail {
                Some(prev) => self.couple(prev, id)?,
                None => head = Some(id),
            }
            tail = Some(id);
        }

        Ok(head)
    }

    /// 释放整个链表，返回释放的块数。
    pub fn release(&mut self, head: BlockId) -> Result<usize> {
        let mut next = Some(head);
        let mut freed = 0;

        while let Some(id) = next {
            if freed == self.links.len() {
                log::error!("chain from {head} loops");
                return Err(Error::BrokenChain(id.into()));
            }

            let slot = self.slot(id)?;
            next = match self.links[slot] {
                Link::Free => return Err(Error::BrokenChain(id.into())),
                Link::End => None,
                Link::Next(next) => Some(next),
            };
            self.links[slot] = Link::Free;
            freed += 1;
        }

        Ok(freed)
    }
}

impl AllocTable {
    /// 块号在分配表内的下标
    fn slot(&self, id: BlockId) -> Result<usize> {
        id.index()
            .checked_sub(self.data_start.index())
            .filter(|&slot| slot < self.links.len())
            .ok_or(Error::BrokenChain(id.into()))
    }
}

/// 沿链表逐块前进的迭代器
///
/// 遇到损坏的链表时产出一个错误后结束；
/// 步数不超过分配表的长度，链表成环也能终止。
#[derive(Debug)]
pub struct Chain<'a> {
    fat: &'a AllocTable,
    next: Option<BlockId>,
    remaining: usize,
}

impl Iterator for Chain<'_> {
    type Item = Result<BlockId>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if self.remaining == 0 {
            return Some(Err(Error::BrokenChain(id.into())));
        }
        self.remaining -= 1;

        match self.fat.next(id) {
            Ok(next) => {
                self.next = next;
                Some(Ok(id))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
