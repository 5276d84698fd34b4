use std::path::Path;
use std::sync::Arc;

use block_dev::{BlockDevice, BlockFile};

use crate::cache::MetadataCache;
use crate::fd_table::FdTable;
use crate::volume::SuperBlock;
use crate::{Error, Geometry, Result};

/// 一次挂载的会话：设备、元数据缓存与打开文件表
///
/// 元数据的改动只在内存中，直到[`FileSystem::sync`]或[`FileSystem::unmount`]；
/// 进程意外终止会丢失这之间的目录与分配表改动（数据块本身已落盘）。
#[derive(Debug)]
pub struct FileSystem {
    pub(crate) dev: Arc<dyn BlockDevice>,
    pub(crate) meta: MetadataCache,
    pub(crate) fd_table: FdTable,
}

impl FileSystem {
    /// 以默认几何参数格式化`path`，卷大小为`2^m`字节
    pub fn format(path: impl AsRef<Path>, m: u32) -> Result<()> {
        Self::format_with(path, m, &Geometry::default())
    }

    pub fn format_with(path: impl AsRef<Path>, m: u32, geometry: &Geometry) -> Result<()> {
        geometry.validate()?;
        let size = geometry.volume_size(m)?;

        let dev: Arc<dyn BlockDevice> =
            Arc::new(BlockFile::create(path, size, geometry.block_size)?);
        Self::format_device(&dev, m, geometry)
    }

    /// 在已有设备上建立文件系统：写超级块、全空的分配表、全空的目录。
    ///
    /// 不保证原子性，中途写入失败会留下不完整的卷。
    pub fn format_device(dev: &Arc<dyn BlockDevice>, m: u32, geometry: &Geometry) -> Result<()> {
        geometry.validate()?;
        let size = geometry.volume_size(m)?;
        if dev.block_size() != geometry.block_size {
            return Err(Error::InvalidGeometry("device block size differs from geometry"));
        }

        let sb = SuperBlock::new(size, geometry);
        log::info!(
            "format: {size} bytes, {} blocks of {} bytes, {} data blocks",
            sb.total_blocks(),
            sb.block_size,
            sb.data_blocks
        );

        MetadataCache::empty(sb).store(dev.as_ref())
    }

    /// 以默认块大小挂载`path`
    pub fn mount(path: impl AsRef<Path>) -> Result<Self> {
        Self::mount_with(path, &Geometry::default())
    }

    /// 挂载时只用到几何参数中的块大小，其余以超级块为准
    pub fn mount_with(path: impl AsRef<Path>, geometry: &Geometry) -> Result<Self> {
        let dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::open(path, geometry.block_size)?);
        Self::mount_device(dev)
    }

    pub fn mount_device(dev: Arc<dyn BlockDevice>) -> Result<Self> {
        let meta = MetadataCache::load(dev.as_ref())?;
        log::info!(
            "mount: {} files, {} of {} data blocks free",
            meta.dir.used().count(),
            meta.fat.free_count(),
            meta.fat.len()
        );
        log::debug!("{:#?}", meta.super_block);

        Ok(Self {
            dev,
            meta,
            fd_table: FdTable::default(),
        })
    }

    /// 写回全部元数据并关闭设备
    pub fn unmount(self) -> Result<()> {
        self.sync()?;
        log::info!("unmount: {} descriptors still open", self.fd_table.len());
        Ok(())
    }

    /// 写回全部元数据，保持挂载
    pub fn sync(&self) -> Result<()> {
        self.meta.store(self.dev.as_ref())
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.meta.super_block
    }

    pub fn free_blocks(&self) -> usize {
        self.meta.fat.free_count()
    }

    /// 所有文件的名字与大小
    pub fn files(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.meta.dir.used().map(|entry| (entry.name(), entry.size()))
    }

    #[inline]
    pub(crate) fn block_size(&self) -> usize {
        self.dev.block_size()
    }
}
