//! # VSFS
//!
//! 寄居在宿主机单个普通文件中的简易文件系统。
//!
//! ## 分层（自上而下）
//!
//! 1. 文件操作层：创建、打开、读取、追加、删除
//! 2. 文件描述符层：打开文件表
//! 3. 元数据缓存层：挂载时整体读入，卸载时整体写回
//! 4. 磁盘数据结构层：超级块、分配表、目录
//! 5. 块设备驱动层：见`block-dev`

mod block;
mod cache;
mod config;
mod control;
mod error;
mod fd_table;
mod file;
pub mod volume;

pub use block_dev::{BlockDevice, BlockFile, RamDisk};

pub use self::{
    block::BlockId,
    config::Geometry,
    control::FileSystem,
    error::{Error, ErrorKind, Result},
    fd_table::{OpenFile, OpenMode},
    volume::{DirEntry, SuperBlock},
};

/// 目录项数量的上限
pub const MAX_DIR_ENTRIES: usize = 128;
/// 同时打开的文件数量上限
pub const MAX_OPEN_FILES: usize = 16;
