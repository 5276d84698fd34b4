use std::io;

use thiserror::Error;

use crate::OpenMode;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("volume size 2^{0} is out of the supported range")]
    InvalidSize(u32),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("file descriptor {0} is out of range")]
    BadDescriptor(usize),
    #[error("file descriptor {0} is not open")]
    NotOpen(usize),
    #[error("file descriptor {fd} is open in {mode} mode")]
    WrongMode { fd: usize, mode: OpenMode },

    #[error("directory is full")]
    DirectoryFull,
    #[error("open file table is full")]
    TableFull,
    #[error("no free data block left")]
    NoSpace,

    #[error("no such file {0:?}")]
    NotFound(String),

    #[error("file {0:?} is already open")]
    AlreadyOpen(String),
    #[error("file {0:?} already exists")]
    AlreadyExists(String),
    #[error("file {0:?} is open and cannot be deleted")]
    Busy(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("superblock is invalid")]
    InvalidSuperBlock,
    #[error("allocation chain is broken at block {0}")]
    BrokenChain(u32),
    #[error(transparent)]
    Codec(#[from] binrw::Error),
}

/// 错误的大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Exhausted,
    NotFound,
    Conflict,
    Io,
    Corrupted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSize(_)
            | Self::InvalidGeometry(_)
            | Self::InvalidName(_)
            | Self::BadDescriptor(_)
            | Self::NotOpen(_)
            | Self::WrongMode { .. } => ErrorKind::InvalidArgument,
            Self::DirectoryFull | Self::TableFull | Self::NoSpace => ErrorKind::Exhausted,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyOpen(_) | Self::AlreadyExists(_) | Self::Busy(_) => ErrorKind::Conflict,
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidSuperBlock | Self::BrokenChain(_) | Self::Codec(_) => {
                ErrorKind::Corrupted
            }
        }
    }
}
