#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use vsfs::{FileSystem, Geometry, OpenMode};

pub struct Volume {
    // 镜像随目录一同删除
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn image() -> Volume {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vsfs.img");
    Volume { _dir: dir, path }
}

/// 格式化并挂载一个新卷
pub fn mounted(m: u32, geometry: &Geometry) -> (Volume, FileSystem) {
    let volume = image();
    FileSystem::format_with(&volume.path, m, geometry).unwrap();
    let fs = FileSystem::mount_with(&volume.path, geometry).unwrap();
    (volume, fs)
}

pub fn write_file(fs: &mut FileSystem, name: &str, data: &[u8]) {
    fs.create(name).unwrap();
    let fd = fs.open(name, OpenMode::Append).unwrap();
    assert_eq!(fs.append(fd, data).unwrap(), data.len());
    fs.close(fd).unwrap();
}

pub fn read_file(fs: &mut FileSystem, name: &str) -> Vec<u8> {
    let fd = fs.open(name, OpenMode::Read).unwrap();
    let mut data = vec![0; fs.size(fd).unwrap()];
    assert_eq!(fs.read(fd, &mut data).unwrap(), data.len());
    fs.close(fd).unwrap();
    data
}

/// 不规则的测试数据
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
}
