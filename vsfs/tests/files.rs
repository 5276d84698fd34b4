mod common;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{mounted, pattern, read_file, write_file};
use vsfs::{
    BlockDevice, Error, ErrorKind, FileSystem, Geometry, MAX_OPEN_FILES, OpenMode, RamDisk,
};

fn fresh() -> (common::Volume, FileSystem) {
    mounted(20, &Geometry::default())
}

/// 块很小、分配表只有128个条目的卷
fn cramped() -> (common::Volume, FileSystem) {
    let geometry = Geometry {
        block_size: 512,
        fat_blocks: 1,
        dir_blocks: 1,
        ..Default::default()
    };
    mounted(18, &geometry)
}

#[test]
fn single_block_round_trip() {
    let (_volume, mut fs) = fresh();
    for len in [1, 100, 2047, 2048] {
        let name = format!("f{len}");
        let data = pattern(len);
        write_file(&mut fs, &name, &data);
        assert_eq!(read_file(&mut fs, &name), data);
    }
}

#[test]
fn multi_block_round_trip() {
    let (_volume, mut fs) = fresh();
    let data = pattern(5 * 2048 + 123);

    fs.create("big").unwrap();
    let fd = fs.open("big", OpenMode::Append).unwrap();
    // 追加的边界与块边界错开
    for chunk in data.chunks(1500) {
        assert_eq!(fs.append(fd, chunk).unwrap(), chunk.len());
    }
    assert_eq!(fs.size(fd).unwrap(), data.len());
    fs.close(fd).unwrap();

    assert_eq!(read_file(&mut fs, "big"), data);
    assert_eq!(
        fs.free_blocks(),
        fs.super_block().data_blocks as usize - 6
    );
}

#[test]
fn unaligned_reads() {
    let (_volume, mut fs) = fresh();
    let data = pattern(3 * 2048);
    write_file(&mut fs, "data", &data);

    let fd = fs.open("data", OpenMode::Read).unwrap();
    let mut out = Vec::new();
    for len in [1, 700, 2048, 3000, 5000] {
        let mut buf = vec![0; len];
        let n = fs.read(fd, &mut buf).unwrap();
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(out, data);
}

#[test]
fn interleaved_files() {
    let (_volume, mut fs) = fresh();
    let a = pattern(4000);
    let b: Vec<u8> = pattern(4000).into_iter().rev().collect();
    fs.create("a").unwrap();
    fs.create("b").unwrap();

    let fa = fs.open("a", OpenMode::Append).unwrap();
    let fb = fs.open("b", OpenMode::Append).unwrap();
    // 两个文件的数据块交错分配
    for (ca, cb) in a.chunks(1000).zip(b.chunks(1000)) {
        fs.append(fa, ca).unwrap();
        fs.append(fb, cb).unwrap();
    }
    fs.close(fa).unwrap();
    fs.close(fb).unwrap();

    assert_eq!(read_file(&mut fs, "a"), a);
    assert_eq!(read_file(&mut fs, "b"), b);
}

#[test]
fn open_twice() {
    let (_volume, mut fs) = fresh();
    fs.create("x").unwrap();

    let fd = fs.open("x", OpenMode::Read).unwrap();
    let err = fs.open("x", OpenMode::Append).unwrap_err();
    assert!(matches!(err, Error::AlreadyOpen(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    fs.close(fd).unwrap();
    fs.open("x", OpenMode::Append).unwrap();
}

#[test]
fn size_sums_appends() {
    let (_volume, mut fs) = fresh();
    fs.create("log").unwrap();

    let mut total = 0;
    for len in [10, 0, 2038, 1, 4096, 77] {
        let fd = fs.open("log", OpenMode::Append).unwrap();
        fs.append(fd, &pattern(len)).unwrap();
        total += len;
        assert_eq!(fs.size(fd).unwrap(), total);
        fs.close(fd).unwrap();
    }
}

#[test]
fn reopen_repositions_cursor() {
    let (_volume, mut fs) = fresh();
    write_file(&mut fs, "f", b"hello");

    // 追加模式从文件末尾接着写
    let fd = fs.open("f", OpenMode::Append).unwrap();
    fs.append(fd, b" world").unwrap();
    fs.close(fd).unwrap();

    // 读模式总是从头读
    let fd = fs.open("f", OpenMode::Read).unwrap();
    let mut buf = [0; 5];
    fs.read(fd, &mut buf).unwrap();
    assert_eq!(&buf, b"hello");
    fs.close(fd).unwrap();

    assert_eq!(read_file(&mut fs, "f"), b"hello world");
}

#[test]
fn read_clamps_at_end() {
    let (_volume, mut fs) = fresh();
    write_file(&mut fs, "f", &pattern(10));

    let fd = fs.open("f", OpenMode::Read).unwrap();
    let mut buf = [0; 4];
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 4);

    let mut buf = [0; 100];
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], &pattern(10)[4..]);

    assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);
}

#[test]
fn empty_file() {
    let (_volume, mut fs) = fresh();
    fs.create("empty").unwrap();

    let fd = fs.open("empty", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), 0);
    assert_eq!(fs.read(fd, &mut [0; 16]).unwrap(), 0);
}

#[test]
fn wrong_mode() {
    let (_volume, mut fs) = fresh();
    fs.create("r").unwrap();
    fs.create("w").unwrap();
    let r = fs.open("r", OpenMode::Read).unwrap();
    let w = fs.open("w", OpenMode::Append).unwrap();

    let err = fs.append(r, b"nope").unwrap_err();
    assert!(matches!(err, Error::WrongMode { mode: OpenMode::Read, .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = fs.read(w, &mut [0; 4]).unwrap_err();
    assert!(matches!(err, Error::WrongMode { mode: OpenMode::Append, .. }));
}

#[test]
fn bad_descriptors() {
    let (_volume, mut fs) = fresh();
    fs.create("f").unwrap();

    assert!(matches!(fs.size(MAX_OPEN_FILES), Err(Error::BadDescriptor(_))));
    assert!(matches!(fs.close(3), Err(Error::NotOpen(3))));

    let fd = fs.open("f", OpenMode::Read).unwrap();
    fs.close(fd).unwrap();
    assert!(matches!(fs.close(fd), Err(Error::NotOpen(_))));
    assert!(matches!(fs.read(fd, &mut [0; 1]), Err(Error::NotOpen(_))));
}

#[test]
fn open_table_full() {
    let (_volume, mut fs) = fresh();
    for i in 0..=MAX_OPEN_FILES {
        fs.create(&format!("f{i}")).unwrap();
    }
    for i in 0..MAX_OPEN_FILES {
        assert_eq!(fs.open(&format!("f{i}"), OpenMode::Read).unwrap(), i);
    }

    let err = fs.open(&format!("f{MAX_OPEN_FILES}"), OpenMode::Read).unwrap_err();
    assert!(matches!(err, Error::TableFull));
    assert_eq!(err.kind(), ErrorKind::Exhausted);

    fs.close(5).unwrap();
    assert_eq!(fs.open(&format!("f{MAX_OPEN_FILES}"), OpenMode::Read).unwrap(), 5);
}

#[test]
fn names() {
    let (_volume, mut fs) = fresh();
    assert!(matches!(fs.create(""), Err(Error::InvalidName(_))));
    assert!(matches!(
        fs.create(&"n".repeat(31)),
        Err(Error::InvalidName(_))
    ));
    fs.create(&"n".repeat(30)).unwrap();

    fs.create("dup").unwrap();
    let err = fs.create("dup").unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = fs.open("ghost", OpenMode::Read).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn directory_slots_are_reused() {
    let (_volume, mut fs) = fresh();
    let capacity = fs.super_block().dir_capacity();
    assert_eq!(capacity, 128);

    for i in 0..capacity {
        fs.create(&format!("f{i}")).unwrap();
    }
    let err = fs.create("one-more").unwrap_err();
    assert!(matches!(err, Error::DirectoryFull));

    fs.delete("f42").unwrap();
    assert!(matches!(
        fs.open("f42", OpenMode::Read),
        Err(Error::NotFound(_))
    ));
    fs.create("one-more").unwrap();
    assert_eq!(fs.files().count(), capacity);
}

#[test]
fn delete_releases_blocks() {
    let (_volume, mut fs) = fresh();
    let free = fs.free_blocks();

    write_file(&mut fs, "big", &pattern(7000));
    assert_eq!(fs.free_blocks(), free - 4);

    fs.delete("big").unwrap();
    assert_eq!(fs.free_blocks(), free);
    assert!(matches!(fs.delete("big"), Err(Error::NotFound(_))));

    // 重新创建的同名文件是空的
    fs.create("big").unwrap();
    assert_eq!(read_file(&mut fs, "big"), b"");
}

#[test]
fn delete_open_file() {
    let (_volume, mut fs) = fresh();
    write_file(&mut fs, "busy", b"data");

    let fd = fs.open("busy", OpenMode::Read).unwrap();
    let err = fs.delete("busy").unwrap_err();
    assert!(matches!(err, Error::Busy(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    fs.close(fd).unwrap();
    fs.delete("busy").unwrap();
}

#[test]
fn out_of_space() {
    let (_volume, mut fs) = cramped();
    assert_eq!(fs.free_blocks(), 128);

    // 一次要的块比剩下的多：什么都不改
    fs.create("huge").unwrap();
    let fd = fs.open("huge", OpenMode::Append).unwrap();
    let err = fs.append(fd, &pattern(129 * 512)).unwrap_err();
    assert!(matches!(err, Error::NoSpace));
    assert_eq!(err.kind(), ErrorKind::Exhausted);
    assert_eq!(fs.size(fd).unwrap(), 0);
    assert_eq!(fs.free_blocks(), 128);

    // 正好用完
    let data = pattern(128 * 512 - 10);
    fs.append(fd, &data).unwrap();
    assert_eq!(fs.free_blocks(), 0);
    // 最后一块还剩10字节
    fs.append(fd, &pattern(10)).unwrap();
    assert!(matches!(fs.append(fd, b"!"), Err(Error::NoSpace)));
    assert_eq!(fs.size(fd).unwrap(), 128 * 512);
    fs.close(fd).unwrap();

    let mut expected = data;
    expected.extend_from_slice(&pattern(10));
    assert_eq!(read_file(&mut fs, "huge"), expected);

    fs.delete("huge").unwrap();
    assert_eq!(fs.free_blocks(), 128);
}

/// 可以随时让写入失败的内存盘
#[derive(Debug)]
struct Flaky {
    disk: RamDisk,
    broken: AtomicBool,
}

impl BlockDevice for Flaky {
    fn block_size(&self) -> usize {
        self.disk.block_size()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        self.disk.read_block(block_id, buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        if self.broken.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::Other, "device went away"));
        }
        self.disk.write_block(block_id, buf)
    }
}

#[test]
fn failed_write_keeps_claimed_blocks() {
    let flaky = Arc::new(Flaky {
        disk: RamDisk::new(1 << 18, 2048),
        broken: AtomicBool::new(false),
    });
    let dev: Arc<dyn BlockDevice> = flaky.clone();
    FileSystem::format_device(&dev, 18, &Geometry::default()).unwrap();
    let mut fs = FileSystem::mount_device(dev).unwrap();
    let free = fs.free_blocks();

    fs.create("f").unwrap();
    let fd = fs.open("f", OpenMode::Append).unwrap();
    let data = pattern(3 * 2048);

    flaky.broken.store(true, Ordering::Relaxed);
    let err = fs.append(fd, &data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(fs.size(fd).unwrap(), 0);
    assert_eq!(fs.free_blocks(), free - 3);

    // 重试沿用已认领的块
    flaky.broken.store(false, Ordering::Relaxed);
    assert_eq!(fs.append(fd, &data).unwrap(), data.len());
    assert_eq!(fs.free_blocks(), free - 3);
    fs.close(fd).unwrap();

    assert_eq!(read_file(&mut fs, "f"), data);
}
