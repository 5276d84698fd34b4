mod cli;

use std::fs;
use std::io::{self, Write};

use clap::Parser;
use vsfs::{Error, FileSystem, OpenMode};

use self::cli::{Cli, Command, Image};

fn main() -> vsfs::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    run(cli.command, &mut io::stdout().lock())
}

/// 执行一条子命令。
///
/// 只有改动镜像的命令才卸载（写回元数据）；`ls`与`cat`直接丢弃会话，
/// 镜像保持原样。
fn run(command: Command, out: &mut impl Write) -> vsfs::Result<()> {
    match command {
        Command::Format { image, m } => {
            FileSystem::format_with(&image.image, m, &image.geometry())?;
            writeln!(out, "formatted {:?}: {} bytes", image.image, 1u64 << m)?;
        }
        Command::Put { image, files } => {
            let mut fs = mount(&image)?;
            for path in files {
                let name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .ok_or_else(|| Error::InvalidName(path.display().to_string()))?
                    .to_owned();
                let data = fs::read(&path)?;
                log::info!("put {path:?} as {name:?}, {} bytes", data.len());

                fs.create(&name)?;
                let fd = fs.open(&name, OpenMode::Append)?;
                fs.append(fd, &data)?;
                fs.close(fd)?;
            }
            fs.unmount()?;
        }
        Command::Cat { image, name } => {
            let mut fs = mount(&image)?;
            let fd = fs.open(&name, OpenMode::Read)?;

            let mut buf = vec![0; image.block_size];
            loop {
                let n = fs.read(fd, &mut buf)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
            }
            out.flush()?;
        }
        Command::Ls { image } => {
            let fs = mount(&image)?;
            for (name, size) in fs.files() {
                writeln!(out, "{size:>10} {name}")?;
            }
            writeln!(
                out,
                "{} of {} data blocks free",
                fs.free_blocks(),
                fs.super_block().data_blocks
            )?;
        }
        Command::Rm { image, name } => {
            let mut fs = mount(&image)?;
            fs.delete(&name)?;
            fs.unmount()?;
        }
    }

    Ok(())
}

fn mount(image: &Image) -> vsfs::Result<FileSystem> {
    let geometry = image.geometry();
    geometry.validate()?;
    FileSystem::mount_with(&image.image, &geometry)
}
