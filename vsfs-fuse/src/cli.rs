use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vsfs::Geometry;

/// Maintain VSFS images on the host
#[derive(Parser)]
#[command(name = "vsfs", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh image of 2^EXP bytes
    Format {
        #[command(flatten)]
        image: Image,

        /// Size exponent
        #[arg(long, short)]
        m: u32,
    },

    /// Copy host files into the image, named after their basenames
    Put {
        #[command(flatten)]
        image: Image,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print a file to stdout
    Cat {
        #[command(flatten)]
        image: Image,

        name: String,
    },

    /// List files and their sizes
    Ls {
        #[command(flatten)]
        image: Image,
    },

    /// Delete a file
    Rm {
        #[command(flatten)]
        image: Image,

        name: String,
    },
}

#[derive(Args)]
pub struct Image {
    /// Image file on the host
    #[arg(long, short)]
    pub image: PathBuf,

    /// Bytes per block
    #[arg(long, default_value_t = 2048)]
    pub block_size: usize,

    /// Blocks reserved for the allocation table
    #[arg(long, default_value_t = 32)]
    pub fat_blocks: u32,

    /// Blocks reserved for the directory
    #[arg(long, default_value_t = 8)]
    pub dir_blocks: u32,
}

impl Image {
    pub fn geometry(&self) -> Geometry {
        Geometry {
            block_size: self.block_size,
            fat_blocks: self.fat_blocks,
            dir_blocks: self.dir_blocks,
            ..Default::default()
        }
    }
}
