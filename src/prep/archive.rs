use std::path::PathBuf;

use crate::fs::Fs;
use crate::settings::Settings;

use super::Error;

/// Compression of a source tarball, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
    None,
}

impl Compression {
    /// Extensions we look for, in the order we report them.
    pub const EXTENSIONS: [(&'static str, Compression); 5] = [
        ("tar.gz", Compression::Gzip),
        ("tgz", Compression::Gzip),
        ("tar.bz2", Compression::Bzip2),
        ("tar.xz", Compression::Xz),
        ("tar", Compression::None),
    ];

    /// Flags for `tar` to extract an archive with this compression.
    pub fn tar_flags(self) -> &'static str {
        match self {
            Self::Gzip => "-xzf",
            Self::Bzip2 => "-xjf",
            Self::Xz => "-xJf",
            Self::None => "-xf",
        }
    }
}

/// A source tarball sitting in the run directory.
#[derive(Debug, PartialEq, Eq)]
pub struct Archive {
    pub path: PathBuf,
    pub compression: Compression,
}

impl Archive {
    /// Look for `<source-dir>.<ext>` in the run directory.
    /// More than one candidate is an error, since we can't tell which one is wanted.
    pub fn find(fs: &Fs, settings: &Settings) -> Result<Option<Archive>, Error> {
        let mut found: Vec<Archive> = Compression::EXTENSIONS
            .iter()
            .map(|&(ext, compression)| Archive {
                path: fs.archive(settings, ext),
                compression,
            })
            .filter(|archive| fs.is_file(&archive.path))
            .collect();

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(Error::AmbiguousArchives(
                found.into_iter().map(|a| a.path).collect(),
            )),
        }
    }
}
