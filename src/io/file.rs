use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::utils::error::{ExtError, Result};

/// Longest path `mkdir_p` accepts, in bytes.
pub const PATH_MAX_LEN: usize = 8192;

/// Copies the contents of `src` to `dst`, creating or truncating `dst`.
pub fn fcopy<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<u64> {
    let mut reader = File::open(src.as_ref())?;
    let mut writer = File::create(dst.as_ref())?;
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    tracing::debug!(
        "copied {} bytes from {} to {}",
        copied,
        src.as_ref().display(),
        dst.as_ref().display()
    );
    Ok(copied)
}

/// Returns `true` if `path` can be opened for reading.
pub fn fexists<P: AsRef<Path>>(path: P) -> bool {
    File::open(path).is_ok()
}

/// Returns `true` if `path` can be opened for reading and holds data.
pub fn fexists_nz<P: AsRef<Path>>(path: P) -> bool {
    File::open(path)
        .and_then(|f| f.metadata())
        .map(|m| m.len() > 0)
        .unwrap_or(false)
}

/// Rewinds `stream` and writes everything in it to `dst`.
pub fn fsave<R, P>(stream: &mut R, dst: P) -> Result<u64>
where
    R: Read + Seek,
    P: AsRef<Path>,
{
    stream.seek(SeekFrom::Start(0))?;
    let mut writer = File::create(dst)?;
    let saved = io::copy(stream, &mut writer)?;
    writer.flush()?;
    Ok(saved)
}

/// Creates `path` if missing, leaving existing contents alone.
pub fn ftouch<P: AsRef<Path>>(path: P) -> Result<()> {
    OpenOptions::new().append(true).create(true).open(path)?;
    Ok(())
}

/// Creates a directory and any missing parents, like `mkdir -p`.
/// An existing directory is not an error.
pub fn mkdir_p<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let len = path.as_os_str().len();
    if len + 1 >= PATH_MAX_LEN {
        return Err(ExtError::NameTooLong {
            len,
            max: PATH_MAX_LEN,
        });
    }
    if len == 0 {
        return Err(ExtError::invalid_argument("empty directory path"));
    }

    fs::create_dir_all(path)?;
    Ok(())
}

/// Reads at most `max` bytes from the start of `path`.
pub fn read_data<P: AsRef<Path>>(path: P, max: usize) -> Result<Vec<u8>> {
    if max == 0 {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let mut data = Vec::with_capacity(max.min(64 * 1024));
    file.take(max as u64).read_to_end(&mut data)?;
    Ok(data)
}

/// Writes `data` to `path`, replacing anything already there.
pub fn write_data<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<usize> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    Ok(data.len())
}
