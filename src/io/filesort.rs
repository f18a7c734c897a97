//! External merge sort for files of fixed-size records.

use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::utils::error::{ExtError, Result};

fn sort_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".sort");
    PathBuf::from(name)
}

/// Sorts the `size`-byte records of the file at `path` with `cmp`.
///
/// Records are first sorted in memory, `block_size / size` at a time, and
/// written back in place. Sorted runs are then merged pairwise into
/// `<path>.sort`, which replaces the original after every pass, until a
/// single run covers the file. The merge is stable. Trailing bytes that do
/// not make up a whole record stay at the end of the file.
pub fn filesort<P, F>(path: P, size: usize, block_size: usize, mut cmp: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&[u8], &[u8]) -> Ordering,
{
    let path = path.as_ref();
    if size == 0 || block_size < size {
        return Err(ExtError::invalid_argument(format!(
            "cannot sort {}-byte records in {}-byte blocks",
            size, block_size
        )));
    }

    let per_block = block_size / size;
    let block_bytes = (per_block * size) as u64;

    let file_len = presort(path, size, per_block, &mut cmp)?;
    let data_len = file_len - file_len % size as u64;

    let tmp = sort_path(path);
    let mut run = block_bytes;
    while run < data_len {
        tracing::debug!(
            "merging {}-byte runs of {} into {}",
            run,
            path.display(),
            tmp.display()
        );
        merge_pass(path, &tmp, size, run, data_len, file_len, &mut cmp)?;
        fs::rename(&tmp, path)?;
        run <<= 1;
    }

    Ok(())
}

fn presort<F>(path: &Path, size: usize, per_block: usize, cmp: &mut F) -> Result<u64>
where
    F: FnMut(&[u8], &[u8]) -> Ordering,
{
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let file_len = file.metadata()?.len();
    let mut remaining = (file_len / size as u64) as usize;

    let mut buffer = vec![0u8; per_block * size];
    let mut sorted = Vec::with_capacity(buffer.len());
    let mut offset = 0u64;

    while remaining > 0 {
        let count = remaining.min(per_block);
        let chunk = &mut buffer[..count * size];
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(chunk)?;

        if count > 1 {
            let mut order: Vec<usize> = (0..count).collect();
            order.sort_by(|&a, &b| cmp(&chunk[a * size..(a + 1) * size], &chunk[b * size..(b + 1) * size]));

            sorted.clear();
            for i in order {
                sorted.extend_from_slice(&chunk[i * size..(i + 1) * size]);
            }
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&sorted)?;
        }

        offset += (count * size) as u64;
        remaining -= count;
    }

    file.flush()?;
    tracing::debug!(
        "presorted {} in blocks of {} records",
        path.display(),
        per_block
    );
    Ok(file_len)
}

fn merge_pass<F>(
    path: &Path,
    tmp: &Path,
    size: usize,
    run: u64,
    data_len: u64,
    file_len: u64,
    cmp: &mut F,
) -> Result<()>
where
    F: FnMut(&[u8], &[u8]) -> Ordering,
{
    let mut left = BufReader::new(File::open(path)?);
    let mut right = BufReader::new(File::open(path)?);
    let mut out = BufWriter::new(File::create(tmp)?);

    let step = size as u64;
    let mut a = vec![0u8; size];
    let mut b = vec![0u8; size];

    let mut start = 0u64;
    while start < data_len {
        let mid = (start + run).min(data_len);
        let end = (mid + run).min(data_len);
        let (mut ai, mut bi) = (start, mid);

        left.seek(SeekFrom::Start(ai))?;
        left.read_exact(&mut a)?;
        if bi < end {
            right.seek(SeekFrom::Start(bi))?;
            right.read_exact(&mut b)?;
        }

        while ai < mid || bi < end {
            let take_left = if ai >= mid {
                false
            } else if bi >= end {
                true
            } else {
                cmp(&a, &b) != Ordering::Greater
            };

            if take_left {
                out.write_all(&a)?;
                ai += step;
                if ai < mid {
                    left.read_exact(&mut a)?;
                }
            } else {
                out.write_all(&b)?;
                bi += step;
                if bi < end {
                    right.read_exact(&mut b)?;
                }
            }
        }

        start = end;
    }

    if file_len > data_len {
        left.seek(SeekFrom::Start(data_len))?;
        io::copy(&mut left, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn u32_records(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn test_sorts_across_multiple_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.bin");
        let values: Vec<u32> = (0..100u32).map(|i| (i * 7919) % 1000).collect();
        fs::write(&path, u32_records(&values)).unwrap();

        filesort(&path, 4, 12, |a, b| a.cmp(b)).unwrap();

        let mut expected = values.clone();
        expected.sort_unstable();
        assert_eq!(fs::read(&path).unwrap(), u32_records(&expected));
        assert!(!sort_path(&path).exists());
    }

    #[test]
    fn test_merge_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.bin");
        // key byte, then original position
        let data: Vec<u8> = [3u8, 1, 3, 2, 1, 1]
            .iter()
            .enumerate()
            .flat_map(|(i, &k)| [k, i as u8])
            .collect();
        fs::write(&path, &data).unwrap();

        filesort(&path, 2, 2, |a, b| a[0].cmp(&b[0])).unwrap();

        assert_eq!(
            fs::read(&path).unwrap(),
            vec![1, 1, 1, 4, 1, 5, 2, 3, 3, 0, 3, 2]
        );
    }

    #[test]
    fn test_trailing_partial_record_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tail.bin");
        fs::write(&path, b"dddcccbbbaaaZZ").unwrap();

        filesort(&path, 3, 3, |a, b| a.cmp(b)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"aaabbbcccdddZZ");
    }

    #[test]
    fn test_invalid_arguments_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.bin");

        assert!(matches!(
            filesort(&path, 0, 16, |a, b| a.cmp(b)),
            Err(ExtError::InvalidArgument { .. })
        ));
        assert!(matches!(
            filesort(&path, 8, 4, |a, b| a.cmp(b)),
            Err(ExtError::InvalidArgument { .. })
        ));
        assert!(matches!(
            filesort(&path, 4, 16, |a, b| a.cmp(b)),
            Err(ExtError::IoError(_))
        ));
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        filesort(&path, 4, 16, |a, b| a.cmp(b)).unwrap();
        assert!(fs::read(&path).unwrap().is_empty());
    }
}
