use std::io::{Read, Seek, SeekFrom};

use crate::utils::error::{ExtError, Result};
use crate::utils::validation::validate_record_size;

/// Binary search over a stream of `size`-byte records sorted ascending by
/// their leading bytes. Only the first `key.len()` bytes of each record are
/// compared. Returns the bytes of a matching record.
pub fn fbsearch<R: Read + Seek>(stream: &mut R, key: &[u8], size: usize) -> Result<Option<Vec<u8>>> {
    if key.is_empty() {
        return Err(ExtError::invalid_argument("search key is empty"));
    }
    validate_record_size(size, key.len())?;

    let len = stream.seek(SeekFrom::End(0))?;
    let mut lo = 0u64;
    let mut hi = len / size as u64;
    let mut record = vec![0u8; size];

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        stream.seek(SeekFrom::Start(mid * size as u64))?;
        stream.read_exact(&mut record)?;

        match key.cmp(&record[..key.len()]) {
            std::cmp::Ordering::Equal => return Ok(Some(record)),
            std::cmp::Ordering::Less => hi = mid,
            std::cmp::Ordering::Greater => lo = mid + 1,
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fbsearch_in_memory() {
        let mut stream = Cursor::new(b"brushfrizzhelloworld".to_vec());

        assert_eq!(
            fbsearch(&mut stream, b"hello", 5).unwrap().as_deref(),
            Some(&b"hello"[..])
        );
        assert_eq!(
            fbsearch(&mut stream, b"wo", 5).unwrap().as_deref(),
            Some(&b"world"[..])
        );
        assert_eq!(fbsearch(&mut stream, b"hellp", 5).unwrap(), None);
    }

    #[test]
    fn test_fbsearch_rejects_bad_arguments() {
        let mut stream = Cursor::new(b"brushfrizz".to_vec());
        assert!(fbsearch(&mut stream, b"", 5).is_err());
        assert!(fbsearch(&mut stream, b"brush", 0).is_err());
        assert!(fbsearch(&mut stream, b"brushes", 5).is_err());
    }

    #[test]
    fn test_fbsearch_empty_stream() {
        let mut stream = Cursor::new(Vec::new());
        assert_eq!(fbsearch(&mut stream, b"a", 1).unwrap(), None);
    }
}
