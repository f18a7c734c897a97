/// Binary search for `key` in `data`, which holds records of `size` bytes
/// sorted ascending by their leading bytes. Only the first `key.len()`
/// bytes of each record are compared.
///
/// Returns the index of a matching record. Trailing bytes that do not
/// make up a whole record are ignored.
pub fn bsearch_len(key: &[u8], data: &[u8], size: usize) -> Option<usize> {
    if size == 0 || key.len() > size {
        return None;
    }

    let mut lo = 0usize;
    let mut hi = data.len() / size;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let record = &data[mid * size..mid * size + key.len()];
        match key.cmp(record) {
            std::cmp::Ordering::Equal => return Some(mid),
            std::cmp::Ordering::Less => hi = mid,
            std::cmp::Ordering::Greater => lo = mid + 1,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = b"brushfrizzhelloworld";

    #[test]
    fn test_finds_every_record() {
        assert_eq!(bsearch_len(b"brush", DATA, 5), Some(0));
        assert_eq!(bsearch_len(b"frizz", DATA, 5), Some(1));
        assert_eq!(bsearch_len(b"hello", DATA, 5), Some(2));
        assert_eq!(bsearch_len(b"world", DATA, 5), Some(3));
    }

    #[test]
    fn test_prefix_key() {
        assert_eq!(bsearch_len(b"he", DATA, 5), Some(2));
        assert!(bsearch_len(b"", DATA, 5).is_some());
    }

    #[test]
    fn test_missing_and_degenerate() {
        assert_eq!(bsearch_len(b"apple", DATA, 5), None);
        assert_eq!(bsearch_len(b"zebra", DATA, 5), None);
        assert_eq!(bsearch_len(b"hello", &[], 5), None);
        assert_eq!(bsearch_len(b"hello", DATA, 0), None);
        assert_eq!(bsearch_len(b"helloworld", DATA, 5), None);
    }

    #[test]
    fn test_u32_records() {
        let data: Vec<u8> = [3u32, 9, 27, 81, 243]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        assert_eq!(bsearch_len(&27u32.to_be_bytes(), &data, 4), Some(2));
        assert_eq!(bsearch_len(&28u32.to_be_bytes(), &data, 4), None);
    }
}
