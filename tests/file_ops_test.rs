use extlib::core::rand::{shuffle, Rand16};
use extlib::io::{fbsearch, filesort, fexists_nz, read_data, write_data};
use std::fs::File;
use tempfile::TempDir;

const RECORD: usize = 8;

fn record(key: u32, payload: u32) -> [u8; RECORD] {
    let mut out = [0u8; RECORD];
    out[..4].copy_from_slice(&key.to_be_bytes());
    out[4..].copy_from_slice(&payload.to_le_bytes());
    out
}

#[test]
fn test_sort_then_search_shuffled_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.dat");

    let mut keys: Vec<u32> = (0..500).map(|i| i * 3).collect();
    let mut rng = Rand16::default();
    shuffle(&mut keys, &mut rng);

    let data: Vec<u8> = keys.iter().flat_map(|&k| record(k, k + 1)).collect();
    write_data(&path, &data).unwrap();
    assert!(fexists_nz(&path));

    // block of 5 records forces several merge passes
    filesort(&path, RECORD, RECORD * 5, |a, b| a[..4].cmp(&b[..4])).unwrap();

    let sorted = read_data(&path, data.len() + 1).unwrap();
    assert_eq!(sorted.len(), data.len());
    let sorted_keys: Vec<u32> = sorted
        .chunks(RECORD)
        .map(|r| u32::from_be_bytes([r[0], r[1], r[2], r[3]]))
        .collect();
    assert_eq!(sorted_keys, (0..500).map(|i| i * 3).collect::<Vec<_>>());

    let mut file = File::open(&path).unwrap();
    let found = fbsearch(&mut file, &300u32.to_be_bytes(), RECORD)
        .unwrap()
        .unwrap();
    assert_eq!(found, record(300, 301));
    assert_eq!(fbsearch(&mut file, &301u32.to_be_bytes(), RECORD).unwrap(), None);
}

#[test]
fn test_sort_single_block_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("words.dat");
    write_data(&path, b"worldhellofrizzbrush").unwrap();

    filesort(&path, 5, 1024, |a, b| a.cmp(b)).unwrap();
    assert_eq!(read_data(&path, 64).unwrap(), b"brushfrizzhelloworld");

    let mut file = File::open(&path).unwrap();
    assert_eq!(
        fbsearch(&mut file, b"fr", 5).unwrap().as_deref(),
        Some(&b"frizz"[..])
    );
}
