use extlib::print::{self, PrintLevel};
use extlib::{perrno, plog, pwarn};
use tempfile::TempDir;

#[test]
fn test_global_printer_logs_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("extlib.log");

    print::set_print_level(PrintLevel::None);
    print::set_output_level(PrintLevel::Warn);
    print::set_output_file(&log_path, false).unwrap();

    let errs = print::num_errs();
    let logs = print::num_logs();

    assert_eq!(perrno!(2, "cannot open {}", "input.dat"), 1);
    assert_eq!(pwarn!("disk almost full"), 0);
    assert_eq!(plog!("not written at warn level"), 0);
    print::close_output();

    assert_eq!(print::num_errs(), errs + 1);
    assert_eq!(print::num_logs(), logs + 2);

    let text = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" - Error. cannot open input.dat: "));
    assert!(lines[1].ends_with(" - Warning... disk almost full"));
}
