pub mod cpu;
pub mod fbsearch;
pub mod file;
pub mod filesort;

pub use cpu::{cpu_brand, cpu_cores, cpu_hyper_threads, cpu_physical_cores, cpu_vendor};
pub use fbsearch::fbsearch;
pub use file::{fcopy, fexists, fexists_nz, fsave, ftouch, mkdir_p, read_data, write_data};
pub use filesort::filesort;
