pub mod addr;
pub mod http;
pub mod sock;

pub use addr::{aton, ntoa, ntoa_u32};
pub use http::{download_name, http_get, parse_download_url};
pub use sock::{connect_addr, connect_ip, host_ip, SockStatus, Socket};
