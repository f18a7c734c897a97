use extlib::net::{connect_addr, SockStatus};
use extlib::thread::ThreadGroup;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(3);

#[test]
fn test_echo_clients_in_thread_group() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let clients = 4;

    let mut group = ThreadGroup::new();
    group
        .spawn("echo-server", move || {
            for _ in 0..clients {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 16];
                stream.read_exact(&mut buf).unwrap();
                stream.write_all(&buf).unwrap();
            }
        })
        .unwrap();

    for i in 0..clients {
        group
            .spawn(format!("client-{}", i), move || {
                let mut sock = connect_addr("localhost", port, TIMEOUT).unwrap();
                let msg = [i as u8; 16];
                assert_eq!(sock.send_all(&msg, TIMEOUT).unwrap(), SockStatus::Complete);
                let mut reply = [0u8; 16];
                assert_eq!(sock.recv_exact(&mut reply, TIMEOUT).unwrap(), SockStatus::Complete);
                assert_eq!(reply, msg);
                sock.close().unwrap();
            })
            .unwrap();
    }

    assert_eq!(group.join_all(), 0);
}
