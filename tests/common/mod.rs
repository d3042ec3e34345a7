use std::{
    io::Read,
    net::TcpListener,
    process::{Command, Output, Stdio},
    thread::{self, JoinHandle},
};

use assert_cmd::cargo::CommandCargoExt;

/// Binary under test, isolated from the caller's LOGSEND_* and RUST_LOG.
pub fn logsend() -> Command {
    let mut command = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    command
        .env_remove("LOGSEND_HOST")
        .env_remove("LOGSEND_PORT")
        .env_remove("LOGSEND_PAYLOAD")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    command
}

pub fn run(args: &[&str]) -> Output {
    logsend().args(args).output().unwrap()
}

/// Listen on an ephemeral local port and collect the bytes of `count`
/// connections, each read until EOF.
pub fn listen(count: usize) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        (0..count)
            .map(|_| {
                let (mut socket, _) = listener.accept().unwrap();
                let mut buffer = Vec::new();
                socket.read_to_end(&mut buffer).unwrap();
                buffer
            })
            .collect()
    });

    (port, handle)
}

/// A port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
