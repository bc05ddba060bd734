//! End to end session tests against an in-process scripted server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ftp_bridge::logger::ArrayLogger;
use ftp_bridge::types::FileType;
use ftp_bridge::{FtpBridge, FtpError, Mode};

use pretty_assertions::assert_eq;

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Read one CRLF-terminated command from the control connection
fn read_command(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).expect("control read failed");
    line.trim_end().to_string()
}

#[test]
fn test_should_run_passive_session() {
    log_init();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().unwrap();

    let server: JoinHandle<Vec<String>> = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        let mut writer = stream.try_clone().expect("clone failed");
        let mut reader = BufReader::new(stream);
        let mut commands = Vec::new();
        writer.write_all(b"220 Service ready.\r\n").unwrap();

        commands.push(read_command(&mut reader)); // USER
        writer
            .write_all(b"331 Please specify the password.\r\n")
            .unwrap();
        commands.push(read_command(&mut reader)); // PASS
        writer.write_all(b"230 Login successful.\r\n").unwrap();
        commands.push(read_command(&mut reader)); // TYPE
        writer.write_all(b"200 Switching to Binary mode.\r\n").unwrap();

        commands.push(read_command(&mut reader)); // PASV
        let data_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let data_port = data_listener.local_addr().unwrap().port();
        writer
            .write_all(
                format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{}).\r\n",
                    data_port / 256,
                    data_port % 256
                )
                .as_bytes(),
            )
            .unwrap();

        commands.push(read_command(&mut reader)); // RETR
        writer
            .write_all(b"150 Opening BINARY mode data connection.\r\n")
            .unwrap();
        let (mut data_connection, _) = data_listener.accept().unwrap();
        data_connection.write_all(b"file content\r\n").unwrap();
        drop(data_connection);
        writer.write_all(b"226 Transfer complete.\r\n").unwrap();

        commands.push(read_command(&mut reader)); // QUIT
        writer.write_all(b"221 Goodbye.\r\n").unwrap();
        commands
    });

    let logger = Arc::new(ArrayLogger::new());
    let mut bridge = FtpBridge::with_logger(logger.clone());
    bridge.connect(addr).expect("connect failed");
    assert_eq!(bridge.welcome().unwrap().message(), "Service ready.");
    bridge.login("omar", "qwerty123").expect("login failed");
    bridge
        .transfer_type(FileType::Binary)
        .expect("transfer type failed");
    bridge
        .open_data_connection(Mode::Passive)
        .expect("data connection failed");
    bridge.send("RETR foo.txt").expect("send failed");
    assert_eq!(bridge.receive().unwrap().code(), 150);
    let data = bridge.receive_data().expect("receive data failed");
    assert_eq!(bridge.receive().unwrap().code(), 226);
    bridge.quit().expect("quit failed");

    assert_eq!(data.as_slice(), b"file content\r\n".as_slice());
    assert_eq!(
        server.join().unwrap(),
        vec![
            "USER omar".to_string(),
            "PASS qwerty123".to_string(),
            "TYPE I".to_string(),
            "PASV".to_string(),
            "RETR foo.txt".to_string(),
            "QUIT".to_string(),
        ]
    );
    // every exchange went through the traffic logger
    assert_eq!(logger.logs()[0].as_str(), "INFO 220 Service ready.");
    assert!(logger
        .logs()
        .iter()
        .any(|entry| entry == "COMMAND RETR foo.txt"));
}

#[test]
fn test_should_run_active_session() {
    log_init();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().unwrap();

    let server: JoinHandle<Vec<u8>> = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        let mut writer = stream.try_clone().expect("clone failed");
        let mut reader = BufReader::new(stream);
        writer.write_all(b"220 Service ready.\r\n").unwrap();

        let user = read_command(&mut reader);
        assert!(user.starts_with("USER "));
        writer.write_all(b"230 Login successful.\r\n").unwrap();

        let port_cmd = read_command(&mut reader);
        assert!(port_cmd.starts_with("PORT "));
        writer.write_all(b"200 PORT command successful.\r\n").unwrap();
        let octets: Vec<u16> = port_cmd
            .trim_start_matches("PORT ")
            .split(',')
            .map(|x| x.parse().unwrap())
            .collect();
        let data_port = octets[4] * 256 + octets[5];

        let stor = read_command(&mut reader);
        assert!(stor.starts_with("STOR "));
        writer.write_all(b"150 Ok to send data.\r\n").unwrap();
        let mut data_connection =
            TcpStream::connect(("127.0.0.1", data_port)).expect("data connect failed");
        let mut stored = Vec::new();
        data_connection.read_to_end(&mut stored).unwrap();
        writer.write_all(b"226 Transfer complete.\r\n").unwrap();

        let quit = read_command(&mut reader);
        assert_eq!(quit.as_str(), "QUIT");
        writer.write_all(b"221 Goodbye.\r\n").unwrap();
        stored
    });

    let mut bridge = FtpBridge::new();
    bridge.connect(addr).expect("connect failed");
    bridge.login("anonymous", "").expect("login failed");
    // the local listener port is random; a bind collision just means retry
    for attempt in 0.. {
        match bridge.open_data_connection(Mode::Active) {
            Ok(()) => break,
            Err(FtpError::ConnectionError(_)) if attempt < 5 => continue,
            Err(err) => panic!("data connection failed: {err}"),
        }
    }
    bridge.send("STOR foo.txt").expect("send failed");
    assert_eq!(bridge.receive().unwrap().code(), 150);
    bridge
        .send_data(b"uploaded content\r\n")
        .expect("send data failed");
    assert_eq!(bridge.receive().unwrap().code(), 226);
    bridge.quit().expect("quit failed");

    assert_eq!(
        server.join().unwrap().as_slice(),
        b"uploaded content\r\n".as_slice()
    );
}

#[test]
fn test_should_time_out_on_silent_server() {
    log_init();
    // a server that accepts and never sends a greeting
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept failed");
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let mut bridge = FtpBridge::new();
    let start = Instant::now();
    let result = bridge.connect_timeout(addr, Duration::from_millis(200));
    assert!(matches!(result, Err(FtpError::ConnectionError(_))));
    // degraded to a timeout error instead of hanging on the missing greeting
    assert!(start.elapsed() < Duration::from_secs(2));
    server.join().unwrap();
}
