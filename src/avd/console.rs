use std::{
    io::{self, BufRead, BufReader, Write},
    net::{SocketAddr, TcpStream},
    time::Duration,
};

/// The console is local and answers immediately when it answers at all, so
/// the probe stays on a short leash.
const CONSOLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Keeps only a line that could plausibly be a name: banners and the
/// OK/KO acknowledgements don't count.
pub fn parse_console_response(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with("OK")
                && !line.starts_with("KO")
                && !line.starts_with("Android Console")
        })
        .map(str::to_string)
}

/// Last-resort name recovery: speak the emulator console protocol directly
/// on the instance's control port and ask for `avd name`.
pub fn query_avd_name(port: u16) -> io::Result<Option<String>> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let mut stream = TcpStream::connect_timeout(&addr, CONSOLE_TIMEOUT)?;
    stream.set_read_timeout(Some(CONSOLE_TIMEOUT))?;
    stream.set_write_timeout(Some(CONSOLE_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    // The greeting ends with its own OK; drain it before asking anything.
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.trim() == "OK" {
            break;
        }
    }

    stream.write_all(b"avd name\r\n")?;
    let mut response = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed == "OK" || trimmed == "KO" {
                    break;
                }
                response.push_str(&line);
            }
            Err(err) => {
                if response.is_empty() {
                    return Err(err);
                }
                break;
            }
        }
    }
    Ok(parse_console_response(&response))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn banners_and_acknowledgements_are_not_names() {
        assert_eq!(
            parse_console_response("Android Console: type 'help'\r\nPixel_6\r\n").as_deref(),
            Some("Pixel_6")
        );
        assert_eq!(parse_console_response("OK\r\n"), None);
        assert_eq!(parse_console_response("KO: must authenticate\r\n"), None);
        assert_eq!(parse_console_response(""), None);
    }

    #[test]
    fn speaks_the_console_protocol_end_to_end() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket
                .write_all(b"Android Console: type 'help' for a list of commands\r\nOK\r\n")
                .unwrap();
            let mut reader = BufReader::new(socket.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            assert_eq!(request.trim(), "avd name");
            socket.write_all(b"Pixel_6\r\nOK\r\n").unwrap();
        });
        assert_eq!(query_avd_name(port).unwrap().as_deref(), Some("Pixel_6"));
        server.join().unwrap();
    }
}
