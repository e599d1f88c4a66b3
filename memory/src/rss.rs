use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{HeapReading, HeapSource};

const PROC_STATUS: &str = "/proc/self/status";

/// Resident set size of this process, read from `/proc/self/status`.
///
/// The read buffer is reused across samples so steady-state sampling does
/// not allocate.
#[derive(Debug)]
pub struct ProcessRssSource {
    buffer: Vec<u8>,
}

impl ProcessRssSource {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(2048),
        }
    }
}

impl Default for ProcessRssSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapSource for ProcessRssSource {
    fn sample(&mut self) -> Option<HeapReading> {
        let used_bytes = read_vm_rss(Path::new(PROC_STATUS), &mut self.buffer)?;
        Some(HeapReading { used_bytes })
    }
}

fn read_vm_rss(path: &Path, buffer: &mut Vec<u8>) -> Option<u64> {
    let bytes = read_to_buffer(path, buffer).ok()?;
    for line in bytes.split(|b| *b == b'\n') {
        if line.starts_with(b"VmRSS:") {
            return parse_kb_value(line).map(|v| v.saturating_mul(1024));
        }
    }
    None
}

fn read_to_buffer<'a>(path: &Path, buffer: &'a mut Vec<u8>) -> io::Result<&'a [u8]> {
    buffer.clear();
    let mut file = File::open(path)?;
    file.read_to_end(buffer)?;
    Ok(buffer.as_slice())
}

fn parse_kb_value(line: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    let mut saw_digit = false;
    for byte in line.iter().copied() {
        if byte.is_ascii_digit() {
            saw_digit = true;
            value = value
                .saturating_mul(10)
                .saturating_add((byte - b'0') as u64);
        } else if saw_digit {
            break;
        }
    }
    if saw_digit {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kb_lines() {
        assert_eq!(parse_kb_value(b"VmRSS:\t  123456 kB"), Some(123456));
        assert_eq!(parse_kb_value(b"VmRSS:      8 kB"), Some(8));
        assert_eq!(parse_kb_value(b"VmRSS:"), None);
    }

    #[test]
    fn finds_vm_rss_among_other_fields() {
        let status = b"Name:\tkestrel\nVmPeak:\t  204800 kB\nVmRSS:\t  102400 kB\nThreads:\t4\n";
        let mut buffer = Vec::new();
        buffer.extend_from_slice(status);

        let mut rss = None;
        for line in buffer.split(|b| *b == b'\n') {
            if line.starts_with(b"VmRSS:") {
                rss = parse_kb_value(line).map(|v| v * 1024);
            }
        }
        assert_eq!(rss, Some(102400 * 1024));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn samples_this_process() {
        let mut source = ProcessRssSource::new();
        let reading = source.sample().expect("proc status should be readable");
        assert!(reading.used_bytes > 0);
    }
}
