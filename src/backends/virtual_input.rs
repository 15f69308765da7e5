use crate::backends::Transport;
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// In-memory transport that replays queued reports.
#[derive(Debug, Default)]
pub struct VirtualTransport {
    path: String,
    reports: VecDeque<Vec<u8>>,
    fail_when_drained: bool,
}

impl VirtualTransport {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Queue a raw report.
    pub fn feed(&mut self, report: &[u8]) {
        self.reports.push_back(report.to_vec());
    }

    /// Builder form of [`feed`](Self::feed).
    pub fn with_report(mut self, report: &[u8]) -> Self {
        self.feed(report);
        self
    }

    /// Once every queued report has been read, fail like an unplugged device.
    pub fn fail_after_drain(mut self) -> Self {
        self.fail_when_drained = true;
        self
    }

    pub fn pending(&self) -> usize {
        self.reports.len()
    }
}

impl Transport for VirtualTransport {
    fn path(&self) -> &str {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.reports.pop_front() {
            Some(report) => {
                // Like a real HID read, a report longer than the buffer is truncated.
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None if self.fail_when_drained => {
                Err(Error::Transport(format!("{}: device unplugged", self.path)))
            }
            None => Ok(0),
        }
    }
}
