use std::io::Write;

/// The process environment a command runs in, replaced by an in-memory host in tests.
pub trait Host: Send + Sync {
    /// Stream for reports and results (stdout).
    fn output(&mut self) -> impl Write;

    /// Stream for diagnostics (stderr).
    fn error(&mut self) -> impl Write;
}

/// Host capturing everything written to it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
}

#[cfg(test)]
impl TestHost {
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }
}
