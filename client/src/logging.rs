use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Copies every log line to stderr and to the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

pub fn init(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{} - {} - {}", buf.timestamp_seconds(), record.level(), record.args())
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
