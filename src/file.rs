use std::fs;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::error::{Error, Result};
use super::host::{Sink, Source};

/// A file on disk, read in packet-sized chunks at arbitrary offsets.
pub struct FileSource {
    file: fs::File,
    len: u64,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let open_err = |source| Error::Open {
            path: path.to_owned(),
            source,
        };

        let file = fs::File::open(path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();

        Ok(Self { file, len })
    }
}

impl Source for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        if offset + buf.len() as u64 > self.len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }
}

/// A file on disk which is created (or truncated) and then appended to in order.
pub struct FileSink {
    writer: BufWriter<fs::File>,
}

impl FileSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = fs::File::create(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
