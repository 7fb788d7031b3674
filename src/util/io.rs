use std::{
    fs::File,
    io::{self, BufRead, BufReader, ErrorKind},
    path::Path,
};

/// Open a file at some path, returning a buffered reader.
///
/// Returns a more helpful error if the file cannot be opened.
pub fn buf_open<P: AsRef<Path>>(path: P) -> io::Result<impl BufRead> {
    let path: &Path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        io::Error::new(
            ErrorKind::Other,
            format!("Could not open file {}: {}", path.display(), err),
        )
    })?;
    Ok(BufReader::new(file))
}
