use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use flate2::bufread::MultiGzDecoder;

/// 128 KB default buffer size, same as pigz.
pub const GZ_BUFSIZE: usize = 64 * (1 << 10) * 2;

/// Returns true if the path ends with one of the given file extensions
fn is_path_with_extension<P: AsRef<Path>>(p: &P, extensions: &[&str]) -> bool {
    if let Some(ext) = p.as_ref().extension() {
        match ext.to_str() {
            Some(x) => extensions.contains(&x),
            None => false,
        }
    } else {
        false
    }
}

/// The set of file extensions to treat as GZIPPED
const GZIP_EXTENSIONS: [&str; 2] = ["gz", "bgz"];

/// Returns true if the path ends with a recognized GZIP file extension
pub fn is_gzip_path<P: AsRef<Path>>(p: &P) -> bool {
    is_path_with_extension(p, &GZIP_EXTENSIONS)
}

/// The set of file extensions to treat as JSON
const JSON_EXTENSIONS: [&str; 1] = ["json"];

/// Returns true if the path ends with a recognized JSON file extension.  For a gzipped file the
/// extension before `.gz` is checked.
pub fn is_json_path<P: AsRef<Path>>(p: &P) -> bool {
    let path = p.as_ref();
    if is_gzip_path(&path) {
        path.file_stem()
            .map_or(false, |stem| is_path_with_extension(&Path::new(stem), &JSON_EXTENSIONS))
    } else {
        is_path_with_extension(&path, &JSON_EXTENSIONS)
    }
}

/// Opens a buffered reader over the file, or standard input for `-`, decompressing when the path
/// has a GZIP extension.
pub fn open_reader<P: AsRef<Path>>(p: &P) -> Result<Box<dyn BufRead + Send>> {
    let path = p.as_ref();
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::with_capacity(GZ_BUFSIZE, std::io::stdin())));
    }
    let handle =
        File::open(path).with_context(|| format!("Error opening input: {}", path.display()))?;
    let buf_handle = BufReader::with_capacity(GZ_BUFSIZE, handle);
    if is_gzip_path(&path) {
        Ok(Box::new(BufReader::with_capacity(
            GZ_BUFSIZE,
            MultiGzDecoder::new(buf_handle),
        )))
    } else {
        Ok(Box::new(buf_handle))
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::{is_gzip_path, is_json_path};

    #[rstest]
    #[case("cases.json.gz", true)]
    #[case("cases.bgz", true)]
    #[case("cases.json", false)]
    #[case("gz", false)]
    fn test_is_gzip_path(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_gzip_path(&path), expected);
    }

    #[rstest]
    #[case("cases.json", true)]
    #[case("dir/cases.json.gz", true)]
    #[case("cases.txt.gz", false)]
    #[case("cases", false)]
    fn test_is_json_path(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_json_path(&path), expected);
    }
}
