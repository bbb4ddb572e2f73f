//! Gzip tarball builders.

use flate2::Compression;
use flate2::write::GzEncoder;

/// Build a `.tar.gz` holding `files` (`(path, contents)` pairs).
///
/// Paths may include a leading directory to mimic GitHub source tarballs.
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .expect("tar_gz: append");
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("tar_gz: finish")
}
