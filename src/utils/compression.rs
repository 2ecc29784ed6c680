use crate::utils::constants::GZIP_MAGIC;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Reader over `bytes`, transparently gunzipping when the gzip header is present
pub fn maybe_gunzip_reader<'a>(bytes: &'a [u8]) -> Box<dyn Read + 'a> {
    if is_gzip(bytes) {
        // Source dumps may be several gzip members concatenated
        Box::new(flate2::read::MultiGzDecoder::new(bytes))
    } else {
        Box::new(bytes)
    }
}

pub fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut result = Vec::new();
    decoder.read_to_end(&mut result)?;
    Ok(result)
}
