use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-wide unique number, used to tell documents apart (handles and
/// the object copy caches)
pub(crate) fn unique_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

/// Zlib-compresses the bytes, for streams written with `/Filter /FlateDecode`
pub(crate) fn compress_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    // writing into a Vec never fails
    if encoder.write_all(data).is_err() {
        return data.to_vec();
    }
    encoder.finish().unwrap_or_else(|_| data.to_vec())
}

/// Inflates zlib data, the inverse of [`compress_bytes`]
pub(crate) fn decompress_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Takes a Vec<u8> of RGBA data and returns two Vec<u8> of RGB and alpha data
pub(crate) fn rgba_to_rgb(data: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(data.len() / 4);
    for px in data.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    (rgb, alpha)
}
