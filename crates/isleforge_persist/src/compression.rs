use std::io;

pub fn compress_zstd(data: &[u8], level: i32) -> io::Result<Vec<u8>> {
    zstd::stream::encode_all(data, level)
}

pub fn decompress_zstd(data: &[u8]) -> io::Result<Vec<u8>> {
    zstd::stream::decode_all(data)
}

#[cfg(test)]
mod tests {
    use super::{compress_zstd, decompress_zstd};

    #[test]
    fn zstd_round_trips_arbitrary_bytes() {
        let data: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();
        let compressed = compress_zstd(&data, 3).expect("compress");
        assert!(compressed.len() < data.len());
        let restored = decompress_zstd(&compressed).expect("decompress");
        assert_eq!(restored, data);
    }

    #[test]
    fn garbage_fails_to_decompress() {
        assert!(decompress_zstd(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
