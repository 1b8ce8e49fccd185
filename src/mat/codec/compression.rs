//! Inflation of compressed (zlib) elements.

use flate2::{Decompress, FlushDecompress, Status};
use log::trace;

use crate::mat::types::error::{MatError, Result};

const CHUNK: usize = 32 * 1024;

/// Inflates a complete zlib stream into memory.
///
/// The stream must run to its end marker: corrupt data, a checksum mismatch
/// or a stream cut short are all errors, as is output larger than `max_size`.
pub fn inflate(payload: &[u8], max_size: u64, offset: u64) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut output: Vec<u8> = Vec::with_capacity(payload.len().saturating_mul(4).min(CHUNK * 8));

    loop {
        if output.capacity() - output.len() < CHUNK {
            output.reserve(CHUNK.max(output.len()));
        }
        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let consumed = before_in as usize;

        let status = inflater
            .decompress_vec(&payload[consumed..], &mut output, FlushDecompress::Finish)
            .map_err(|e| MatError::Compression {
                offset,
                message: format!("zlib decompression failed: {}", e),
            })?;

        if output.len() as u64 > max_size {
            return Err(MatError::Compression {
                offset,
                message: format!("inflated block exceeds the {} byte limit", max_size),
            });
        }

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                if inflater.total_in() == before_in && inflater.total_out() == before_out {
                    return Err(MatError::Compression {
                        offset,
                        message: format!(
                            "zlib stream ended early after {} of {} bytes",
                            before_in,
                            payload.len()
                        ),
                    });
                }
            }
        }
    }

    trace!(
        "Inflated compressed element: {} bytes -> {} bytes",
        payload.len(),
        output.len()
    );
    Ok(output)
}
