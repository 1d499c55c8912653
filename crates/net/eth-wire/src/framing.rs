//! Frame size bookkeeping for the `Header`/`Body` states. The header is
//! always a fixed 32 bytes (16-byte encrypted header + 16-byte MAC); the
//! body is whatever [`reth_ecies::EciesState::create_body`] produces (the
//! frame padded to a 16-byte multiple, plus its 16-byte MAC), per
//! `spec.md` §8 scenario 8.

/// The fixed on-wire length of an RLPx frame header.
pub const HEADER_WIRE_LEN: usize = 32;

/// The on-wire length of a body carrying `frame_len` unpadded bytes.
pub const fn body_wire_len(frame_len: usize) -> usize {
    frame_len.div_ceil(16) * 16 + 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_message_of_83_bytes_matches_the_published_framing_scenario() {
        // spec.md §8 scenario 8: a HELLO body of 83 bytes plus the leading
        // message-id byte encodes to header length 32, body length
        // ceil(83+1,16)+16 = 112.
        assert_eq!(HEADER_WIRE_LEN, 32);
        assert_eq!(body_wire_len(83 + 1), 112);
    }
}
