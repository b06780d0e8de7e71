//! Cluster hash slot calculation

/// Number of hash slots in a cluster
pub const SLOT_COUNT: u16 = 16384;

/// Calculate the slot owning `key`, honoring `{hash tags}`
pub fn slot_for_key(key: &[u8]) -> u16 {
    if let Some(start) = key.iter().position(|&b| b == b'{') {
        if let Some(end) = key[start + 1..].iter().position(|&b| b == b'}') {
            if end > 0 {
                return crc16(&key[start + 1..start + 1 + end]) % SLOT_COUNT;
            }
        }
    }
    crc16(key) % SLOT_COUNT
}

/// CRC16 (XMODEM) as used by cluster key hashing
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
