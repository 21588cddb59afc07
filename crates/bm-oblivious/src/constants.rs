/// Domain separation prefix of the payload MAC subkey
pub const CIPHER_MAC_LABEL: &[u8] = b"bm-oblivious/v1/payload-mac";

/// Magic prefix of every protocol frame (Oblivious Transfer Message Protocol)
pub const FRAME_MAGIC: [u8; 4] = *b"OTMP";

/// magic (4) | kind (1) | body length (4)
pub const FRAME_HEADER_BYTES: usize = 9;

/// Symmetric key size, the output of the key derivation.
pub const KEY_BYTES: usize = 32;

/// AES block and CBC IV size.
pub const IV_BYTES: usize = 16;

/// HMAC-SHA-256 tag size.
pub const TAG_BYTES: usize = 32;

/// Largest plaintext a sender accepts.
pub const MAX_MESSAGE_BYTES: usize = 1 << 24;
