// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! AES-256-CBC payload encryption.
//!
//! A ciphertext blob is `iv (16) | cbc output | tag (32)`. The tag is
//! HMAC-SHA-256 over `iv | cbc output` under a subkey derived from the
//! payload key (encrypt-then-MAC). The tag is verified in constant time
//! before the padding is looked at, and every failure is reported as the
//! same [`OTError::DecryptionFailed`], so there is no padding oracle.

use aes::Aes256;
use cbc::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut,
    BlockEncryptMut, KeyIvInit,
};
use hmac::{digest::Key, Hmac, Mac};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{
    constants::{CIPHER_MAC_LABEL, IV_BYTES, KEY_BYTES, TAG_BYTES},
    OTError,
};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Encrypted payload blob.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// The IV this blob was produced with.
    pub fn iv(&self) -> &[u8] {
        &self.0[..IV_BYTES.min(self.0.len())]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Ciphertext {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// Size of the blob produced for a plaintext of `len` bytes.
pub const fn ciphertext_len(len: usize) -> usize {
    IV_BYTES + (len / IV_BYTES + 1) * IV_BYTES + TAG_BYTES
}

fn tag_mac(key: &[u8; KEY_BYTES]) -> HmacSha256 {
    let mut subkey = Sha256::new()
        .chain_update(CIPHER_MAC_LABEL)
        .chain_update(key)
        .finalize();

    // HMAC pads short keys with zeros up to the block size, so this is the
    // same as keying with the 32 byte subkey directly.
    let mut mac_key = Key::<HmacSha256>::default();
    mac_key[..subkey.len()].copy_from_slice(&subkey);
    subkey.as_mut_slice().zeroize();

    let mac = <HmacSha256 as Mac>::new(&mac_key);
    mac_key.as_mut_slice().zeroize();

    mac
}

/// Encrypt `plaintext` under a fresh random IV.
pub fn encrypt<R: CryptoRng + RngCore>(
    key: &[u8; KEY_BYTES],
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Ciphertext, OTError> {
    let mut iv = [0u8; IV_BYTES];
    rng.try_fill_bytes(&mut iv)
        .map_err(|_| OTError::RandomnessFailure)?;

    let body = Aes256CbcEnc::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(&iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(IV_BYTES + body.len() + TAG_BYTES);
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&body);

    let tag = tag_mac(key).chain_update(&blob).finalize().into_bytes();
    blob.extend_from_slice(&tag);

    Ok(Ciphertext(blob))
}

/// Decrypt a blob produced by [`encrypt`] under the same key.
pub fn decrypt(
    key: &[u8; KEY_BYTES],
    ciphertext: &[u8],
) -> Result<Vec<u8>, OTError> {
    let len = ciphertext.len();

    if len < ciphertext_len(0) || (len - IV_BYTES - TAG_BYTES) % IV_BYTES != 0
    {
        return Err(OTError::DecryptionFailed);
    }

    let (authenticated, tag) = ciphertext.split_at(len - TAG_BYTES);

    tag_mac(key)
        .chain_update(authenticated)
        .verify_slice(tag)
        .map_err(|_| OTError::DecryptionFailed)?;

    let (iv, body) = authenticated.split_at(IV_BYTES);

    Aes256CbcDec::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| OTError::DecryptionFailed)
}
