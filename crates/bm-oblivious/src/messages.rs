// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! The three protocol messages and their byte layout.
//!
//! Points travel in their canonical encoding and are only decoded, and so
//! validated, by the party that consumes them.

use crate::{cipher::Ciphertext, group::CurveGroup, OTError};

/// Message 1, sender to receiver: `encode(C)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentMsg {
    /// Encoded commitment point C.
    pub commitment: Vec<u8>,
}

/// Message 2, receiver to sender: `encode(PK0) | encode(PK1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceMsg {
    /// Encoded public keys in index order.
    pub public_keys: [Vec<u8>; 2],
}

/// Ephemeral point and encrypted message for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Encoded `e_i = r_i * G`.
    pub ephemeral: Vec<u8>,
    /// `iv | cbc output | tag` under `Derive(r_i * PK_i)`.
    pub ciphertext: Ciphertext,
}

/// Message 3, sender to receiver: for index 0 then 1,
/// `encode(e_i) | u32 BE length | ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadsMsg {
    /// Payloads in index order.
    pub payloads: [Payload; 2],
}

impl CommitmentMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.commitment.clone()
    }

    pub fn from_bytes<G: CurveGroup>(bytes: &[u8]) -> Result<Self, OTError> {
        if bytes.len() != G::POINT_BYTES {
            return Err(OTError::InvalidEncoding);
        }

        Ok(Self {
            commitment: bytes.to_vec(),
        })
    }
}

impl ChoiceMsg {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.public_keys.concat()
    }

    pub fn from_bytes<G: CurveGroup>(bytes: &[u8]) -> Result<Self, OTError> {
        if bytes.len() != 2 * G::POINT_BYTES {
            return Err(OTError::InvalidEncoding);
        }

        let (pk0, pk1) = bytes.split_at(G::POINT_BYTES);

        Ok(Self {
            public_keys: [pk0.to_vec(), pk1.to_vec()],
        })
    }
}

impl PayloadsMsg {
    pub fn to_bytes(&self) -> Result<Vec<u8>, OTError> {
        let size = self
            .payloads
            .iter()
            .map(|p| p.ephemeral.len() + 4 + p.ciphertext.len())
            .sum();

        let mut buf = Vec::with_capacity(size);

        for payload in &self.payloads {
            let len = payload.ciphertext.len();
            let prefix = u32::try_from(len)
                .map_err(|_| OTError::MessageTooLarge(len))?;

            buf.extend_from_slice(&payload.ephemeral);
            buf.extend_from_slice(&prefix.to_be_bytes());
            buf.extend_from_slice(payload.ciphertext.as_bytes());
        }

        Ok(buf)
    }

    pub fn from_bytes<G: CurveGroup>(bytes: &[u8]) -> Result<Self, OTError> {
        let mut reader = Reader(bytes);

        let first = reader.payload::<G>()?;
        let second = reader.payload::<G>()?;

        if !reader.0.is_empty() {
            return Err(OTError::InvalidEncoding);
        }

        Ok(Self {
            payloads: [first, second],
        })
    }
}

struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], OTError> {
        if self.0.len() < n {
            return Err(OTError::InvalidEncoding);
        }

        let (head, tail) = self.0.split_at(n);
        self.0 = tail;

        Ok(head)
    }

    fn payload<G: CurveGroup>(&mut self) -> Result<Payload, OTError> {
        let ephemeral = self.take(G::POINT_BYTES)?.to_vec();

        let mut len = [0u8; 4];
        len.copy_from_slice(self.take(4)?);
        let len = u32::from_be_bytes(len) as usize;

        let ciphertext = Ciphertext::from(self.take(len)?.to_vec());

        Ok(Payload {
            ephemeral,
            ciphertext,
        })
    }
}
