// Copyright (c) Silence Laboratories Pte. Ltd. All Rights Reserved.
// This software is licensed under the Silence Laboratories License Agreement.

//! Prime order group used by the protocol.
//!
//! The protocol code only talks to [`CurveGroup`]. [`P256`] is the
//! production instance; tests may plug in a cheaper group without touching
//! the sender or the receiver.

use elliptic_curve::{
    sec1::{FromEncodedPoint, ToEncodedPoint},
    Field, Group, PrimeField,
};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

use crate::OTError;

/// Group operations the oblivious transfer is built from.
///
/// Implementations must be constant time with respect to secret scalars.
pub trait CurveGroup {
    /// Exponent, always secret in this protocol.
    type Scalar: Zeroize + Send + Sync;

    /// Group element.
    type Point: Copy + ConditionallySelectable + ConstantTimeEq + Send + Sync;

    /// Size of the canonical point encoding.
    const POINT_BYTES: usize;

    /// The fixed generator G.
    fn generator() -> Self::Point;

    /// Group law, `a + b`.
    fn add(a: &Self::Point, b: &Self::Point) -> Self::Point;

    /// Inverse element, `-p`.
    fn negate(p: &Self::Point) -> Self::Point;

    /// Scalar multiplication, `k * p`.
    fn mul(k: &Self::Scalar, p: &Self::Point) -> Self::Point;

    /// True for the neutral element, which has no wire encoding.
    fn is_identity(p: &Self::Point) -> bool;

    /// Sample a scalar uniformly from `[1, order - 1]`.
    fn random_scalar<R: CryptoRng + RngCore>(
        rng: &mut R,
    ) -> Result<Self::Scalar, OTError>;

    /// Canonical encoding, exactly [`Self::POINT_BYTES`] long for any
    /// non-identity point.
    fn encode(p: &Self::Point) -> Vec<u8>;

    /// Decode untrusted bytes. Rejects anything that is not a canonical
    /// encoding of a non-identity group element.
    fn decode(bytes: &[u8]) -> Result<Self::Point, OTError>;

    /// Returns `a` if `choice == 0` and `b` if `choice == 1`.
    fn select(a: &Self::Point, b: &Self::Point, choice: Choice) -> Self::Point {
        Self::Point::conditional_select(a, b, choice)
    }
}

/// NIST P-256 with SEC1 compressed point encoding.
#[derive(Debug, Clone, Copy)]
pub struct P256;

impl CurveGroup for P256 {
    type Scalar = Scalar;
    type Point = ProjectivePoint;

    const POINT_BYTES: usize = 33;

    fn generator() -> ProjectivePoint {
        ProjectivePoint::GENERATOR
    }

    fn add(a: &ProjectivePoint, b: &ProjectivePoint) -> ProjectivePoint {
        *a + *b
    }

    fn negate(p: &ProjectivePoint) -> ProjectivePoint {
        -*p
    }

    fn mul(k: &Scalar, p: &ProjectivePoint) -> ProjectivePoint {
        *p * k
    }

    fn is_identity(p: &ProjectivePoint) -> bool {
        bool::from(p.is_identity())
    }

    fn random_scalar<R: CryptoRng + RngCore>(
        rng: &mut R,
    ) -> Result<Scalar, OTError> {
        let mut buf = Zeroizing::new([0u8; 32]);

        // Draws >= order and zero are discarded, never reduced, so the
        // result stays uniform.
        loop {
            rng.try_fill_bytes(&mut buf[..])
                .map_err(|_| OTError::RandomnessFailure)?;

            let candidate: Option<Scalar> =
                Scalar::from_repr(FieldBytes::clone_from_slice(&buf[..]))
                    .into();

            if let Some(k) = candidate {
                if !bool::from(k.is_zero()) {
                    return Ok(k);
                }
            }
        }
    }

    fn encode(p: &ProjectivePoint) -> Vec<u8> {
        p.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<ProjectivePoint, OTError> {
        if bytes.len() != Self::POINT_BYTES {
            return Err(OTError::InvalidEncoding);
        }

        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|_| OTError::InvalidEncoding)?;

        if !encoded.is_compressed() {
            return Err(OTError::InvalidEncoding);
        }

        let affine: Option<AffinePoint> =
            AffinePoint::from_encoded_point(&encoded).into();

        let point =
            ProjectivePoint::from(affine.ok_or(OTError::InvalidEncoding)?);

        if bool::from(point.is_identity()) {
            return Err(OTError::InvalidEncoding);
        }

        Ok(point)
    }
}

/// Additive group of integers modulo the Mersenne prime 2^61 - 1.
///
/// Discrete logs are trivial here, so it is only good for exercising the
/// protocol logic deterministically and fast.
#[cfg(test)]
pub(crate) mod toy {
    use super::*;

    pub const MODULUS: u64 = (1 << 61) - 1;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ToyPoint(pub u64);

    impl ConditionallySelectable for ToyPoint {
        fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
            Self(u64::conditional_select(&a.0, &b.0, choice))
        }
    }

    impl ConstantTimeEq for ToyPoint {
        fn ct_eq(&self, other: &Self) -> Choice {
            self.0.ct_eq(&other.0)
        }
    }

    pub struct ToyGroup;

    impl CurveGroup for ToyGroup {
        type Scalar = u64;
        type Point = ToyPoint;

        const POINT_BYTES: usize = 8;

        fn generator() -> ToyPoint {
            ToyPoint(7)
        }

        fn add(a: &ToyPoint, b: &ToyPoint) -> ToyPoint {
            ToyPoint((a.0 + b.0) % MODULUS)
        }

        fn negate(p: &ToyPoint) -> ToyPoint {
            ToyPoint((MODULUS - p.0) % MODULUS)
        }

        fn mul(k: &u64, p: &ToyPoint) -> ToyPoint {
            ToyPoint(((*k as u128 * p.0 as u128) % MODULUS as u128) as u64)
        }

        fn is_identity(p: &ToyPoint) -> bool {
            p.0 == 0
        }

        fn random_scalar<R: CryptoRng + RngCore>(
            rng: &mut R,
        ) -> Result<u64, OTError> {
            loop {
                let mut buf = [0u8; 8];
                rng.try_fill_bytes(&mut buf)
                    .map_err(|_| OTError::RandomnessFailure)?;
                let k = u64::from_be_bytes(buf) & MODULUS;
                if k != 0 && k != MODULUS {
                    return Ok(k);
                }
            }
        }

        fn encode(p: &ToyPoint) -> Vec<u8> {
            p.0.to_be_bytes().to_vec()
        }

        fn decode(bytes: &[u8]) -> Result<ToyPoint, OTError> {
            let bytes: [u8; 8] =
                bytes.try_into().map_err(|_| OTError::InvalidEncoding)?;
            let v = u64::from_be_bytes(bytes);
            if v == 0 || v >= MODULUS {
                return Err(OTError::InvalidEncoding);
            }
            Ok(ToyPoint(v))
        }
    }
}
