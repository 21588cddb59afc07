use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{constants::KEY_BYTES, group::CurveGroup};

/// Symmetric key for one payload: `SHA-256(encode(point))`.
///
/// Both parties arrive at the same key from the same point without any
/// further negotiation.
pub fn derive_key<G: CurveGroup>(point: &G::Point) -> Zeroizing<[u8; KEY_BYTES]> {
    let encoded = Zeroizing::new(G::encode(point));

    Zeroizing::new(Sha256::digest(&encoded[..]).into())
}

#[cfg(test)]
mod test {
    use rand::{rngs::OsRng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::group::{toy::ToyGroup, P256};

    #[test]
    fn same_point_same_key() {
        let mut rng = ChaCha20Rng::from_seed([3; 32]);
        let k = P256::random_scalar(&mut rng).unwrap();
        let p = P256::mul(&k, &P256::generator());

        assert_eq!(*derive_key::<P256>(&p), *derive_key::<P256>(&p));
    }

    #[test]
    fn key_is_hash_of_compressed_encoding() {
        let g = P256::generator();
        let expected: [u8; 32] = Sha256::digest(P256::encode(&g)).into();

        assert_eq!(*derive_key::<P256>(&g), expected);
    }

    #[test]
    fn distinct_points_distinct_keys() {
        let mut rng = OsRng;
        let a = P256::random_scalar(&mut rng).unwrap();
        let p = P256::mul(&a, &P256::generator());
        let q = P256::add(&p, &P256::generator());

        assert_ne!(*derive_key::<P256>(&p), *derive_key::<P256>(&q));
    }

    #[test]
    fn works_for_any_group() {
        let p = ToyGroup::generator();

        assert_eq!(
            *derive_key::<ToyGroup>(&p),
            <[u8; 32]>::from(Sha256::digest(7u64.to_be_bytes()))
        );
    }
}
