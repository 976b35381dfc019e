//! Defines the CryptoProvider trait for crypto-agility.

use crate::error::CryptoError;

/// Trait that formalizes all cryptographic operations the channel relies on.
///
/// Every operation is an associated function so roles can be generic over the
/// suite without carrying a provider value around. Keys are raw byte strings;
/// each suite documents the lengths it expects through the `*_LEN` constants.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Opaque identifier of the public-key encryption scheme.
    const ENCRYPTION_ALGORITHM: &'static str;
    /// Opaque identifier of the signature scheme.
    const SIGNATURE_ALGORITHM: &'static str;
    /// Opaque identifier of the block cipher, mode and padding.
    const CIPHER_ALGORITHM: &'static str;
    /// Opaque identifier of the keyed MAC.
    const MAC_ALGORITHM: &'static str;

    /// Length of the symmetric session key in bytes.
    const SESSION_KEY_LEN: usize;
    /// Length of the block cipher IV in bytes.
    const IV_LEN: usize;
    /// Length of the MAC key in bytes.
    const MAC_KEY_LEN: usize;
    /// Length of an encryption public key in bytes.
    const ENCRYPTION_PUBLIC_KEY_LEN: usize;
    /// Length of an encryption private key in bytes.
    const ENCRYPTION_PRIVATE_KEY_LEN: usize;
    /// Length of a signature verifying key in bytes.
    const SIGNATURE_PUBLIC_KEY_LEN: usize;
    /// Length of a signing key in bytes.
    const SIGNATURE_PRIVATE_KEY_LEN: usize;

    /// Generates a new encryption key pair. Returns `(private, public)`.
    fn generate_encryption_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Generates a new signature key pair. Returns `(private, public)`.
    fn generate_signature_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Generates `len` bytes of secret randomness (symmetric keys, IVs).
    fn generate_secret(len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Derives an encryption public key from its private key.
    fn encryption_public_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Derives a verifying key from a signing key.
    fn signature_public_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Encrypts `plaintext` so only the holder of the matching private key can read it.
    fn asym_encrypt(public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Reverses [`CryptoProvider::asym_encrypt`].
    fn asym_decrypt(private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Signs a message with the given private key.
    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a signature with the given public key.
    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError>;

    /// Encrypts with the fixed block cipher and padding.
    /// `key`: The symmetric session key.
    /// `iv`: The initialization vector shared through key transport.
    fn sym_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts with the fixed block cipher. Fails on bad length or bad padding.
    fn sym_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Computes a keyed MAC tag over `message`.
    fn mac(key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Checks a MAC tag in constant time. Returns [`CryptoError::MacMismatch`] on mismatch.
    fn verify_mac(key: &[u8], message: &[u8], tag: &[u8]) -> Result<(), CryptoError>;
}
