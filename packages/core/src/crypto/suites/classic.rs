use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key as AeadKeyChacha, KeyInit, Nonce};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand_core::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

const X25519_KEY_LEN: usize = 32;
const SEAL_NONCE_LEN: usize = 12;
const SEAL_INFO: &[u8] = b"secure-channel/key-transport/v1";
const AES_BLOCK_LEN: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = hmac::Hmac<Sha256>;

/// Concrete implementation of `CryptoProvider` for the classic suite.
///
/// - public-key encryption: X25519 sealed box (ephemeral DH, HKDF-SHA256, ChaCha20-Poly1305)
/// - signatures: Ed25519
/// - block cipher: AES-128-CBC with PKCS#7 padding
/// - MAC: HMAC-SHA256
pub struct ClassicSuiteProvider;

fn to_array_32(bytes: &[u8], what: &str) -> Result<[u8; 32], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidInputError(format!("Invalid {} length", what)))
}

fn seal_key(shared: &[u8], ephemeral_public: &[u8], recipient_public: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut salt = Vec::with_capacity(ephemeral_public.len() + recipient_public.len());
    salt.extend_from_slice(ephemeral_public);
    salt.extend_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(Some(&salt), shared);
    let mut okm = [0u8; 32];
    hkdf.expand(SEAL_INFO, &mut okm)
        .map_err(|e| CryptoError::KeyDerivationError(e.to_string()))?;
    Ok(okm)
}

impl CryptoProvider for ClassicSuiteProvider {
    const ENCRYPTION_ALGORITHM: &'static str = "X25519-HKDF-SHA256-ChaCha20Poly1305";
    const SIGNATURE_ALGORITHM: &'static str = "Ed25519";
    const CIPHER_ALGORITHM: &'static str = "AES-128/CBC/PKCS7";
    const MAC_ALGORITHM: &'static str = "HmacSHA256";

    const SESSION_KEY_LEN: usize = 16;
    const IV_LEN: usize = AES_BLOCK_LEN;
    const MAC_KEY_LEN: usize = 32;
    const ENCRYPTION_PUBLIC_KEY_LEN: usize = X25519_KEY_LEN;
    const ENCRYPTION_PRIVATE_KEY_LEN: usize = X25519_KEY_LEN;
    const SIGNATURE_PUBLIC_KEY_LEN: usize = 32;
    const SIGNATURE_PRIVATE_KEY_LEN: usize = 32;

    fn generate_encryption_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let private_key = StaticSecret::random_from_rng(OsRng);
        let public_key = X25519PublicKey::from(&private_key);
        Ok((private_key.to_bytes().to_vec(), public_key.to_bytes().to_vec()))
    }

    fn generate_signature_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Ok((
            signing_key.to_bytes().to_vec(),
            verifying_key.to_bytes().to_vec(),
        ))
    }

    fn generate_secret(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(bytes)
    }

    fn encryption_public_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = to_array_32(private_key, "encryption private key")?;
        let static_secret = StaticSecret::from(bytes);
        Ok(X25519PublicKey::from(&static_secret).to_bytes().to_vec())
    }

    fn signature_public_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = to_array_32(private_key, "signing key")?;
        let signing_key = SigningKey::from_bytes(&bytes);
        Ok(signing_key.verifying_key().to_bytes().to_vec())
    }

    fn asym_encrypt(public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let pk_bytes = to_array_32(public_key, "encryption public key")?;
        let recipient_public = X25519PublicKey::from(pk_bytes);

        // Get ephemeral public key before consuming ephemeral_secret
        let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);
        let shared = ephemeral_secret.diffie_hellman(&recipient_public);

        let key = seal_key(shared.as_bytes(), ephemeral_public.as_bytes(), &pk_bytes)?;
        let mut nonce = [0u8; SEAL_NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce)?;

        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(&key));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::SealError(e.to_string()))?;

        let mut out = Vec::with_capacity(X25519_KEY_LEN + SEAL_NONCE_LEN + sealed.len());
        out.extend_from_slice(ephemeral_public.as_bytes());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn asym_decrypt(private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < X25519_KEY_LEN + SEAL_NONCE_LEN {
            return Err(CryptoError::OpenError("Sealed payload too short".to_string()));
        }
        let sk_bytes = to_array_32(private_key, "encryption private key")?;
        let static_secret = StaticSecret::from(sk_bytes);
        let own_public = X25519PublicKey::from(&static_secret);

        let (ephemeral_bytes, rest) = ciphertext.split_at(X25519_KEY_LEN);
        let (nonce, sealed) = rest.split_at(SEAL_NONCE_LEN);
        let ephemeral_public = X25519PublicKey::from(to_array_32(ephemeral_bytes, "ephemeral key")?);
        let shared = static_secret.diffie_hellman(&ephemeral_public);

        let key = seal_key(shared.as_bytes(), ephemeral_bytes, own_public.as_bytes())?;
        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(&key));
        let plaintext = cipher.decrypt(Nonce::from_slice(nonce), sealed)?;
        Ok(plaintext)
    }

    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = to_array_32(private_key, "signing key")?;
        let signing_key = SigningKey::from_bytes(&bytes);
        let signature = signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let vk_bytes = to_array_32(public_key, "verifying key")?;
        let verifying_key = VerifyingKey::from_bytes(&vk_bytes)
            .map_err(|e| CryptoError::InvalidInputError(format!("Invalid verifying key: {}", e)))?;

        let sig_bytes: &[u8; 64] = signature
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid signature length".to_string()))?;
        let signature_obj = Signature::from_bytes(sig_bytes);

        verifying_key
            .verify(message, &signature_obj)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))
    }

    fn sym_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

        let encryptor = Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(|e| CryptoError::CipherEncryptionError(e.to_string()))?;
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn sym_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

        if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_LEN != 0 {
            return Err(CryptoError::CipherDecryptionError(
                "Ciphertext length must be a non-zero multiple of block size".to_string(),
            ));
        }
        let decryptor = Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| CryptoError::CipherDecryptionError(e.to_string()))?;
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CryptoError::CipherDecryptionError(e.to_string()))
    }

    fn mac(key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        use hmac::Mac;

        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| CryptoError::MacError(e.to_string()))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify_mac(key: &[u8], message: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
        use hmac::Mac;

        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| CryptoError::MacError(e.to_string()))?;
        mac.update(message);
        mac.verify_slice(tag).map_err(|_| CryptoError::MacMismatch)
    }
}
