//! Tests for cryptographic functions
//!
//! This test suite covers:
//! - Classic Suite Provider (X25519 sealed box, Ed25519, AES-128-CBC, HMAC-SHA256)
//! - Session material
//! - Key store loading

use secure_channel_core::crypto::suites::classic::ClassicSuiteProvider;
use secure_channel_core::crypto::{CryptoProvider, KeyKind, KeyStore, LongTermIdentity, Session};
use secure_channel_core::error::CryptoError;
use secure_channel_core::utils::b64;

/// Test that ClassicSuiteProvider can generate encryption keys
#[test]
fn test_classic_suite_generate_encryption_keys() {
    let result = ClassicSuiteProvider::generate_encryption_keys();
    assert!(result.is_ok(), "Failed to generate encryption keys");

    let (private_key, public_key) = result.unwrap();

    // X25519 keys should be 32 bytes
    assert_eq!(private_key.len(), 32, "Private key should be 32 bytes");
    assert_eq!(public_key.len(), 32, "Public key should be 32 bytes");
}

/// Test that ClassicSuiteProvider can generate signature keys
#[test]
fn test_classic_suite_generate_signature_keys() {
    let result = ClassicSuiteProvider::generate_signature_keys();
    assert!(result.is_ok(), "Failed to generate signature keys");

    let (signing_key, verifying_key) = result.unwrap();

    // Ed25519 keys: signing key 32 bytes, verifying key 32 bytes
    assert_eq!(signing_key.len(), 32, "Signing key should be 32 bytes");
    assert_eq!(verifying_key.len(), 32, "Verifying key should be 32 bytes");
}

/// Test signature creation and verification
#[test]
fn test_classic_suite_sign_verify() {
    let (signing_key, verifying_key) = ClassicSuiteProvider::generate_signature_keys().unwrap();
    let message = b"Hello, Bob!";

    let signature = ClassicSuiteProvider::sign(&signing_key, message);
    assert!(signature.is_ok(), "Failed to sign message");
    let signature = signature.unwrap();

    // Ed25519 signature should be 64 bytes
    assert_eq!(signature.len(), 64, "Signature should be 64 bytes");

    let verify_result = ClassicSuiteProvider::verify(&verifying_key, message, &signature);
    assert!(verify_result.is_ok(), "Signature verification failed");
}

/// Test that signature verification fails with wrong message
#[test]
fn test_classic_suite_verify_fails_with_wrong_message() {
    let (signing_key, verifying_key) = ClassicSuiteProvider::generate_signature_keys().unwrap();
    let signature = ClassicSuiteProvider::sign(&signing_key, b"Original message").unwrap();

    let verify_result = ClassicSuiteProvider::verify(&verifying_key, b"Modified message", &signature);
    assert!(verify_result.is_err(), "Verification should fail with wrong message");
}

/// Test public-key encryption round trip
#[test]
fn test_classic_suite_asym_encrypt_decrypt() {
    let (private_key, public_key) = ClassicSuiteProvider::generate_encryption_keys().unwrap();
    let plaintext = br#"{"Sender":"Alice","Session Key":"AAAA"}"#;

    let ciphertext = ClassicSuiteProvider::asym_encrypt(&public_key, plaintext).unwrap();
    assert_ne!(&ciphertext[..], &plaintext[..]);

    let decrypted = ClassicSuiteProvider::asym_decrypt(&private_key, &ciphertext).unwrap();
    assert_eq!(decrypted, plaintext);
}

/// Sealing twice gives different ciphertexts (fresh ephemeral key each time)
#[test]
fn test_classic_suite_asym_encrypt_is_randomized() {
    let (_, public_key) = ClassicSuiteProvider::generate_encryption_keys().unwrap();
    let a = ClassicSuiteProvider::asym_encrypt(&public_key, b"same").unwrap();
    let b = ClassicSuiteProvider::asym_encrypt(&public_key, b"same").unwrap();
    assert_ne!(a, b);
}

/// Test block cipher encryption and decryption
#[test]
fn test_classic_suite_sym_encrypt_decrypt() {
    let key = ClassicSuiteProvider::generate_secret(ClassicSuiteProvider::SESSION_KEY_LEN).unwrap();
    let iv = ClassicSuiteProvider::generate_secret(ClassicSuiteProvider::IV_LEN).unwrap();
    let plaintext = br#"{"Message Number":1,"Message":"hello"}"#;

    let ciphertext = ClassicSuiteProvider::sym_encrypt(&key, &iv, plaintext).unwrap();
    assert_eq!(ciphertext.len() % 16, 0, "CBC output must be block aligned");

    let decrypted = ClassicSuiteProvider::sym_decrypt(&key, &iv, &ciphertext).unwrap();
    assert_eq!(decrypted, plaintext);
}

/// Test that block cipher decryption with the wrong key does not return the plaintext
#[test]
fn test_classic_suite_sym_decrypt_with_wrong_key() {
    let key = vec![1u8; 16];
    let wrong_key = vec![2u8; 16];
    let iv = vec![0u8; 16];
    let plaintext = b"attack at dawn, attack at dawn!!";

    let ciphertext = ClassicSuiteProvider::sym_encrypt(&key, &iv, plaintext).unwrap();
    match ClassicSuiteProvider::sym_decrypt(&wrong_key, &iv, &ciphertext) {
        Ok(decrypted) => assert_ne!(decrypted, plaintext),
        Err(e) => assert!(matches!(e, CryptoError::CipherDecryptionError(_))),
    }
}

/// Test MAC creation and constant-time verification
#[test]
fn test_classic_suite_mac() {
    let key = ClassicSuiteProvider::generate_secret(ClassicSuiteProvider::MAC_KEY_LEN).unwrap();
    let tag = ClassicSuiteProvider::mac(&key, b"ciphertext").unwrap();
    assert_eq!(tag.len(), 32, "HMAC-SHA256 tag should be 32 bytes");

    assert!(ClassicSuiteProvider::verify_mac(&key, b"ciphertext", &tag).is_ok());
    assert_eq!(
        ClassicSuiteProvider::verify_mac(&key, b"ciphertexT", &tag),
        Err(CryptoError::MacMismatch)
    );
}

/// Test session material matches suite lengths and is fresh each time
#[test]
fn test_session_generation() {
    let a = Session::generate::<ClassicSuiteProvider>().unwrap();
    let b = Session::generate::<ClassicSuiteProvider>().unwrap();

    assert_eq!(a.session_key().len(), 16);
    assert_eq!(a.iv().len(), 16);
    assert_eq!(a.mac_key().len(), 32);
    assert_ne!(a.mac_key(), b.mac_key());
}

/// Test key files written as base64 load back into an identity
#[test]
fn test_key_store_loads_identity() {
    let dir = tempfile::tempdir().unwrap();
    let alice = LongTermIdentity::generate::<ClassicSuiteProvider>("Alice").unwrap();
    let store = KeyStore::<ClassicSuiteProvider>::new(dir.path());

    let files = [
        (KeyKind::SignPublic, alice.public_sign.clone()),
        (KeyKind::SignPrivate, alice.private_sign().to_vec()),
        (KeyKind::EncryptPublic, alice.public_encrypt.clone()),
        (KeyKind::EncryptPrivate, alice.private_encrypt().to_vec()),
    ];
    for (kind, bytes) in files {
        std::fs::write(store.path_for("Alice", kind), format!("{}\n", b64::encode(&bytes))).unwrap();
    }

    assert!(store.path_for("Alice", KeyKind::SignPublic).ends_with("alice.sign-public.key"));

    let loaded = LongTermIdentity::load(&store, "Alice").unwrap();
    assert_eq!(loaded.private_sign(), alice.private_sign());
    assert_eq!(
        ClassicSuiteProvider::encryption_public_from_private(loaded.private_encrypt()).unwrap(),
        alice.public_encrypt
    );
}

/// Test random number generation quality (entropy check)
#[test]
fn test_random_number_quality() {
    let mut bytes_set = std::collections::HashSet::new();

    // Generate 100 random IVs
    for _ in 0..100 {
        let iv = ClassicSuiteProvider::generate_secret(ClassicSuiteProvider::IV_LEN).unwrap();
        let iv_hex = hex::encode(&iv);

        // All IVs should be unique
        assert!(bytes_set.insert(iv_hex.clone()), "Duplicate IV generated: {}", iv_hex);
    }

    assert_eq!(bytes_set.len(), 100, "Not all IVs are unique");
}
