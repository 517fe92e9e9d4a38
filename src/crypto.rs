use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const COST_LEN: usize = 8;
const HEADER_LEN: usize = SALT_LEN + COST_LEN + NONCE_LEN;
/// Prepended to the plaintext before sealing; checked on open to tell a wrong
/// passphrase apart from a foreign file.
const MAGIC: &[u8] = b"FLOWCAST";
const FORMAT_VERSION: u8 = 1;
/// Upper bound accepted from a file header, 1 GiB.
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
const MAX_ITERATIONS: u32 = 64;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed, wrong passphrase or corrupted data")]
    Decryption,
    #[error("invalid data format")]
    InvalidFormat,
    #[error("unsupported data format version {0}")]
    UnsupportedVersion(u8),
}

/// Argon2id cost. Stored in the sealed header so a file opens with the cost
/// it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for KdfCost {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
        }
    }
}

impl KdfCost {
    fn to_bytes(self) -> [u8; COST_LEN] {
        let mut out = [0u8; COST_LEN];
        out[..4].copy_from_slice(&self.memory_kib.to_le_bytes());
        out[4..].copy_from_slice(&self.iterations.to_le_bytes());
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let memory_kib = u32::from_le_bytes(
            bytes[..4].try_into().map_err(|_| CryptoError::InvalidFormat)?,
        );
        let iterations = u32::from_le_bytes(
            bytes[4..COST_LEN]
                .try_into()
                .map_err(|_| CryptoError::InvalidFormat)?,
        );
        if memory_kib > MAX_MEMORY_KIB || iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(CryptoError::InvalidFormat);
        }
        Ok(Self {
            memory_kib,
            iterations,
        })
    }
}

/// Derive a 256-bit key from a passphrase and salt using Argon2id.
fn derive_key(
    passphrase: &str,
    salt: &[u8],
    cost: KdfCost,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(cost.memory_kib, cost.iterations, 1, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivation)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(key)
}

/// Encrypt `plaintext` under `passphrase`.
/// Output: salt (32) || cost (8) || nonce (12) || ciphertext
pub fn seal(passphrase: &str, plaintext: &[u8], cost: KdfCost) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt, cost)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::Encryption)?;

    let mut payload = Zeroizing::new(Vec::with_capacity(MAGIC.len() + 1 + plaintext.len()));
    payload.extend_from_slice(MAGIC);
    payload.push(FORMAT_VERSION);
    payload.extend_from_slice(plaintext);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), payload.as_slice())
        .map_err(|_| CryptoError::Encryption)?;

    let mut output = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&cost.to_bytes());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data produced by [`seal`].
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < HEADER_LEN + MAGIC.len() + 1 {
        return Err(CryptoError::InvalidFormat);
    }

    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (cost, rest) = rest.split_at(COST_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
    let cost = KdfCost::from_bytes(cost)?;

    let key = derive_key(passphrase, salt, cost)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::Decryption)?;

    let decrypted = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::Decryption)?,
    );

    let header_len = MAGIC.len() + 1;
    if decrypted.len() < header_len || &decrypted[..MAGIC.len()] != MAGIC {
        return Err(CryptoError::Decryption);
    }
    let version = decrypted[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }

    Ok(Zeroizing::new(decrypted[header_len..].to_vec()))
}
