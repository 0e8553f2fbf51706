use std::fmt;
use std::str::FromStr;

/// Errors in the session configuration, reported at open time.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// No decryption key was supplied. The key is mandatory.
    #[error("no decryption key supplied")]
    MissingKey,

    /// The key is not exactly 16 bytes long.
    #[error("decryption key must be 16 bytes, got {len}")]
    InvalidKeyLength { len: usize },

    /// The key string is not valid hexadecimal.
    #[error("decryption key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// 128-bit AES key used to decrypt payload prefixes.
///
/// The bytes never appear in `Debug` output.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DecryptionKey([u8; DecryptionKey::LEN]);

impl DecryptionKey {
    pub const LEN: usize = 16;

    pub fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice, rejecting any length other than 16.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeyLength`] for a wrong-sized slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let key: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| ConfigError::InvalidKeyLength { len: bytes.len() })?;
        Ok(Self(key))
    }

    /// Parse 32 hex characters. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidHex`] for a non-hex character or odd length.
    /// - [`ConfigError::InvalidKeyLength`] if the decoded key is not 16 bytes.
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(s.trim())?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DecryptionKey(..)")
    }
}

impl FromStr for DecryptionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Configuration for opening an lk7777 session.
///
/// The decryption key is the only recognised option and it is mandatory,
/// so a `DemuxConfig` cannot exist without one. The resync budget and the
/// encrypted prefix length are protocol constants, not settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemuxConfig {
    pub key: DecryptionKey,
}

impl DemuxConfig {
    pub fn new(key: DecryptionKey) -> Self {
        Self { key }
    }

    /// Validate raw key bytes into a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeyLength`] unless `key` is 16 bytes.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self, ConfigError> {
        DecryptionKey::from_slice(key).map(Self::new)
    }

    /// Build a configuration from an optional hex key, as found on a
    /// command line or in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] for `None`, otherwise any error
    /// from [`DecryptionKey::from_hex`].
    pub fn from_hex_key(key: Option<&str>) -> Result<Self, ConfigError> {
        let key = key.ok_or(ConfigError::MissingKey)?;
        DecryptionKey::from_hex(key).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_sixteen_bytes() {
        assert!(DecryptionKey::from_slice(&[0u8; 16]).is_ok());
        assert_eq!(
            DecryptionKey::from_slice(&[0u8; 15]),
            Err(ConfigError::InvalidKeyLength { len: 15 })
        );
        assert_eq!(
            DecryptionKey::from_slice(&[0u8; 17]),
            Err(ConfigError::InvalidKeyLength { len: 17 })
        );
        assert_eq!(
            DecryptionKey::from_slice(&[]),
            Err(ConfigError::InvalidKeyLength { len: 0 })
        );
    }

    #[test]
    fn parses_hex() {
        let key = DecryptionKey::from_hex(" 000102030405060708090a0b0c0d0e0f\n").unwrap();
        assert_eq!(key.as_bytes()[15], 0x0F);

        let parsed: DecryptionKey = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF".parse().unwrap();
        assert_eq!(parsed.as_bytes(), &[0xFF; 16]);
    }

    #[test]
    fn rejects_bad_hex() {
        assert_eq!(
            DecryptionKey::from_hex("zz0102030405060708090a0b0c0d0e0f"),
            Err(ConfigError::InvalidHex(hex::FromHexError::InvalidHexCharacter {
                c: 'z',
                index: 0
            }))
        );
        assert_eq!(
            DecryptionKey::from_hex("0001"),
            Err(ConfigError::InvalidKeyLength { len: 2 })
        );
    }

    #[test]
    fn missing_key_is_reported() {
        assert_eq!(DemuxConfig::from_hex_key(None), Err(ConfigError::MissingKey));
        assert!(DemuxConfig::from_hex_key(Some("00000000000000000000000000000000")).is_ok());
    }

    #[test]
    fn debug_redacts_key() {
        let key = DecryptionKey::new([0xAB; 16]);
        let shown = format!("{:?}", DemuxConfig::new(key));
        assert!(!shown.contains("171"));
        assert!(shown.contains("DecryptionKey(..)"));
    }
}
