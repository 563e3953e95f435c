//! Core types used throughout bargain

use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a negotiation run (timestamp-based)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NegotiationId(pub String);

impl NegotiationId {
    /// Generate a new negotiation ID from the clock plus a random suffix,
    /// so runs started in the same millisecond by a batch stay distinct
    pub fn generate() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Self(format!("neg_{}_{:08x}", timestamp, rand::random::<u32>()))
    }
}

impl fmt::Display for NegotiationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Blake2b 256-bit hash wrapper
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Create hash from bytes using Blake2b
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Blake2b512::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result[..32]);
        Hash(hash)
    }

    /// Get hash as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create hash from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(Hash(hash))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Quality grade of a product lot
///
/// Parsing never fails: anything that is not `A`, `B` or `Export`
/// (ignoring case and surrounding whitespace) becomes `Ungraded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QualityGrade {
    A,
    B,
    Export,
    Ungraded,
}

impl QualityGrade {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "export" => Self::Export,
            _ => Self::Ungraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Export => "Export",
            Self::Ungraded => "Ungraded",
        }
    }
}

impl From<String> for QualityGrade {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for QualityGrade {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<QualityGrade> for String {
    fn from(grade: QualityGrade) -> Self {
        grade.as_str().to_string()
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The item being negotiated. Built once per negotiation and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub quality_grade: QualityGrade,
    pub origin: String,
    /// Reference price for the whole lot
    pub base_market_price: u64,
    /// Free-form attributes, carried for display only
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        quality_grade: impl Into<QualityGrade>,
        origin: impl Into<String>,
        base_market_price: u64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            quality_grade: quality_grade.into(),
            origin: origin.into(),
            base_market_price,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}
