use crate::{
    Result,
    constants::{MAX_TAG_ID_LENGTH, MIN_TAG_ID_LENGTH},
    error::Error,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock instant used for sightings and stream bookkeeping.
pub type Timestamp = DateTime<Local>;

/// Raw tag identifier (EPC bytes).
///
/// Equality and hashing are by byte content, so the same physical tag
/// always maps to the same key no matter which buffer it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(Box<[u8]>);

impl TagId {
    /// Create a tag identifier from raw bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if the identifier is empty or longer
    /// than the EPC memory bank allows.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if !(MIN_TAG_ID_LENGTH..=MAX_TAG_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidTagId(format!(
                "Tag identifier must be {MIN_TAG_ID_LENGTH}-{MAX_TAG_ID_LENGTH} bytes, got {len}"
            )));
        }
        Ok(TagId(bytes))
    }

    /// Parse an identifier from hexadecimal text.
    ///
    /// Whitespace between byte pairs is accepted, so `"AA BB"` and `"aabb"`
    /// name the same tag.
    ///
    /// # Errors
    /// Returns `Error::InvalidEpc` for odd-length or non-hex input.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if !digits.is_ascii() {
            return Err(Error::InvalidEpc(format!("'{s}' is not hexadecimal")));
        }
        if digits.len() % 2 != 0 {
            return Err(Error::InvalidEpc(format!(
                "'{s}' has an odd number of hex digits"
            )));
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(&digits[i..i + 2], 16)
                    .map_err(|_| Error::InvalidEpc(format!("'{s}' is not hexadecimal")))
            })
            .collect::<Result<Vec<u8>>>()?;

        TagId::new(bytes)
    }

    /// Get the raw identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of identifier bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed identifier; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the identifier as uppercase hex without separators.
    #[must_use]
    pub fn to_epc(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_epc())
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::from_hex(s)
    }
}

impl TryFrom<&[u8]> for TagId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        TagId::new(bytes)
    }
}

/// Last-seen metadata for one tag.
///
/// Serializes with the field names the inventory route exposes:
/// `epc`, `antennaId` and `timeserie`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    /// Uppercase hex rendering of the identifier, computed at first sighting.
    pub epc: String,

    /// Antenna that produced the most recent sighting.
    #[serde(rename = "antennaId")]
    pub antenna_id: u8,

    /// Time of the most recent sighting.
    #[serde(rename = "timeserie")]
    pub last_seen: Timestamp,
}

impl TagEntry {
    /// Create the entry for a tag seen for the first time.
    #[must_use]
    pub fn first_sighting(id: &TagId, antenna_id: u8, now: Timestamp) -> Self {
        Self {
            epc: id.to_epc(),
            antenna_id,
            last_seen: now,
        }
    }

    /// Record a repeat sighting. The EPC text is left untouched.
    pub fn resighted(&mut self, antenna_id: u8, now: Timestamp) {
        self.antenna_id = antenna_id;
        self.last_seen = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(&[0xAA, 0xBB], "AABB")]
    #[case(&[0x00, 0x0F, 0xF0], "000FF0")]
    #[case(&[0xE2, 0x00, 0x34, 0x12, 0x01, 0x2C], "E2003412012C")]
    fn test_tag_id_epc_rendering(#[case] bytes: &[u8], #[case] expected: &str) {
        let id = TagId::try_from(bytes).unwrap();
        assert_eq!(id.to_epc(), expected);
        assert_eq!(id.to_epc().len(), bytes.len() * 2);
        assert_eq!(id.to_string(), expected);
    }

    #[rstest]
    #[case("AABB", &[0xAA, 0xBB])]
    #[case("aa bb", &[0xAA, 0xBB])]
    #[case("E2 00 34", &[0xE2, 0x00, 0x34])]
    fn test_tag_id_from_hex(#[case] input: &str, #[case] expected: &[u8]) {
        let id: TagId = input.parse().unwrap();
        assert_eq!(id.as_bytes(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("ABC")] // odd length
    #[case("ZZ")] // not hex
    fn test_tag_id_from_hex_invalid(#[case] input: &str) {
        assert!(TagId::from_hex(input).is_err());
    }

    #[test]
    fn test_tag_id_rejects_empty() {
        let result = TagId::new(Vec::<u8>::new());
        assert!(matches!(result, Err(Error::InvalidTagId(_))));
    }

    #[test]
    fn test_tag_id_rejects_oversized() {
        let result = TagId::new(vec![0u8; MAX_TAG_ID_LENGTH + 1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tag_id_equality_is_by_content() {
        let a = TagId::new(vec![0xCCu8, 0xDD]).unwrap();
        let b = TagId::try_from([0xCCu8, 0xDD].as_slice()).unwrap();
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_tag_entry_resighting_keeps_epc() {
        let id = TagId::from_hex("AABB").unwrap();
        let first = Local.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
        let second = Local.with_ymd_and_hms(2025, 1, 15, 12, 30, 5).unwrap();

        let mut entry = TagEntry::first_sighting(&id, 1, first);
        entry.resighted(2, second);

        assert_eq!(entry.epc, "AABB");
        assert_eq!(entry.antenna_id, 2);
        assert_eq!(entry.last_seen, second);
    }

    #[test]
    fn test_tag_entry_serialization_field_names() {
        let id = TagId::from_hex("CCDD").unwrap();
        let at = Local.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
        let entry = TagEntry::first_sighting(&id, 3, at);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["epc"], "CCDD");
        assert_eq!(json["antennaId"], 3);
        assert!(json["timeserie"].is_string());
    }
}
