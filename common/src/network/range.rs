//! # Range Descriptors
//!
//! A [`RangeSpec`] is a block of IPv4 addresses written as `A.B.C.D/N`.
//!
//! Addresses inside a range are addressed by an *offset* counted from the base
//! address. The offset is split into four 8-bit groups (most significant first) and
//! each group is added to the matching base octet. Offsets that are a multiple of
//! 256 are network addresses and are never handed out by the enumerator, except for
//! a /32 whose only address is the base itself.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

const OCTET_SPAN: u64 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range '{0}', expected A.B.C.D/N")]
    InvalidRangeFormat(String),
    #[error("invalid prefix length {prefix} in '{range}', must be within 0-32")]
    InvalidPrefixLength { range: String, prefix: i64 },
    #[error("invalid octet {octet} in '{range}', must be within 0-255")]
    InvalidOctet { range: String, octet: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeSpec {
    base: Ipv4Addr,
    prefix_len: u8,
    label: String,
    output_key: String,
}

impl RangeSpec {
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Result<Self, RangeError> {
        if prefix_len > 32 {
            return Err(RangeError::InvalidPrefixLength {
                range: format!("{base}/{prefix_len}"),
                prefix: i64::from(prefix_len),
            });
        }

        Ok(Self {
            base,
            prefix_len,
            label: format!("{base}/{prefix_len}"),
            output_key: format!("{base}({prefix_len})_domains.txt"),
        })
    }

    pub fn base(&self) -> Ipv4Addr {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Progress caption shown once when the range starts being probed.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the result file discoveries in this range are appended to.
    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Number of addresses covered, `2^(32 - prefix)`.
    pub fn range_size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Derives the address at `offset`, adding each 8-bit group of the offset to
    /// the corresponding base octet. Octets wrap independently.
    pub fn address_at(&self, offset: u64) -> Ipv4Addr {
        let base: [u8; 4] = self.base.octets();
        let mut octets: [u8; 4] = [0; 4];

        for (idx, octet) in octets.iter_mut().enumerate() {
            let group: u64 = (offset / OCTET_SPAN.pow(3 - idx as u32)) % OCTET_SPAN;
            *octet = base[idx].wrapping_add(group as u8);
        }

        Ipv4Addr::from(octets)
    }

    pub fn first_address(&self) -> Ipv4Addr {
        self.address_at(0)
    }

    pub fn last_address(&self) -> Ipv4Addr {
        self.address_at(self.range_size() - 1)
    }
}

/// True for offsets that land on a network address (`x.x.x.0` in an aligned range).
pub fn is_network_offset(offset: u64) -> bool {
    offset % OCTET_SPAN == 0
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for RangeSpec {
    type Err = RangeError;

    /// Parses `A.B.C.D/N`.
    ///
    /// Anything that is not four numeric components and one numeric prefix is a
    /// format error. Numbers outside their bounds get their own error kinds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s: &str = s.trim();
        let format_err = || RangeError::InvalidRangeFormat(s.to_string());

        let (addr_str, prefix_str) = s.split_once('/').ok_or_else(format_err)?;
        if prefix_str.contains('/') {
            return Err(format_err());
        }

        let components: Vec<&str> = addr_str.split('.').collect();
        if components.len() != 4 {
            return Err(format_err());
        }

        let mut octets: [u8; 4] = [0; 4];
        for (slot, component) in octets.iter_mut().zip(components) {
            let value: i64 = parse_number(component).ok_or_else(format_err)?;
            *slot = u8::try_from(value).map_err(|_| RangeError::InvalidOctet {
                range: s.to_string(),
                octet: value,
            })?;
        }

        let prefix: i64 = parse_number(prefix_str).ok_or_else(format_err)?;
        let prefix_len: u8 = match u8::try_from(prefix) {
            Ok(p) if p <= 32 => p,
            _ => {
                return Err(RangeError::InvalidPrefixLength {
                    range: s.to_string(),
                    prefix,
                });
            }
        };

        RangeSpec::new(Ipv4Addr::from(octets), prefix_len)
    }
}

/// Plain decimal digits only: no sign, no inner whitespace.
fn parse_number(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<i64>().unwrap_or(i64::MAX))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
