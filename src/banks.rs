//! Participant-bank registry.
//!
//! The interbank directory is a compile-time constant: ten banks reachable
//! over the (notional) network, each identified by a 6-digit code. The home
//! bank itself is not listed here - it is identified by the configured
//! `home_bank_code`.

use serde::Serialize;

/// A bank reachable over the interbank network.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantBank {
    #[serde(rename = "bankName")]
    pub bank_name: &'static str,
    #[serde(rename = "bankCode")]
    pub bank_code: &'static str,
}

const BANKS: &[ParticipantBank] = &[
    ParticipantBank { bank_name: "Access Bank", bank_code: "044001" },
    ParticipantBank { bank_name: "First Bank of Nigeria", bank_code: "011001" },
    ParticipantBank { bank_name: "Guaranty Trust Bank", bank_code: "058001" },
    ParticipantBank { bank_name: "United Bank for Africa", bank_code: "033001" },
    ParticipantBank { bank_name: "Zenith Bank", bank_code: "057001" },
    ParticipantBank { bank_name: "Fidelity Bank", bank_code: "070001" },
    ParticipantBank { bank_name: "Ecobank Nigeria", bank_code: "050001" },
    ParticipantBank { bank_name: "FCMB", bank_code: "214001" },
    ParticipantBank { bank_name: "Union Bank", bank_code: "032001" },
    ParticipantBank { bank_name: "Sterling Bank", bank_code: "232001" },
];

/// All participant banks.
pub fn all() -> &'static [ParticipantBank] {
    BANKS
}

/// Resolve a bank name by code. Linear scan over a tiny slice.
pub fn lookup(bank_code: &str) -> Option<&'static str> {
    let trimmed = bank_code.trim();
    BANKS
        .iter()
        .find(|bank| bank.bank_code == trimmed)
        .map(|bank| bank.bank_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_code() {
        assert_eq!(lookup("044001"), Some("Access Bank"));
        assert_eq!(lookup(" 232001 "), Some("Sterling Bank"));
    }

    #[test]
    fn lookup_unknown_code() {
        assert_eq!(lookup("999999"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn registry_has_ten_banks_with_six_digit_codes() {
        assert_eq!(all().len(), 10);
        for bank in all() {
            assert_eq!(bank.bank_code.len(), 6);
            assert!(bank.bank_code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
