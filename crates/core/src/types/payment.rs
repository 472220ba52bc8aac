//! Payment mode enumeration.
//!
//! Payment mode is a label on the order only; no gateway integration
//! exists behind it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a payment mode label is not recognized.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown payment mode: {0}")]
pub struct PaymentModeError(pub String);

/// The fixed set of accepted payment modes.
///
/// Serialized with the exact labels the checkout form presents, e.g.
/// `"Cash on Delivery"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Upi,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Netbanking,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMode {
    /// Every accepted payment mode, in display order.
    pub const ALL: [Self; 5] = [
        Self::Upi,
        Self::DebitCard,
        Self::CreditCard,
        Self::Netbanking,
        Self::CashOnDelivery,
    ];

    /// The display label for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "Upi",
            Self::DebitCard => "Debit Card",
            Self::CreditCard => "Credit Card",
            Self::Netbanking => "Netbanking",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }

    /// Parse a mode from its display label.
    ///
    /// # Errors
    ///
    /// Returns `PaymentModeError` if the label is not one of the accepted
    /// modes. Matching is exact; labels are what the checkout form submits.
    pub fn parse(s: &str) -> Result<Self, PaymentModeError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PaymentModeError(s.to_owned()))
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = PaymentModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with sqlite feature): stored as the display label.
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for PaymentMode {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for PaymentMode {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for PaymentMode {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.as_str().to_owned(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_labels() {
        for mode in PaymentMode::ALL {
            assert_eq!(PaymentMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert!(PaymentMode::parse("upi").is_err());
        assert!(PaymentMode::parse("Bitcoin").is_err());
        assert!(PaymentMode::parse("").is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&PaymentMode::CashOnDelivery).unwrap();
        assert_eq!(json, "\"Cash on Delivery\"");

        let parsed: PaymentMode = serde_json::from_str("\"Debit Card\"").unwrap();
        assert_eq!(parsed, PaymentMode::DebitCard);
    }
}
