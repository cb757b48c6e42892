//! Non-negative money value type.
//!
//! Amounts are stored as whole minor units in an `i64` (IDR has no
//! subunit in practice). Arithmetic is checked: results can never go
//! negative and operands must share a currency.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Supported currencies. The department operates in Rupiah; the closed
/// enum keeps mixed-currency arithmetic unrepresentable at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Idr,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Idr => "IDR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, non-negative monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Create a new amount, rejecting negatives.
    pub fn new(amount: i64, currency: Currency) -> CoreResult<Self> {
        if amount < 0 {
            return Err(CoreError::Validation(
                "amount cannot be negative".to_string(),
            ));
        }
        Ok(Self { amount, currency })
    }

    /// Create an IDR amount.
    pub fn idr(amount: i64) -> CoreResult<Self> {
        Self::new(amount, Currency::Idr)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Checked addition; fails on currency mismatch or overflow.
    pub fn checked_add(&self, other: &Money) -> CoreResult<Money> {
        self.require_same_currency(other)?;
        let amount = self.amount.checked_add(other.amount).ok_or_else(|| {
            CoreError::Validation("amount overflow in addition".to_string())
        })?;
        Ok(Money {
            amount,
            currency: self.currency,
        })
    }

    /// Checked subtraction; fails on currency mismatch or a negative result.
    pub fn checked_sub(&self, other: &Money) -> CoreResult<Money> {
        self.require_same_currency(other)?;
        if other.amount > self.amount {
            return Err(CoreError::Validation(
                "resulting amount cannot be negative".to_string(),
            ));
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    fn require_same_currency(&self, other: &Money) -> CoreResult<()> {
        if self.currency != other.currency {
            return Err(CoreError::Validation(format!(
                "currency mismatch: {} and {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }

    /// Rupiah display with thousand separators, e.g. `Rp 1.500.000`.
    pub fn format_idr(&self) -> String {
        let digits = self.amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        format!("Rp {grouped}")
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}
