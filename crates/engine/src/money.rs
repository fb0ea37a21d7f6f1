use std::fmt;

use crate::EngineError;

/// Largest magnitude accepted for a single amount: ten trillion units.
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000_000;

/// An amount in minor units (cents).
///
/// Balances, transaction amounts and case fees are all integers of cents;
/// this wrapper only carries the arithmetic that needs care.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let fee = MoneyCents::new(1_500_00);
/// assert_eq!(fee.to_string(), "1500.00");
/// assert_eq!(fee.split(4).unwrap()[0].cents(), 375_00);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Reject amounts whose magnitude exceeds [`MAX_AMOUNT_MINOR`].
    pub fn bounded(cents: i64, label: &str) -> Result<Self, EngineError> {
        if cents.unsigned_abs() > MAX_AMOUNT_MINOR.unsigned_abs() {
            return Err(EngineError::InvalidAmount(format!(
                "{label} must not exceed {}",
                MoneyCents(MAX_AMOUNT_MINOR)
            )));
        }
        Ok(Self(cents))
    }

    pub fn checked_add(self, other: MoneyCents) -> Result<Self, EngineError> {
        self.0.checked_add(other.0).map(Self).ok_or_else(overflow)
    }

    pub fn checked_sub(self, other: MoneyCents) -> Result<Self, EngineError> {
        self.0.checked_sub(other.0).map(Self).ok_or_else(overflow)
    }

    /// Divide a positive amount into `parts` equal shares, in order.
    ///
    /// The first share absorbs the remainder, so the shares always add up to
    /// the original amount. Fails when a share would be zero.
    pub fn split(self, parts: u32) -> Result<Vec<MoneyCents>, EngineError> {
        if parts == 0 {
            return Err(EngineError::InvalidInput(
                "cannot split into zero parts".to_string(),
            ));
        }
        if self.0 <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let count = i64::from(parts);
        let share = self.0 / count;
        if share == 0 {
            return Err(EngineError::InvalidAmount(format!(
                "{self} is too small for {parts} installments"
            )));
        }

        let first = MoneyCents(share + self.0 % count);
        Ok(std::iter::once(first)
            .chain(std::iter::repeat_n(MoneyCents(share), parts as usize - 1))
            .collect())
    }
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("amount total is out of range".to_string())
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / 100;
        let cents = (self.0 % 100).abs();
        if self.0 < 0 && units == 0 {
            write!(f, "-0.{cents:02}")
        } else {
            write!(f, "{units}.{cents:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_cents() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(5).to_string(), "0.05");
        assert_eq!(MoneyCents::new(250_000).to_string(), "2500.00");
        assert_eq!(MoneyCents::new(-75).to_string(), "-0.75");
        assert_eq!(MoneyCents::new(-12_345).to_string(), "-123.45");
    }

    #[test]
    fn bound_is_inclusive() {
        assert!(MoneyCents::bounded(MAX_AMOUNT_MINOR, "amount").is_ok());
        assert!(MoneyCents::bounded(-MAX_AMOUNT_MINOR, "amount").is_ok());
        assert!(matches!(
            MoneyCents::bounded(MAX_AMOUNT_MINOR + 1, "amount"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(MoneyCents::bounded(i64::MIN, "amount").is_err());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let big = MoneyCents::new(i64::MAX / 2 + 1);
        assert!(matches!(
            big.checked_add(big),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(MoneyCents::new(i64::MIN).checked_sub(MoneyCents::new(1)).is_err());
        assert_eq!(
            MoneyCents::new(5).checked_sub(MoneyCents::new(7)).unwrap(),
            MoneyCents::new(-2)
        );
    }

    #[test]
    fn split_keeps_the_total() {
        let shares = MoneyCents::new(10_000).split(3).unwrap();
        assert_eq!(
            shares,
            vec![
                MoneyCents::new(3_334),
                MoneyCents::new(3_333),
                MoneyCents::new(3_333)
            ]
        );
        assert_eq!(shares.iter().map(|s| s.cents()).sum::<i64>(), 10_000);
    }

    #[test]
    fn even_split_has_equal_shares() {
        let shares = MoneyCents::new(1_200).split(12).unwrap();
        assert!(shares.iter().all(|s| s.cents() == 100));
    }

    #[test]
    fn split_rejects_impossible_requests() {
        assert!(MoneyCents::new(2).split(3).is_err());
        assert!(MoneyCents::new(100).split(0).is_err());
        assert!(MoneyCents::new(-100).split(2).is_err());
    }
}
