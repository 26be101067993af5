//! Coupon & pricing resolution.
//!
//! `final = round2(base × (1 − discount/100))`. A final price strictly between
//! zero and the provider minimum cannot be charged, so such a quote is
//! rejected. A zero final price routes to free-usage registration instead of
//! a charge.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A non-negative amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    /// Rounds to the nearest cent; negative inputs clamp to zero.
    pub fn from_decimal(amount: f64) -> Self {
        Price((amount.max(0.0) * 100.0).round() as u64)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {},{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Price::from_decimal(f64::deserialize(deserializer)?))
    }
}

/// A coupon the provider has accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("final price {final_price} is below the minimum charge of {minimum}; change or remove the coupon to continue")]
    BelowMinimum { final_price: Price, minimum: Price },

    #[error("this order is free and does not need a charge")]
    FreeOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Charge the final price.
    Chargeable,
    /// Full discount: register free usage.
    Free,
    /// Partial discount leaving less than the minimum, zero cents included.
    /// Blocked until the coupon changes.
    BelowMinimum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingQuote {
    pub base_price: Price,
    pub coupon_code: Option<String>,
    pub discount_percent: f64,
    pub final_price: Price,
    pub minimum_price: Price,
    pub status: QuoteStatus,
    pub message: Option<String>,
}

impl PricingQuote {
    pub fn is_free(&self) -> bool {
        self.status == QuoteStatus::Free
    }

    /// Gate in front of charge creation.
    pub fn ensure_chargeable(&self) -> Result<(), PricingError> {
        match self.status {
            QuoteStatus::Chargeable => Ok(()),
            QuoteStatus::Free => Err(PricingError::FreeOrder),
            QuoteStatus::BelowMinimum => Err(PricingError::BelowMinimum {
                final_price: self.final_price,
                minimum: self.minimum_price,
            }),
        }
    }
}

/// Configured export price and provider minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceList {
    pub base: Price,
    pub minimum: Price,
}

impl Default for PriceList {
    fn default() -> Self {
        Self {
            base: Price::from_cents(1000),
            minimum: Price::from_cents(500),
        }
    }
}

impl PriceList {
    pub fn quote(&self, coupon: Option<&AppliedCoupon>) -> PricingQuote {
        quote(self.base, coupon, self.minimum)
    }
}

pub fn quote(base_price: Price, coupon: Option<&AppliedCoupon>, minimum_price: Price) -> PricingQuote {
    let discount_percent = coupon
        .map(|c| c.discount_percent)
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);

    let final_price = if discount_percent >= 100.0 {
        Price::ZERO
    } else {
        let cents = base_price.cents() as f64 * (100.0 - discount_percent) / 100.0;
        Price::from_cents(cents.round() as u64)
    };

    // a partial discount never skips payment, even at zero cents
    let (status, message) = if discount_percent >= 100.0 {
        (QuoteStatus::Free, None)
    } else if final_price.is_zero() || final_price < minimum_price {
        (
            QuoteStatus::BelowMinimum,
            Some(format!(
                "Com este cupom o valor fica em {final_price}, abaixo do mínimo de {minimum_price} \
                 para pagamento. Use outro cupom ou remova-o para pagar o valor integral."
            )),
        )
    } else {
        (QuoteStatus::Chargeable, None)
    };

    PricingQuote {
        base_price,
        coupon_code: coupon.map(|c| c.code.clone()),
        discount_percent,
        final_price,
        minimum_price,
        status,
        message,
    }
}
