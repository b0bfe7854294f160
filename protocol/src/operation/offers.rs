//! DEX offers.
//!
//! An offer id of 0 creates a new offer; a non-zero id updates that offer,
//! and an amount of 0 deletes it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::amount::{non_negative_amount, positive_amount};
use crate::types::{Asset, Price};
use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

/// A price given either as a decimal string or as explicit terms.
#[derive(Debug, Clone)]
enum PriceInput {
    Decimal(String),
    Exact(Price),
}

impl PriceInput {
    fn resolve(&self) -> Result<Price> {
        match self {
            Self::Decimal(s) => s.parse(),
            Self::Exact(p) => Price::new(p.n, p.d),
        }
    }
}

fn offer_id(id: i64) -> Result<i64> {
    if id < 0 {
        return Err(Error::constraint("offer id", "must not be negative"));
    }
    Ok(id)
}

macro_rules! price_setter {
    ($builder:ty) => {
        impl $builder {
            /// Replaces the price with explicit `n / d` terms.
            pub fn price_ratio(mut self, price: Price) -> Self {
                self.price = PriceInput::Exact(price);
                self
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Manage sell offer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageSellOfferOp {
    pub selling: Asset,
    pub buying: Asset,
    /// Amount of `selling` offered.
    pub amount: i64,
    /// Units of `buying` per unit of `selling`.
    pub price: Price,
    pub offer_id: i64,
}

impl WriteXdr for ManageSellOfferOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.selling.write_xdr(w);
        self.buying.write_xdr(w);
        w.write_i64(self.amount);
        self.price.write_xdr(w);
        w.write_i64(self.offer_id);
    }
}

impl ReadXdr for ManageSellOfferOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            selling: Asset::read_xdr(r)?,
            buying: Asset::read_xdr(r)?,
            amount: r.read_i64()?,
            price: Price::read_xdr(r)?,
            offer_id: r.read_i64()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ManageSellOfferBuilder {
    selling: Asset,
    buying: Asset,
    amount: String,
    price: PriceInput,
    offer_id: i64,
    source: SourceOverride,
}

impl ManageSellOfferBuilder {
    pub fn new(selling: Asset, buying: Asset, amount: &str, price: &str) -> Self {
        Self {
            selling,
            buying,
            amount: amount.to_string(),
            price: PriceInput::Decimal(price.to_string()),
            offer_id: 0,
            source: SourceOverride::default(),
        }
    }

    /// Updates (or, with amount 0, deletes) an existing offer.
    pub fn offer_id(mut self, offer_id: i64) -> Self {
        self.offer_id = offer_id;
        self
    }

    pub fn build(self) -> Result<Operation> {
        let body = ManageSellOfferOp {
            selling: self.selling,
            buying: self.buying,
            amount: non_negative_amount("amount", &self.amount)?,
            price: self.price.resolve()?,
            offer_id: offer_id(self.offer_id)?,
        };
        self.source.into_operation(OperationBody::ManageSellOffer(body))
    }
}

price_setter!(ManageSellOfferBuilder);
source_account_setters!(ManageSellOfferBuilder);

// ---------------------------------------------------------------------------
// Create passive sell offer
// ---------------------------------------------------------------------------

/// A sell offer that does not take offers at exactly its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePassiveSellOfferOp {
    pub selling: Asset,
    pub buying: Asset,
    pub amount: i64,
    pub price: Price,
}

impl WriteXdr for CreatePassiveSellOfferOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.selling.write_xdr(w);
        self.buying.write_xdr(w);
        w.write_i64(self.amount);
        self.price.write_xdr(w);
    }
}

impl ReadXdr for CreatePassiveSellOfferOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            selling: Asset::read_xdr(r)?,
            buying: Asset::read_xdr(r)?,
            amount: r.read_i64()?,
            price: Price::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreatePassiveSellOfferBuilder {
    selling: Asset,
    buying: Asset,
    amount: String,
    price: PriceInput,
    source: SourceOverride,
}

impl CreatePassiveSellOfferBuilder {
    pub fn new(selling: Asset, buying: Asset, amount: &str, price: &str) -> Self {
        Self {
            selling,
            buying,
            amount: amount.to_string(),
            price: PriceInput::Decimal(price.to_string()),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = CreatePassiveSellOfferOp {
            selling: self.selling,
            buying: self.buying,
            amount: positive_amount("amount", &self.amount)?,
            price: self.price.resolve()?,
        };
        self.source
            .into_operation(OperationBody::CreatePassiveSellOffer(body))
    }
}

price_setter!(CreatePassiveSellOfferBuilder);
source_account_setters!(CreatePassiveSellOfferBuilder);

// ---------------------------------------------------------------------------
// Manage buy offer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageBuyOfferOp {
    pub selling: Asset,
    pub buying: Asset,
    /// Amount of `buying` wanted.
    pub buy_amount: i64,
    /// Units of `selling` per unit of `buying`.
    pub price: Price,
    pub offer_id: i64,
}

impl WriteXdr for ManageBuyOfferOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.selling.write_xdr(w);
        self.buying.write_xdr(w);
        w.write_i64(self.buy_amount);
        self.price.write_xdr(w);
        w.write_i64(self.offer_id);
    }
}

impl ReadXdr for ManageBuyOfferOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            selling: Asset::read_xdr(r)?,
            buying: Asset::read_xdr(r)?,
            buy_amount: r.read_i64()?,
            price: Price::read_xdr(r)?,
            offer_id: r.read_i64()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ManageBuyOfferBuilder {
    selling: Asset,
    buying: Asset,
    buy_amount: String,
    price: PriceInput,
    offer_id: i64,
    source: SourceOverride,
}

impl ManageBuyOfferBuilder {
    pub fn new(selling: Asset, buying: Asset, buy_amount: &str, price: &str) -> Self {
        Self {
            selling,
            buying,
            buy_amount: buy_amount.to_string(),
            price: PriceInput::Decimal(price.to_string()),
            offer_id: 0,
            source: SourceOverride::default(),
        }
    }

    pub fn offer_id(mut self, offer_id: i64) -> Self {
        self.offer_id = offer_id;
        self
    }

    pub fn build(self) -> Result<Operation> {
        let body = ManageBuyOfferOp {
            selling: self.selling,
            buying: self.buying,
            buy_amount: non_negative_amount("buy amount", &self.buy_amount)?,
            price: self.price.resolve()?,
            offer_id: offer_id(self.offer_id)?,
        };
        self.source.into_operation(OperationBody::ManageBuyOffer(body))
    }
}

price_setter!(ManageBuyOfferBuilder);
source_account_setters!(ManageBuyOfferBuilder);

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    fn usd() -> Asset {
        Asset::credit("USD", ISSUER).unwrap()
    }

    #[test]
    fn sell_offer_price_from_decimal() {
        let op = ManageSellOfferBuilder::new(Asset::native(), usd(), "10", "0.25")
            .build()
            .unwrap();
        let OperationBody::ManageSellOffer(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!((body.price.n, body.price.d), (1, 4));
        assert_eq!(body.offer_id, 0);
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }

    #[test]
    fn zero_amount_deletes_offer() {
        let op = ManageSellOfferBuilder::new(Asset::native(), usd(), "0", "1")
            .offer_id(12345)
            .build()
            .unwrap();
        let OperationBody::ManageSellOffer(body) = &op.body else {
            panic!("wrong body");
        };
        assert_eq!(body.amount, 0);
        assert_eq!(body.offer_id, 12345);
    }

    #[test]
    fn negative_offer_id_rejected() {
        let err = ManageBuyOfferBuilder::new(Asset::native(), usd(), "1", "1")
            .offer_id(-1)
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn explicit_price_must_be_positive() {
        let bad = Price { n: 0, d: 1 };
        assert!(CreatePassiveSellOfferBuilder::new(Asset::native(), usd(), "1", "1")
            .price_ratio(bad)
            .build()
            .is_err());
        let ok = CreatePassiveSellOfferBuilder::new(Asset::native(), usd(), "1", "1")
            .price_ratio(Price { n: 3, d: 7 })
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&ok.to_xdr()).unwrap(), ok);
    }

    #[test]
    fn passive_offer_needs_positive_amount() {
        assert!(CreatePassiveSellOfferBuilder::new(Asset::native(), usd(), "0", "1")
            .build()
            .is_err());
    }

    #[test]
    fn buy_offer_roundtrip() {
        let op = ManageBuyOfferBuilder::new(usd(), Asset::native(), "5.5", "2")
            .offer_id(9)
            .source_account(ISSUER)
            .build()
            .unwrap();
        assert_eq!(Operation::from_xdr(&op.to_xdr()).unwrap(), op);
    }
}
