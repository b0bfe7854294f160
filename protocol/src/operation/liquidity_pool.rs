//! Liquidity pool deposit and withdraw.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::amount::{non_negative_amount, positive_amount};
use crate::types::{PoolId, Price};
use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::{source_account_setters, Operation, OperationBody, SourceOverride};

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPoolDepositOp {
    pub liquidity_pool_id: PoolId,
    pub max_amount_a: i64,
    pub max_amount_b: i64,
    /// Lowest acceptable deposit price, A per B.
    pub min_price: Price,
    pub max_price: Price,
}

impl WriteXdr for LiquidityPoolDepositOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.liquidity_pool_id.write_xdr(w);
        w.write_i64(self.max_amount_a);
        w.write_i64(self.max_amount_b);
        self.min_price.write_xdr(w);
        self.max_price.write_xdr(w);
    }
}

impl ReadXdr for LiquidityPoolDepositOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            liquidity_pool_id: PoolId::read_xdr(r)?,
            max_amount_a: r.read_i64()?,
            max_amount_b: r.read_i64()?,
            min_price: Price::read_xdr(r)?,
            max_price: Price::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LiquidityPoolDepositBuilder {
    pool_id: String,
    max_amount_a: String,
    max_amount_b: String,
    min_price: String,
    max_price: String,
    source: SourceOverride,
}

impl LiquidityPoolDepositBuilder {
    /// `pool_id` is an `L...` StrKey or 64 hex characters; prices are
    /// decimal strings.
    pub fn new(
        pool_id: &str,
        max_amount_a: &str,
        max_amount_b: &str,
        min_price: &str,
        max_price: &str,
    ) -> Self {
        Self {
            pool_id: pool_id.to_string(),
            max_amount_a: max_amount_a.to_string(),
            max_amount_b: max_amount_b.to_string(),
            min_price: min_price.to_string(),
            max_price: max_price.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let min_price: Price = self.min_price.parse()?;
        let max_price: Price = self.max_price.parse()?;
        // a/b <= c/d  <=>  a*d <= c*b, exact in i64 for i32 terms
        if i64::from(min_price.n) * i64::from(max_price.d)
            > i64::from(max_price.n) * i64::from(min_price.d)
        {
            return Err(Error::constraint("price bounds", "min price exceeds max price"));
        }
        let body = LiquidityPoolDepositOp {
            liquidity_pool_id: self.pool_id.parse()?,
            max_amount_a: positive_amount("max amount a", &self.max_amount_a)?,
            max_amount_b: positive_amount("max amount b", &self.max_amount_b)?,
            min_price,
            max_price,
        };
        self.source
            .into_operation(OperationBody::LiquidityPoolDeposit(body))
    }
}

source_account_setters!(LiquidityPoolDepositBuilder);

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPoolWithdrawOp {
    pub liquidity_pool_id: PoolId,
    /// Pool shares to redeem.
    pub amount: i64,
    pub min_amount_a: i64,
    pub min_amount_b: i64,
}

impl WriteXdr for LiquidityPoolWithdrawOp {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.liquidity_pool_id.write_xdr(w);
        w.write_i64(self.amount);
        w.write_i64(self.min_amount_a);
        w.write_i64(self.min_amount_b);
    }
}

impl ReadXdr for LiquidityPoolWithdrawOp {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            liquidity_pool_id: PoolId::read_xdr(r)?,
            amount: r.read_i64()?,
            min_amount_a: r.read_i64()?,
            min_amount_b: r.read_i64()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LiquidityPoolWithdrawBuilder {
    pool_id: String,
    amount: String,
    min_amount_a: String,
    min_amount_b: String,
    source: SourceOverride,
}

impl LiquidityPoolWithdrawBuilder {
    pub fn new(pool_id: &str, amount: &str, min_amount_a: &str, min_amount_b: &str) -> Self {
        Self {
            pool_id: pool_id.to_string(),
            amount: amount.to_string(),
            min_amount_a: min_amount_a.to_string(),
            min_amount_b: min_amount_b.to_string(),
            source: SourceOverride::default(),
        }
    }

    pub fn build(self) -> Result<Operation> {
        let body = LiquidityPoolWithdrawOp {
            liquidity_pool_id: self.pool_id.parse()?,
            amount: positive_amount("amount", &self.amount)?,
            min_amount_a: non_negative_amount("min amount a", &self.min_amount_a)?,
            min_amount_b: non_negative_amount("min amount b", &self.min_amount_b)?,
        };
        self.source
            .into_operation(OperationBody::LiquidityPoolWithdraw(body))
    }
}

source_account_setters!(LiquidityPoolWithdrawBuilder);
