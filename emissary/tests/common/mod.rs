#![allow(dead_code)]

use emissary::{CancellationToken, Handler, HandlerOutput, Request};
use thiserror::Error;

// ============================================================================
// Test Request Types
// ============================================================================

/// Echoes its text back.
#[derive(Clone, Debug)]
pub struct Echo {
    pub text: String,
}

impl Echo {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Request for Echo {
    type Response = String;
}

/// Doubles a number.
#[derive(Clone, Copy, Debug)]
pub struct Double(pub u64);

impl Request for Double {
    type Response = u64;
}

/// Never registered.
#[derive(Debug)]
pub struct Orphan;

impl Request for Orphan {
    type Response = String;
}

/// Moves money between accounts; fails with [`LedgerError`].
#[derive(Debug)]
pub struct Transfer {
    pub amount: u64,
    pub balance: u64,
}

impl Request for Transfer {
    type Response = u64;
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: wanted {wanted}, have {available}")]
    InsufficientFunds { wanted: u64, available: u64 },
}

// ============================================================================
// Test Handlers
// ============================================================================

pub struct EchoHandler;

impl Handler<Echo> for EchoHandler {
    async fn handle(&self, req: &Echo, _: &CancellationToken) -> HandlerOutput<String> {
        Ok(Some(req.text.clone()))
    }
}

pub struct DoubleHandler;

impl Handler<Double> for DoubleHandler {
    async fn handle(&self, req: &Double, _: &CancellationToken) -> HandlerOutput<u64> {
        Ok(Some(req.0 * 2))
    }
}

pub struct TransferHandler;

impl Handler<Transfer> for TransferHandler {
    async fn handle(&self, req: &Transfer, _: &CancellationToken) -> HandlerOutput<u64> {
        if req.amount > req.balance {
            return Err(LedgerError::InsufficientFunds {
                wanted: req.amount,
                available: req.balance,
            }
            .into());
        }
        Ok(Some(req.balance - req.amount))
    }
}
