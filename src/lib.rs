//! Two-way peg client SDK
//!
//! Lets an application accept Bitcoin deposits and withdrawals bridged to
//! a Solana wrapped-BTC token: UTXO bookkeeping with pending-transaction
//! reservations, reserve quota allocation, and the deposit/withdrawal
//! transaction flows around them.

pub mod address;
pub mod cache;
pub mod cli;
pub mod client;
pub mod clients;
pub mod config;
pub mod deposit;
pub mod ledger;
pub mod models;
pub mod signer;
pub mod txbuild;
pub mod types;
pub mod units;
pub mod withdraw;
pub mod zpl;
