//! # Konto
//!
//! `konto` provisions and authenticates user accounts for a gateway-fronted
//! API platform. Registration enrolls the account with the external API
//! gateway (consumer + signing credentials) and both registration and login
//! return a signed, 3-hour bearer token the gateway can verify offline.
//!
//! Registration is a saga across three independently-failing systems:
//! `PostgreSQL`, the gateway admin API and the token signer. The sequencing
//! and failure contract live in [`account::registrar`].

pub mod account;
pub mod cli;
pub mod gateway;
pub mod konto;
