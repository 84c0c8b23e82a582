//! Streaming AES encryption for files and pipes.
//!
//! A cipher suite selector plus a handful of directives configure the key,
//! IV or nonce (given as hex or derived from a text phrase), and the input
//! and output paths; the engine then pumps the data through the selected
//! cipher in fixed-size chunks. Supported modes are CBC, ECB, CFB8, OFB8
//! and GCM with 128-, 192- or 256-bit keys.

pub mod app;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod hex;
pub mod options;
pub mod suite;
