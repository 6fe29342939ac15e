//! Adapters implementing the outbound ports.

pub mod secp256k1;
