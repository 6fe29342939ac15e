//! Domain layer: batch payloads, codec, gate, and the evaluation rules for
//! both batch kinds.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod gate;
pub mod netting;
pub mod settlement;
pub mod withdrawal;
