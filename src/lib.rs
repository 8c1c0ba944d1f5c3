//! **xtskit** - streaming AES-XTS (IEEE P1619 / NIST SP 800-38E) sector
//! encryption with ciphertext stealing.
//!
//! # Modules
//! | Module | Purpose |
//! |--------|---------|
//! | [`xts`]   | Buffered streaming encryptor/decryptor - the public cipher |
//! | [`tweak`] | Tweak derivation: stateless values and the stateful sequence |
//! | [`gf128`] | GF(2^128) arithmetic behind tweak advancement |
//! | [`aes`]   | Keyed AES-ECB single-block primitive (AES-128/256) |
//! | [`error`] | Library-wide error and result types |
//!
//! The entry point is [`xts::XtsCipher`]: feed it arbitrarily fragmented
//! input through `process` and close the data unit with `finalize`; output
//! is bit-identical to the IEEE 1619 / NIST XTSVS reference vectors and
//! always exactly as long as the input.
//!
//! Sensitive state - key schedules, tweaks, buffered plaintext - is wiped
//! on disposal and on drop.

pub mod aes;
pub mod error;
pub mod gf128;
pub mod tweak;
pub mod xts;

pub use aes::AesEcb;
pub use error::{Error, Result};
pub use tweak::TweakSequence;
pub use xts::{Direction, XtsCipher, XtsMode, XtsParams};
