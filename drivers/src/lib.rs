/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the TinyQV TRNG driver library.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod port;
mod reg;
mod trng;
pub mod wait;

#[cfg(test)]
mod testing;

pub use port::RegisterPort;
pub use reg::{Control, Status, TrngReg};
pub use trng::{
    SequenceConfig, SequenceState, Trng, DEFAULT_ENTROPY_CELLS, READ_TIMEOUT_CYCLES,
    READ_WORD_CYCLES,
};
pub use tqv_trng_error::{ErrorCode, Phase, TrngError, TrngResult};
