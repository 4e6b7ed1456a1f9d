/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the TinyQV Emulator Peripheral library.

--*/
mod root_bus;
mod trng;

pub use root_bus::{
    user_peripheral_base, TinyQvRootBus, TinyQvRootBusArgs, DEFAULT_TRNG_PERIPHERAL,
    USER_PERIPHERAL_BASE, USER_PERIPHERAL_COUNT, USER_PERIPHERAL_STRIDE,
};
pub use trng::{States as TrngState, Trng, TrngArgs, TRNG_WINDOW_SIZE};
