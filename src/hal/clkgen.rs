//! Clock generator control.

use vcell::VolatileCell;

use super::Status;

const CLKGEN_BASE: usize = 0x4000_4000;

/// Written to `CLKKEY` to unlock clock configuration writes.
const CLKKEY_UNLOCK: u32 = 0x47;

/// `CCTRL.CORESEL` selection for the undivided 48 MHz HFRC.
const CORESEL_HFRC: u32 = 0;

/// Clock generator registers, in datasheet order.
#[allow(dead_code)]
#[repr(C)]
struct RegisterBlock {
    calxt: VolatileCell<u32>,
    calrc: VolatileCell<u32>,
    acalctr: VolatileCell<u32>,
    octrl: VolatileCell<u32>,
    clkout: VolatileCell<u32>,
    clkkey: VolatileCell<u32>,
    cctrl: VolatileCell<u32>,
    status: VolatileCell<u32>,
}

fn regs() -> &'static RegisterBlock {
    // SAFETY: CLKGEN_BASE is the fixed MMIO address of the clock generator.
    unsafe { &*(CLKGEN_BASE as *const RegisterBlock) }
}

/// Switch the core to the maximum system clock, the 48 MHz HFRC undivided.
///
/// `CCTRL` only takes writes while `CLKKEY` holds the unlock value; the key
/// is cleared again afterwards so a stray write cannot retune the core.
pub fn sysclk_max() -> Result<(), Status> {
    let clkgen = regs();
    clkgen.clkkey.set(CLKKEY_UNLOCK);
    clkgen.cctrl.set(CORESEL_HFRC);
    clkgen.clkkey.set(0);
    Ok(())
}
