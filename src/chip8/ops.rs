//! Opcode handlers.
//!
//! Every handler owns the program counter: it either steps past itself
//! (2), skips the following instruction (4), or overwrites PC outright.

use std::time::Instant;

use log::debug;
use rand::Rng;

use super::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use super::memory::Memory;
use super::{Chip8, Chip8Error, HaltReason, Instruction, State, WaitForKey, KEY_COUNT, STACK_SIZE};

pub type Handler = fn(&mut Chip8, Instruction, &mut dyn WaitForKey) -> Result<(), Chip8Error>;

const VF: usize = 0xF;

fn advance(vm: &mut Chip8) {
    vm.pc = vm.pc.wrapping_add(2);
}

fn skip_if(vm: &mut Chip8, condition: bool) {
    vm.pc = vm.pc.wrapping_add(if condition { 4 } else { 2 });
}

// 00E0
pub fn cls(vm: &mut Chip8, _: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.display.clear();
    advance(vm);
    Ok(())
}

// 00EE
pub fn ret(vm: &mut Chip8, _: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    if vm.sp == 0 {
        return Err(Chip8Error::StackUnderflow { pc: vm.pc });
    }
    vm.sp -= 1;
    vm.pc = vm.stack[vm.sp];
    vm.stack[vm.sp] = 0;
    Ok(())
}

// 1NNN
pub fn jp(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.pc = ins.nnn;
    Ok(())
}

// 2NNN
// the return address pushed is the instruction after the call
pub fn call(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    if vm.sp >= STACK_SIZE {
        return Err(Chip8Error::StackOverflow { pc: vm.pc });
    }
    vm.stack[vm.sp] = vm.pc.wrapping_add(2);
    vm.sp += 1;
    vm.pc = ins.nnn;
    Ok(())
}

// 3XKK
pub fn se_byte(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let equal = vm.v[ins.x] == ins.kk;
    skip_if(vm, equal);
    Ok(())
}

// 4XKK
pub fn sne_byte(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let differ = vm.v[ins.x] != ins.kk;
    skip_if(vm, differ);
    Ok(())
}

// 5XY0
pub fn se_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let equal = vm.v[ins.x] == vm.v[ins.y];
    skip_if(vm, equal);
    Ok(())
}

// 6XKK
pub fn ld_byte(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] = ins.kk;
    advance(vm);
    Ok(())
}

// 7XKK
// no carry flag
pub fn add_byte(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] = vm.v[ins.x].wrapping_add(ins.kk);
    advance(vm);
    Ok(())
}

// 8XY0
pub fn ld_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] = vm.v[ins.y];
    advance(vm);
    Ok(())
}

// 8XY1
pub fn or(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] |= vm.v[ins.y];
    advance(vm);
    Ok(())
}

// 8XY2
pub fn and(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] &= vm.v[ins.y];
    advance(vm);
    Ok(())
}

// 8XY3
pub fn xor(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] ^= vm.v[ins.y];
    advance(vm);
    Ok(())
}

// The flag-setting ALU ops write VF after the result, so the flag wins when
// X is F.

// 8XY4
// VF = carry
pub fn add_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let (sum, carry) = vm.v[ins.x].overflowing_add(vm.v[ins.y]);
    vm.v[ins.x] = sum;
    vm.v[VF] = carry as u8;
    advance(vm);
    Ok(())
}

// 8XY5
// VF = 1 when there is no borrow
pub fn sub(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let (vx, vy) = (vm.v[ins.x], vm.v[ins.y]);
    vm.v[ins.x] = vx.wrapping_sub(vy);
    vm.v[VF] = (vx >= vy) as u8;
    advance(vm);
    Ok(())
}

// 8XY6
// VF = the bit shifted out
pub fn shr(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let vx = vm.v[ins.x];
    vm.v[ins.x] = vx >> 1;
    vm.v[VF] = vx & 0x1;
    advance(vm);
    Ok(())
}

// 8XY7
// VX = VY - VX, VF = 1 when there is no borrow
pub fn subn(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let (vx, vy) = (vm.v[ins.x], vm.v[ins.y]);
    vm.v[ins.x] = vy.wrapping_sub(vx);
    vm.v[VF] = (vy >= vx) as u8;
    advance(vm);
    Ok(())
}

// 8XYE
pub fn shl(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let vx = vm.v[ins.x];
    vm.v[ins.x] = vx << 1;
    vm.v[VF] = vx >> 7;
    advance(vm);
    Ok(())
}

// 9XY0
pub fn sne_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let differ = vm.v[ins.x] != vm.v[ins.y];
    skip_if(vm, differ);
    Ok(())
}

// ANNN
pub fn ld_i(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.i = ins.nnn;
    advance(vm);
    Ok(())
}

// BNNN
pub fn jp_v0(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.pc = ins.nnn + vm.v[0] as u16;
    Ok(())
}

// CXKK
pub fn rnd(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] = vm.rng.gen::<u8>() & ins.kk;
    advance(vm);
    Ok(())
}

// DXYN
// draw an 8xN sprite from memory at I to (VX, VY), VF = 1 if any lit pixel
// was turned off
pub fn drw(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let x = vm.v[ins.x] as usize % DISPLAY_WIDTH;
    let y = vm.v[ins.y] as usize % DISPLAY_HEIGHT;

    let mut collision = false;
    for row in 0..ins.n as u16 {
        let sprite = vm.memory.read(vm.i.wrapping_add(row));
        collision |= vm.display.draw_sprite_row(x, y + row as usize, sprite);
    }

    vm.v[VF] = collision as u8;
    advance(vm);
    Ok(())
}

// EX9E
pub fn skp(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let pressed = vm.is_key_pressed(vm.v[ins.x] as usize);
    skip_if(vm, pressed);
    Ok(())
}

// EXA1
pub fn sknp(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let pressed = vm.is_key_pressed(vm.v[ins.x] as usize);
    skip_if(vm, !pressed);
    Ok(())
}

// FX07
pub fn ld_reg_dt(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.v[ins.x] = vm.timers.delay;
    advance(vm);
    Ok(())
}

// FX0A
// blocks until the key source reports a key; the timers don't count the wait
pub fn ld_key(vm: &mut Chip8, ins: Instruction, keys: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    debug!("waiting for a key into V{:X}", ins.x);
    let key = loop {
        match keys.wait_for_key() {
            Some(key) if (key as usize) < KEY_COUNT => break key,
            Some(key) => debug!("ignoring key index {}", key),
            None => {
                debug!("key wait abandoned");
                vm.state = State::Halted(HaltReason::Requested);
                return Ok(());
            }
        }
    };
    debug!("got key {:X}", key);

    vm.v[ins.x] = key;
    vm.set_key(key as usize, true);
    vm.timers.resync(Instant::now());
    advance(vm);
    Ok(())
}

// FX15
pub fn ld_dt_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.timers.delay = vm.v[ins.x];
    advance(vm);
    Ok(())
}

// FX18
pub fn ld_st_reg(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.timers.sound = vm.v[ins.x];
    advance(vm);
    Ok(())
}

// FX1E
pub fn add_i(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.i = vm.i.wrapping_add(vm.v[ins.x] as u16);
    advance(vm);
    Ok(())
}

// FX29
pub fn ld_font(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    vm.i = Memory::glyph_address(vm.v[ins.x]);
    advance(vm);
    Ok(())
}

// FX33
// so 193 becomes [1, 9, 3] in memory at I
pub fn ld_bcd(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    let vx = vm.v[ins.x];
    let i = vm.i;
    vm.memory.write(i, vx / 100);
    vm.memory.write(i.wrapping_add(1), (vx / 10) % 10);
    vm.memory.write(i.wrapping_add(2), vx % 10);
    advance(vm);
    Ok(())
}

// FX55
// V0 to VX inclusive, I is left alone
pub fn store_registers(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    for offset in 0..=ins.x {
        vm.memory.write(vm.i.wrapping_add(offset as u16), vm.v[offset]);
    }
    advance(vm);
    Ok(())
}

// FX65
pub fn load_registers(vm: &mut Chip8, ins: Instruction, _: &mut dyn WaitForKey) -> Result<(), Chip8Error> {
    for offset in 0..=ins.x {
        vm.v[offset] = vm.memory.read(vm.i.wrapping_add(offset as u16));
    }
    advance(vm);
    Ok(())
}
