mod config;
mod frontend;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};

use chip8vm::chip8::KEY_COUNT;
use chip8vm::{loader, Chip8, HaltReason, State};

use config::{Args, DataType};
use frontend::{Control, Frontend};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "warn" }),
    )
    .init();
    debug!(
        "launch options: ui {:?}, type {:?}, data {:?}, {}Hz",
        args.ui, args.data_type, args.data, args.hz
    );

    let program = match args.data_type {
        DataType::File => {
            loader::from_file(&args.data).with_context(|| format!("loading {}", args.data))?
        }
        DataType::Raw => loader::from_hex(&args.data).context("parsing raw program bytes")?,
    };

    let mut emu = match args.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    emu.load_program(&program);

    let mut frontend = frontend::open(args.ui)?;
    let result = run(&mut emu, frontend.as_mut(), args.hz);
    // restore the terminal before anything else gets printed
    drop(frontend);

    if args.debug {
        dump_state(&emu);
    }
    result
}

/// Step the machine at `hz` instructions per second until it halts.
fn run(emu: &mut Chip8, frontend: &mut dyn Frontend, hz: u32) -> Result<()> {
    let period = Duration::from_secs(1) / hz;

    loop {
        let started = Instant::now();

        if frontend.poll_input(emu)? == Control::Quit {
            emu.halt();
        }

        match emu.step(frontend.key_source()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                error!("{}", err);
                frontend.set_tone(false)?;
                return Err(err.into());
            }
        }

        frontend.present(emu)?;
        frontend.set_tone(emu.should_play_sound())?;

        if let Some(rest) = period.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    frontend.set_tone(false)?;
    match emu.state() {
        State::Halted(HaltReason::Unhandled(word)) => {
            info!("stopped at {:03X} on unhandled opcode {:04X}", emu.pc(), word)
        }
        state => info!("stopped at {:03X}: {:?}", emu.pc(), state),
    }
    Ok(())
}

fn dump_state(emu: &Chip8) {
    println!("state: {:?}", emu.state());
    print!("[ ");
    for v in emu.registers() {
        print!("{:0>2X} ", v);
    }
    println!("]");
    println!(
        "PC: {:03X}  I: {:03X}  stack depth: {}",
        emu.pc(),
        emu.index(),
        emu.stack_depth()
    );
    println!("sound timer: {}  delay timer: {}", emu.sound_timer(), emu.delay_timer());
    for key in 0..KEY_COUNT {
        println!("{:X} : {}", key, emu.is_key_pressed(key) as u8);
    }
}
