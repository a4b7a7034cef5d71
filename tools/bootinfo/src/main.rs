use kernel_bootinfo::records::{CpuEntry, CpuFlags, MemoryMapEntry, MemoryType};
use kernel_bootinfo::{BootInfoBuilder, BootRegion, try_parse};
use std::{env, fs, io, process::ExitCode};

const USAGE: &str = "usage: bootinfo gen <out> | bootinfo inspect <file>";

fn main() -> ExitCode {
    // args: gen <out> | inspect <file>
    let mut args = env::args().skip(1);
    let result = match (args.next().as_deref(), args.next()) {
        (Some("gen"), Some(out)) => generate(&out),
        (Some("inspect"), Some(file)) => inspect(&file),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bootinfo: {e}");
            ExitCode::FAILURE
        }
    }
}

/// A region resembling what a UEFI loader hands over on a small QEMU VM.
fn sample_region() -> Vec<u8> {
    const MIB: u64 = 1024 * 1024;
    let bsp = CpuFlags::new().with_enabled(true).with_bootstrap(true);
    let ap = CpuFlags::new().with_enabled(true);

    BootInfoBuilder::new()
        .bootloader("bootinfo sample")
        .cmdline("console=fb loglevel=debug")
        .memory_map(&[
            MemoryMapEntry::new(0x0, 0x9_f000, MemoryType::Usable),
            MemoryMapEntry::new(0x9_f000, 0x6_1000, MemoryType::Reserved),
            MemoryMapEntry::new(MIB, MIB, MemoryType::Kernel),
            MemoryMapEntry::new(2 * MIB, 8 * MIB, MemoryType::Initrd),
            MemoryMapEntry::new(10 * MIB, 500 * MIB, MemoryType::Usable),
            MemoryMapEntry::new(510 * MIB, 2 * MIB, MemoryType::AcpiReclaimable),
            MemoryMapEntry::new(0x8000_0000, 8 * MIB, MemoryType::Framebuffer),
        ])
        .framebuffer(0x8000_0000, 1280, 800, 1280 * 4, 32)
        .acpi_rsdp(0x1fb7_e014)
        .smp(
            0,
            &[
                CpuEntry::new(0, bsp),
                CpuEntry::new(1, ap),
                CpuEntry::new(2, ap),
                CpuEntry::new(3, ap),
            ],
        )
        .initrd(2 * MIB, 8 * MIB)
        .build()
}

fn generate(out: &str) -> io::Result<()> {
    let bytes = sample_region();
    fs::write(out, &bytes)?;
    eprintln!("wrote {} byte boot info region to {out}", bytes.len());
    Ok(())
}

fn inspect(file: &str) -> io::Result<()> {
    let bytes = fs::read(file)?;

    let region = BootRegion::new(&bytes).map_err(invalid_data)?;
    let header = region.header();
    println!(
        "header: magic {:#010x}, total size {}, version {}",
        header.magic, header.total_size, header.version
    );
    for tag in region.tags() {
        println!(
            "  tag {:>6} @ {:#06x}: {} ({} bytes, flags {:#06x})",
            u16::from(tag.tag_type()),
            tag.position().offset(),
            tag.tag_type(),
            tag.size(),
            tag.flags()
        );
    }
    println!();

    let info = try_parse(&bytes).map_err(invalid_data)?;
    print!("{}", info.system_report());
    println!();
    print!("{}", info.memory_map_report());
    Ok(())
}

fn invalid_data(e: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
