use kernel_bootinfo::records::{CpuEntry, CpuFlags, MemoryMapEntry, MemoryType};
use kernel_bootinfo::{
    BOOT_MAGIC, BootInfoBuilder, HeaderError, Limits, ParseError, ParsedBootInfo, TagType, parse,
    parse_with_limits, try_parse, validate,
};

const MIB: u64 = 1024 * 1024;

/// Header, one 40-byte memory map tag with a single 64 KiB usable entry, End tag.
fn hand_encoded(reserved: u32) -> Vec<u8> {
    let mut blob = Vec::new();
    for word in [BOOT_MAGIC, 64, 1, reserved] {
        blob.extend_from_slice(&word.to_le_bytes());
    }
    blob.extend_from_slice(&2u16.to_le_bytes());
    blob.extend_from_slice(&0u16.to_le_bytes());
    blob.extend_from_slice(&40u32.to_le_bytes());
    blob.extend_from_slice(&24u32.to_le_bytes());
    blob.extend_from_slice(&1u32.to_le_bytes());
    blob.extend_from_slice(&0u64.to_le_bytes());
    blob.extend_from_slice(&0x1_0000u64.to_le_bytes());
    blob.extend_from_slice(&1u32.to_le_bytes());
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob.extend_from_slice(&[0, 0, 0, 0, 8, 0, 0, 0]);
    assert_eq!(blob.len(), 64);
    blob
}

fn usable(length: u64) -> MemoryMapEntry {
    MemoryMapEntry::new(0, length, MemoryType::Usable)
}

#[test]
fn minimal_hand_encoded_region() {
    let blob = hand_encoded(0);
    assert!(validate(&blob));

    let mut info = ParsedBootInfo::default();
    assert!(parse(&blob, &mut info));
    assert!(info.has_memory_map());
    assert_eq!(info.total_usable_memory_mb(), 0);
    assert_eq!(info.cpu_count(), 1);
    assert!(!info.has_framebuffer());
    assert!(!info.has_cmdline());
    assert!(!info.has_acpi());
    assert!(!info.has_smp());
    assert!(!info.has_initrd());
}

#[test]
fn reserved_header_field_fails_everything() {
    let blob = hand_encoded(1);
    assert!(!validate(&blob));
    let mut info = ParsedBootInfo::default();
    assert!(!parse(&blob, &mut info));
    assert_eq!(
        try_parse(&blob).unwrap_err(),
        ParseError::Header(HeaderError::ReservedNotZero(1))
    );
}

#[test]
fn full_region_populates_every_record() {
    let blob = BootInfoBuilder::new()
        .bootloader("test loader")
        .cmdline("root=/dev/ram0")
        .memory_map(&[usable(512 * MIB), MemoryMapEntry::new(0, MIB, MemoryType::Reserved)])
        .framebuffer(0xfd00_0000, 800, 600, 3200, 32)
        .acpi_rsdp(0xe_0000)
        .smp(
            0,
            &[
                CpuEntry::new(0, CpuFlags::new().with_enabled(true).with_bootstrap(true)),
                CpuEntry::new(1, CpuFlags::new().with_enabled(true)),
            ],
        )
        .initrd(0x800_0000, 0x4_0000)
        .build();

    let info = try_parse(&blob).unwrap();
    assert_eq!(info.total_usable_memory_mb(), 512);
    assert_eq!(info.cpu_count(), 2);
    assert_eq!(info.framebuffer().unwrap().width(), 800);
    assert_eq!(info.cmdline().unwrap().as_str(), Some("root=/dev/ram0"));
    assert_eq!(info.bootloader().unwrap().as_str(), Some("test loader"));
    assert_eq!(info.acpi_rsdp().unwrap().rsdp_address(), 0xe_0000);
    assert_eq!(info.initrd().unwrap().length(), 0x4_0000);
    assert_eq!(info.smp().unwrap().cpus().len(), 2);
}

#[test]
fn unterminated_cmdline_is_skipped_but_parse_succeeds() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .raw_tag(1, 0, b"console=ttyS0")
        .build();
    let info = try_parse(&blob).unwrap();
    assert!(!info.has_cmdline());
    assert_eq!(info.total_usable_memory_mb(), 1);
}

#[test]
fn invalid_records_are_skipped() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .framebuffer(0, 800, 600, 3200, 32)
        .acpi_rsdp(0)
        .initrd(0x800_0000, 0)
        .smp(0, &[])
        .build();
    let info = try_parse(&blob).unwrap();
    assert!(!info.has_framebuffer());
    assert!(!info.has_acpi());
    assert!(!info.has_initrd());
    assert!(!info.has_smp());
    assert_eq!(info.cpu_count(), 1);
}

#[test]
fn undersized_records_are_skipped() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .raw_tag(TagType::AcpiRsdp.into(), 0, &[0x14, 0xe0, 0x0e, 0, 0, 0, 0])
        .raw_tag(TagType::Smp.into(), 0, &[4, 0, 0, 0])
        .raw_tag(TagType::Initrd.into(), 0, &[0xff; 15])
        .build();
    let info = try_parse(&blob).unwrap();
    assert!(!info.has_acpi());
    assert!(!info.has_smp());
    assert!(!info.has_initrd());
    assert_eq!(info.cpu_count(), 1);
    assert_eq!(info.total_usable_memory_mb(), 1);
}

#[test]
fn unknown_and_vendor_tags_are_ignored() {
    let blob = BootInfoBuilder::new()
        .raw_tag(4, 0, &[1; 16])
        .raw_tag(0x0042, 0, &[2; 5])
        .raw_tag(0x8000, 0xffff, &[3; 24])
        .memory_map(&[usable(2 * MIB)])
        .raw_tag(0xfffe, 0, &[])
        .build();
    let info = try_parse(&blob).unwrap();
    assert_eq!(info.total_usable_memory_mb(), 2);
}

#[test]
fn missing_memory_map_fails() {
    let blob = BootInfoBuilder::new().cmdline("quiet").build();
    assert!(validate(&blob));
    assert_eq!(try_parse(&blob).unwrap_err(), ParseError::MissingMemoryMap);

    // A memory map that fails validation counts as missing.
    let blob = BootInfoBuilder::new().memory_map_raw(8, 0, &[]).build();
    assert_eq!(try_parse(&blob).unwrap_err(), ParseError::MissingMemoryMap);
}

#[test]
fn region_without_end_tag_fails() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .build_without_end();
    assert!(validate(&blob));
    assert_eq!(try_parse(&blob).unwrap_err(), ParseError::MissingEndTag);
}

#[test]
fn undersized_tag_before_end_fails() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .raw_tag_sized(0x8000, 3, &[])
        .build();
    assert_eq!(try_parse(&blob).unwrap_err(), ParseError::MissingEndTag);
}

#[test]
fn slice_shorter_than_declared_size_fails() {
    let blob = BootInfoBuilder::new().memory_map(&[usable(MIB)]).build();
    let short = &blob[..blob.len() - 8];
    assert!(!validate(short));
    assert_eq!(
        try_parse(short).unwrap_err(),
        ParseError::Header(HeaderError::Truncated {
            total_size: u32::try_from(blob.len()).unwrap(),
            available: blob.len() - 8,
        })
    );
}

fn with_padding_tags(count: usize) -> Vec<u8> {
    let mut builder = BootInfoBuilder::new().memory_map(&[usable(MIB)]);
    for _ in 0..count {
        builder = builder.raw_tag(0x8000, 0, &[]);
    }
    builder.build()
}

#[test]
fn tag_cap_counts_every_visited_tag() {
    // memory map + 998 vendor tags + End = 1000 tags
    assert!(try_parse(&with_padding_tags(998)).is_ok());
    // memory map + 999 vendor tags + End = 1001 tags
    assert_eq!(
        try_parse(&with_padding_tags(999)).unwrap_err(),
        ParseError::TooManyTags(1000)
    );
}

#[test]
fn thousand_and_one_minimal_tags_hit_the_cap() {
    let mut builder = BootInfoBuilder::new();
    for _ in 0..1001 {
        builder = builder.raw_tag(0x8000, 0, &[]);
    }
    let blob = builder.memory_map(&[usable(MIB)]).build();
    assert!(validate(&blob));
    let mut info = ParsedBootInfo::default();
    assert!(!parse(&blob, &mut info));
}

#[test]
fn custom_limits_lower_the_cap() {
    let blob = with_padding_tags(3);
    let limits = Limits {
        max_tags: 4,
        ..Limits::DEFAULT
    };
    assert_eq!(
        parse_with_limits(&blob, &limits).unwrap_err(),
        ParseError::TooManyTags(4)
    );
    let limits = Limits {
        max_tags: 5,
        ..Limits::DEFAULT
    };
    assert!(parse_with_limits(&blob, &limits).is_ok());
}

#[test]
fn usable_memory_saturates_and_keeps() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(3 * MIB), usable(u64::MAX - 2 * MIB), usable(MIB)])
        .build();
    let info = try_parse(&blob).unwrap();
    // 3 MiB + (MAX - 2 MiB) overflows and is dropped; the last MiB still fits.
    assert_eq!(info.total_usable_memory_mb(), 4);

    let entries = [usable(MIB + 1); 5];
    let blob = BootInfoBuilder::new().memory_map(&entries).build();
    assert_eq!(try_parse(&blob).unwrap().total_usable_memory_mb(), 5);
}

#[test]
fn later_tags_replace_earlier_ones() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(MIB)])
        .cmdline("first")
        .memory_map(&[usable(8 * MIB)])
        .cmdline("second")
        .build();
    let info = try_parse(&blob).unwrap();
    assert_eq!(info.total_usable_memory_mb(), 8);
    assert_eq!(info.cmdline().unwrap().as_str(), Some("second"));
}

#[test]
fn output_is_untouched_on_header_failure_and_reset_otherwise() {
    let good = BootInfoBuilder::new()
        .memory_map(&[usable(16 * MIB)])
        .cmdline("keep")
        .build();
    let mut info = ParsedBootInfo::default();
    assert!(parse(&good, &mut info));

    let bad_magic = BootInfoBuilder::new().magic(0).build();
    assert!(!parse(&bad_magic, &mut info));
    assert_eq!(info.cmdline().unwrap().as_str(), Some("keep"));

    let no_cmdline = BootInfoBuilder::new().memory_map(&[usable(MIB)]).build();
    assert!(parse(&no_cmdline, &mut info));
    assert!(!info.has_cmdline());
    assert_eq!(info.total_usable_memory_mb(), 1);
}

#[test]
fn parsing_twice_gives_the_same_result() {
    let blob = BootInfoBuilder::new()
        .memory_map(&[usable(100 * MIB)])
        .smp(0, &[CpuEntry::new(0, CpuFlags::new()); 4])
        .build();
    let first = try_parse(&blob).unwrap();
    let second = try_parse(&blob).unwrap();
    assert_eq!(first.total_usable_memory_mb(), second.total_usable_memory_mb());
    assert_eq!(first.cpu_count(), 4);
    assert_eq!(second.cpu_count(), 4);
}

#[test]
fn newer_versions_are_accepted() {
    let blob = BootInfoBuilder::new()
        .version(7)
        .memory_map(&[usable(MIB)])
        .build();
    assert!(try_parse(&blob).is_ok());

    let blob = BootInfoBuilder::new().version(0).build();
    assert!(!validate(&blob));
}
