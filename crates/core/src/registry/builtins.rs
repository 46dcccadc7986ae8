use crate::Type;

const STRING32_LENGTH: u64 = 2_147_483_648;
const STRING64_LENGTH: u64 = 9_223_372_036_854_775_807;

/// The aliases every seeded [`crate::Registry`] starts with.
pub fn builtin_types() -> Vec<(&'static str, Type)> {
    vec![
        ("int8", Type::int(8, true)),
        ("uint8", Type::int(8, false)),
        ("int16", Type::int(16, true)),
        ("uint16", Type::int(16, false)),
        ("int32", Type::int(32, true)),
        ("uint32", Type::int(32, false)),
        ("int64", Type::int(64, true)),
        ("uint64", Type::int(64, false)),
        ("float16", Type::float(16)),
        ("float32", Type::float(32)),
        ("float64", Type::float(64)),
        ("string32", Type::string(STRING32_LENGTH, true)),
        ("string64", Type::string(STRING64_LENGTH, true)),
        ("bytes32", Type::bytes(STRING32_LENGTH, true)),
        ("bytes64", Type::bytes(STRING64_LENGTH, true)),
        ("uuid", Type::string(36, false).with_logical("UUID")),
        ("decimal128", decimal(16, 28, 14)),
        ("decimal256", decimal(32, 56, 28)),
        (
            "duration64",
            Type::int(64, true)
                .with_logical("Duration")
                .with_attr("unit", "millisecond"),
        ),
        (
            "interval128",
            Type::bytes(16, false)
                .with_logical("Interval")
                .with_attr("unit", "millisecond"),
        ),
        ("time32", time(32)),
        ("time64", time(64)),
        (
            "timestamp64",
            Type::int(64, true)
                .with_logical("Timestamp")
                .with_attr("unit", "millisecond")
                .with_attr("timezone", "UTC"),
        ),
        ("date32", date(32)),
        ("date64", date(64)),
    ]
}

fn decimal(max_length: u64, precision: i64, scale: i64) -> Type {
    Type::bytes(max_length, false)
        .with_logical("Decimal")
        .with_attr("precision", precision)
        .with_attr("scale", scale)
}

fn time(bits: u32) -> Type {
    Type::int(bits, true)
        .with_logical("Time")
        .with_attr("unit", "second")
}

fn date(bits: u32) -> Type {
    Type::int(bits, true)
        .with_logical("Date")
        .with_attr("unit", "day")
}
