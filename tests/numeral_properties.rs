use std::str::FromStr;

use proptest::prelude::*;
use receiptgen::amount_to_chinese;
use receiptgen::numeral::integer_to_chinese;
use rust_decimal::Decimal;

fn zh(s: &str) -> String {
    amount_to_chinese(Decimal::from_str(s).unwrap())
}

#[test]
fn boundary_table() {
    let cases = [
        ("0", "零元整"),
        ("1", "壹元整"),
        ("9", "玖元整"),
        ("10", "拾元整"),
        ("11", "拾壹元整"),
        ("19", "拾玖元整"),
        ("20", "贰拾元整"),
        ("99", "玖拾玖元整"),
        ("100", "壹佰元整"),
        ("101", "壹佰零壹元整"),
        ("110", "壹佰壹拾元整"),
        ("999", "玖佰玖拾玖元整"),
        ("1000", "壹仟元整"),
        ("1010", "壹仟零壹拾元整"),
        ("1500", "壹仟伍佰元整"),
        ("9999", "玖仟玖佰玖拾玖元整"),
        ("10000", "壹万元整"),
        ("10005", "壹万零伍元整"),
        ("10010", "壹万零壹拾元整"),
        ("10100", "壹万零壹佰元整"),
        ("15000", "壹万伍仟元整"),
        ("100000", "拾万元整"),
        ("100010", "拾万零壹拾元整"),
        ("120000", "拾贰万元整"),
        ("1000000", "壹佰万元整"),
        ("10000000", "壹仟万元整"),
        ("100000000", "壹亿元整"),
        ("100000005", "壹亿零伍元整"),
        ("1000000000", "拾亿元整"),
        ("1000000001", "拾亿零壹元整"),
    ];
    for (input, expected) in cases {
        assert_eq!(zh(input), expected, "amount {}", input);
    }
}

#[test]
fn cents_table() {
    let cases = [
        ("100.5", "壹佰元伍角"),
        ("100.50", "壹佰元伍角"),
        ("100.05", "壹佰元零伍分"),
        ("0.01", "零元壹分"),
        ("0.10", "零元壹角"),
        ("0.99", "零元玖角玖分"),
        ("1500.25", "壹仟伍佰元贰角伍分"),
        ("2.345", "贰元叁角伍分"),
    ];
    for (input, expected) in cases {
        assert_eq!(zh(input), expected, "amount {}", input);
    }
}

fn amount() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000_000_000, 0u32..100).prop_map(|(units, cents)| {
        Decimal::from(units) + Decimal::new(cents as i64, 2)
    })
}

proptest! {
    #[test]
    fn never_double_or_trailing_zero(units in 0u128..1_000_000_000_000_000_000) {
        let s = integer_to_chinese(units);
        prop_assert!(!s.contains("零零"), "{} -> {}", units, s);
        if units != 0 {
            prop_assert!(!s.ends_with('零'), "{} -> {}", units, s);
        }
    }

    #[test]
    fn whole_amounts_end_exact(units in 0u64..1_000_000_000_000) {
        let s = amount_to_chinese(Decimal::from(units));
        prop_assert!(s.ends_with("元整"));
        prop_assert!(!s.contains('角') && !s.contains('分'));
    }

    #[test]
    fn negation_only_adds_prefix(x in amount()) {
        prop_assume!(!x.is_zero());
        prop_assert_eq!(amount_to_chinese(-x), format!("负{}", amount_to_chinese(x)));
    }

    #[test]
    fn cents_words_match_fraction(x in amount()) {
        let s = amount_to_chinese(x);
        let cents = (x.fract() * Decimal::ONE_HUNDRED).trunc();
        prop_assert_eq!(s.ends_with('整'), cents.is_zero());
        prop_assert_eq!(s.contains('角'), cents / Decimal::TEN >= Decimal::ONE);
    }
}
