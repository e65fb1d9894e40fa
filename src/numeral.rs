//! Formal (anti-fraud) Chinese numerals for monetary amounts.
//!
//! `amount_to_chinese` turns a decimal amount into the capitalised form used
//! on receipts and cheques, e.g. `1500.00` becomes `壹仟伍佰元整` and
//! `100.5` becomes `壹佰元伍角`.

use rust_decimal::prelude::*;

const DIGITS: [&str; 10] = ["零", "壹", "贰", "叁", "肆", "伍", "陆", "柒", "捌", "玖"];
const POSITIONS: [&str; 4] = ["仟", "佰", "拾", ""];

pub const ZERO: &str = "零";
pub const NEGATIVE: &str = "负";
pub const CURRENCY_UNIT: &str = "元";
pub const EXACT: &str = "整";
pub const TEN_CENTS: &str = "角";
pub const CENT: &str = "分";

/// Convert an amount to its formal numeral string.
///
/// Cents are rounded half-up on the exact decimal value; a rounding carry
/// (`0.995`) moves into the integer part.
pub fn amount_to_chinese(amount: Decimal) -> String {
    if amount.is_zero() {
        return format!("{ZERO}{CURRENCY_UNIT}{EXACT}");
    }

    let negative = amount.is_sign_negative();
    let abs = amount.abs();

    let mut units = abs.trunc().to_u128().unwrap_or(0);
    let cents = ((abs - abs.trunc()) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);
    let cents = if cents >= 100 {
        units += 1;
        cents - 100
    } else {
        cents
    };

    let mut out = String::new();
    if negative {
        out.push_str(NEGATIVE);
    }
    out.push_str(&integer_to_chinese(units));
    out.push_str(CURRENCY_UNIT);

    if cents == 0 {
        out.push_str(EXACT);
        return out;
    }

    let jiao = (cents / 10) as usize;
    let fen = (cents % 10) as usize;
    if jiao > 0 {
        out.push_str(DIGITS[jiao]);
        out.push_str(TEN_CENTS);
    }
    if fen > 0 {
        if jiao == 0 && units > 0 {
            out.push_str(ZERO);
        }
        out.push_str(DIGITS[fen]);
        out.push_str(CENT);
    }
    out
}

/// Render a non-negative integer with four-digit grouping.
///
/// Gaps between non-zero groups, and groups below one thousand that follow
/// a non-zero group, are bridged by a single `零`. A leading 10-19 drops the
/// `壹` before `拾`.
pub fn integer_to_chinese(value: u128) -> String {
    if value == 0 {
        return ZERO.to_string();
    }

    let mut groups = Vec::new();
    let mut rest = value;
    while rest > 0 {
        groups.push((rest % 10_000) as u16);
        rest /= 10_000;
    }

    let mut out = String::new();
    let mut gap = false;
    for (index, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            gap = !out.is_empty();
            continue;
        }
        let leading = out.is_empty();
        if !leading && (gap || group < 1000) {
            out.push_str(ZERO);
        }
        out.push_str(&group_to_chinese(group, leading));
        out.push_str(&group_unit(index));
        gap = false;
    }
    out
}

/// Suffix for the n-th four-digit group: 万 every odd group, one 亿 per pair.
fn group_unit(index: usize) -> String {
    let mut unit = String::new();
    if index % 2 == 1 {
        unit.push('万');
    }
    for _ in 0..index / 2 {
        unit.push('亿');
    }
    unit
}

fn group_to_chinese(group: u16, leading: bool) -> String {
    if leading && (10..20).contains(&group) {
        let unit = (group % 10) as usize;
        let mut out = String::from("拾");
        if unit > 0 {
            out.push_str(DIGITS[unit]);
        }
        return out;
    }

    let digits = [group / 1000, group / 100 % 10, group / 10 % 10, group % 10];
    let mut out = String::new();
    let mut pending_zero = false;
    for (digit, position) in digits.iter().zip(POSITIONS) {
        if *digit == 0 {
            pending_zero = !out.is_empty();
            continue;
        }
        if pending_zero {
            out.push_str(ZERO);
            pending_zero = false;
        }
        out.push_str(DIGITS[*digit as usize]);
        out.push_str(position);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn zh(s: &str) -> String {
        amount_to_chinese(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn zero_is_fixed_string() {
        assert_eq!(zh("0"), "零元整");
        assert_eq!(zh("0.00"), "零元整");
    }

    #[test]
    fn whole_amounts_end_exact() {
        assert_eq!(zh("1500"), "壹仟伍佰元整");
        assert_eq!(zh("1500.00"), "壹仟伍佰元整");
        assert_eq!(zh("1"), "壹元整");
        assert_eq!(zh("100"), "壹佰元整");
    }

    #[test]
    fn cents_rendering() {
        assert_eq!(zh("100.5"), "壹佰元伍角");
        assert_eq!(zh("100.05"), "壹佰元零伍分");
        assert_eq!(zh("100.55"), "壹佰元伍角伍分");
        assert_eq!(zh("0.5"), "零元伍角");
        assert_eq!(zh("0.05"), "零元伍分");
        assert_eq!(zh("0.55"), "零元伍角伍分");
    }

    #[test]
    fn cents_round_half_up() {
        assert_eq!(zh("1.005"), "壹元零壹分");
        assert_eq!(zh("1.004"), "壹元整");
        assert_eq!(zh("0.995"), "壹元整");
        assert_eq!(zh("9.999"), "拾元整");
    }

    #[test]
    fn negative_prefix() {
        assert_eq!(zh("-1500"), "负壹仟伍佰元整");
        assert_eq!(zh("-0.5"), "负零元伍角");
    }

    #[test]
    fn ten_to_nineteen_only_at_start() {
        assert_eq!(zh("10"), "拾元整");
        assert_eq!(zh("15"), "拾伍元整");
        assert_eq!(zh("110"), "壹佰壹拾元整");
        assert_eq!(zh("100010"), "拾万零壹拾元整");
        assert_eq!(zh("150000"), "拾伍万元整");
    }

    #[test]
    fn internal_zeros_within_group() {
        assert_eq!(zh("101"), "壹佰零壹元整");
        assert_eq!(zh("1001"), "壹仟零壹元整");
        assert_eq!(zh("1005"), "壹仟零伍元整");
        assert_eq!(zh("1050"), "壹仟零伍拾元整");
        assert_eq!(zh("1200"), "壹仟贰佰元整");
        assert_eq!(zh("1234"), "壹仟贰佰叁拾肆元整");
    }

    #[test]
    fn group_bridging() {
        assert_eq!(zh("10000"), "壹万元整");
        assert_eq!(zh("10005"), "壹万零伍元整");
        assert_eq!(zh("10500"), "壹万零伍佰元整");
        assert_eq!(zh("11000"), "壹万壹仟元整");
        assert_eq!(zh("100000000"), "壹亿元整");
        assert_eq!(zh("100000001"), "壹亿零壹元整");
        assert_eq!(zh("100010000"), "壹亿零壹万元整");
        assert_eq!(zh("110000000"), "壹亿壹仟万元整");
        assert_eq!(zh("1000000000000"), "壹万亿元整");
        assert_eq!(zh("1000100000000"), "壹万亿零壹亿元整");
    }

    #[test]
    fn group_units_beyond_trillion() {
        assert_eq!(group_unit(0), "");
        assert_eq!(group_unit(1), "万");
        assert_eq!(group_unit(2), "亿");
        assert_eq!(group_unit(3), "万亿");
        assert_eq!(group_unit(4), "亿亿");
        assert_eq!(integer_to_chinese(10u128.pow(16)), "壹亿亿");
    }
}
