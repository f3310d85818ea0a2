// 💵 Money formatting
//
// Stored values are thousands of won. Display groups the real amount into
// 억 (10^8) and 만 (10^4) units rather than thousands separators.

use crate::aggregation::AssetBreakdown;

const UNIT: i64 = 1_000;
const EOK: i64 = 100_000_000;
const MAN: i64 = 10_000;

/// "12억 3456만원", "-5만원", "0원"
pub fn format_money(thousands: i64) -> String {
    let real = thousands as i128 * UNIT as i128;
    if real == 0 {
        return "0원".to_string();
    }

    let sign = if real < 0 { "-" } else { "" };
    let magnitude = real.unsigned_abs();
    let eok = magnitude / EOK as u128;
    let man = (magnitude % EOK as u128) / MAN as u128;

    if eok > 0 {
        let man_part = if man > 0 { format!("{}만", man) } else { String::new() };
        format!("{}{}억 {}원", sign, eok, man_part)
    } else {
        format!("{}{}만원", sign, man)
    }
}

/// Summary-card form: "12억+", "350만+", "-"
pub fn format_compact(thousands: i64) -> String {
    let real = thousands as i128 * UNIT as i128;
    if real == 0 {
        return "-".to_string();
    }

    let eok = real.div_euclid(EOK as i128);
    if eok > 0 {
        format!("{}억+", eok)
    } else {
        format!("{}만+", real.div_euclid(MAN as i128))
    }
}

/// Signed amount with an explicit "+" for gains
pub fn format_signed(thousands: i64) -> String {
    if thousands > 0 {
        format!("+{}", format_money(thousands))
    } else {
        format_money(thousands)
    }
}

/// "▲ 4.5% (+1억 2000만원)"; a zero change counts as up
pub fn format_change(breakdown: &AssetBreakdown) -> String {
    let arrow = if breakdown.change_amount >= 0 { "▲" } else { "▼" };
    format!(
        "{} {:.1}% ({})",
        arrow,
        breakdown.change_rate_percent.abs(),
        format_signed(breakdown.change_amount)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::disclosure::RawLineItem;

    #[test]
    fn test_two_tier_grouping() {
        assert_eq!(format_money(1234567), "12억 3456만원");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_money(0), "0원");
        assert_eq!(format_compact(0), "-");
    }

    #[test]
    fn test_round_eok_keeps_space() {
        assert_eq!(format_money(100000), "1억 원");
    }

    #[test]
    fn test_below_one_eok() {
        assert_eq!(format_money(35000), "3500만원");
        assert_eq!(format_money(5), "0만원");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_money(-1234567), "-12억 3456만원");
        assert_eq!(format_money(-500), "-50만원");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_compact(1234567), "12억+");
        assert_eq!(format_compact(35000), "3500만+");
    }

    #[test]
    fn test_signed() {
        assert_eq!(format_signed(500), "+50만원");
        assert_eq!(format_signed(-500), "-50만원");
        assert_eq!(format_signed(0), "0원");
    }

    #[test]
    fn test_change_line() {
        let item = RawLineItem {
            item_type: "예금".to_string(),
            previous_value: 100000,
            current_value: 90000,
            ..Default::default()
        };
        assert_eq!(format_change(&aggregate(&[item])), "▼ 10.0% (-1000만원)");
    }
}
