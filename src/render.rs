//! Display helpers for the CLI report: rupee amounts with Indian digit
//! grouping (lakh / crore) and fixed-precision percentages.

/// Formats `amount` as whole rupees, e.g. `₹8,61,52,368`.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹—".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}₹{}", group_indian(&digits))
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

// Last three digits form one group, every group to the left has two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lakhs_and_crores() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1_000.0), "₹1,000");
        assert_eq!(format_inr(50_000.0), "₹50,000");
        assert_eq!(format_inr(600_000.0), "₹6,00,000");
        assert_eq!(format_inr(86_152_367.59), "₹8,61,52,368");
        assert_eq!(format_inr(1_234_567_890.0), "₹1,23,45,67,890");
    }

    #[test]
    fn rounds_to_whole_rupees_and_keeps_sign() {
        assert_eq!(format_inr(29_287.64), "₹29,288");
        assert_eq!(format_inr(-12_345.4), "-₹12,345");
        assert_eq!(format_inr(f64::INFINITY), "₹—");
    }

    #[test]
    fn percent_uses_requested_precision() {
        assert_eq!(format_percent(12.682_503, 2), "12.68%");
        assert_eq!(format_percent(41.0, 1), "41.0%");
    }
}
