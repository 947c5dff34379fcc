//! Lenient number parsing for free-text vital-sign inputs.
//!
//! Form fields arrive as whatever the user typed ("72", "80 bpm", " 36.6"). The leading
//! numeric prefix is taken and the rest ignored; input with no leading number yields `None`.
//! No range checks are applied.

/// End index of the run of ASCII digits beginning at `start`.
fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn sign_end(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start) {
        Some(b'+') | Some(b'-') => start + 1,
        _ => start,
    }
}

pub(crate) fn parse_leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let digits_start = sign_end(bytes, 0);
    let end = digits_end(bytes, digits_start);
    if end == digits_start {
        return None;
    }

    s[..end].parse().ok()
}

pub(crate) fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let int_start = sign_end(bytes, 0);
    let int_end = digits_end(bytes, int_start);
    let mut end = int_end;
    let mut has_digits = int_end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_end(bytes, end + 1);
        if frac_end > end + 1 || has_digits {
            has_digits |= frac_end > end + 1;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_digits_start = sign_end(bytes, end + 1);
        let exp_end = digits_end(bytes, exp_digits_start);
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
