//! Pure, stateless input validators used at capture time.

use std::sync::OnceLock;

use regex::Regex;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9-.]+$")
            .expect("email regex is valid")
    })
}

/// Basic email shape check (local-part@domain.tld). `None` and the empty
/// string are rejected.
pub fn validate_email(correo: Option<&str>) -> bool {
    match correo {
        Some(c) => email_regex().is_match(c.trim()),
        None => false,
    }
}

/// Validate a Chilean RUT with its mod-11 check character.
///
/// Accepts any of `12.345.678-5`, `12345678-5`, `123456785`, `9.876.543-K`
/// (check letter in either case). Anything malformed — wrong length after
/// stripping separators, non-numeric body — is simply invalid.
pub fn validate_rut(rut_raw: Option<&str>) -> bool {
    let Some(raw) = rut_raw else {
        return false;
    };
    let rut: Vec<char> = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    // 7-digit body + check char = 8, 8-digit body + check char = 9
    if rut.len() < 8 || rut.len() > 9 {
        return false;
    }

    let (body, given) = rut.split_at(rut.len() - 1);

    if !body.iter().all(|c| c.is_ascii_digit()) {
        return false;
    }

    given[0] == compute_check_char(&body.iter().collect::<String>())
}

/// Official algorithm: weights 2..=7 cycling right-to-left over the body,
/// remainder mapped 11→'0', 10→'K'.
fn compute_check_char(body: &str) -> char {
    let mut sum: u32 = 0;
    let mut mult: u32 = 2;
    for c in body.chars().rev() {
        sum += c.to_digit(10).expect("body is numeric") * mult;
        mult = if mult == 7 { 2 } else { mult + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).expect("single digit"),
    }
}
