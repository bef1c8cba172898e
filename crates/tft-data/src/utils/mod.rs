pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Data Dragon spells locales with an upper-case region (`en_US`), Community
/// Dragon with a lower-case one (`en_us`).
pub fn data_dragon_locale(language: &str) -> String {
    match language.split_once('_') {
        Some((lang, region)) => format!("{}_{}", lang.to_lowercase(), region.to_uppercase()),
        None => language.to_string(),
    }
}
