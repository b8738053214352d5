//! Configuration access port trait.
//!
//! Keys are grouped in INI-style sections; numeric getters fall back to the
//! supplied default when a key is absent or unparsable.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Comma-separated value split into trimmed, non-empty items. `None` when
    /// the key is absent; an empty list when it is present but blank.
    fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.get_string(section, key).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
    }
}
