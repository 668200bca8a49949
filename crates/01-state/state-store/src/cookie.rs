use url::form_urlencoded;

use crate::error::{StoreError, StoreResult};
use crate::KvStore;

/// Largest encoded value a single cookie may carry.
pub const MAX_COOKIE_VALUE_LEN: usize = 4096;

/// Raw access to a browser-style cookie jar.
///
/// `read_all` returns the `document.cookie` string (`a=b; c=d`), `write`
/// receives one `Set-Cookie`-style assignment.
pub trait CookieJar {
    /// Returns every visible cookie as a single `; `-separated string.
    fn read_all(&self) -> String;

    /// Applies one cookie assignment.
    fn write(&mut self, assignment: &str) -> StoreResult<()>;
}

/// Percent-encodes a cookie value.
pub fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Decodes a value produced by [`encode_value`] (or `encodeURIComponent`).
///
/// Raw values carrying the separators the encoder always escapes were not
/// written by us and decode to `None`.
pub fn decode_value(raw: &str) -> Option<String> {
    if raw.contains(['&', '=', ';']) {
        return None;
    }
    if raw.is_empty() {
        return Some(String::new());
    }
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
}

/// Builds the assignment written to `document.cookie`.
pub fn format_assignment(name: &str, value: &str, ttl_seconds: u64) -> String {
    format!(
        "{name}={}; max-age={ttl_seconds}; path=/",
        encode_value(value)
    )
}

/// Finds `name` in a `document.cookie` string. First match wins.
pub fn lookup(jar: &str, name: &str) -> Option<String> {
    jar.split(';')
        .map(str::trim_start)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, raw)| decode_value(raw.trim_end()))
}

/// [`KvStore`] over a [`CookieJar`]; expiry is enforced by the jar itself.
#[derive(Debug, Clone, Default)]
pub struct CookieStore<J> {
    jar: J,
}

impl<J: CookieJar> CookieStore<J> {
    /// Wraps a jar.
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    /// Borrows the underlying jar.
    pub fn jar(&self) -> &J {
        &self.jar
    }
}

impl<J: CookieJar> KvStore for CookieStore<J> {
    fn get(&self, key: &str) -> Option<String> {
        lookup(&self.jar.read_all(), key)
    }

    fn set(&mut self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        let encoded_len = encode_value(value).len();
        if encoded_len > MAX_COOKIE_VALUE_LEN {
            return Err(StoreError::CapacityExceeded {
                key: key.to_owned(),
                len: encoded_len,
            });
        }
        let assignment = format_assignment(key, value, ttl_seconds);
        log::trace!("AmberLoader: cookie write {assignment}");
        self.jar.write(&assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingJar {
        visible: String,
        written: Vec<String>,
    }

    impl CookieJar for RecordingJar {
        fn read_all(&self) -> String {
            self.visible.clone()
        }

        fn write(&mut self, assignment: &str) -> StoreResult<()> {
            self.written.push(assignment.to_owned());
            Ok(())
        }
    }

    #[test]
    fn assignment_carries_max_age_and_root_path() {
        assert_eq!(
            format_assignment("AmberLoader_lastPoll", "1700000000", 3600),
            "AmberLoader_lastPoll=1700000000; max-age=3600; path=/"
        );
        assert_eq!(
            format_assignment("k", "a b;c", 0),
            "k=a+b%3Bc; max-age=0; path=/"
        );
    }

    #[test]
    fn lookup_matches_whole_names_only() {
        let jar = "xAmberLoader_collapsed=false; AmberLoader_collapsed=true; other=1";
        assert_eq!(lookup(jar, "AmberLoader_collapsed").as_deref(), Some("true"));
        assert_eq!(lookup(jar, "other").as_deref(), Some("1"));
        assert_eq!(lookup(jar, "missing"), None);
        assert_eq!(lookup("", "other"), None);
    }

    #[test]
    fn lookup_decodes_uri_component_values() {
        let jar = "k=Amber%20Alert%3B%20actief";
        assert_eq!(lookup(jar, "k").as_deref(), Some("Amber Alert; actief"));
    }

    #[test]
    fn foreign_values_with_separators_are_absent() {
        assert_eq!(decode_value("a=b"), None);
        assert_eq!(decode_value("a&b"), None);
        assert_eq!(decode_value("").as_deref(), Some(""));
    }

    #[test]
    fn cookie_store_rejects_oversized_values_without_writing() {
        let mut store = CookieStore::new(RecordingJar::default());
        let huge = "x".repeat(MAX_COOKIE_VALUE_LEN + 1);
        assert!(matches!(
            store.set("k", &huge, 10),
            Err(StoreError::CapacityExceeded { .. })
        ));
        assert!(store.jar().written.is_empty());

        store.set("k", "v", 10).unwrap();
        assert_eq!(store.jar().written, vec!["k=v; max-age=10; path=/".to_owned()]);
    }

    #[test]
    fn cookie_store_reads_through_jar() {
        let jar = RecordingJar {
            visible: "AmberLoader_activeAlert=true".into(),
            written: Vec::new(),
        };
        let store = CookieStore::new(jar);
        assert_eq!(store.get("AmberLoader_activeAlert").as_deref(), Some("true"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever we encode must come back unchanged through a jar lookup.
            #[test]
            fn lookup_recovers_encoded_values(value in "\\PC{0,64}") {
                let jar = format!("other=1; k={}", encode_value(&value));
                prop_assert_eq!(lookup(&jar, "k"), Some(value));
            }
        }
    }
}
