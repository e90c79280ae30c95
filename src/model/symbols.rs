// Tue Jan 13 2026 - Alex

use crate::hprof::Id;
use ahash::AHashMap;
use bytes::Bytes;

#[derive(Debug, Default, Clone)]
pub struct StringTable {
    strings: AHashMap<Id, Box<str>>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: Id, utf8: &Bytes) {
        let text = String::from_utf8_lossy(utf8).into_owned().into_boxed_str();
        self.strings.insert(id, text);
    }

    pub fn get(&self, id: Id) -> Option<&str> {
        self.strings.get(&id).map(|s| s.as_ref())
    }

    pub fn get_or_placeholder(&self, id: Id) -> String {
        match self.get(id) {
            Some(s) => s.to_string(),
            None => format!("<string {:#x}>", id),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Normalizes JVM internal names to dotted source form:
/// `java/lang/String` -> `java.lang.String`, `[Ljava/lang/Object;` -> `java.lang.Object[]`,
/// `[[I` -> `int[][]`.
pub fn normalize_class_name(raw: &str) -> String {
    let dims = raw.chars().take_while(|&c| c == '[').count();
    if dims == 0 {
        return raw.replace('/', ".");
    }
    let element = &raw[dims..];
    let base = match element {
        "Z" => "boolean".to_string(),
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "S" => "short".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "F" => "float".to_string(),
        "D" => "double".to_string(),
        other => other
            .strip_prefix('L')
            .map(|s| s.strip_suffix(';').unwrap_or(s))
            .unwrap_or(other)
            .replace('/', "."),
    };
    format!("{}{}", base, "[]".repeat(dims))
}

pub fn package_of(class_name: &str) -> Option<&str> {
    let name = class_name.trim_end_matches("[]");
    name.rfind('.').map(|pos| &name[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_class_name() {
        assert_eq!(normalize_class_name("java/lang/String"), "java.lang.String");
        assert_eq!(normalize_class_name("java.lang.String"), "java.lang.String");
        assert_eq!(normalize_class_name("[Ljava/lang/Object;"), "java.lang.Object[]");
        assert_eq!(normalize_class_name("[[I"), "int[][]");
        assert_eq!(normalize_class_name("android.view.View[]"), "android.view.View[]");
    }

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("java.util.HashMap"), Some("java.util"));
        assert_eq!(package_of("java.lang.String[]"), Some("java.lang"));
        assert_eq!(package_of("Main"), None);
    }

    #[test]
    fn test_string_table() {
        let mut table = StringTable::new();
        table.insert(7, &Bytes::from_static(b"mWidth"));
        assert_eq!(table.get(7), Some("mWidth"));
        assert_eq!(table.get_or_placeholder(8), "<string 0x8>");
    }
}
