//! Compacted JSON records.

use serde::de::IgnoredAny;

/// One compacted JSON value followed by a single `\n`.
///
/// Only constructed through [`Message::compact`], so the bytes are always a
/// syntactically valid JSON document on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Vec<u8>);

impl Message {
    /// Validate `body` as JSON and strip insignificant whitespace.
    ///
    /// Tokens are copied verbatim: key order, duplicate keys and number
    /// spelling are preserved.
    pub fn compact(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<IgnoredAny>(body)?;

        let mut out = Vec::with_capacity(body.len() + 1);
        let mut in_string = false;
        let mut escaped = false;
        for &b in body {
            if in_string {
                out.push(b);
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => {}
                b'"' => {
                    in_string = true;
                    out.push(b);
                }
                _ => out.push(b),
            }
        }
        out.push(b'\n');
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(s: &str) -> String {
        String::from_utf8(Message::compact(s.as_bytes()).unwrap().0).unwrap()
    }

    #[test]
    fn strips_whitespace() {
        assert_eq!(compact(r#"{"a": 1,  "b": [2,3]}"#), "{\"a\":1,\"b\":[2,3]}\n");
        assert_eq!(compact("\n\t[ 1 ,\r\n 2 ]\n"), "[1,2]\n");
    }

    #[test]
    fn keeps_string_contents() {
        assert_eq!(
            compact(r#"{ "msg" : "disk  full: \"/var\" \\ " }"#),
            "{\"msg\":\"disk  full: \\\"/var\\\" \\\\ \"}\n"
        );
    }

    #[test]
    fn preserves_tokens_verbatim() {
        assert_eq!(compact(r#"{"z": 1e3, "a": 1.50, "z": null}"#), "{\"z\":1e3,\"a\":1.50,\"z\":null}\n");
    }

    #[test]
    fn accepts_scalars() {
        assert_eq!(compact(" 42 "), "42\n");
        assert_eq!(compact(r#""hello""#), "\"hello\"\n");
        assert_eq!(compact("true"), "true\n");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(Message::compact(b"").is_err());
        assert!(Message::compact(b"   ").is_err());
        assert!(Message::compact(b"not json").is_err());
        assert!(Message::compact(b"{\"a\":1} trailing").is_err());
        assert!(Message::compact(b"{\"a\":}").is_err());
    }
}
