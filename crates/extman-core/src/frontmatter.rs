//! YAML front matter for markdown resources.

use serde::de::DeserializeOwned;

/// Split `---` delimited front matter from the body.
///
/// Returns `None` when the document does not open with a front matter block.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    None
}

/// Deserialize the front matter into `T` and return it with the body.
pub fn parse<T: DeserializeOwned>(content: &str) -> Result<(T, String), String> {
    let (yaml, body) = split(content).ok_or_else(|| "missing YAML front matter".to_string())?;
    let meta = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    Ok((meta, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Meta {
        name: String,
    }

    #[test]
    fn splits_front_matter_and_body() {
        let (yaml, body) = split("---\nname: x\n---\n\nHello\n").unwrap();
        assert_eq!(yaml, "name: x\n");
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn handles_crlf() {
        let (meta, body) = parse::<Meta>("---\r\nname: x\r\n---\r\nBody").unwrap();
        assert_eq!(meta.name, "x");
        assert_eq!(body, "Body");
    }

    #[test]
    fn missing_or_unterminated_front_matter() {
        assert!(split("# Just markdown").is_none());
        assert!(split("---\nname: x\nno end").is_none());
        assert!(parse::<Meta>("---\nother: 1\n---\n").is_err());
    }
}
