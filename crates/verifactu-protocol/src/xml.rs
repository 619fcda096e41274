//! Minimal XML plumbing for the authority's SOAP dialect.
//!
//! Requests are built as flat strings with a fixed element order; replies
//! are read with a namespace-prefix-tolerant tag extractor. The authority
//! controls both sides of the wire, so this never aspires to be a general
//! XML processor.

/// Escapes the five XML special characters.
pub(crate) fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Reverses [`escape`]; applied to extracted text content.
pub(crate) fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Appends `<tag>escaped-value</tag>`.
pub(crate) fn leaf(out: &mut String, tag: &str, value: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape(value));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

pub(crate) fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

pub(crate) fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

/// Counts opening occurrences of `marker` (a `<qname` prefix) in `segment`,
/// requiring a tag-name boundary so `<Foo` never matches `<FooBar`.
fn count_opens(segment: &str, marker: &str) -> usize {
    let mut count = 0;
    let mut pos = 0;
    while let Some(offset) = segment[pos..].find(marker) {
        let end = pos + offset + marker.len();
        match segment[end..].chars().next() {
            Some('>') | Some('/') => count += 1,
            Some(c) if c.is_whitespace() => count += 1,
            _ => {}
        }
        pos = end;
    }
    count
}

/// Returns the inner content of every element whose local name is `tag`,
/// regardless of namespace prefix. Nested elements of the same name stay
/// inside their parent's slice.
pub(crate) fn find_all<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = xml[pos..].find('<') {
        let start = pos + offset;
        let rest = &xml[start + 1..];
        if rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('!') {
            pos = start + 1;
            continue;
        }
        let Some(name_end) = rest.find(|c: char| c == '>' || c == '/' || c.is_whitespace())
        else {
            break;
        };
        let qname = &rest[..name_end];
        if local_name(qname) != tag {
            pos = start + 1;
            continue;
        }
        let Some(bracket) = rest.find('>') else { break };
        if rest[..bracket].ends_with('/') {
            found.push("");
            pos = start + 1 + bracket + 1;
            continue;
        }

        let content_start = start + 1 + bracket + 1;
        let open_marker = format!("<{qname}");
        let close_marker = format!("</{qname}>");
        let mut depth = 1usize;
        let mut cursor = content_start;
        let mut content_end = None;
        while let Some(close_offset) = xml[cursor..].find(&close_marker) {
            let close_abs = cursor + close_offset;
            depth += count_opens(&xml[cursor..close_abs], &open_marker);
            depth -= 1;
            if depth == 0 {
                content_end = Some(close_abs);
                break;
            }
            cursor = close_abs + close_marker.len();
        }
        let Some(content_end) = content_end else { break };
        found.push(xml[content_start..content_end].trim());
        pos = content_end + close_marker.len();
    }
    found
}

/// Inner content of the first element with local name `tag`, if any.
pub(crate) fn find_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    find_all(xml, tag).into_iter().next()
}

/// Unescaped text content of the first element with local name `tag`,
/// skipping empty elements.
pub(crate) fn find_text(xml: &str, tag: &str) -> Option<String> {
    find_tag(xml, tag)
        .filter(|content| !content.is_empty())
        .map(unescape)
}

#[cfg(test)]
mod tests {
    use super::{escape, find_all, find_tag, find_text};

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }

    #[test]
    fn finds_tags_with_any_prefix() {
        let xml = "<tikR:CSV>ABC123</tikR:CSV><other>x</other>";
        assert_eq!(find_tag(xml, "CSV"), Some("ABC123"));
        assert_eq!(find_text(xml, "CSV").as_deref(), Some("ABC123"));
        assert_eq!(find_tag(xml, "Missing"), None);
    }

    #[test]
    fn finds_repeated_blocks() {
        let xml = "<a:Linea><n>1</n></a:Linea><a:Linea><n>2</n></a:Linea>";
        let blocks = find_all(xml, "Linea");
        assert_eq!(blocks.len(), 2);
        assert_eq!(find_tag(blocks[1], "n"), Some("2"));
    }

    #[test]
    fn nested_same_name_elements_stay_inside_parent() {
        let xml = "<Estado><Estado>inner</Estado><Codigo>7</Codigo></Estado>";
        let outer = find_all(xml, "Estado");
        assert_eq!(outer.len(), 1);
        assert_eq!(find_tag(outer[0], "Estado"), Some("inner"));
        assert_eq!(find_tag(outer[0], "Codigo"), Some("7"));
    }

    #[test]
    fn self_closing_elements_are_empty() {
        let xml = "<a><PrimerRegistro/></a>";
        assert_eq!(find_tag(xml, "PrimerRegistro"), Some(""));
        assert_eq!(find_text(xml, "PrimerRegistro"), None);
    }
}
