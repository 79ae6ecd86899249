use super::{Element, Node};

/// Elements that never have children, even without `/>`.
const VOID_TAGS: &[&str] = &["img"];

struct OpenTag {
    element: Element,
    self_closing: bool,
    consumed: usize,
}

/// Parse command text into a markup tree.
///
/// Parsing never fails: anything that does not form a well-formed tag is kept
/// as text, unmatched closing tags stay text, and elements still open at the
/// end of input are closed there.
pub fn parse(input: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        if rest.starts_with("</") {
            if let Some((name, consumed)) = parse_close_tag(rest) {
                if let Some(depth) = open.iter().rposition(|element| element.tag == name) {
                    flush_text(&mut text, target(&mut root, &mut open));
                    while open.len() > depth {
                        close_top(&mut root, &mut open);
                    }
                    pos += consumed;
                    continue;
                }
            }
        } else if rest.starts_with('<') {
            if let Some(tag) = parse_open_tag(rest) {
                flush_text(&mut text, target(&mut root, &mut open));
                pos += tag.consumed;
                if tag.self_closing || VOID_TAGS.contains(&tag.element.tag.as_str()) {
                    target(&mut root, &mut open).push(Node::Element(tag.element));
                } else {
                    open.push(tag.element);
                }
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        text.push(ch);
        pos += ch.len_utf8();
    }

    flush_text(&mut text, target(&mut root, &mut open));
    while !open.is_empty() {
        close_top(&mut root, &mut open);
    }
    root
}

fn target<'a>(root: &'a mut Vec<Node>, open: &'a mut [Element]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(element) => &mut element.children,
        None => root,
    }
}

fn close_top(root: &mut Vec<Node>, open: &mut Vec<Element>) {
    if let Some(element) = open.pop() {
        target(root, open).push(Node::Element(element));
    }
}

fn flush_text(text: &mut String, into: &mut Vec<Node>) {
    if !text.is_empty() {
        into.push(Node::Text(unescape(&std::mem::take(text))));
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn leading_whitespace(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn parse_name(s: &str) -> Option<&str> {
    if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let len = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    Some(&s[..len])
}

/// `</name>` with optional whitespace before `>`.
fn parse_close_tag(rest: &str) -> Option<(&str, usize)> {
    let name = parse_name(&rest[2..])?;
    let mut pos = 2 + name.len();
    pos += leading_whitespace(&rest[pos..]);
    rest[pos..].starts_with('>').then_some((name, pos + 1))
}

fn parse_open_tag(rest: &str) -> Option<OpenTag> {
    let name = parse_name(&rest[1..])?;
    let mut element = Element::new(name);
    let mut pos = 1 + name.len();

    loop {
        pos += leading_whitespace(&rest[pos..]);
        let tail = &rest[pos..];
        if tail.is_empty() {
            return None;
        }
        if tail.starts_with("/>") {
            return Some(OpenTag {
                element,
                self_closing: true,
                consumed: pos + 2,
            });
        }
        if tail.starts_with('>') {
            return Some(OpenTag {
                element,
                self_closing: false,
                consumed: pos + 1,
            });
        }

        let key_len = tail
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(tail.len());
        if key_len == 0 {
            return None;
        }
        let key = tail[..key_len].to_string();
        pos += key_len;
        pos += leading_whitespace(&rest[pos..]);

        if !rest[pos..].starts_with('=') {
            element.attrs.insert(key, String::new());
            continue;
        }
        pos += 1;
        pos += leading_whitespace(&rest[pos..]);

        let tail = &rest[pos..];
        let value = match tail.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = tail[1..].find(quote)?;
                pos += end + 2;
                &tail[1..1 + end]
            }
            Some(_) => {
                let end = tail
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(tail.len());
                pos += end;
                let raw = &tail[..end];
                // `<img src=a.png/>`: the slash closes the tag, not the value.
                match raw.strip_suffix('/') {
                    Some(trimmed) if rest[pos..].starts_with('>') => {
                        pos -= 1;
                        trimmed
                    }
                    _ => raw,
                }
            }
            None => return None,
        };
        element.attrs.insert(key, unescape(value));
    }
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_element(nodes: &[Node]) -> &Element {
        let elements: Vec<&Element> = nodes
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                Node::Text(_) => None,
            })
            .collect();
        assert_eq!(elements.len(), 1, "expected one element in {:?}", nodes);
        elements[0]
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello"), vec![Node::Text("hello".to_string())]);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_self_closing_with_quoted_attrs() {
        let nodes = parse("describe <img src=\"https://x/y.png\" alt='a b'/> please");
        assert_eq!(nodes.len(), 3);
        let img = single_element(&nodes);
        assert_eq!(img.tag, "img");
        assert_eq!(img.attr("src"), Some("https://x/y.png"));
        assert_eq!(img.attr("alt"), Some("a b"));
        assert_eq!(nodes[0], Node::Text("describe ".to_string()));
        assert_eq!(nodes[2], Node::Text(" please".to_string()));
    }

    #[test]
    fn test_bare_attribute_value_before_slash() {
        let nodes = parse("<img src=https://x/y.png/>");
        let img = single_element(&nodes);
        assert_eq!(img.attr("src"), Some("https://x/y.png"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn test_void_img_without_slash() {
        let nodes = parse("<img url=\"a.gif\">after");
        assert_eq!(nodes.len(), 2);
        assert_eq!(single_element(&nodes).attr("url"), Some("a.gif"));
        assert_eq!(nodes[1], Node::Text("after".to_string()));
    }

    #[test]
    fn test_valueless_attribute() {
        let nodes = parse("<video muted src=\"v.mp4\"/>");
        let video = single_element(&nodes);
        assert_eq!(video.attr("muted"), Some(""));
        assert_eq!(video.attr("src"), Some("v.mp4"));
    }

    #[test]
    fn test_nested_elements() {
        let nodes = parse("<quote id=\"1\">hi <b>there</b></quote>");
        let quote = single_element(&nodes);
        assert_eq!(quote.tag, "quote");
        assert_eq!(quote.children.len(), 2);
        assert_eq!(quote.children[0], Node::Text("hi ".to_string()));
    }

    #[test]
    fn test_unclosed_element_closes_at_end() {
        let nodes = parse("<b>bold");
        let b = single_element(&nodes);
        assert_eq!(b.children, vec![Node::Text("bold".to_string())]);
    }

    #[test]
    fn test_malformed_markup_stays_text() {
        assert_eq!(parse("a < b"), vec![Node::Text("a < b".to_string())]);
        assert_eq!(parse("3<5"), vec![Node::Text("3<5".to_string())]);
        assert_eq!(
            parse("<img src=\"x"),
            vec![Node::Text("<img src=\"x".to_string())]
        );
        assert_eq!(parse("x</b>"), vec![Node::Text("x</b>".to_string())]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let nodes = parse("&lt;tag&gt; &amp;lt; <img src=\"a?b=1&amp;c=2\"/>");
        assert_eq!(nodes[0], Node::Text("<tag> &lt; ".to_string()));
        assert_eq!(single_element(&nodes).attr("src"), Some("a?b=1&c=2"));
    }

    #[test]
    fn test_non_ascii_text() {
        let nodes = parse("描述一下<img src=\"a.png\"/>这张图");
        assert_eq!(nodes[0], Node::Text("描述一下".to_string()));
        assert_eq!(nodes[2], Node::Text("这张图".to_string()));
    }
}
