//! Forgiving HTML tokenizer producing a flat event stream.
//!
//! Never fails: anything that does not start a tag, comment or doctype is
//! text. `script` and `style` contents are emitted as raw text up to their
//! closing tag.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Quote character around the value, `None` when unquoted or absent.
    pub quote: Option<char>,
    /// Whether `=` was present.
    pub has_value: bool,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    Doctype {
        /// Text between `<!` and `>`.
        content: &'a str,
        offset: usize,
    },
    Start {
        name: &'a str,
        attrs: Vec<Attr<'a>>,
        self_closing: bool,
        raw: &'a str,
        offset: usize,
    },
    End {
        name: &'a str,
        raw: &'a str,
        offset: usize,
    },
    Text {
        text: &'a str,
        offset: usize,
    },
    RawText {
        text: &'a str,
        offset: usize,
    },
    Comment {
        offset: usize,
    },
}

impl Event<'_> {
    pub fn offset(&self) -> usize {
        match self {
            Event::Doctype { offset, .. }
            | Event::Start { offset, .. }
            | Event::End { offset, .. }
            | Event::Text { offset, .. }
            | Event::RawText { offset, .. }
            | Event::Comment { offset } => *offset,
        }
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn starts_with_ci(hay: &[u8], needle: &[u8]) -> bool {
    hay.len() >= needle.len() && hay[..needle.len()].eq_ignore_ascii_case(needle)
}

/// Byte offset of `needle` at or after `from`.
fn find_from(src: &str, from: usize, needle: &str) -> Option<usize> {
    src.get(from..).and_then(|s| s.find(needle)).map(|i| from + i)
}

pub fn tokenize(src: &str) -> Vec<Event<'_>> {
    let bytes = src.as_bytes();
    let mut events = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    macro_rules! flush_text {
        ($end:expr) => {
            if $end > text_start {
                events.push(Event::Text {
                    text: &src[text_start..$end],
                    offset: text_start,
                });
            }
        };
    }

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &bytes[i..];
        if rest.starts_with(b"<!--") {
            flush_text!(i);
            let end = find_from(src, i + 4, "-->").map(|e| e + 3).unwrap_or(src.len());
            events.push(Event::Comment { offset: i });
            i = end;
            text_start = i;
        } else if starts_with_ci(rest, b"<!doctype") {
            flush_text!(i);
            let end = find_from(src, i, ">").unwrap_or(src.len());
            events.push(Event::Doctype {
                content: &src[i + 2..end],
                offset: i,
            });
            i = (end + 1).min(src.len());
            text_start = i;
        } else if rest.starts_with(b"<![CDATA[") {
            flush_text!(i);
            let end = find_from(src, i, "]]>").map(|e| e + 3).unwrap_or(src.len());
            events.push(Event::Comment { offset: i });
            i = end;
            text_start = i;
        } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            flush_text!(i);
            let end = find_from(src, i, ">").map(|e| e + 1).unwrap_or(src.len());
            events.push(Event::Comment { offset: i });
            i = end;
            text_start = i;
        } else if rest.len() > 2 && rest[1] == b'/' && rest[2].is_ascii_alphabetic() {
            flush_text!(i);
            let name_start = i + 2;
            let mut j = name_start;
            while j < bytes.len() && is_name_char(bytes[j]) {
                j += 1;
            }
            let end = find_from(src, j, ">").map(|e| e + 1).unwrap_or(src.len());
            events.push(Event::End {
                name: &src[name_start..j],
                raw: &src[i..end],
                offset: i,
            });
            i = end;
            text_start = i;
        } else if rest.len() > 1 && rest[1].is_ascii_alphabetic() {
            flush_text!(i);
            let (event, end) = parse_start_tag(src, i);
            let raw_text_tag = match &event {
                Event::Start {
                    name, self_closing, ..
                } if !self_closing
                    && (name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")) =>
                {
                    Some(name.to_ascii_lowercase())
                }
                _ => None,
            };
            events.push(event);
            i = end;
            text_start = i;
            if let Some(tag) = raw_text_tag {
                let close = find_close_tag(src, i, &tag).unwrap_or(src.len());
                if close > i {
                    events.push(Event::RawText {
                        text: &src[i..close],
                        offset: i,
                    });
                }
                i = close;
                text_start = i;
            }
        } else {
            // a lone '<' stays part of the text
            i += 1;
        }
    }
    flush_text!(bytes.len());
    events
}

/// Case-insensitive search for `</tag` starting at `from`.
fn find_close_tag(src: &str, from: usize, tag: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = from;
    while let Some(p) = find_from(src, i, "</") {
        let name = &bytes[p + 2..];
        if starts_with_ci(name, tag.as_bytes())
            && !name.get(tag.len()).copied().map(is_name_char).unwrap_or(false)
        {
            return Some(p);
        }
        i = p + 2;
    }
    None
}

/// Parse a start tag at `start` (pointing at `<`). Returns the event and the
/// offset just past the tag.
fn parse_start_tag(src: &str, start: usize) -> (Event<'_>, usize) {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    let name = &src[start + 1..i];
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>')
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        if i == name_start {
            // stray '=' without a name
            i += 1;
            continue;
        }
        let attr_name = &src[name_start..i];

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let (value, quote, end) = match bytes.get(j) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let close = find_from(src, j + 1, if q == b'"' { "\"" } else { "'" })
                        .unwrap_or(src.len());
                    (&src[j + 1..close], Some(q as char), (close + 1).min(src.len()))
                }
                _ => {
                    let mut k = j;
                    while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        k += 1;
                    }
                    (&src[j..k], None, k)
                }
            };
            attrs.push(Attr {
                name: attr_name,
                value,
                quote,
                has_value: true,
                offset: name_start,
            });
            i = end;
        } else {
            attrs.push(Attr {
                name: attr_name,
                value: "",
                quote: None,
                has_value: false,
                offset: name_start,
            });
        }
    }

    (
        Event::Start {
            name,
            attrs,
            self_closing,
            raw: &src[start..i],
            offset: start,
        },
        i,
    )
}
