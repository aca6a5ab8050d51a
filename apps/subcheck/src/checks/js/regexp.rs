//! Structural checks for regular expression patterns and flags.
//!
//! Not a matcher: only catches the mistakes a JavaScript engine rejects at
//! construction time (unbalanced groups and classes, dangling quantifiers,
//! reversed ranges, bad flags).

pub fn valid_flags(flags: &str) -> bool {
    let mut seen = String::new();
    for c in flags.chars() {
        if !"dgimsuyv".contains(c) || seen.contains(c) {
            return false;
        }
        seen.push(c);
    }
    !(seen.contains('u') && seen.contains('v'))
}

pub fn check_pattern(pattern: &str, unicode: bool) -> Result<(), &'static str> {
    let chars: Vec<char> = pattern.chars().collect();
    let n = chars.len();
    let mut i = 0;
    let mut depth = 0usize;
    // whether the previous item may take a quantifier
    let mut atom = false;
    while i < n {
        match chars[i] {
            '\\' => {
                if i + 1 >= n {
                    return Err("\\ at end of pattern");
                }
                atom = !matches!(chars[i + 1], 'b' | 'B');
                i += 2;
            }
            '[' => {
                i = char_class(&chars, i + 1)?;
                atom = true;
            }
            '(' => {
                i = group_open(&chars, i)?;
                depth += 1;
                atom = false;
            }
            ')' => {
                if depth == 0 {
                    return Err("Unmatched ')'");
                }
                depth -= 1;
                i += 1;
                atom = true;
            }
            '|' => {
                i += 1;
                atom = false;
            }
            '*' | '+' | '?' => {
                if !atom {
                    return Err("Nothing to repeat");
                }
                i += 1;
                if chars.get(i) == Some(&'?') {
                    i += 1;
                }
                atom = false;
            }
            '{' => match brace_quantifier(&chars, i) {
                Some((min, max, end)) => {
                    if !atom {
                        return Err("Nothing to repeat");
                    }
                    if max.is_some_and(|m| m < min) {
                        return Err("numbers out of order in {} quantifier");
                    }
                    i = end;
                    if chars.get(i) == Some(&'?') {
                        i += 1;
                    }
                    atom = false;
                }
                None if unicode => return Err("Lone quantifier brackets"),
                None => {
                    i += 1;
                    atom = true;
                }
            },
            '}' | ']' if unicode => return Err("Lone quantifier brackets"),
            '^' | '$' => {
                i += 1;
                atom = false;
            }
            _ => {
                i += 1;
                atom = true;
            }
        }
    }
    if depth > 0 {
        return Err("Unterminated group");
    }
    Ok(())
}

fn group_open(chars: &[char], i: usize) -> Result<usize, &'static str> {
    if chars.get(i + 1) != Some(&'?') {
        return Ok(i + 1);
    }
    match chars.get(i + 2) {
        Some(':' | '=' | '!') => Ok(i + 3),
        Some('<') => match chars.get(i + 3) {
            Some('=' | '!') => Ok(i + 4),
            _ => {
                let close = chars[i + 3..]
                    .iter()
                    .position(|c| *c == '>')
                    .ok_or("Invalid capture group name")?;
                let name = &chars[i + 3..i + 3 + close];
                let valid = name.first().is_some_and(|c| c.is_alphabetic() || matches!(c, '_' | '$'))
                    && name.iter().all(|c| c.is_alphanumeric() || matches!(c, '_' | '$'));
                if !valid {
                    return Err("Invalid capture group name");
                }
                Ok(i + 3 + close + 1)
            }
        },
        _ => Err("Invalid group"),
    }
}

/// `{n}`, `{n,}` or `{n,m}` starting at `i`; returns `(min, max, end)`.
fn brace_quantifier(chars: &[char], i: usize) -> Option<(u64, Option<u64>, usize)> {
    let close = chars[i..].iter().position(|c| *c == '}')? + i;
    let body: String = chars[i + 1..close].iter().collect();
    let (min, max) = match body.split_once(',') {
        Some((a, "")) => (a.parse().ok()?, None),
        Some((a, b)) => (a.parse().ok()?, Some(b.parse().ok()?)),
        None => {
            let v = body.parse().ok()?;
            (v, Some(v))
        }
    };
    Some((min, max, close + 1))
}

/// Scan a class body starting after `[`; returns the index after `]`.
fn char_class(chars: &[char], mut i: usize) -> Result<usize, &'static str> {
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    loop {
        let Some(&c) = chars.get(i) else {
            return Err("Unterminated character class");
        };
        if c == ']' {
            return Ok(i + 1);
        }
        let (low, next) = class_atom(chars, i)?;
        i = next;
        if chars.get(i) == Some(&'-') && chars.get(i + 1).is_some_and(|c| *c != ']') {
            let (high, after) = class_atom(chars, i + 1)?;
            if let (Some(l), Some(h)) = (low, high) {
                if l > h {
                    return Err("Range out of order in character class");
                }
            }
            i = after;
        }
    }
}

/// One class member; the value is `None` for class escapes like `\d`.
fn class_atom(chars: &[char], i: usize) -> Result<(Option<char>, usize), &'static str> {
    if chars[i] != '\\' {
        return Ok((Some(chars[i]), i + 1));
    }
    let Some(&e) = chars.get(i + 1) else {
        return Err("\\ at end of pattern");
    };
    let simple = |c: char| Ok((Some(c), i + 2));
    match e {
        'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'p' | 'P' => Ok((None, i + 2)),
        'n' => simple('\n'),
        't' => simple('\t'),
        'r' => simple('\r'),
        'f' => simple('\u{c}'),
        'v' => simple('\u{b}'),
        'b' => simple('\u{8}'),
        '0' => simple('\0'),
        'x' => Ok(hex_escape(chars, i + 2, 2)),
        'u' => Ok(hex_escape(chars, i + 2, 4)),
        other => simple(other),
    }
}

fn hex_escape(chars: &[char], start: usize, len: usize) -> (Option<char>, usize) {
    let digits: String = chars.iter().skip(start).take(len).collect();
    match u32::from_str_radix(&digits, 16).ok().filter(|_| digits.len() == len).and_then(char::from_u32) {
        Some(c) => (Some(c), start + len),
        None => (Some(chars[start - 1]), start),
    }
}
