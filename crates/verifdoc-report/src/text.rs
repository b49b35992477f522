// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text preparation for the built-in PDF fonts: ASCII folding and line wrapping.

/// Fold text to the ASCII subset the built-in Helvetica faces can show.
///
/// Typographic punctuation becomes its plain equivalent, accented Latin
/// letters lose their accent, and anything else outside ASCII is dropped.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push('\n'),
            '\t' | '\u{00A0}' => out.push(' '),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            '\u{2014}' | '\u{2013}' | '\u{2010}' | '\u{2011}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2022}' => out.push('*'),
            c => {
                if let Some(base) = fold_accent(c) {
                    out.push(base);
                }
            }
        }
    }
    out
}

fn fold_accent(c: char) -> Option<char> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => return None,
    };
    Some(base)
}

/// How many average-width glyphs fit across `width` points.
pub fn chars_per_line(width: f32, font_size: f32, char_width_factor: f32) -> usize {
    let glyph = font_size * char_width_factor;
    if glyph <= 0.0 {
        return 1;
    }
    ((width / glyph).floor() as usize).max(1)
}

/// Wrap text so that no line exceeds `max_chars` characters.
///
/// Existing newlines are kept, words are packed greedily, and words longer
/// than a line are force-broken. Always returns at least one line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_chars).peekable();
                current_len = 0;
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        lines.push(chunk.iter().collect());
                    } else {
                        current = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
                current_len = word_len;
            }
        }

        lines.push(current);
    }

    lines
}

/// Cut text to at most `limit` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Human-readable byte count using 1024-based units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
