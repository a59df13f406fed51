use crate::checker::dictionary::Dictionary;

// Letter pairs commonly confused in Russian; each works in both directions.
const CONFUSIONS: [(char, char); 7] = [
    ('е', 'ё'),
    ('е', 'и'),
    ('а', 'о'),
    ('ш', 'щ'),
    ('ь', 'ъ'),
    ('з', 'с'),
    ('д', 'т'),
];

/// Up to `max_suggestions` dictionary words close to `word`, best first.
///
/// Near words sharing a three-letter prefix come first, then single edits,
/// then looser matches sharing only a two-letter prefix.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    let word = word.to_lowercase();
    let mut suggestions = Vec::new();

    push_near(&word, dictionary, 3, 2, max_suggestions, &mut suggestions);

    for edit in single_edits(&word) {
        if suggestions.len() >= max_suggestions {
            break;
        }
        if dictionary.contains(&edit) && !suggestions.contains(&edit) {
            suggestions.push(edit);
        }
    }

    push_near(&word, dictionary, 2, 3, max_suggestions, &mut suggestions);
    suggestions
}

/// Append words sharing the first `prefix_len` chars of `word` that are at
/// most `max_distance` edits away, nearest first.
fn push_near(
    word: &str,
    dictionary: &Dictionary,
    prefix_len: usize,
    max_distance: usize,
    limit: usize,
    suggestions: &mut Vec<String>,
) {
    if suggestions.len() >= limit {
        return;
    }
    let Some(prefix) = char_prefix(word, prefix_len) else {
        return;
    };

    let mut candidates: Vec<(usize, String)> = dictionary
        .words_with_prefix(prefix)
        .into_iter()
        .map(|candidate| (edit_distance(word, &candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    candidates.sort();

    for (_, candidate) in candidates {
        if suggestions.len() >= limit {
            break;
        }
        if !suggestions.contains(&candidate) {
            suggestions.push(candidate);
        }
    }
}

/// First `n` chars of `word`, or `None` if it is shorter.
fn char_prefix(word: &str, n: usize) -> Option<&str> {
    match word.char_indices().nth(n) {
        Some((idx, _)) => Some(&word[..idx]),
        None if word.chars().count() == n => Some(word),
        None => None,
    }
}

/// Levenshtein distance over chars, keeping two rows.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn confusable(ch: char) -> impl Iterator<Item = char> {
    CONFUSIONS.iter().filter_map(move |&(x, y)| match ch {
        c if c == x => Some(y),
        c if c == y => Some(x),
        _ => None,
    })
}

/// Words one deletion, adjacent swap or letter confusion away from `word`.
fn single_edits(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut edits: Vec<Vec<char>> = Vec::new();

    for i in 0..chars.len() {
        let mut deleted = chars.clone();
        deleted.remove(i);
        edits.push(deleted);

        if i + 1 < chars.len() {
            let mut swapped = chars.clone();
            swapped.swap(i, i + 1);
            edits.push(swapped);
        }

        for replacement in confusable(chars[i]) {
            let mut replaced = chars.clone();
            replaced[i] = replacement;
            edits.push(replaced);
        }
    }

    edits.into_iter().map(|edit| edit.into_iter().collect()).collect()
}
